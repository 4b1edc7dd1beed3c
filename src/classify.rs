//! Commit classification from message markers and tags.
//!
//! A commit message opts out of the default bugfix classification with a
//! conventional marker line in its body:
//!
//! ```text
//! Subject line
//!
//! sem-ver: feature
//! ```
//!
//! Markers only count when they start a line after the subject; a
//! `sem-ver:` in the subject line itself is ignored.

use regex::Regex;

use crate::domain::{Classification, Commit, Version};
use crate::tags::TagTable;

// The leading \n anchors each marker to a body line.
const FEAT_HEADER: &str = r"(?i)\nsem-ver:[^\n]*(feature|deprecat)";
const FEAT_MSG: &str = r"\n\* NEW";
const MAJOR_HEADER: &str = r"(?i)\nsem-ver:[^\n]*break";
const MAJOR_MSG: &str = r"\n\* INCOMPATIBLE";

fn matches(pattern: &str, text: &str) -> bool {
    Regex::new(pattern)
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}

/// Whether a commit message carries an API-break marker.
pub fn is_api_break(message: &str) -> bool {
    matches(MAJOR_HEADER, message) || matches(MAJOR_MSG, message)
}

/// Whether a commit message carries a feature marker.
pub fn is_feature(message: &str) -> bool {
    matches(FEAT_HEADER, message) || matches(FEAT_MSG, message)
}

/// Classify a lineage node.
///
/// A tagged commit is classified from the tag's numbers against
/// `prev_version` alone; message text is never inspected for tagged
/// commits. Untagged commits scan their own message and every message in
/// the merged set, with api-break taking precedence over feature, and
/// anything unmarked counting as a bugfix.
pub fn classify(
    commit: &Commit,
    merged: &[Commit],
    tags: &TagTable,
    prev_version: &Version,
) -> Classification {
    if let Some(entry) = tags.get(&commit.id) {
        if entry.version.major > prev_version.major {
            return Classification::ApiBreak;
        } else if entry.version.minor > prev_version.minor {
            return Classification::Feature;
        }
        return Classification::Bug;
    }

    classify_markers(commit, merged)
}

/// Marker-only classification over a commit and its merged set.
///
/// The merged set is a logical OR: one marker anywhere in the group
/// classifies the whole node.
pub fn classify_markers(commit: &Commit, merged: &[Commit]) -> Classification {
    let messages = || std::iter::once(commit).chain(merged.iter());

    if messages().any(|c| is_api_break(&c.message)) {
        Classification::ApiBreak
    } else if messages().any(|c| is_feature(&c.message)) {
        Classification::Feature
    } else {
        Classification::Bug
    }
}
