//! The version-derivation fold.
//!
//! One left-to-right fold over the oldest-to-newest lineage sequence,
//! starting from `0.0.0`. Each step either adopts a tag's own numbers or
//! bumps one component according to the node's classification.

use crate::classify::classify_markers;
use crate::domain::{Commit, Version};
use crate::tags::TagTable;

/// Advance the running version across one lineage node.
///
/// A tag on the commit is ground truth: its triple replaces the running
/// version even if it appears to go backward. Untagged nodes bump the
/// component their marker classification selects.
pub fn next_version(
    commit: &Commit,
    merged: &[Commit],
    tags: &TagTable,
    running: &Version,
) -> Version {
    if let Some(entry) = tags.get(&commit.id) {
        return entry.version;
    }

    running.bump(classify_markers(commit, merged))
}
