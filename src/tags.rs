//! Typed version-tag ingestion.
//!
//! Version tags are collected once per invocation into a [TagTable];
//! lookups afterwards are plain map reads with the numeric triple already
//! parsed.

use std::collections::{BTreeSet, HashMap};

use regex::Regex;

use crate::domain::Version;
use crate::error::Result;
use crate::git::Repository;

const VALID_TAG: &str = r"^v?\d+\.\d+(\.\d+)?$";

/// A version tag resolved to its numeric triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntry {
    /// Tag basename, e.g. "v1.2" or "1.2.3"
    pub name: String,
    /// Parsed version, patch defaulting to 0 when the tag omits it
    pub version: Version,
}

/// Mapping from commit hash to the version tag pointing at it.
///
/// Only refs under `refs/tags/` whose basename matches
/// `[v]MAJOR.MINOR[.PATCH]` are kept. Built once per invocation and
/// read-only afterwards.
#[derive(Debug, Default)]
pub struct TagTable {
    by_commit: HashMap<String, TagEntry>,
    names: BTreeSet<String>,
}

impl TagTable {
    /// Collect the repository's version tags.
    ///
    /// A ref that matches the tag naming pattern but whose numbers fail to
    /// parse fails the whole run; treating it as untagged would silently
    /// shift every derived version after it.
    pub fn from_repository<R: Repository + ?Sized>(repo: &R) -> Result<Self> {
        let valid =
            Regex::new(VALID_TAG).map_err(|e| crate::error::AutosemverError::config(e.to_string()))?;
        let mut by_commit = HashMap::new();
        let mut names = BTreeSet::new();

        for (ref_name, commit_id) in repo.list_refs()? {
            let base = match ref_name.strip_prefix("refs/tags/") {
                Some(base) => base,
                None => continue,
            };
            if !valid.is_match(base) {
                continue;
            }

            let version = Version::parse(base)?;
            names.insert(base.to_string());
            by_commit.insert(
                commit_id,
                TagEntry {
                    name: base.to_string(),
                    version,
                },
            );
        }

        Ok(TagTable { by_commit, names })
    }

    /// The tag pointing at a commit, if any.
    pub fn get(&self, commit_id: &str) -> Option<&TagEntry> {
        self.by_commit.get(commit_id)
    }

    /// Whether a tag with this basename already exists.
    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn is_empty(&self) -> bool {
        self.by_commit.is_empty()
    }
}
