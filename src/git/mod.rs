//! Repository access abstraction layer
//!
//! This module provides a trait-based abstraction over repository reads,
//! allowing for multiple implementations including real git repositories
//! and an in-memory implementation for testing.
//!
//! The primary abstraction is the [Repository] trait. Concrete
//! implementations:
//!
//! - [repository::Git2Repository]: a real implementation using the `git2` crate
//! - [mock::MockRepository]: an in-memory implementation for testing
//!
//! Most code should depend on the [Repository] trait rather than concrete
//! implementations.

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::domain::Commit;
use crate::error::Result;

/// Read access to a repository's commits and refs.
///
/// All implementors must be `Send + Sync` to allow safe sharing across
/// threads. Methods return [crate::error::Result]; implementations map
/// underlying errors (like `git2::Error`) to the appropriate
/// [crate::error::AutosemverError] variants. A missing object must surface
/// as [crate::error::AutosemverError::ObjectNotFound] so traversal can skip
/// it instead of failing the run.
pub trait Repository: Send + Sync {
    /// All refs in the repository as a `ref name -> commit hash` mapping.
    ///
    /// Refs pointing at annotated tag objects are peeled to the commit they
    /// ultimately reference.
    fn list_refs(&self) -> Result<BTreeMap<String, String>>;

    /// Look up a single commit by its full hex id.
    fn get_commit(&self, id: &str) -> Result<Commit>;

    /// All commits reachable from the current head, newest first, in
    /// topological order (a commit appears before any of its parents).
    ///
    /// An empty or head-less repository yields an empty sequence.
    fn walk_topological(&self) -> Result<Vec<Commit>>;

    /// Write a lightweight tag ref `refs/tags/<name>` pointing at a commit.
    fn create_tag_ref(&self, name: &str, commit_id: &str) -> Result<()>;
}

/// Group the repository's refs by the commit they point at.
///
/// Each commit's set also contains its own hash, so a full hash behaves
/// like any other ref when matched against a requested start point.
pub fn refs_per_commit<R: Repository + ?Sized>(
    repo: &R,
) -> Result<HashMap<String, BTreeSet<String>>> {
    let mut refs: HashMap<String, BTreeSet<String>> = HashMap::new();
    for (ref_name, commit_id) in repo.list_refs()? {
        let entry = refs.entry(commit_id.clone()).or_default();
        entry.insert(commit_id);
        entry.insert(ref_name);
    }
    Ok(refs)
}

/// Whether a requested refspec matches a ref name "fuzzily".
///
/// The request matches when it equals some right-aligned slash-joined
/// suffix of the ref's path components: requesting `main` matches
/// `refs/heads/main`, as does `heads/main` and the full ref name.
pub fn fuzzy_matches_ref(fuzzy_ref: &str, ref_name: &str) -> bool {
    let mut cur_section = String::new();
    for path_section in ref_name.split('/').rev() {
        if cur_section.is_empty() {
            cur_section = path_section.to_string();
        } else {
            cur_section = format!("{}/{}", path_section, cur_section);
        }
        if fuzzy_ref == cur_section {
            return true;
        }
    }
    false
}

/// Whether a requested refspec fuzzily matches any ref in a set.
pub fn fuzzy_matches_refs<'a, I>(fuzzy_ref: &str, refs: I) -> bool
where
    I: IntoIterator<Item = &'a String>,
{
    refs.into_iter()
        .any(|ref_name| fuzzy_matches_ref(fuzzy_ref, ref_name))
}
