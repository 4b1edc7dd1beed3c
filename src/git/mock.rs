use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use crate::domain::Commit;
use crate::error::{AutosemverError, Result};
use crate::git::Repository;

/// In-memory repository for testing without actual git operations.
///
/// Commits are added oldest first; [Repository::walk_topological] replays
/// them in reverse insertion order, so tests control the walk order by
/// construction.
pub struct MockRepository {
    commits: Vec<Commit>,
    by_id: HashMap<String, Commit>,
    refs: Mutex<BTreeMap<String, String>>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository {
            commits: Vec::new(),
            by_id: HashMap::new(),
            refs: Mutex::new(BTreeMap::new()),
        }
    }

    /// Add a commit, oldest first.
    pub fn add_commit(
        &mut self,
        id: &str,
        author: &str,
        message: &str,
        timestamp: i64,
        parents: &[&str],
    ) {
        let commit = Commit {
            id: id.to_string(),
            author: author.to_string(),
            message: message.to_string(),
            timestamp,
            parents: parents.iter().map(|p| p.to_string()).collect(),
        };
        self.by_id.insert(commit.id.clone(), commit.clone());
        self.commits.push(commit);
    }

    /// Add a ref pointing to a commit id.
    pub fn add_ref(&mut self, name: impl Into<String>, commit_id: impl Into<String>) {
        self.refs
            .lock()
            .unwrap()
            .insert(name.into(), commit_id.into());
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn list_refs(&self) -> Result<BTreeMap<String, String>> {
        Ok(self.refs.lock().unwrap().clone())
    }

    fn get_commit(&self, id: &str) -> Result<Commit> {
        self.by_id
            .get(id)
            .cloned()
            .ok_or_else(|| AutosemverError::not_found(id.to_string()))
    }

    fn walk_topological(&self) -> Result<Vec<Commit>> {
        Ok(self.commits.iter().rev().cloned().collect())
    }

    fn create_tag_ref(&self, name: &str, commit_id: &str) -> Result<()> {
        self.refs
            .lock()
            .unwrap()
            .insert(format!("refs/tags/{}", name), commit_id.to_string());
        Ok(())
    }
}
