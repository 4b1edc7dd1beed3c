/// A single commit as read from the repository.
///
/// Text fields are UTF-8 decoded at the repository boundary; downstream code
/// never re-decides the encoding. The record is immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    /// Full hex digest identifying the commit
    pub id: String,
    /// Free-text author, usually "Name <email>"
    pub author: String,
    /// Full commit message, first line is the subject
    pub message: String,
    /// Commit time as unix seconds
    pub timestamp: i64,
    /// Ordered parent hashes (0, 1 or more)
    pub parents: Vec<String>,
}

impl Commit {
    /// The subject line of the commit message.
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    /// Shortened hash used in rendered entries.
    pub fn short_id(&self) -> String {
        self.id.chars().take(8).collect()
    }

    /// Whether this commit is a merge point.
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}
