use std::collections::BTreeMap;
use std::path::Path;

use git2::{ErrorCode, ObjectType, Oid, Repository as Git2Repo, Sort};

use crate::domain::Commit;
use crate::error::{AutosemverError, Result};
use crate::git::Repository;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository.
    ///
    /// A path that does not resolve to a repository is a fatal
    /// [AutosemverError::RepositoryUnavailable] error.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path.as_ref()).map_err(|e| {
            AutosemverError::unavailable(format!("{}: {}", path.as_ref().display(), e))
        })?;

        Ok(Git2Repository { repo })
    }

    /// Create from an existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    fn to_commit(commit: &git2::Commit<'_>) -> Commit {
        // Decode text once at the boundary; everything downstream works on
        // UTF-8 strings.
        let author = commit.author();
        let name = String::from_utf8_lossy(author.name_bytes()).into_owned();
        let email = String::from_utf8_lossy(author.email_bytes()).into_owned();

        Commit {
            id: commit.id().to_string(),
            author: format!("{} <{}>", name, email),
            message: String::from_utf8_lossy(commit.message_bytes()).into_owned(),
            timestamp: commit.time().seconds(),
            parents: commit.parent_ids().map(|p| p.to_string()).collect(),
        }
    }
}

impl Repository for Git2Repository {
    fn list_refs(&self) -> Result<BTreeMap<String, String>> {
        let mut refs = BTreeMap::new();

        for reference in self.repo.references()? {
            let reference = reference?;
            let name = String::from_utf8_lossy(reference.name_bytes()).into_owned();
            // Annotated tags peel to the commit they ultimately point at.
            if let Ok(object) = reference.peel(ObjectType::Commit) {
                refs.insert(name, object.id().to_string());
            }
        }

        Ok(refs)
    }

    fn get_commit(&self, id: &str) -> Result<Commit> {
        let oid = Oid::from_str(id)
            .map_err(|_| AutosemverError::not_found(format!("invalid object id '{}'", id)))?;

        match self.repo.find_commit(oid) {
            Ok(commit) => Ok(Self::to_commit(&commit)),
            Err(e) if e.code() == ErrorCode::NotFound => {
                Err(AutosemverError::not_found(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn walk_topological(&self) -> Result<Vec<Commit>> {
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL)?;

        match revwalk.push_head() {
            Ok(()) => {}
            // Empty and unborn repositories degrade to an empty walk. Some
            // libgit2 versions surface an unborn HEAD as a generic "reference
            // not found" rather than NotFound/UnbornBranch, so confirm against
            // the HEAD reference itself.
            Err(e)
                if e.code() == ErrorCode::NotFound
                    || e.code() == ErrorCode::UnbornBranch
                    || matches!(
                        self.repo.head().err().map(|he| he.code()),
                        Some(ErrorCode::NotFound) | Some(ErrorCode::UnbornBranch)
                    ) =>
            {
                return Ok(Vec::new())
            }
            Err(e) => return Err(e.into()),
        }

        let mut commits = Vec::new();
        for oid in revwalk {
            let oid = oid?;
            match self.repo.find_commit(oid) {
                Ok(commit) => commits.push(Self::to_commit(&commit)),
                // Dangling entries are skipped, not fatal.
                Err(e) if e.code() == ErrorCode::NotFound => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(commits)
    }

    fn create_tag_ref(&self, name: &str, commit_id: &str) -> Result<()> {
        let oid = Oid::from_str(commit_id)
            .map_err(|_| AutosemverError::not_found(format!("invalid object id '{}'", commit_id)))?;

        self.repo
            .reference(&format!("refs/tags/{}", name), oid, false, "version tag")?;

        Ok(())
    }
}

// SAFETY: Git2Repository wraps git2::Repository which is Send.
// libgit2 is thread-safe for the read operations this trait performs.
unsafe impl Sync for Git2Repository {}
