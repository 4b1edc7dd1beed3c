//! The operations surfaced to callers and the command line: version
//! derivation, changelog, release notes, authors and version tagging.
//!
//! Every operation is a single pass: linearize the graph, fold the
//! version over the lineage oldest-to-newest, and render what the fold
//! visits. Re-running any of them on an unchanged repository produces
//! byte-identical output.

use std::collections::{BTreeSet, HashMap};

use crate::classify::classify;
use crate::domain::{Classification, Version};
use crate::error::Result;
use crate::git::{fuzzy_matches_refs, refs_per_commit, Repository};
use crate::lineage::{linearize, LineageNode};
use crate::render::pretty_commit;
use crate::tags::TagTable;
use crate::versioning::next_version;

/// One-way latch deciding which lineage nodes make it into a document.
///
/// Open from the start when no start point was requested; otherwise opens
/// at the first node whose hash has the requested prefix or whose refs
/// fuzzily match the requested refspec, and stays open for the rest of
/// the walk.
struct IncludeLatch<'a> {
    from_commit: Option<&'a str>,
    open: bool,
}

impl<'a> IncludeLatch<'a> {
    fn new(from_commit: Option<&'a str>) -> Self {
        IncludeLatch {
            from_commit,
            open: from_commit.is_none(),
        }
    }

    fn admits(&mut self, node: &LineageNode, refs: &HashMap<String, BTreeSet<String>>) -> bool {
        if self.open {
            return true;
        }
        let wanted = match self.from_commit {
            Some(wanted) => wanted,
            None => return true,
        };
        let matches = node.commit.id.starts_with(wanted)
            || refs
                .get(&node.commit.id)
                .map(|names| fuzzy_matches_refs(wanted, names))
                .unwrap_or(false);
        if matches {
            self.open = true;
        }
        matches
    }
}

/// Derive the current version of the repository.
///
/// An empty repository is version `0.0.0`.
pub fn current_version<R: Repository + ?Sized>(repo: &R) -> Result<Version> {
    let tags = TagTable::from_repository(repo)?;
    let mut version = Version::default();

    for node in linearize(repo)? {
        version = next_version(&node.commit, &node.merged, &tags, &version);
    }

    Ok(version)
}

/// Render one lineage node: the trunk entry followed by entries for the
/// commits it merged in.
fn render_node(
    node: &LineageNode,
    version: &Version,
    kind: Classification,
    child_kind: Classification,
    bugtracker_url: &str,
    rpm_format: bool,
) -> Result<String> {
    let mut entry = pretty_commit(
        &node.commit,
        Some(&version.to_string()),
        kind,
        bugtracker_url,
        rpm_format,
    )?;
    for child in &node.merged {
        entry.push_str(&pretty_commit(
            child,
            None,
            child_kind,
            bugtracker_url,
            rpm_format,
        )?);
    }
    Ok(entry)
}

/// Generate the changelog, newest entries first.
///
/// With `from_commit`, entries start at the first lineage node matching
/// the given hash prefix or refspec and continue to the tip. The rpm
/// layout swaps the version-keyed header for an author-and-date one.
pub fn changelog<R: Repository + ?Sized>(
    repo: &R,
    from_commit: Option<&str>,
    bugtracker_url: &str,
    rpm_format: bool,
) -> Result<String> {
    let tags = TagTable::from_repository(repo)?;
    let refs = refs_per_commit(repo)?;
    let mut latch = IncludeLatch::new(from_commit);

    let mut entries = Vec::new();
    let mut version = Version::default();
    let mut prev_version = version;

    for node in linearize(repo)? {
        version = next_version(&node.commit, &node.merged, &tags, &version);

        if latch.admits(&node, &refs) {
            let kind = classify(&node.commit, &node.merged, &tags, &prev_version);
            let child_kind = classify(&node.commit, &[], &tags, &prev_version);
            entries.push(render_node(
                &node,
                &version,
                kind,
                child_kind,
                bugtracker_url,
                rpm_format,
            )?);
        }

        prev_version = version;
    }

    entries.reverse();
    Ok(entries.join("\n"))
}

#[derive(Default)]
struct NotesBucket {
    breaks: Vec<String>,
    features: Vec<String>,
    bugs: Vec<String>,
}

impl NotesBucket {
    fn push(&mut self, kind: Classification, entry: String) {
        match kind {
            Classification::ApiBreak => self.breaks.push(entry),
            Classification::Feature => self.features.push(entry),
            Classification::Bug => self.bugs.push(entry),
        }
    }
}

fn render_notes_section(version: &str, bucket: &NotesBucket) -> String {
    fn sub_section(entries: &[String], placeholder: &str) -> String {
        if entries.is_empty() {
            format!("{}\n", placeholder)
        } else {
            entries.join("\n")
        }
    }

    format!(
        "New changes for version {}\n\
         =================================\n\
         \n\
         API Breaking changes\n\
         --------------------\n\
         {}\n\
         New features\n\
         ------------\n\
         {}\n\
         Bugfixes and minor changes\n\
         --------------------------\n\
         {}",
        version,
        sub_section(&bucket.breaks, "No new API breaking changes"),
        sub_section(&bucket.features, "No new features"),
        sub_section(&bucket.bugs, "No new bugs"),
    )
}

/// Generate release notes, sectioned by major version.
///
/// Walking oldest to newest, entries accumulate in a bucket of breaking
/// changes, features and bugfixes. Each api-break seals the bucket under
/// the version in effect before the break and starts a fresh one; the
/// final bucket seals under the last version seen. Sections render
/// newest-first, the entries inside each sub-list oldest-first, with a
/// placeholder line where a sub-list is empty.
pub fn release_notes<R: Repository + ?Sized>(
    repo: &R,
    from_commit: Option<&str>,
    bugtracker_url: &str,
) -> Result<String> {
    let tags = TagTable::from_repository(repo)?;
    let refs = refs_per_commit(repo)?;
    let mut latch = IncludeLatch::new(from_commit);

    let mut sections: Vec<(String, NotesBucket)> = Vec::new();
    let mut bucket = NotesBucket::default();
    let mut version = Version::default();
    let mut prev_version = version;

    for node in linearize(repo)? {
        version = next_version(&node.commit, &node.merged, &tags, &version);

        if latch.admits(&node, &refs) {
            let kind = classify(&node.commit, &node.merged, &tags, &prev_version);
            let child_kind = classify(&node.commit, &[], &tags, &prev_version);

            if kind == Classification::ApiBreak {
                sections.push((prev_version.to_string(), std::mem::take(&mut bucket)));
            }

            let entry = render_node(&node, &version, kind, child_kind, bugtracker_url, false)?;
            bucket.push(kind, entry);
        }

        prev_version = version;
    }

    sections.push((version.to_string(), bucket));

    let rendered: Vec<String> = sections
        .iter()
        .rev()
        .map(|(version, bucket)| render_notes_section(version, bucket))
        .collect();

    Ok(rendered.join("\n"))
}

/// Collect the distinct authors of the included history.
///
/// Includes the author of every admitted trunk commit and of every commit
/// in its merged set; sorted lexicographically, without duplicates.
pub fn authors<R: Repository + ?Sized>(
    repo: &R,
    from_commit: Option<&str>,
) -> Result<Vec<String>> {
    let refs = refs_per_commit(repo)?;
    let mut latch = IncludeLatch::new(from_commit);
    let mut authors: BTreeSet<String> = BTreeSet::new();

    for node in linearize(repo)? {
        if latch.admits(&node, &refs) {
            authors.insert(node.commit.author.clone());
            for child in &node.merged {
                authors.insert(child.author.clone());
            }
        }
    }

    Ok(authors.into_iter().collect())
}

/// Tag every major/minor boundary crossed by the walk.
///
/// Writes a `refs/tags/MAJOR.MINOR` ref at each lineage node where the
/// derived major/minor pair changes, skipping pairs that already carry a
/// tag of that name. Returns one `"MAJOR.MINOR -> <hash>"` line per tag
/// written.
pub fn create_version_tags<R: Repository + ?Sized>(repo: &R) -> Result<Vec<String>> {
    let tags = TagTable::from_repository(repo)?;
    let mut version = Version::default();
    let mut last_pair = (version.major, version.minor);
    let mut created = Vec::new();

    for node in linearize(repo)? {
        version = next_version(&node.commit, &node.merged, &tags, &version);
        let pair = (version.major, version.minor);

        if pair != last_pair {
            let name = format!("{}.{}", pair.0, pair.1);
            if !tags.contains_name(&name) {
                repo.create_tag_ref(&name, &node.commit.id)?;
                created.push(format!("{} -> {}", name, node.commit.id));
            }
            last_pair = pair;
        }
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;

    fn semver_repo() -> MockRepository {
        let mut repo = MockRepository::new();
        repo.add_commit("a1", "Alice <a@x.com>", "Initial commit", 1, &[]);
        repo.add_commit(
            "b2",
            "Bob <b@x.com>",
            "Subject\n\nsem-ver: feature\n",
            2,
            &["a1"],
        );
        repo.add_commit(
            "c3",
            "Alice <a@x.com>",
            "Subject\n\nsem-ver: breaks compatibility\n",
            3,
            &["b2"],
        );
        repo
    }

    #[test]
    fn test_current_version_end_to_end() {
        let repo = semver_repo();
        assert_eq!(current_version(&repo).unwrap().to_string(), "1.0.0");
    }

    #[test]
    fn test_current_version_of_empty_repository() {
        let repo = MockRepository::new();
        assert_eq!(current_version(&repo).unwrap().to_string(), "0.0.0");
    }

    #[test]
    fn test_current_version_tag_reanchors_count() {
        let mut repo = semver_repo();
        repo.add_ref("refs/tags/2.3", "c3");
        repo.add_commit("d4", "Alice <a@x.com>", "plain fix", 4, &["c3"]);

        assert_eq!(current_version(&repo).unwrap().to_string(), "2.3.1");
    }

    #[test]
    fn test_changelog_newest_first() {
        let repo = semver_repo();
        let log = changelog(&repo, None, "", false).unwrap();

        let first = log.find("* 1.0.0").unwrap();
        let second = log.find("* 0.1.0").unwrap();
        let third = log.find("* 0.0.1").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn test_changelog_is_idempotent() {
        let repo = semver_repo();
        let once = changelog(&repo, None, "", false).unwrap();
        let twice = changelog(&repo, None, "", false).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_changelog_from_commit_prefix_latch() {
        let repo = semver_repo();
        let log = changelog(&repo, Some("b2"), "", false).unwrap();

        assert!(!log.contains("Initial commit"));
        assert!(log.contains("* 0.1.0"));
        assert!(log.contains("* 1.0.0"));
    }

    #[test]
    fn test_changelog_from_refspec_fuzzy_latch() {
        let mut repo = semver_repo();
        repo.add_ref("refs/heads/topic", "b2");
        let log = changelog(&repo, Some("topic"), "", false).unwrap();

        assert!(!log.contains("Initial commit"));
        assert!(log.contains("* 0.1.0"));
    }

    #[test]
    fn test_changelog_unmatched_start_point_is_empty() {
        let repo = semver_repo();
        assert_eq!(changelog(&repo, Some("zz"), "", false).unwrap(), "");
    }

    #[test]
    fn test_changelog_includes_merged_commits_without_version() {
        let mut repo = MockRepository::new();
        repo.add_commit("a1", "Alice <a@x.com>", "Initial commit", 1, &[]);
        repo.add_commit("x2", "Bob <b@x.com>", "Branch work", 2, &["a1"]);
        repo.add_commit(
            "m3",
            "Alice <a@x.com>",
            "Merge branch 'topic'",
            3,
            &["a1", "x2"],
        );

        let log = changelog(&repo, None, "", false).unwrap();
        assert!(log.contains("* 0.0.2 \"Alice <a@x.com>\""));
        assert!(log.contains(": Branch work"));
        assert!(!log.contains("* 0.0.2 \"Bob"));
    }

    #[test]
    fn test_changelog_rpm_layout() {
        let repo = semver_repo();
        let log = changelog(&repo, None, "", true).unwrap();
        assert!(log.contains("Alice <a@x.com> - 1.0.0"));
        assert!(!log.contains("* 1.0.0 \""));
    }

    #[test]
    fn test_release_notes_sections_newest_first() {
        let repo = semver_repo();
        let notes = release_notes(&repo, None, "").unwrap();

        let head = notes.find("New changes for version 1.0.0").unwrap();
        let tail = notes.find("New changes for version 0.1.0").unwrap();
        assert!(head < tail);
    }

    #[test]
    fn test_release_notes_buckets_and_placeholders() {
        let repo = semver_repo();
        let notes = release_notes(&repo, None, "").unwrap();

        // The break bucket holds only the break; its other lists are empty.
        let head_section = &notes[..notes.find("New changes for version 0.1.0").unwrap()];
        assert!(head_section.contains("MAJOR c3"));
        assert!(head_section.contains("No new features"));
        assert!(head_section.contains("No new bugs"));

        // The sealed bucket holds the feature and the root bugfix.
        let tail_section = &notes[notes.find("New changes for version 0.1.0").unwrap()..];
        assert!(tail_section.contains("No new API breaking changes"));
        assert!(tail_section.contains("FEATURE b2"));
        assert!(tail_section.contains("MINOR a1"));
    }

    #[test]
    fn test_release_notes_without_breaks_has_single_section() {
        let mut repo = MockRepository::new();
        repo.add_commit("a1", "Alice <a@x.com>", "Initial commit", 1, &[]);
        repo.add_commit("b2", "Bob <b@x.com>", "Another fix", 2, &["a1"]);

        let notes = release_notes(&repo, None, "").unwrap();
        assert_eq!(notes.matches("New changes for version").count(), 1);
        assert!(notes.contains("New changes for version 0.0.2"));
    }

    #[test]
    fn test_authors_sorted_and_deduplicated() {
        let mut repo = MockRepository::new();
        repo.add_commit("a1", "Bob <b@x.com>", "Initial commit", 1, &[]);
        repo.add_commit("b2", "Alice <a@x.com>", "Second", 2, &["a1"]);
        repo.add_commit("c3", "Bob <b@x.com>", "Third", 3, &["b2"]);

        assert_eq!(
            authors(&repo, None).unwrap(),
            vec!["Alice <a@x.com>".to_string(), "Bob <b@x.com>".to_string()]
        );
    }

    #[test]
    fn test_authors_include_merged_set() {
        let mut repo = MockRepository::new();
        repo.add_commit("a1", "Alice <a@x.com>", "Initial commit", 1, &[]);
        repo.add_commit("x2", "Carol <c@x.com>", "Branch work", 2, &["a1"]);
        repo.add_commit(
            "m3",
            "Alice <a@x.com>",
            "Merge branch 'topic'",
            3,
            &["a1", "x2"],
        );

        let all = authors(&repo, None).unwrap();
        assert!(all.contains(&"Carol <c@x.com>".to_string()));
    }

    #[test]
    fn test_authors_from_commit_latch() {
        let mut repo = MockRepository::new();
        repo.add_commit("a1", "Early <e@x.com>", "Initial commit", 1, &[]);
        repo.add_commit("b2", "Late <l@x.com>", "Second", 2, &["a1"]);

        assert_eq!(
            authors(&repo, Some("b2")).unwrap(),
            vec!["Late <l@x.com>".to_string()]
        );
    }

    #[test]
    fn test_create_version_tags_writes_boundaries() {
        let repo = semver_repo();
        let lines = create_version_tags(&repo).unwrap();

        assert_eq!(lines, vec!["0.1 -> b2".to_string(), "1.0 -> c3".to_string()]);
        let refs = repo.list_refs().unwrap();
        assert_eq!(refs.get("refs/tags/0.1"), Some(&"b2".to_string()));
        assert_eq!(refs.get("refs/tags/1.0"), Some(&"c3".to_string()));
    }

    #[test]
    fn test_create_version_tags_skips_existing_names() {
        let mut repo = semver_repo();
        repo.add_ref("refs/tags/0.1", "b2");

        let lines = create_version_tags(&repo).unwrap();
        assert_eq!(lines, vec!["1.0 -> c3".to_string()]);
    }

    #[test]
    fn test_create_version_tags_ignores_patch_bumps() {
        let mut repo = MockRepository::new();
        repo.add_commit("a1", "Alice <a@x.com>", "Initial commit", 1, &[]);
        repo.add_commit("b2", "Alice <a@x.com>", "Another fix", 2, &["a1"]);

        assert!(create_version_tags(&repo).unwrap().is_empty());
    }
}
