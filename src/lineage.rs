//! First-parent linearization of the commit graph.
//!
//! The commit graph is flattened into an ordered sequence of
//! [LineageNode]s: one per trunk commit, each carrying the commits that
//! the trunk absorbed at that point via merges. Later stages (classifier,
//! version fold, renderer) only ever see this sequence.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::domain::Commit;
use crate::error::Result;
use crate::git::Repository;

/// One step of the linearized history: a trunk commit plus everything it
/// merged in.
///
/// `merged` is sorted by commit id so rendered output is reproducible;
/// classification treats it as an unordered set.
#[derive(Debug, Clone)]
pub struct LineageNode {
    pub commit: Commit,
    pub merged: Vec<Commit>,
}

/// Walk state for resolving which commits lie on the trunk line.
///
/// Held per traversal so concurrent linearizations never share it.
struct TrunkWalk {
    ordered: Vec<String>,
    seen: HashSet<String>,
    on_merge: bool,
}

impl TrunkWalk {
    fn new() -> Self {
        TrunkWalk {
            ordered: Vec::new(),
            seen: HashSet::new(),
            on_merge: false,
        }
    }

    fn push(&mut self, id: &str) {
        if self.seen.insert(id.to_string()) {
            self.ordered.push(id.to_string());
        }
    }

    fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }
}

/// Resolve the trunk commits from a newest-first topological walk.
///
/// Root commits always belong to the trunk. Before the first merge is
/// seen, every single-parent commit and its parent do too. The first
/// merge flips the walk into merge mode: from then on a commit only
/// extends the trunk through its first parent, and only if it is already
/// known to be a trunk commit itself.
fn first_parents(walk: &[Commit]) -> Vec<String> {
    let mut trunk = TrunkWalk::new();

    for commit in walk {
        if commit.parents.is_empty() {
            trunk.push(&commit.id);
        } else if commit.parents.len() == 1 && !trunk.on_merge {
            trunk.push(&commit.id);
            trunk.push(&commit.parents[0]);
        } else if commit.parents.len() > 1 && !trunk.on_merge {
            trunk.on_merge = true;
            trunk.push(&commit.id);
            trunk.push(&commit.parents[0]);
        } else if trunk.contains(&commit.id) {
            trunk.push(&commit.parents[0]);
        }
    }

    trunk.ordered
}

/// Invert the parent links: which commits name each commit as a parent.
fn children_per_parent(walk: &[Commit]) -> HashMap<String, HashSet<String>> {
    let mut children: HashMap<String, HashSet<String>> = HashMap::new();
    for commit in walk {
        for parent in &commit.parents {
            children
                .entry(parent.clone())
                .or_default()
                .insert(commit.id.clone());
        }
    }
    children
}

fn has_first_parent_child(
    id: &str,
    first_parents: &HashSet<String>,
    children: &HashMap<String, HashSet<String>>,
) -> bool {
    children
        .get(id)
        .map(|kids| kids.iter().any(|child| first_parents.contains(child)))
        .unwrap_or(false)
}

/// Collect the commits a merge point absorbed into history.
///
/// Explores outward from the merge commit along non-first-parent edges.
/// A visited commit counts as merged when it is off the trunk with no
/// trunk child, or when it is a direct parent of the merge commit.
/// Missing objects end their branch of the exploration.
fn merged_commits<R: Repository + ?Sized>(
    repo: &R,
    merge: &Commit,
    first_parents: &HashSet<String>,
    children: &HashMap<String, HashSet<String>>,
) -> Result<BTreeSet<String>> {
    let mut merged: BTreeSet<String> = BTreeSet::new();
    let mut explored: HashSet<String> = HashSet::new();
    let mut to_explore: Vec<String> = vec![merge.id.clone()];

    while let Some(next_id) = to_explore.pop() {
        if !explored.insert(next_id.clone()) {
            continue;
        }

        let next_commit = match repo.get_commit(&next_id) {
            Ok(commit) => commit,
            Err(e) if e.is_not_found() => continue,
            Err(e) => return Err(e),
        };

        let off_trunk = !first_parents.contains(&next_id)
            && !has_first_parent_child(&next_id, first_parents, children);
        if off_trunk || merge.parents.contains(&next_id) {
            merged.insert(next_id.clone());
        }

        for parent in &next_commit.parents {
            if first_parents.contains(parent) {
                continue;
            }
            if !merged.contains(parent) && *parent != next_id {
                to_explore.push(parent.clone());
            }
        }
    }

    Ok(merged)
}

/// Linearize the repository into lineage nodes, oldest first.
///
/// Trunk commits whose objects are missing are skipped, as are merged
/// commits that cannot be resolved; neither is fatal.
pub fn linearize<R: Repository + ?Sized>(repo: &R) -> Result<Vec<LineageNode>> {
    let walk = repo.walk_topological()?;
    let ordered_trunk = first_parents(&walk);
    let trunk_set: HashSet<String> = ordered_trunk.iter().cloned().collect();
    let children = children_per_parent(&walk);

    let mut nodes = Vec::with_capacity(ordered_trunk.len());
    for trunk_id in &ordered_trunk {
        let commit = match repo.get_commit(trunk_id) {
            Ok(commit) => commit,
            Err(e) if e.is_not_found() => continue,
            Err(e) => return Err(e),
        };

        let merged_ids = if commit.is_merge() {
            merged_commits(repo, &commit, &trunk_set, &children)?
        } else {
            BTreeSet::new()
        };

        let mut merged = Vec::with_capacity(merged_ids.len());
        for id in merged_ids {
            match repo.get_commit(&id) {
                Ok(child) => merged.push(child),
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e),
            }
        }
        merged.sort_by(|a, b| a.id.cmp(&b.id));

        nodes.push(LineageNode { commit, merged });
    }

    nodes.reverse();
    Ok(nodes)
}
