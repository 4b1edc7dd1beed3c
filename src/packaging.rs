//! Version, authors and changelog for packaged source trees.
//!
//! A project consumed as a pre-built source distribution has no git
//! history to derive from. These helpers check the override channels
//! first (environment variable, `PKG-INFO`, pre-generated `AUTHORS` and
//! `CHANGELOG` files) and fall back to the graph-derived values when the
//! project is a live checkout.

use std::env;
use std::fs;
use std::path::Path;

use crate::api;
use crate::error::Result;
use crate::git::Git2Repository;

const PKG_INFO: &str = "PKG-INFO";
const AUTHORS_FILE: &str = "AUTHORS";
const CHANGELOG_FILE: &str = "CHANGELOG";

fn version_from_pkg_info(pkg_info: &Path) -> Result<Option<String>> {
    let contents = fs::read_to_string(pkg_info)?;
    Ok(contents.lines().find_map(|line| {
        line.strip_prefix("Version: ")
            .map(|version| version.trim().to_string())
    }))
}

/// The version of a project, in override order.
///
/// Checks, in priority order:
/// 1. a `<PROJECT_NAME>_VERSION` environment variable (upper-cased, when a
///    project name is known and the variable is non-empty);
/// 2. the `Version:` line of a `PKG-INFO` file in the project directory;
/// 3. the git history of `repo_dir` (defaulting to the project directory).
pub fn package_version(
    project_name: Option<&str>,
    project_dir: &Path,
    repo_dir: Option<&Path>,
) -> Result<String> {
    if let Some(name) = project_name {
        let env_var = format!("{}_VERSION", name.to_uppercase());
        if let Ok(version) = env::var(&env_var) {
            if !version.is_empty() {
                return Ok(version);
            }
        }
    }

    let pkg_info = project_dir.join(PKG_INFO);
    if pkg_info.exists() {
        if let Some(version) = version_from_pkg_info(&pkg_info)? {
            return Ok(version);
        }
    }

    let repo = Git2Repository::open(repo_dir.unwrap_or(project_dir))?;
    Ok(api::current_version(&repo)?.to_string())
}

/// The authors list, from the `AUTHORS` file when packaged, otherwise
/// from the git history.
pub fn package_authors(project_dir: &Path) -> Result<Vec<String>> {
    let pkg_info = project_dir.join(PKG_INFO);
    let authors_file = project_dir.join(AUTHORS_FILE);
    if pkg_info.exists() && authors_file.exists() {
        let contents = fs::read_to_string(authors_file)?;
        return Ok(contents.lines().map(|line| line.to_string()).collect());
    }

    let repo = Git2Repository::open(project_dir)?;
    api::authors(&repo, None)
}

/// The changelog, from the `CHANGELOG` file when packaged, otherwise
/// from the git history.
pub fn package_changelog(project_dir: &Path, bugtracker_url: &str) -> Result<String> {
    let pkg_info = project_dir.join(PKG_INFO);
    let changelog_file = project_dir.join(CHANGELOG_FILE);
    if pkg_info.exists() && changelog_file.exists() {
        return Ok(fs::read_to_string(changelog_file)?);
    }

    let repo = Git2Repository::open(project_dir)?;
    api::changelog(&repo, None, bugtracker_url, false)
}

/// Write the generated authors list to `AUTHORS`.
///
/// Skipped inside a packaged distribution, where the file already ships.
pub fn create_authors(project_dir: &Path) -> Result<()> {
    if project_dir.join(PKG_INFO).exists() {
        return Ok(());
    }

    let authors = package_authors(project_dir)?;
    fs::write(
        project_dir.join(AUTHORS_FILE),
        format!("{}\n", authors.join("\n")),
    )?;
    Ok(())
}

/// Write the generated changelog to `CHANGELOG`.
///
/// Skipped inside a packaged distribution, where the file already ships.
pub fn create_changelog(project_dir: &Path, bugtracker_url: &str) -> Result<()> {
    if project_dir.join(PKG_INFO).exists() {
        return Ok(());
    }

    let changelog = package_changelog(project_dir, bugtracker_url)?;
    fs::write(project_dir.join(CHANGELOG_FILE), changelog)?;
    Ok(())
}
