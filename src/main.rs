use anyhow::Result;
use clap::{Parser, Subcommand};

use autosemver::config::load_config;
use autosemver::git::Git2Repository;
use autosemver::{api, ui};

#[derive(Parser)]
#[command(
    name = "autosemver",
    about = "Derive semantic versions, changelogs and release notes from git history"
)]
struct Cli {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(help = "Git repository to inspect")]
    repo_path: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the version derived from the commit history
    Version,

    /// Print the changelog
    Changelog {
        #[arg(long, help = "Commit, tag or refspec to start the changelog from")]
        from_commit: Option<String>,

        #[arg(long, help = "Use the author-and-date entry header layout")]
        rpm_format: bool,
    },

    /// Print release notes grouped by version
    Releasenotes {
        #[arg(long, help = "Commit, tag or refspec to start the release notes from")]
        from_commit: Option<String>,
    },

    /// Print the sorted list of authors
    Authors {
        #[arg(long, help = "Commit, tag or refspec to start the authors from")]
        from_commit: Option<String>,
    },

    /// Write version tags at every major/minor boundary
    Tag,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            ui::display_error(&format!("Failed to load configuration: {}", e));
            std::process::exit(1);
        }
    };

    let repo = match Git2Repository::open(&cli.repo_path) {
        Ok(repo) => repo,
        Err(e) => {
            ui::display_error(&e.to_string());
            std::process::exit(1);
        }
    };

    let bugtracker_url = config.project.bugtracker_url.as_str();

    match cli.command {
        Commands::Version => {
            println!("{}", api::current_version(&repo)?);
        }
        Commands::Changelog {
            from_commit,
            rpm_format,
        } => {
            let rpm_format = rpm_format || config.changelog.rpm_format;
            println!(
                "{}",
                api::changelog(&repo, from_commit.as_deref(), bugtracker_url, rpm_format)?
            );
        }
        Commands::Releasenotes { from_commit } => {
            println!(
                "{}",
                api::release_notes(&repo, from_commit.as_deref(), bugtracker_url)?
            );
        }
        Commands::Authors { from_commit } => {
            println!("{}", api::authors(&repo, from_commit.as_deref())?.join("\n"));
        }
        Commands::Tag => {
            let lines = api::create_version_tags(&repo)?;
            if lines.is_empty() {
                ui::display_status("No new version boundaries to tag");
            } else {
                for line in &lines {
                    println!("{}", line);
                }
                ui::display_success(&format!("Created {} version tags", lines.len()));
            }
        }
    }

    Ok(())
}
