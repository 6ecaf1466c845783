//! Beacon - live status for backlog-driven projects
//!
//! Scans a directory of projects and reports progress, current task, blockers
//! and task timing reconstructed from each backlog's git history.

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use beacon::backlog::{parse_backlog, parse_epics, TaskStatus};
use beacon::git::GitCli;
use beacon::scan::{load_timings, scan_projects, ProjectArtifacts, ProjectSummary};
use beacon::{BeaconError, ProjectStatus, ScanConfig};

#[derive(Parser)]
#[command(name = "beacon")]
#[command(version)]
#[command(about = "Live project status from markdown backlogs and git history", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan every project directly under a root directory
    Scan {
        /// Directory containing one subdirectory per project
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Timeout for each backlog history query in milliseconds
        #[arg(long, value_name = "MS")]
        history_timeout: Option<u64>,

        /// Number of recent commits to include per project
        #[arg(long, value_name = "N")]
        recent_commits: Option<u32>,
    },

    /// Parse a single backlog file
    Parse {
        /// Backlog markdown file
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show task timing reconstructed from a project's backlog history
    ///
    /// Settings are read from the .beacon.json of the project's parent directory.
    Timings {
        /// Project directory
        #[arg(default_value = ".")]
        project: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "beacon=debug,info"
    } else {
        "beacon=info,warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Scan {
            root,
            json,
            history_timeout,
            recent_commits,
        } => run_scan(&root, json, history_timeout, recent_commits).await,
        Commands::Parse { file, json } => run_parse(&file, json),
        Commands::Timings { project } => run_timings(&project).await,
    };

    if let Err(err) = result {
        eprintln!("{} {}", "Error:".red().bold(), err);
        std::process::exit(err.exit_code());
    }
    Ok(())
}

async fn run_scan(
    root: &Path,
    json: bool,
    history_timeout: Option<u64>,
    recent_commits: Option<u32>,
) -> beacon::Result<()> {
    if !root.is_dir() {
        return Err(BeaconError::MissingDirectory {
            path: root.to_path_buf(),
        });
    }

    let mut config = ScanConfig::load(root)?;
    if let Some(ms) = history_timeout {
        config.history_timeout_ms = ms;
    }
    if let Some(n) = recent_commits {
        config.recent_commit_limit = n;
    }

    let git = Arc::new(GitCli::new(&config));
    let summaries = scan_projects(root, Arc::new(config), git).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else if summaries.is_empty() {
        println!("No projects found under {}", root.display());
    } else {
        for summary in &summaries {
            print_summary(summary);
        }
    }
    Ok(())
}

fn status_label(status: ProjectStatus) -> colored::ColoredString {
    let label = format!("{:<11}", status.to_string());
    match status {
        ProjectStatus::Blocked => label.red().bold(),
        ProjectStatus::NeedsWork => label.yellow(),
        ProjectStatus::InProgress => label.cyan(),
        ProjectStatus::Complete => label.green(),
    }
}

fn print_summary(summary: &ProjectSummary) {
    let progress = summary
        .metrics
        .map(|m| format!("{:>3}% ({}/{})", m.progress_percent, m.done, m.total()))
        .unwrap_or_else(|| "  - ".to_string());

    println!(
        "{} {} {}  {}",
        status_label(summary.status),
        summary.title.bold(),
        format!("[{}]", summary.id).dimmed(),
        progress
    );
    if !summary.current_task.is_empty() {
        println!("    {} {}", "current:".dimmed(), summary.current_task);
    }
    for epic in &summary.epics {
        for task in epic.tasks.iter().filter(|t| t.is_blocked()) {
            println!("    {} {} ({})", "blocked:".red(), task.text, epic.title);
        }
    }
    for missing in &summary.missing_files {
        println!("    {} {}", "missing:".yellow(), missing);
    }
}

fn run_parse(file: &Path, json: bool) -> beacon::Result<()> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let epics = parse_epics(&text);
    let progress = parse_backlog(&text);

    if json {
        let value = serde_json::json!({
            "metrics": progress.metrics,
            "current_task": progress.current_task,
            "epics": epics,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    let m = progress.metrics;
    println!(
        "{} {}% ({} done, {} left)",
        "Progress:".bold(),
        m.progress_percent,
        m.done,
        m.left
    );
    if !progress.current_task.is_empty() {
        println!("{} {}", "Current:".bold(), progress.current_task);
    }
    for epic in &epics {
        println!("\n{}", epic.title.bold());
        for task in &epic.tasks {
            let mark = match task.status {
                TaskStatus::Done => "[x]".green(),
                TaskStatus::Blocked => "[!]".red(),
                TaskStatus::Pending => "[ ]".normal(),
            };
            println!("  {} {}", mark, task.text);
        }
    }
    Ok(())
}

async fn run_timings(project: &Path) -> beacon::Result<()> {
    if !project.is_dir() {
        return Err(BeaconError::MissingDirectory {
            path: project.to_path_buf(),
        });
    }
    // Settings live in the scan root the project belongs to.
    let project = std::fs::canonicalize(project)?;
    let config = match project.parent() {
        Some(root) => ScanConfig::load(root)?,
        None => ScanConfig::default(),
    };
    let artifacts = ProjectArtifacts::discover(&project, &config);
    let git = GitCli::new(&config);
    let timings = load_timings(&project, artifacts.backlog.as_deref(), &git).await?;
    println!("{}", serde_json::to_string_pretty(&timings)?);
    Ok(())
}
