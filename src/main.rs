mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use s3scope_logs::{
    DEFAULT_CONCURRENCY, EntryFilter, IngestionCoordinator, LoadProgress, LoadSummary, LogEntry,
    Severity, export_visible,
};
use s3scope_storage::{
    AwsCliConnector, AwsProfiles, DEFAULT_AWS_CLI, DEFAULT_PROFILE, ObjectLocation,
    ProfileResolver, RemoteObjectFetcher, select_by_file_name,
};

use crate::config::Config;

/// s3scope - View gzip-compressed log files stored in S3
#[derive(Parser, Debug)]
#[command(name = "s3scope")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Location of the logs, e.g. s3://bucket-name/path/to/logs/
    #[arg(value_name = "S3_PATH", required_unless_present = "list_profiles")]
    path: Option<String>,

    /// AWS credential profile
    #[arg(short, long)]
    profile: Option<String>,

    /// Print the available AWS profiles and exit
    #[arg(long)]
    list_profiles: bool,

    /// Print the log files found under the path and exit
    #[arg(long)]
    list: bool,

    /// Load only this file (by name); repeat for several. Loads all files if omitted
    #[arg(short, long = "file", value_name = "NAME")]
    files: Vec<String>,

    /// Show only entries containing this text (case-insensitive)
    #[arg(long, value_name = "TEXT")]
    filter: Option<String>,

    /// Write the visible entries to this file as comma-separated fields
    #[arg(long, value_name = "FILE")]
    export: Option<PathBuf>,

    /// Number of files fetched in parallel
    #[arg(long)]
    concurrency: Option<usize>,

    /// Print the full detail view of every entry
    #[arg(long)]
    details: bool,

    /// Config file (default: ~/.config/s3scope/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = run_app(args).await;

    if let Err(e) = &result {
        eprintln!("Error: {:#}", e);
    }

    result
}

async fn run_app(args: Args) -> Result<()> {
    let config = Config::load(args.config.as_deref())?;
    let resolver = AwsProfiles::from_env();

    if args.list_profiles {
        for profile in resolver.available_profiles() {
            println!("{}", profile);
        }
        return Ok(());
    }

    let path = args.path.as_deref().context("An S3 path is required")?;
    let location = ObjectLocation::parse(path)?;

    let profile = args
        .profile
        .clone()
        .or(config.profile.clone())
        .unwrap_or_else(|| DEFAULT_PROFILE.to_string());
    let connector = AwsCliConnector::new(config.aws_cli.as_deref().unwrap_or(DEFAULT_AWS_CLI));

    let fetcher = RemoteObjectFetcher::connect(&resolver, &connector, &profile)
        .await
        .with_context(|| format!("Failed to connect with AWS profile '{}'", profile))?;

    let objects = fetcher
        .list_objects(&location.bucket, &location.prefix)
        .await
        .with_context(|| format!("Failed to list log files in {}", location))?;

    if objects.is_empty() {
        eprintln!("No log files found in {}", location);
        return Ok(());
    }

    if args.list {
        for object in &objects {
            println!("{}", object.file_name());
        }
        return Ok(());
    }

    let selected = if args.files.is_empty() {
        objects
    } else {
        select_by_file_name(&objects, &args.files)
    };
    if selected.is_empty() {
        anyhow::bail!("None of the requested files were found in {}", location);
    }

    let concurrency = args
        .concurrency
        .or(config.concurrency)
        .unwrap_or(DEFAULT_CONCURRENCY);
    let mut coordinator = IngestionCoordinator::new(fetcher).with_concurrency(concurrency);

    // Ctrl-C stops the load; whatever finished so far is kept
    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    let (progress_tx, mut progress_rx) = mpsc::unbounded_channel::<LoadProgress>();
    let reporter = tokio::spawn(async move {
        while let Some(progress) = progress_rx.recv().await {
            eprint!("\rloaded {}/{} files", progress.processed, progress.total);
        }
        eprintln!();
    });

    let summary = coordinator.load(&selected, &cancel, Some(&progress_tx)).await;
    drop(progress_tx);
    let _ = reporter.await;
    interrupt.abort();

    let store = coordinator.store();
    let filter = EntryFilter::new(args.filter.as_deref().unwrap_or(""));
    for entry in store.visible(&filter) {
        if args.details {
            println!("{}\n", entry.detail());
        } else {
            println!("{}", format_row(&entry));
        }
    }

    print_summary(&summary, &store.level_counts());

    if let Some(destination) = &args.export {
        let batch = store.snapshot();
        let count = export_visible(batch.entries(), &filter, destination)
            .context("Failed to export logs")?;
        eprintln!("Exported {} entries to {}", count, destination.display());
    }

    Ok(())
}

/// One table row: marker, timestamp, level, worker, task, message.
///
/// ERROR rows are marked `!!` and WARN rows `!`.
fn format_row(entry: &LogEntry) -> String {
    let marker = match entry.severity() {
        Severity::Error => "!!",
        Severity::Warn => "!",
        Severity::Other => "",
    };
    format!(
        "{:<2} {:<19}  {:<5}  {:<12}  {:<16}  {}",
        marker,
        entry.timestamp,
        entry.level,
        entry.worker,
        entry.task_or_empty(),
        entry.message
    )
}

fn print_summary(summary: &LoadSummary, counts: &s3scope_logs::LevelCounts) {
    eprintln!(
        "Loaded {} log entries from {}/{} files ({} errors, {} warnings)",
        summary.total_entries, summary.processed, summary.requested, counts.error, counts.warn
    );

    if !summary.failed.is_empty() {
        eprintln!("{} files could not be read:", summary.failed.len());
        for key in &summary.failed {
            eprintln!("  {}", key);
        }
    }

    if summary.cancelled {
        eprintln!("Load cancelled; showing the files loaded so far");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(level: &str, task: Option<&str>) -> LogEntry {
        LogEntry {
            timestamp: "2024-01-15 10:30:00".to_string(),
            level: level.to_string(),
            worker: "Worker-1".to_string(),
            task: task.map(str::to_string),
            message: "disk full".to_string(),
            full_message: String::new(),
        }
    }

    #[test]
    fn test_format_row_marks_severity() {
        assert!(format_row(&entry("ERROR", None)).starts_with("!! 2024-01-15"));
        assert!(format_row(&entry("WARN", None)).starts_with("!  2024-01-15"));
        assert!(format_row(&entry("INFO", None)).starts_with("   2024-01-15"));
    }

    #[test]
    fn test_format_row_columns() {
        let row = format_row(&entry("ERROR", Some("[sync]")));
        assert!(row.contains("  ERROR  Worker-1"));
        assert!(row.contains("[sync]"));
        assert!(row.ends_with("disk full"));
    }
}
