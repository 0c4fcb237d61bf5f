use crate::config::{Config, ConfigError, ConfigPaths, MAX_INTERVAL_MINUTES};
use crate::engine::RuntimeProfiles;
use clap::Args;
use sift_core::capture::{CaptureQuery, CaptureSource, FileSource, ScreenpipeSource};
use sift_core::extract::Orchestrator;
use sift_core::filter::filter_captures;
use sift_core::merge::set_status;
use sift_core::notify::{Notice, Notifier, due_soon, high_priority_notice, reminder_notice};
use sift_core::pipeline::{ScanReport, scan};
use sift_core::store::{JsonTaskStore, TaskStore};
use sift_core::{CaptureError, StoreError, Task, TaskStatus};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("output error: {0}")]
    Output(#[from] serde_json::Error),
    #[error("no task with id {0}")]
    UnknownTask(String),
    #[error("{0}")]
    Usage(String),
}

#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Read captures from a JSON dump instead of the capture service
    #[arg(long, value_name = "file")]
    pub input: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct WatchArgs {
    /// Minutes between scans (defaults to scan.interval_minutes)
    #[arg(long, value_name = "minutes")]
    pub interval: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Capture dump to extract from
    #[arg(long, value_name = "file")]
    pub input: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct TasksArgs {
    /// Only list tasks with this status: pending, completed or cancelled
    #[arg(long)]
    pub status: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct TaskIdArgs {
    /// Task id as shown by `sift tasks`
    pub id: String,
}

/// Prints notices to stdout.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: &Notice) {
        println!("{}: {}", notice.title, notice.body);
    }
}

/// Everything one scan needs, resolved once per invocation.
pub struct ScanContext<'a> {
    pub config: &'a Config,
    pub paths: &'a ConfigPaths,
    pub orchestrator: Orchestrator,
}

impl<'a> ScanContext<'a> {
    pub fn new(config: &'a Config, paths: &'a ConfigPaths, profiles: &RuntimeProfiles) -> Self {
        let orchestrator = profiles.build_orchestrator(config);
        tracing::debug!(strategies = ?orchestrator.strategy_names(), "extraction chain ready");
        Self {
            config,
            paths,
            orchestrator,
        }
    }

    fn source(&self, input: Option<&PathBuf>) -> Box<dyn CaptureSource> {
        match input {
            Some(path) => Box::new(FileSource::new(path.clone())),
            None => Box::new(ScreenpipeSource::new(&self.config.capture.base_url)),
        }
    }

    fn query(&self) -> CaptureQuery {
        CaptureQuery::trailing(
            OffsetDateTime::now_utc(),
            self.config.scan.window_minutes,
            self.config.scan.limit,
        )
    }

    fn scan_once(&self, input: Option<&PathBuf>) -> Result<ScanReport, CommandError> {
        let source = self.source(input);
        let items = source.fetch(&self.query())?;
        let store = JsonTaskStore::new(self.paths.tasks_path.clone());
        let report = scan(
            &items,
            &self.config.keyword_set(),
            &self.config.filter_options(),
            &self.orchestrator,
            &store,
        )?;
        if self.config.notify.enabled
            && let Some(notice) = high_priority_notice(report.high_priority_added)
        {
            ConsoleNotifier.notify(&notice);
        }
        Ok(report)
    }
}

pub fn run_scan(ctx: &ScanContext<'_>, args: &ScanArgs) -> Result<(), CommandError> {
    let report = ctx.scan_once(args.input.as_ref())?;
    print_report(&report);
    Ok(())
}

pub fn run_watch(ctx: &ScanContext<'_>, args: &WatchArgs) -> Result<(), CommandError> {
    let minutes = args.interval.unwrap_or(ctx.config.scan.interval_minutes);
    let interval = watch_interval(minutes)?;
    loop {
        match ctx.scan_once(None) {
            Ok(report) => print_report(&report),
            Err(err) => tracing::warn!(error = %err, "scan failed; retrying next interval"),
        }
        thread::sleep(interval);
    }
}

fn watch_interval(minutes: u64) -> Result<Duration, CommandError> {
    if minutes == 0 || minutes > MAX_INTERVAL_MINUTES {
        return Err(CommandError::Usage(format!(
            "interval must be between 1 and {MAX_INTERVAL_MINUTES} minutes"
        )));
    }
    Ok(Duration::from_secs(minutes * 60))
}

pub fn run_extract(ctx: &ScanContext<'_>, args: &ExtractArgs) -> Result<(), CommandError> {
    let items = FileSource::new(args.input.clone()).fetch(&ctx.query())?;
    let eligible = filter_captures(&items, &ctx.config.filter_options());
    let candidates = ctx
        .orchestrator
        .extract(&eligible, &ctx.config.keyword_set());
    println!("{}", serde_json::to_string_pretty(&candidates)?);
    Ok(())
}

pub fn run_tasks(paths: &ConfigPaths, args: &TasksArgs) -> Result<(), CommandError> {
    let status = args.status.as_deref().map(parse_status).transpose()?;
    let tasks = JsonTaskStore::new(paths.tasks_path.clone()).load()?;
    let shown: Vec<&Task> = tasks
        .iter()
        .filter(|task| status.is_none_or(|wanted| task.status == wanted))
        .collect();
    if shown.is_empty() {
        println!("no tasks");
        return Ok(());
    }
    for task in shown {
        println!("{}", format_task(task));
    }
    Ok(())
}

pub fn run_set_status(
    paths: &ConfigPaths,
    args: &TaskIdArgs,
    status: TaskStatus,
) -> Result<(), CommandError> {
    let store = JsonTaskStore::new(paths.tasks_path.clone());
    update_status(&store, &args.id, status)?;
    println!("{} {}", args.id, status.as_str());
    Ok(())
}

fn update_status(store: &dyn TaskStore, id: &str, status: TaskStatus) -> Result<(), CommandError> {
    let mut tasks = store.load()?;
    if !set_status(&mut tasks, id, status) {
        return Err(CommandError::UnknownTask(id.to_string()));
    }
    store.save(&tasks)?;
    Ok(())
}

pub fn run_remind(config: &Config, paths: &ConfigPaths) -> Result<(), CommandError> {
    let tasks = JsonTaskStore::new(paths.tasks_path.clone()).load()?;
    let due = due_soon(&tasks, OffsetDateTime::now_utc(), &config.reminder_timing());
    match reminder_notice(&due) {
        Some(notice) => ConsoleNotifier.notify(&notice),
        None => println!("nothing due soon"),
    }
    Ok(())
}

fn parse_status(value: &str) -> Result<TaskStatus, CommandError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "pending" => Ok(TaskStatus::Pending),
        "completed" | "done" => Ok(TaskStatus::Completed),
        "cancelled" | "canceled" => Ok(TaskStatus::Cancelled),
        other => Err(CommandError::Usage(format!(
            "status must be pending, completed or cancelled (got {other})"
        ))),
    }
}

fn format_task(task: &Task) -> String {
    let mut line = format!(
        "{}  {:<9}  {:<6}  {} ({})",
        task.id,
        task.status.as_str(),
        task.priority.as_str(),
        task.title,
        task.source
    );
    if let Some(due) = task.due_date {
        line.push_str(&format!("  due {}", due.date()));
    }
    line
}

fn print_report(report: &ScanReport) {
    println!(
        "captured {} eligible {} candidates {} | added {} refreshed {} kept {} | {} tasks stored",
        report.captured,
        report.eligible,
        report.candidates,
        report.added,
        report.refreshed,
        report.preserved,
        report.total_tasks
    );
}
