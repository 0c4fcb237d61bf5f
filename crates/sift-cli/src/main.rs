mod commands;
mod config;
mod config_cmd;
mod engine;

use clap::{Args, Parser, Subcommand};
use commands::{ExtractArgs, ScanArgs, ScanContext, TaskIdArgs, TasksArgs, WatchArgs};
use config::{Config, ConfigPaths};
use engine::{Mode, RuntimeProfiles};
use sift_core::TaskStatus;
use tracing::Level;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "sift", version, about = "task extraction from screen captures")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    mode: ModeArgs,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Scan recent captures once and merge new tasks into the store
    Scan(ScanArgs),
    /// Scan repeatedly on an interval
    Watch(WatchArgs),
    /// Extract candidates from a capture dump and print them as JSON
    Extract(ExtractArgs),
    /// List stored tasks
    Tasks(TasksArgs),
    /// Mark a task completed
    Done(TaskIdArgs),
    /// Mark a task cancelled
    Cancel(TaskIdArgs),
    /// Mark a task pending again
    Reopen(TaskIdArgs),
    /// Show a reminder for pending tasks that are due soon
    Remind,
    /// Print or change the config file
    Config(config_cmd::ConfigArgs),
}

#[derive(Args, Debug, Clone)]
struct ModeArgs {
    /// Extract with the local model profile
    #[arg(long, global = true, conflicts_with_all = ["cloud", "pattern"])]
    local: bool,

    /// Extract with the cloud model profile
    #[arg(long, global = true, conflicts_with = "pattern")]
    cloud: bool,

    /// Extract with text patterns only
    #[arg(long, global = true)]
    pattern: bool,

    /// Model override for the selected profile
    #[arg(long, global = true, value_name = "model")]
    model: Option<String>,
}

impl ModeArgs {
    fn selector(&self) -> Option<Mode> {
        if self.local {
            Some(Mode::Local)
        } else if self.cloud {
            Some(Mode::Cloud)
        } else if self.pattern {
            Some(Mode::Pattern)
        } else {
            None
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init();
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let paths = match ConfigPaths::from_home() {
        Ok(paths) => paths,
        Err(err) => {
            eprintln!("config paths error: {err}");
            std::process::exit(1);
        }
    };

    if let Some(Command::Config(args)) = &cli.command {
        if let Err(e) = config_cmd::run(args, &paths) {
            eprintln!("config failed: {e}");
            std::process::exit(1);
        }
        return;
    }

    let config = match Config::load_or_create(&paths) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config load failed: {err}");
            std::process::exit(1);
        }
    };

    let command = cli.command.unwrap_or(Command::Scan(ScanArgs { input: None }));
    let result = match command {
        Command::Tasks(args) => commands::run_tasks(&paths, &args),
        Command::Done(args) => commands::run_set_status(&paths, &args, TaskStatus::Completed),
        Command::Cancel(args) => commands::run_set_status(&paths, &args, TaskStatus::Cancelled),
        Command::Reopen(args) => commands::run_set_status(&paths, &args, TaskStatus::Pending),
        Command::Remind => commands::run_remind(&config, &paths),
        Command::Config(_) => Ok(()),
        scanning => {
            let profiles =
                match RuntimeProfiles::resolve(&config, cli.mode.selector(), cli.mode.model) {
                    Ok(profiles) => profiles,
                    Err(err) => {
                        eprintln!("run args error: {err}");
                        std::process::exit(1);
                    }
                };
            let ctx = ScanContext::new(&config, &paths, &profiles);
            match scanning {
                Command::Scan(args) => commands::run_scan(&ctx, &args),
                Command::Watch(args) => commands::run_watch(&ctx, &args),
                Command::Extract(args) => commands::run_extract(&ctx, &args),
                _ => Ok(()),
            }
        }
    };

    if let Err(e) = result {
        eprintln!("sift failed: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_flags_select_profile() {
        let cli = Cli::try_parse_from(["sift", "scan", "--cloud"]).unwrap();
        assert_eq!(cli.mode.selector(), Some(Mode::Cloud));
        let cli = Cli::try_parse_from(["sift", "--pattern", "extract", "--input", "dump.json"]).unwrap();
        assert_eq!(cli.mode.selector(), Some(Mode::Pattern));
        assert!(matches!(cli.command, Some(Command::Extract(_))));
    }

    #[test]
    fn mode_flags_conflict() {
        assert!(Cli::try_parse_from(["sift", "scan", "--local", "--cloud"]).is_err());
    }

    #[test]
    fn status_commands_take_an_id() {
        let cli = Cli::try_parse_from(["sift", "done", "0192f0c4"]).unwrap();
        match cli.command {
            Some(Command::Done(args)) => assert_eq!(args.id, "0192f0c4"),
            _ => panic!("expected done"),
        }
        assert!(Cli::try_parse_from(["sift", "cancel"]).is_err());
    }
}
