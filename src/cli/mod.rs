pub mod daemon_path;
pub mod import;
pub mod output;
pub mod process;
pub mod report;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use import::{process_import_command, ImportCommand};
use process::{kill_previous_servers, restart_server};
use report::{
    process_day_command, process_month_command, process_months_command, DayCommand, MonthCommand,
};
use tracing::level_filters::LevelFilter;

use crate::{
    daemon::{start_daemon, DEFAULT_SAVE_INTERVAL},
    utils::{
        dir::resolve_application_path,
        logging::{enable_logging, CLI_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "screentime", version, long_about = None)]
#[command(about = "Application for tracking time spent in foreground applications", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Starts a daemon for the application")]
    Init,
    #[command(
        about = "Run a daemon directly in current console. Used for debugging and for systems where the daemon binary is missing"
    )]
    Serve,
    #[command(about = "Stop currently running daemon.")]
    Stop,
    #[command(about = "List months with recorded usage")]
    Months,
    #[command(about = "Display daily totals of a month")]
    Month {
        #[command(flatten)]
        command: MonthCommand,
    },
    #[command(about = "Display usage of a single day")]
    Day {
        #[command(flatten)]
        command: DayCommand,
    },
    #[command(about = "Add usage from another log file, restarting the daemon if it runs")]
    Import {
        #[command(flatten)]
        command: ImportCommand,
    },
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let dir = resolve_application_path(args.dir.as_deref())?;

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, &dir.join("logs"), logging_level, args.log)?;

    match args.commands {
        Commands::Init => restart_server(&dir),
        Commands::Stop => {
            let stopped = kill_previous_servers()?;
            println!("Stopped {stopped} daemon(s)");
            Ok(())
        }
        Commands::Serve => start_daemon(dir, DEFAULT_SAVE_INTERVAL).await,
        Commands::Months => process_months_command(&dir).await,
        Commands::Month { command } => process_month_command(command, &dir).await,
        Commands::Day { command } => process_day_command(command, &dir).await,
        Commands::Import { command } => process_import_command(command, &dir).await,
    }
}
