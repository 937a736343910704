// This runs daemon on windows without creating a console. Disable during development to see
// stdout.
#![windows_subsystem = "windows"]

use std::{env::args, time::Duration};

use anyhow::Result;
use clap::Parser;
use screentime::{
    daemon::{args::DaemonArgs, start_daemon},
    utils::{
        dir::resolve_application_path,
        logging::{enable_logging, DAEMON_PREFIX},
        runtime::single_thread_runtime,
    },
};
use tracing::error;

/// Which side of the detach the current process ended up on.
enum Detached {
    /// The tracker runs elsewhere, this process should exit.
    Parent,
    /// This process is the tracker.
    Daemon,
}

fn main() -> Result<()> {
    let command_args = args().collect::<Vec<_>>();
    let args = DaemonArgs::parse_from(&command_args);

    if !args.force {
        if let Detached::Parent = detach(command_args)? {
            println!("Created daemon");
            return Ok(());
        }
    }

    run(args)
}

/// Restarts the daemon as a detached process with the same arguments plus `--force`.
#[cfg(feature = "win")]
fn detach(mut command_args: Vec<String>) -> Result<Detached> {
    use std::os::windows::process::CommandExt;
    use std::process::{Command, Stdio};
    use windows::Win32::System::Threading::DETACHED_PROCESS;

    command_args.push("--force".into());
    let mut command = Command::new(std::env::current_exe()?);
    command
        .args(command_args.into_iter().skip(1))
        .creation_flags(DETACHED_PROCESS.0)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    #[allow(clippy::zombie_processes)]
    command.spawn()?;
    Ok(Detached::Parent)
}

/// Forks into the background. The parent returns as soon as the child is set up.
#[cfg(all(unix, not(feature = "win")))]
fn detach(_command_args: Vec<String>) -> Result<Detached> {
    use daemonize::{Daemonize, Outcome, Stdio};

    match Daemonize::new()
        .stdout(Stdio::devnull())
        .stderr(Stdio::devnull())
        // stdin already defaults to /dev/null in daemonize 0.5
        .execute()
    {
        Outcome::Parent(parent) => {
            parent.inspect_err(|e| eprintln!("Failed to create daemon on parent side {e:?}"))?;
            Ok(Detached::Parent)
        }
        Outcome::Child(child) => {
            child.inspect_err(|e| eprintln!("Failed to create daemon {e:?}"))?;
            Ok(Detached::Daemon)
        }
    }
}

#[cfg(not(any(unix, feature = "win")))]
fn detach(_command_args: Vec<String>) -> Result<Detached> {
    Ok(Detached::Daemon)
}

fn run(args: DaemonArgs) -> Result<()> {
    let app_dir = resolve_application_path(args.dir.as_deref())?;
    enable_logging(DAEMON_PREFIX, &app_dir.join("logs"), args.log, args.log_console)?;
    let save_interval = Duration::from_secs(args.save_interval);
    single_thread_runtime()?
        .block_on(start_daemon(app_dir, save_interval))
        .inspect_err(|e| error!("Daemon failed {e:?}"))
}
