use std::{env, path::Path, process::Stdio};

use anyhow::{anyhow, Context, Result};
use sysinfo::{get_current_pid, Process, Signal, System};
use tracing::info;

use super::daemon_path::to_daemon_path;

/// Whether `process` is a running tracker: either the daemon binary or `screentime serve`.
fn is_server(process: &Process, cli: &Path, daemon: &Path) -> bool {
    let Some(exe) = process.exe().filter(|v| v.exists()) else {
        return false;
    };
    if exe == daemon {
        return true;
    }
    exe == cli && process.cmd().iter().any(|arg| arg == "serve")
}

/// Stops every running tracker and returns how many were stopped. Trackers are asked to
/// terminate first so that they can save the usage log.
pub fn kill_previous_servers() -> Result<usize> {
    let cli = env::current_exe().context("Can't operate without an executable")?;
    let daemon = to_daemon_path(cli.clone());

    let system = System::new_all();
    let current_id = get_current_pid().map_err(|e| anyhow!("Can't get current pid {e}"))?;
    let mut stopped = 0;
    for (pid, process) in system.processes().iter() {
        if *pid == current_id {
            continue;
        }
        if matches!(process.parent(), Some(p) if p == current_id) {
            continue;
        }

        if is_server(process, &cli, &daemon) {
            info!("Stopping {pid}");
            // This will forcefully terminate the process on Windows. Anything better will require a
            // lot more work.
            if process.kill_with(Signal::Term).is_none() {
                process.kill();
            }
            process.wait();
            stopped += 1;
        }
    }
    Ok(stopped)
}

/// Shuts down previous trackers and starts a new detached daemon writing into `dir`.
pub fn restart_server(dir: &Path) -> Result<()> {
    kill_previous_servers()?;

    let daemon = to_daemon_path(env::current_exe().context("Can't operate without an executable")?);
    let mut command = std::process::Command::new(&daemon);
    command.arg("--force").arg("--dir").arg(dir);

    #[cfg(feature = "win")]
    {
        use std::os::windows::process::CommandExt;
        use windows::Win32::System::Threading::DETACHED_PROCESS;
        command.creation_flags(DETACHED_PROCESS.0);
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }
    command.stdin(Stdio::null());
    command.stdout(Stdio::null());
    command.stderr(Stdio::null());

    info!("Spawning {daemon:?}");
    #[allow(clippy::zombie_processes)]
    command
        .spawn()
        .with_context(|| format!("Failed to start {daemon:?}"))?;
    println!("Started daemon writing into {dir:?}");
    Ok(())
}
