use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use tracing::info;

use crate::daemon::storage::usage_store::UsageStore;

use super::process::{kill_previous_servers, restart_server};

#[derive(Debug, Parser)]
pub struct ImportCommand {
    #[arg(help = "Usage log to add, for example a repaired screentime_daily.json.corrupt")]
    file: PathBuf,
}

/// Adds every (day, application) of the log at `source` to the log kept by `store`. Returns the
/// number of imported days.
pub async fn import_log(store: &UsageStore, source: &Path) -> Result<usize> {
    let source = tokio::fs::canonicalize(source)
        .await
        .with_context(|| format!("Can't import {source:?}"))?;
    if let Ok(target) = tokio::fs::canonicalize(store.path()).await {
        if target == source {
            return Err(anyhow!("{source:?} is the usage log itself"));
        }
    }

    let imported = UsageStore::new(source).try_load().await?;
    // Saving over a log that couldn't be read would lose it.
    let mut log = store.try_load().await?;

    let days = imported.len();
    log.merge(imported);
    store.try_save(&log).await?;
    Ok(days)
}

pub async fn process_import_command(
    ImportCommand { file }: ImportCommand,
    dir: &Path,
) -> Result<()> {
    // A running tracker would overwrite the merged file with its own copy on the next save.
    let stopped = kill_previous_servers()?;
    info!("Stopped {stopped} tracker(s) before import");

    let days = import_log(&UsageStore::in_dir(dir), &file).await?;
    println!("Imported usage for {days} days from {file:?}");

    if stopped > 0 {
        restart_server(dir)?;
    }
    Ok(())
}
