use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use tracing::{debug, error, info, instrument, warn};

use crate::fs::operations::{read_locked, replace_file, with_file_name_suffix};

use super::entities::UsageLog;

pub const DATA_FILE_NAME: &str = "screentime_daily.json";

/// Durable home of the [UsageLog]. The whole log is kept in a single human readable json file
/// that is rewritten in full on every save.
#[derive(Debug, Clone)]
pub struct UsageStore {
    path: PathBuf,
}

impl UsageStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store located at the default file name inside the application directory.
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(DATA_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the log from disk. A missing or blank file is an empty log.
    pub async fn try_load(&self) -> Result<UsageLog> {
        let content = match read_locked(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No usage log at {:?}, starting empty", self.path);
                return Ok(UsageLog::new());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {:?}", self.path));
            }
        };

        if content.iter().all(u8::is_ascii_whitespace) {
            return Ok(UsageLog::new());
        }

        serde_json::from_slice(&content)
            .with_context(|| format!("Failed to parse {:?}", self.path))
    }

    /// Same as [UsageStore::try_load] but never fails. Any error results in an empty log.
    pub async fn load(&self) -> UsageLog {
        match self.try_load().await {
            Ok(log) => log,
            Err(e) => {
                warn!("Couldn't load usage log, starting fresh {e:?}");
                UsageLog::new()
            }
        }
    }

    /// Loads the log for a process that is going to write it back.
    ///
    /// An unparsable file is moved to `<file>.corrupt` before starting fresh, otherwise the
    /// first save would overwrite whatever could still be recovered from it by hand.
    #[instrument(skip(self), fields(path = ?self.path))]
    pub async fn load_or_backup(&self) -> UsageLog {
        let error = match self.try_load().await {
            Ok(log) => return log,
            Err(e) => e,
        };

        if error.downcast_ref::<serde_json::Error>().is_none() {
            warn!("Couldn't read usage log, starting fresh {error:?}");
            return UsageLog::new();
        }

        let backup = with_file_name_suffix(&self.path, ".corrupt");
        match tokio::fs::rename(&self.path, &backup).await {
            Ok(()) => warn!("Usage log is corrupted, moved it to {backup:?}: {error:?}"),
            Err(e) => error!("Usage log is corrupted and couldn't be moved to {backup:?}: {e:?}"),
        }
        UsageLog::new()
    }

    /// Writes the whole log to disk, replacing the previous version.
    pub async fn try_save(&self, log: &UsageLog) -> Result<()> {
        let mut buffer = serde_json::to_vec_pretty(log)?;
        buffer.push(b'\n');
        replace_file(&self.path, &buffer)
            .await
            .with_context(|| format!("Failed to write {:?}", self.path))?;
        Ok(())
    }

    /// Same as [UsageStore::try_save] but only logs failures.
    pub async fn save(&self, log: &UsageLog) {
        match self.try_save(log).await {
            Ok(()) => info!("Saved usage for {} days", log.len()),
            Err(e) => error!("Failed to save usage log {e:?}"),
        }
    }
}
