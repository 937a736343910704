use std::{
    env, io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

pub const APPLICATION_DIR_NAME: &str = "screentime";

/// Directory where data and logs are kept when the user doesn't specify one.
///
/// - Windows: `%APPDATA%\screentime`
/// - macOS: `$HOME/Library/Application Support/screentime`
/// - Other unix systems: `$XDG_STATE_HOME/screentime` or `$HOME/.local/state/screentime`
pub fn application_default_path() -> Result<PathBuf> {
    let mut path = {
        #[cfg(windows)]
        {
            PathBuf::from(env::var("APPDATA").context("APPDATA should be present on Windows")?)
        }
        #[cfg(target_os = "macos")]
        {
            let mut path = PathBuf::from(env::var("HOME").context("Couldn't find HOME")?);
            path.push("Library/Application Support");
            path
        }
        #[cfg(all(unix, not(target_os = "macos")))]
        {
            env::var("XDG_STATE_HOME")
                .map(PathBuf::from)
                .or_else(|_| {
                    env::var("HOME").map(|home| {
                        let mut path = PathBuf::from(home);
                        path.push(".local/state");
                        path
                    })
                })
                .context("Couldn't find neither XDG_STATE_HOME nor HOME")?
        }
    };
    path.push(APPLICATION_DIR_NAME);
    Ok(path)
}

pub fn create_application_default_path() -> Result<PathBuf> {
    create_application_path(application_default_path()?)
}

/// Makes sure `path` exists, so that data and logs can be written into it.
pub fn create_application_path(path: PathBuf) -> Result<PathBuf> {
    match std::fs::create_dir_all(&path) {
        Ok(_) => Ok(path),
        Err(v) if v.kind() == io::ErrorKind::AlreadyExists => Ok(path),
        Err(v) => Err(v).with_context(|| format!("Failed to create {path:?}")),
    }
}

/// Picks the user specified directory or falls back to the default one.
pub fn resolve_application_path(dir: Option<&Path>) -> Result<PathBuf> {
    match dir {
        Some(dir) => create_application_path(dir.to_path_buf()),
        None => create_application_default_path(),
    }
}
