use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process,
    sync::atomic::{AtomicU64, Ordering},
};

use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{self, AsyncReadExt, AsyncWriteExt},
};

/// Reads the whole file while holding a shared lock on it. Content is returned as raw bytes, so
/// decoding problems surface in whatever parses them.
pub async fn read_locked(path: &Path) -> Result<Vec<u8>, io::Error> {
    let mut file = File::open(path).await?;
    file.lock_shared()?;
    let mut content = Vec::new();
    let result = file.read_to_end(&mut content).await;
    file.unlock_async().await?;
    result?;
    Ok(content)
}

static TEMPORARY_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Sibling of `path` that no other write, in this process or another one, uses at the same time.
fn temporary_path(path: &Path) -> PathBuf {
    let id = TEMPORARY_COUNTER.fetch_add(1, Ordering::Relaxed);
    with_file_name_suffix(path, &format!(".{}.{id}.tmp", process::id()))
}

/// Replaces the contents of `path` with `content`.
///
/// Data is first written into a sibling temporary file and then renamed over the target, so a
/// reader never observes a half written file. Every write gets its own temporary file, which is
/// locked exclusively while it's being written.
pub async fn replace_file(path: &Path, content: &[u8]) -> Result<(), io::Error> {
    let temporary = temporary_path(path);

    let result = write_temporary(&temporary, content).await;
    let result = match result {
        Ok(()) => tokio::fs::rename(&temporary, path).await,
        Err(e) => Err(e),
    };
    if result.is_err() {
        let _ = tokio::fs::remove_file(&temporary).await;
    }
    result
}

async fn write_temporary(temporary: &Path, content: &[u8]) -> Result<(), io::Error> {
    let mut file = File::options()
        .write(true)
        .create_new(true)
        .open(temporary)
        .await?;

    file.lock_exclusive()?;
    let result = write_synced(&mut file, content).await;
    file.unlock_async().await?;
    result
}

async fn write_synced(file: &mut File, content: &[u8]) -> Result<(), io::Error> {
    file.write_all(content).await?;
    file.flush().await?;
    file.sync_all().await
}

/// Appends `suffix` to the file name of `path`. `data.json` with `.tmp` becomes `data.json.tmp`.
pub fn with_file_name_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use anyhow::Result;
    use tempfile::tempdir;

    use crate::fs::operations::{read_locked, replace_file, with_file_name_suffix};

    #[tokio::test]
    async fn test_replace_file_creates_and_reads_back() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("data.json");

        replace_file(&path, b"hello there").await?;

        assert_eq!(read_locked(&path).await?, b"hello there");
        Ok(())
    }

    #[tokio::test]
    async fn test_replace_file_shorter_content_leaves_no_tail() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("data.json");

        replace_file(&path, b"a rather long first version").await?;
        replace_file(&path, b"short").await?;

        assert_eq!(read_locked(&path).await?, b"short");
        Ok(())
    }

    #[tokio::test]
    async fn test_replace_file_removes_temporary() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("data.json");

        replace_file(&path, b"{}").await?;

        let names = std::fs::read_dir(dir.path())?
            .map(|entry| entry.map(|v| v.file_name()))
            .collect::<Result<Vec<_>, _>>()?;
        assert_eq!(names, vec![std::ffi::OsString::from("data.json")]);
        Ok(())
    }

    #[tokio::test]
    async fn test_concurrent_replacements_keep_one_whole_version() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("data.json");
        let long = vec![b'a'; 64 * 1024];
        let short = b"short".to_vec();

        for _ in 0..20 {
            let (first, second) =
                tokio::join!(replace_file(&path, &long), replace_file(&path, &short));
            first?;
            second?;

            let content = read_locked(&path).await?;
            assert!(content == long || content == short);
        }

        let names = std::fs::read_dir(dir.path())?.count();
        assert_eq!(names, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_read_locked_keeps_invalid_utf8() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("data.json");
        std::fs::write(&path, [b'{', 0xff, b'}'])?;

        assert_eq!(read_locked(&path).await?, vec![b'{', 0xff, b'}']);
        Ok(())
    }

    #[tokio::test]
    async fn test_read_locked_missing_file() -> Result<()> {
        let dir = tempdir()?;
        let error = read_locked(&dir.path().join("missing.json"))
            .await
            .unwrap_err();
        assert_eq!(error.kind(), std::io::ErrorKind::NotFound);
        Ok(())
    }

    #[test]
    fn test_with_file_name_suffix() {
        assert_eq!(
            with_file_name_suffix(Path::new("/state/screentime/data.json"), ".tmp"),
            Path::new("/state/screentime/data.json.tmp")
        );
        assert_eq!(
            with_file_name_suffix(Path::new("data.json"), ".corrupt"),
            Path::new("data.json.corrupt")
        );
    }
}
