//! Standard async file I/O implementation using tokio.
//!
//! This is the default cross-platform implementation. It wraps a standard
//! file and uses tokio's `spawn_blocking` for async operations.

use std::fs::File as StdFile;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task;

use super::error::{IoError, IoResult};
use super::handle::{FileHandle, ReadAt};
use super::options::OpenOptions;

fn join_error(e: task::JoinError) -> IoError {
    IoError::Io {
        source: std::io::Error::other(e),
    }
}

/// Standard file implementation using tokio.
///
/// The underlying file is behind a mutex; each positional operation seeks
/// and transfers under the lock inside a blocking task. Handles are cheap
/// and scoped to a single store call, so no long-lived state is kept.
pub struct StandardFile {
    /// The underlying file, wrapped in a mutex for thread-safe access.
    file: Arc<Mutex<StdFile>>,
    /// The file path.
    path: PathBuf,
    /// Whether the file was opened with write access.
    writable: bool,
}

impl StandardFile {
    /// Opens a file with the specified options.
    pub async fn open(path: impl AsRef<Path>, options: OpenOptions) -> IoResult<Self> {
        let path = path.as_ref().to_path_buf();
        let path_clone = path.clone();
        let writable = options.write;

        let file = task::spawn_blocking(move || {
            options
                .to_std_options()
                .open(&path_clone)
                .map_err(|e| IoError::from_io_with_path(e, &path_clone))
        })
        .await
        .map_err(join_error)??;

        Ok(Self {
            file: Arc::new(Mutex::new(file)),
            path,
            writable,
        })
    }
}

impl ReadAt for StandardFile {
    async fn read_at(&self, buf: &mut [u8], offset: u64) -> IoResult<usize> {
        let file = Arc::clone(&self.file);
        let mut owned_buf = vec![0u8; buf.len()];

        let (n, read_buf) = task::spawn_blocking(move || {
            let mut file = file.lock();
            file.seek(SeekFrom::Start(offset))
                .map_err(|e| IoError::Io { source: e })?;
            let n = file
                .read(&mut owned_buf)
                .map_err(|e| IoError::Io { source: e })?;
            Ok::<_, IoError>((n, owned_buf))
        })
        .await
        .map_err(join_error)??;

        buf[..n].copy_from_slice(&read_buf[..n]);
        Ok(n)
    }
}

impl FileHandle for StandardFile {
    fn path(&self) -> &Path {
        &self.path
    }

    async fn size(&self) -> IoResult<u64> {
        let file = Arc::clone(&self.file);
        task::spawn_blocking(move || {
            let file = file.lock();
            file.metadata()
                .map(|m| m.len())
                .map_err(|e| IoError::Io { source: e })
        })
        .await
        .map_err(join_error)?
    }

    async fn write_at(&self, buf: &[u8], offset: u64) -> IoResult<usize> {
        if !self.writable {
            return Err(IoError::InvalidOperation {
                operation: "write",
                mode: "read-only",
            });
        }

        let file = Arc::clone(&self.file);
        let owned_buf = buf.to_vec();

        task::spawn_blocking(move || {
            let mut file = file.lock();
            file.seek(SeekFrom::Start(offset))
                .map_err(|e| IoError::Io { source: e })?;
            file.write(&owned_buf)
                .map_err(|e| IoError::Io { source: e })
        })
        .await
        .map_err(join_error)?
    }

    async fn sync(&self) -> IoResult<()> {
        let file = Arc::clone(&self.file);
        task::spawn_blocking(move || {
            let file = file.lock();
            file.sync_all().map_err(|e| IoError::Io { source: e })
        })
        .await
        .map_err(join_error)?
    }

    async fn set_len(&self, size: u64) -> IoResult<()> {
        if !self.writable {
            return Err(IoError::InvalidOperation {
                operation: "set_len",
                mode: "read-only",
            });
        }

        let file = Arc::clone(&self.file);
        task::spawn_blocking(move || {
            let file = file.lock();
            file.set_len(size).map_err(|e| IoError::Io { source: e })
        })
        .await
        .map_err(join_error)?
    }
}

impl std::fmt::Debug for StandardFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StandardFile")
            .field("path", &self.path)
            .field("writable", &self.writable)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_open_create() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.page");

        let file = StandardFile::open(&path, OpenOptions::for_create())
            .await
            .unwrap();

        assert_eq!(file.path(), path);
        assert!(file.writable);
    }

    #[tokio::test]
    async fn test_open_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing.page");

        let result = StandardFile::open(&path, OpenOptions::for_read()).await;
        assert!(matches!(result, Err(IoError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rw.page");

        let file = StandardFile::open(&path, OpenOptions::for_create())
            .await
            .unwrap();

        let data = b"Hello, Stratum!";
        file.write_all_at(data, 0).await.unwrap();
        file.sync().await.unwrap();

        let mut buf = vec![0u8; data.len()];
        file.read_exact_at(&mut buf, 0).await.unwrap();
        assert_eq!(&buf, data);
    }

    #[tokio::test]
    async fn test_write_at_offset() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("offset.page");

        let file = StandardFile::open(&path, OpenOptions::for_create())
            .await
            .unwrap();

        let data = b"Test data";
        file.write_all_at(data, 100).await.unwrap();
        file.sync().await.unwrap();

        assert_eq!(file.size().await.unwrap(), 100 + data.len() as u64);

        let mut buf = vec![0u8; data.len()];
        file.read_exact_at(&mut buf, 100).await.unwrap();
        assert_eq!(&buf, data);
    }

    #[tokio::test]
    async fn test_read_exact_short() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.page");

        let file = StandardFile::open(&path, OpenOptions::for_create())
            .await
            .unwrap();

        file.write_all_at(b"Short", 0).await.unwrap();
        file.sync().await.unwrap();

        let mut buf = vec![0u8; 100];
        let result = file.read_exact_at(&mut buf, 0).await;
        assert!(matches!(result, Err(IoError::ShortIo { .. })));
    }

    #[tokio::test]
    async fn test_set_len() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("len.page");

        let file = StandardFile::open(&path, OpenOptions::for_create())
            .await
            .unwrap();

        file.set_len(1024).await.unwrap();
        assert_eq!(file.size().await.unwrap(), 1024);

        file.set_len(512).await.unwrap();
        assert_eq!(file.size().await.unwrap(), 512);
    }

    #[tokio::test]
    async fn test_read_only_write_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ro.page");

        {
            let file = StandardFile::open(&path, OpenOptions::for_create())
                .await
                .unwrap();
            file.write_all_at(b"data", 0).await.unwrap();
        }

        let file = StandardFile::open(&path, OpenOptions::for_read())
            .await
            .unwrap();
        let result = file.write_at(b"new data", 0).await;
        assert!(matches!(result, Err(IoError::InvalidOperation { .. })));
    }
}
