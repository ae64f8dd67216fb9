//! Byte-source and file-handle traits.

use std::path::Path;

use super::error::{IoError, IoResult};

/// Trait for positional byte sources.
///
/// Anything that supports reading N bytes at an offset: an open file, or
/// a plain in-memory buffer. Page parsing is written once against this
/// trait instead of maintaining parallel code paths for buffers and
/// files.
#[allow(async_fn_in_trait)]
pub trait ReadAt {
    /// Reads data from the source at the specified offset.
    ///
    /// Returns the number of bytes read. May return less than the buffer
    /// size if the end of the source is reached.
    async fn read_at(&self, buf: &mut [u8], offset: u64) -> IoResult<usize>;

    /// Reads exactly `buf.len()` bytes from the source at the specified
    /// offset.
    ///
    /// Returns an error if the source ends before the buffer is filled.
    async fn read_exact_at(&self, buf: &mut [u8], offset: u64) -> IoResult<()> {
        let mut total_read = 0;
        while total_read < buf.len() {
            let n = self
                .read_at(&mut buf[total_read..], offset + total_read as u64)
                .await?;
            if n == 0 {
                return Err(IoError::short_read(buf.len(), total_read));
            }
            total_read += n;
        }
        Ok(())
    }
}

/// Trait for writable file handles.
///
/// All operations are position-based (pread/pwrite style); no cursor
/// state is shared between calls.
#[allow(async_fn_in_trait)]
pub trait FileHandle: ReadAt {
    /// Returns the file path.
    fn path(&self) -> &Path;

    /// Returns the current file size.
    async fn size(&self) -> IoResult<u64>;

    /// Writes data to the file at the specified offset.
    ///
    /// Returns the number of bytes written.
    async fn write_at(&self, buf: &[u8], offset: u64) -> IoResult<usize>;

    /// Writes all bytes to the file at the specified offset.
    ///
    /// Returns an error if not all bytes could be written.
    async fn write_all_at(&self, buf: &[u8], offset: u64) -> IoResult<()> {
        let mut total_written = 0;
        while total_written < buf.len() {
            let n = self
                .write_at(&buf[total_written..], offset + total_written as u64)
                .await?;
            if n == 0 {
                return Err(IoError::short_write(buf.len(), total_written));
            }
            total_written += n;
        }
        Ok(())
    }

    /// Syncs all data and metadata to disk.
    async fn sync(&self) -> IoResult<()>;

    /// Truncates or extends the file to the specified size.
    async fn set_len(&self, size: u64) -> IoResult<()>;
}

impl ReadAt for [u8] {
    async fn read_at(&self, buf: &mut [u8], offset: u64) -> IoResult<usize> {
        let offset = offset as usize;
        if offset >= self.len() {
            return Ok(0);
        }
        let n = buf.len().min(self.len() - offset);
        buf[..n].copy_from_slice(&self[offset..offset + n]);
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_slice_read_at() {
        let data: &[u8] = b"0123456789";

        let mut buf = [0u8; 4];
        let n = data.read_at(&mut buf, 3).await.unwrap();
        assert_eq!(n, 4);
        assert_eq!(&buf, b"3456");
    }

    #[tokio::test]
    async fn test_slice_read_at_tail() {
        let data: &[u8] = b"0123456789";

        // Read past the end is truncated
        let mut buf = [0u8; 4];
        let n = data.read_at(&mut buf, 8).await.unwrap();
        assert_eq!(n, 2);
        assert_eq!(&buf[..2], b"89");

        // Read at the end yields nothing
        let n = data.read_at(&mut buf, 10).await.unwrap();
        assert_eq!(n, 0);
    }

    #[tokio::test]
    async fn test_slice_read_exact_at() {
        let data: &[u8] = b"0123456789";

        let mut buf = [0u8; 10];
        data.read_exact_at(&mut buf, 0).await.unwrap();
        assert_eq!(&buf, b"0123456789");

        let mut buf = [0u8; 4];
        let result = data.read_exact_at(&mut buf, 8).await;
        assert!(matches!(result, Err(IoError::ShortIo { .. })));
    }
}
