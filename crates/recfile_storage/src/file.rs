//! File-based storage backend.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use fs2::FileExt;
use parking_lot::RwLock;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A file-based storage backend.
///
/// A backend is opened in one of two modes:
///
/// - [`FileBackend::create`] truncates the file and holds an **exclusive**
///   advisory lock, so only one writer can own a container file.
/// - [`FileBackend::open_read_only`] holds a **shared** advisory lock, so any
///   number of readers can coexist but none while a writer is active.
///
/// The lock is released when the backend is dropped.
///
/// # Example
///
/// ```no_run
/// use recfile_storage::{StorageBackend, FileBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::create(Path::new("records.bin")).unwrap();
/// backend.append(b"payload").unwrap();
/// backend.sync().unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    file: RwLock<File>,
    size: RwLock<u64>,
    read_only: bool,
}

impl FileBackend {
    /// Creates (or truncates) the file at `path` for writing.
    ///
    /// Parent directories are created as needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Locked`] if another handle holds a lock on the
    /// file, or an I/O error if the file cannot be created.
    pub fn create(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Lock before truncating so a live writer's file is never clobbered.
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        if file.try_lock_exclusive().is_err() {
            return Err(StorageError::Locked {
                path: path.to_path_buf(),
            });
        }

        file.set_len(0)?;

        Ok(Self {
            path: path.to_path_buf(),
            file: RwLock::new(file),
            size: RwLock::new(0),
            read_only: false,
        })
    }

    /// Opens an existing file for reading.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Locked`] if a writer holds the file, or an
    /// I/O error if the file does not exist or cannot be opened.
    pub fn open_read_only(path: &Path) -> StorageResult<Self> {
        let file = OpenOptions::new().read(true).open(path)?;

        if file.try_lock_shared().is_err() {
            return Err(StorageError::Locked {
                path: path.to_path_buf(),
            });
        }

        let size = file.metadata()?.len();

        Ok(Self {
            path: path.to_path_buf(),
            file: RwLock::new(file),
            size: RwLock::new(size),
            read_only: true,
        })
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if this backend was opened with [`Self::open_read_only`].
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }
}

impl StorageBackend for FileBackend {
    fn read_at(&self, offset: u64, len: usize) -> StorageResult<Vec<u8>> {
        let size = *self.size.read();
        let end = offset.saturating_add(len as u64);

        if offset > size || end > size {
            return Err(StorageError::ReadPastEnd { offset, len, size });
        }

        if len == 0 {
            return Ok(Vec::new());
        }

        let mut file = self.file.write();
        file.seek(SeekFrom::Start(offset))?;

        let mut buffer = vec![0u8; len];
        file.read_exact(&mut buffer)?;

        Ok(buffer)
    }

    fn append(&mut self, data: &[u8]) -> StorageResult<u64> {
        if self.read_only {
            return Err(StorageError::ReadOnly);
        }

        if data.is_empty() {
            return Ok(*self.size.read());
        }

        let mut file = self.file.write();
        let mut size = self.size.write();

        let offset = *size;
        file.seek(SeekFrom::End(0))?;
        file.write_all(data)?;
        *size += data.len() as u64;

        Ok(offset)
    }

    fn flush(&mut self) -> StorageResult<()> {
        if self.read_only {
            return Ok(());
        }
        let mut file = self.file.write();
        file.flush()?;
        Ok(())
    }

    fn size(&self) -> StorageResult<u64> {
        Ok(*self.size.read())
    }

    fn sync(&mut self) -> StorageResult<()> {
        if self.read_only {
            return Ok(());
        }
        let file = self.file.write();
        file.sync_all()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn create_new_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");

        let backend = FileBackend::create(&path).unwrap();
        assert_eq!(backend.size().unwrap(), 0);
        assert!(path.exists());
        assert!(!backend.is_read_only());
    }

    #[test]
    fn create_truncates_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");
        std::fs::write(&path, b"stale contents").unwrap();

        let backend = FileBackend::create(&path).unwrap();
        assert_eq!(backend.size().unwrap(), 0);
        drop(backend);
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    }

    #[test]
    fn append_and_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");

        let mut backend = FileBackend::create(&path).unwrap();

        assert_eq!(backend.append(b"hello").unwrap(), 0);
        assert_eq!(backend.append(b" world").unwrap(), 5);
        assert_eq!(backend.size().unwrap(), 11);

        let data = backend.read_at(0, 11).unwrap();
        assert_eq!(&data, b"hello world");

        let data = backend.read_at(6, 5).unwrap();
        assert_eq!(&data, b"world");
    }

    #[test]
    fn read_past_end_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");

        let mut backend = FileBackend::create(&path).unwrap();
        backend.append(b"hello").unwrap();

        let result = backend.read_at(3, 5);
        assert!(matches!(result, Err(StorageError::ReadPastEnd { .. })));
    }

    #[test]
    fn reopen_read_only() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");

        {
            let mut backend = FileBackend::create(&path).unwrap();
            backend.append(b"persistent data").unwrap();
            backend.sync().unwrap();
        }

        let mut backend = FileBackend::open_read_only(&path).unwrap();
        assert!(backend.is_read_only());
        assert_eq!(backend.size().unwrap(), 15);
        assert_eq!(&backend.read_at(0, 15).unwrap(), b"persistent data");
        assert!(matches!(backend.append(b"x"), Err(StorageError::ReadOnly)));
    }

    #[test]
    fn open_missing_file_fails() {
        let dir = tempdir().unwrap();
        let result = FileBackend::open_read_only(&dir.path().join("missing.bin"));
        assert!(matches!(result, Err(StorageError::Io(_))));
    }

    #[test]
    fn second_writer_is_locked_out() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");

        let mut first = FileBackend::create(&path).unwrap();
        first.append(b"owned").unwrap();

        let second = FileBackend::create(&path);
        assert!(matches!(second, Err(StorageError::Locked { .. })));

        // The locked-out attempt must not have truncated the file.
        assert_eq!(&first.read_at(0, 5).unwrap(), b"owned");
    }

    #[test]
    fn reader_is_locked_out_while_writing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");

        let writer = FileBackend::create(&path).unwrap();
        assert!(matches!(
            FileBackend::open_read_only(&path),
            Err(StorageError::Locked { .. })
        ));

        drop(writer);
        assert!(FileBackend::open_read_only(&path).is_ok());
    }

    #[test]
    fn create_with_nested_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("path").join("test.bin");

        let backend = FileBackend::create(&path).unwrap();
        assert_eq!(backend.size().unwrap(), 0);
        assert_eq!(backend.path(), path);
    }

    #[test]
    fn empty_append_and_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.bin");

        let mut backend = FileBackend::create(&path).unwrap();
        backend.append(b"x").unwrap();

        assert_eq!(backend.append(b"").unwrap(), 1);
        assert!(backend.read_at(1, 0).unwrap().is_empty());
    }
}
