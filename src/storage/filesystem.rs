//! File system operations
//!
//! File-like interface to the storage under test and its `std::fs` implementation.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Result, Write};
use std::path::Path;

/// An open file on the storage under test
pub trait StorageHandle {
    /// Issue one write call and return how many bytes it accepted
    fn write(&mut self, buf: &[u8]) -> Result<usize>;

    /// Issue one read call and return how many bytes it produced
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Force written data down to the medium
    fn sync(&mut self) -> Result<()>;

    /// Release the handle
    fn close(self) -> Result<()>
    where
        Self: Sized;
}

/// Storage mount holding the file under test
pub trait StorageBackend {
    type Handle: StorageHandle;

    /// Stat-like presence check used before any test work starts
    fn exists(&self, path: &Path) -> bool;

    /// Open an existing file write-only
    fn open_write(&mut self, path: &Path) -> Result<Self::Handle>;

    /// Open an existing file read-only
    fn open_read(&mut self, path: &Path) -> Result<Self::Handle>;
}

/// Storage backed by the host file system
#[derive(Debug, Default, Clone, Copy)]
pub struct FsStorage;

impl StorageBackend for FsStorage {
    type Handle = FsHandle;

    fn exists(&self, path: &Path) -> bool {
        fs::metadata(path).is_ok()
    }

    fn open_write(&mut self, path: &Path) -> Result<FsHandle> {
        // Neither create nor truncate: the parameter file is provisioned by the platform
        let file = OpenOptions::new().write(true).open(path)?;
        Ok(FsHandle { file })
    }

    fn open_read(&mut self, path: &Path) -> Result<FsHandle> {
        let file = File::open(path)?;
        Ok(FsHandle { file })
    }
}

/// Open file on the host file system
#[derive(Debug)]
pub struct FsHandle {
    file: File,
}

impl StorageHandle for FsHandle {
    fn write(&mut self, buf: &[u8]) -> Result<usize> {
        loop {
            match self.file.write(buf) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                other => return other,
            }
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        loop {
            match self.file.read(buf) {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                other => return other,
            }
        }
    }

    fn sync(&mut self) -> Result<()> {
        self.file.sync_all()
    }

    fn close(self) -> Result<()> {
        drop(self.file);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exists_tracks_file_presence() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mtd_params");
        assert!(!FsStorage.exists(&path));

        fs::write(&path, b"").unwrap();
        assert!(FsStorage.exists(&path));
    }

    #[test]
    fn test_open_write_requires_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing");
        assert!(FsStorage.open_write(&path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_write_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mtd_params");
        fs::write(&path, b"").unwrap();

        let mut storage = FsStorage;
        let mut handle = storage.open_write(&path).unwrap();
        assert_eq!(handle.write(b"abcd").unwrap(), 4);
        handle.sync().unwrap();
        handle.close().unwrap();

        let mut handle = storage.open_read(&path).unwrap();
        let mut buf = [0u8; 4];
        assert_eq!(handle.read(&mut buf).unwrap(), 4);
        assert_eq!(&buf, b"abcd");
        assert_eq!(handle.read(&mut buf).unwrap(), 0);
        handle.close().unwrap();
    }

    #[test]
    fn test_open_write_does_not_truncate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mtd_params");
        fs::write(&path, b"0123456789").unwrap();

        let mut storage = FsStorage;
        let mut handle = storage.open_write(&path).unwrap();
        handle.write(b"ab").unwrap();
        handle.close().unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"ab23456789");
    }
}
