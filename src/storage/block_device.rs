//! Block device: a linear array of fixed-size pages on persistent storage.
//!
//! Grounded in `storage_mgr.c`'s `createPageFile`/`openPageFile`/`readBlock`/
//! `writeBlock`/`appendEmptyBlock`/`ensureCapacity`. The cursor-driven
//! sequential helpers (`read_first`, `read_current`, ...) are thin wrappers
//! over `read_page` exactly as in the original.

use crate::error::{Result, StorageError};
use crate::types::{PageId, PAGE_SIZE};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A fixed-size opaque page buffer.
pub type Page = [u8; PAGE_SIZE];

/// Abstraction over a linear array of fixed-size pages on disk.
///
/// Implementations are not required to be `Send`/`Sync`; the engine is
/// single-threaded (see §5 of the design).
pub trait BlockDevice {
    /// Create a new backing file, initialized with exactly one zero-filled
    /// page.
    fn create(name: &Path) -> Result<()>
    where
        Self: Sized;

    /// Open an existing backing file.
    fn open(name: &Path) -> Result<Self>
    where
        Self: Sized;

    /// Close the device. A no-op beyond dropping in-process state.
    fn close(self) -> Result<()>;

    /// Delete the backing file.
    fn destroy(name: &Path) -> Result<()>
    where
        Self: Sized;

    /// Total number of pages currently allocated.
    fn total_pages(&self) -> i64;

    /// Read page `i` into `out`.
    fn read_page(&mut self, i: PageId, out: &mut Page) -> Result<()>;

    /// Overwrite page `i`. If `i` equals `total_pages`, the device appends.
    fn write_page(&mut self, i: PageId, data: &Page) -> Result<()>;

    /// Append one zero-filled page, incrementing `total_pages`.
    fn append_empty(&mut self) -> Result<PageId>;

    /// Append pages until `total_pages >= k`.
    fn ensure_capacity(&mut self, k: i64) -> Result<()>;

    /// Current cursor position (last-touched page).
    fn cursor(&self) -> PageId;

    fn read_first(&mut self, out: &mut Page) -> Result<()> {
        self.read_page(PageId::new(0), out)
    }

    fn read_current(&mut self, out: &mut Page) -> Result<()> {
        let cur = self.cursor();
        self.read_page(cur, out)
    }

    fn read_next(&mut self, out: &mut Page) -> Result<()> {
        let next = PageId::new(self.cursor().value() + 1);
        self.read_page(next, out)
    }

    fn read_prev(&mut self, out: &mut Page) -> Result<()> {
        let prev = PageId::new(self.cursor().value() - 1);
        self.read_page(prev, out)
    }

    fn read_last(&mut self, out: &mut Page) -> Result<()> {
        let last = PageId::new(self.total_pages() - 1);
        self.read_page(last, out)
    }
}

/// A [`BlockDevice`] backed by an OS file.
pub struct FileBlockDevice {
    file: File,
    name: PathBuf,
    total_pages: i64,
    cursor: PageId,
}

impl FileBlockDevice {
    fn zero_page() -> Page {
        [0u8; PAGE_SIZE]
    }
}

impl BlockDevice for FileBlockDevice {
    fn create(name: &Path) -> Result<()> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(name)
            .map_err(|_| StorageError::FileNotFound(name.display().to_string()))?;
        file.write_all(&Self::zero_page())?;
        file.sync_all()?;
        Ok(())
    }

    fn open(name: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(name)
            .map_err(|_| StorageError::FileNotFound(name.display().to_string()))?;
        let len = file.metadata()?.len();
        let total_pages = (len / PAGE_SIZE as u64) as i64;
        Ok(Self {
            file,
            name: name.to_path_buf(),
            total_pages,
            cursor: PageId::new(0),
        })
    }

    fn close(self) -> Result<()> {
        Ok(())
    }

    fn destroy(name: &Path) -> Result<()> {
        std::fs::remove_file(name)
            .map_err(|_| StorageError::FileNotFound(name.display().to_string()))
    }

    fn total_pages(&self) -> i64 {
        self.total_pages
    }

    fn read_page(&mut self, i: PageId, out: &mut Page) -> Result<()> {
        if i.value() < 0 || i.value() >= self.total_pages {
            return Err(StorageError::ReadNonExisting(i));
        }
        self.file.seek(SeekFrom::Start(i.file_offset(PAGE_SIZE)))?;
        self.file.read_exact(out)?;
        self.cursor = i;
        Ok(())
    }

    fn write_page(&mut self, i: PageId, data: &Page) -> Result<()> {
        if i.value() < 0 || i.value() > self.total_pages {
            return Err(StorageError::WriteFailed(i));
        }
        self.file.seek(SeekFrom::Start(i.file_offset(PAGE_SIZE)))?;
        self.file.write_all(data)?;
        if i.value() == self.total_pages {
            self.total_pages += 1;
        }
        self.cursor = i;
        Ok(())
    }

    fn append_empty(&mut self) -> Result<PageId> {
        let id = PageId::new(self.total_pages);
        self.write_page(id, &Self::zero_page())?;
        Ok(id)
    }

    fn ensure_capacity(&mut self, k: i64) -> Result<()> {
        while self.total_pages < k {
            self.append_empty()?;
        }
        Ok(())
    }

    fn cursor(&self) -> PageId {
        self.cursor
    }
}

impl FileBlockDevice {
    /// The path this device was opened against.
    pub fn name(&self) -> &Path {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn create_then_open_has_one_page() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("device.bin");
        FileBlockDevice::create(&path)?;
        let dev = FileBlockDevice::open(&path)?;
        assert_eq!(dev.total_pages(), 1);
        Ok(())
    }

    #[test]
    fn read_out_of_range_fails() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("device.bin");
        FileBlockDevice::create(&path)?;
        let mut dev = FileBlockDevice::open(&path)?;
        let mut buf = [0u8; PAGE_SIZE];
        assert!(matches!(
            dev.read_page(PageId::new(1), &mut buf),
            Err(StorageError::ReadNonExisting(_))
        ));
        assert!(matches!(
            dev.read_page(PageId::new(-1), &mut buf),
            Err(StorageError::ReadNonExisting(_))
        ));
        Ok(())
    }

    #[test]
    fn write_at_total_pages_appends() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("device.bin");
        FileBlockDevice::create(&path)?;
        let mut dev = FileBlockDevice::open(&path)?;
        let mut data = [0u8; PAGE_SIZE];
        data[0] = 7;
        dev.write_page(PageId::new(1), &data)?;
        assert_eq!(dev.total_pages(), 2);

        let mut out = [0u8; PAGE_SIZE];
        dev.read_page(PageId::new(1), &mut out)?;
        assert_eq!(out[0], 7);
        Ok(())
    }

    #[test]
    fn ensure_capacity_extends_with_zero_pages() -> Result<()> {
        let dir = tempdir().unwrap();
        let path = dir.path().join("device.bin");
        FileBlockDevice::create(&path)?;
        let mut dev = FileBlockDevice::open(&path)?;
        dev.ensure_capacity(5)?;
        assert_eq!(dev.total_pages(), 5);
        Ok(())
    }
}
