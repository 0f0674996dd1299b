//! The buffer pool: a bounded cache of page frames over one block device.
//!
//! Grounded in `buffer_mgr.c`'s `initBufferPool`/`pinPage`/`unpinPage`/
//! `markDirty`/`forcePage`/`shutdownBufferPool`/`forceFlushPool`. Eviction
//! is delegated to a pluggable [`ReplacementStrategy`] rather than the
//! original's inline `if/else` over a strategy enum.

use crate::buffer::eviction::ReplacementStrategy;
use crate::buffer::frame::Frame;
use crate::error::{Result, StorageError};
use crate::storage::BlockDevice;
use crate::types::PageId;
use parking_lot::Mutex;

struct Inner<D> {
    device: D,
    frames: Vec<Frame>,
    strategy: Box<dyn ReplacementStrategy + Send>,
    read_count: u64,
    write_count: u64,
}

/// A bounded cache of page frames backed by one [`BlockDevice`].
pub struct BufferPool<D> {
    inner: Mutex<Inner<D>>,
    capacity: usize,
}

impl<D: BlockDevice> BufferPool<D> {
    /// Attach a pool of `capacity` frames to `device`, evicting via
    /// `strategy`.
    pub fn new(device: D, capacity: usize, strategy: Box<dyn ReplacementStrategy + Send>) -> Self {
        let mut frames = Vec::with_capacity(capacity);
        frames.resize_with(capacity, Frame::empty);
        Self {
            inner: Mutex::new(Inner {
                device,
                frames,
                strategy,
                read_count: 0,
                write_count: 0,
            }),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Pin page `p`, loading it from the device if necessary and evicting a
    /// victim frame if the pool is full.
    pub fn pin(&self, p: PageId) -> Result<PageGuard<'_, D>> {
        if p.value() < -1 {
            log::warn!("pin: negative page number {p}");
            return Err(StorageError::PinNegative(p));
        }
        let mut inner = self.inner.lock();

        if let Some(idx) = inner.frames.iter().position(|f| f.page_no == p) {
            inner.frames[idx].pin_count += 1;
            let Inner { frames, strategy, .. } = &mut *inner;
            strategy.on_hit(frames, idx);
            return Ok(PageGuard {
                pool: self,
                page_no: p,
                frame_idx: idx,
            });
        }

        let idx = if let Some(idx) = inner.frames.iter().position(|f| f.is_empty()) {
            idx
        } else {
            let victim = {
                let Inner { frames, strategy, .. } = &mut *inner;
                match strategy.pick_victim(frames) {
                    Ok(idx) => idx,
                    Err(e) => {
                        log::warn!("pin({p}): no free frame to evict");
                        return Err(e);
                    }
                }
            };
            log::trace!(
                "pin({p}): evicting frame {victim} (page {})",
                inner.frames[victim].page_no
            );
            if inner.frames[victim].dirty {
                let data = inner.frames[victim].data.clone();
                let page_no = inner.frames[victim].page_no;
                inner.device.write_page(page_no, &data)?;
                inner.write_count += 1;
                inner.frames[victim].dirty = false;
                log::trace!("pin({p}): wrote back dirty victim page {page_no}");
            }
            inner.frames[victim].page_no = PageId::NO_PAGE;
            victim
        };

        if p.value() >= inner.device.total_pages() {
            let target = p.value() + 1;
            inner.device.ensure_capacity(target)?;
        }
        inner.device.read_page(p, &mut inner.frames[idx].data)?;
        inner.read_count += 1;
        inner.frames[idx].page_no = p;
        inner.frames[idx].pin_count = 1;
        inner.frames[idx].dirty = false;
        inner.frames[idx].meta = 0;
        let Inner { frames, strategy, .. } = &mut *inner;
        strategy.on_load(frames, idx);

        Ok(PageGuard {
            pool: self,
            page_no: p,
            frame_idx: idx,
        })
    }

    fn unpin(&self, idx: usize) {
        let mut inner = self.inner.lock();
        let frame = &mut inner.frames[idx];
        if frame.pin_count == 0 {
            log::warn!("unpin called on already-unpinned frame {idx}");
            return;
        }
        frame.pin_count -= 1;
    }

    fn mark_dirty(&self, idx: usize) {
        let mut inner = self.inner.lock();
        inner.frames[idx].dirty = true;
    }

    /// Write frame `idx` to the device unconditionally, clearing the dirty
    /// bit and incrementing the write counter regardless of whether the
    /// frame was dirty.
    fn force_page(&self, idx: usize) -> Result<()> {
        let mut inner = self.inner.lock();
        let page_no = inner.frames[idx].page_no;
        let data = inner.frames[idx].data.clone();
        inner.device.write_page(page_no, &data)?;
        inner.write_count += 1;
        inner.frames[idx].dirty = false;
        Ok(())
    }

    /// Write every dirty, unpinned frame to the device.
    pub fn force_flush_pool(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        for idx in 0..inner.frames.len() {
            if inner.frames[idx].dirty && inner.frames[idx].pin_count == 0 {
                let page_no = inner.frames[idx].page_no;
                let data = inner.frames[idx].data.clone();
                inner.device.write_page(page_no, &data)?;
                inner.write_count += 1;
                inner.frames[idx].dirty = false;
            }
        }
        Ok(())
    }

    /// Flush dirty frames and release the pool. Errors if any frame is
    /// still pinned.
    pub fn shutdown(&self) -> Result<()> {
        let pinned = {
            let inner = self.inner.lock();
            inner.frames.iter().filter(|f| f.pin_count > 0).count()
        };
        if pinned > 0 {
            log::warn!("shutdown: {pinned} frame(s) still pinned");
            return Err(StorageError::PinnedPages(pinned));
        }
        self.force_flush_pool()
    }

    /// Per-frame page numbers in slot order (`NO_PAGE` for empty slots).
    pub fn frame_contents(&self) -> Vec<PageId> {
        self.inner.lock().frames.iter().map(|f| f.page_no).collect()
    }

    /// Per-frame dirty flags in slot order.
    pub fn dirty_flags(&self) -> Vec<bool> {
        self.inner.lock().frames.iter().map(|f| f.dirty).collect()
    }

    /// Per-frame pin counts in slot order.
    pub fn pin_counts(&self) -> Vec<u32> {
        self.inner.lock().frames.iter().map(|f| f.pin_count).collect()
    }

    /// Cumulative number of pages read from the device.
    pub fn read_count(&self) -> u64 {
        self.inner.lock().read_count
    }

    /// Cumulative number of pages written to the device.
    pub fn write_count(&self) -> u64 {
        self.inner.lock().write_count
    }
}

/// RAII pin on a page.
///
/// Dropping the guard unpins the frame. Mutation is only ever observed by
/// the pool through an explicit [`PageGuard::mark_dirty`] call.
pub struct PageGuard<'a, D> {
    pool: &'a BufferPool<D>,
    page_no: PageId,
    frame_idx: usize,
}

impl<'a, D: BlockDevice> PageGuard<'a, D> {
    pub fn page_no(&self) -> PageId {
        self.page_no
    }

    /// Read-only view of the page bytes.
    pub fn data(&self) -> Vec<u8> {
        self.pool.inner.lock().frames[self.frame_idx].data.to_vec()
    }

    /// Overwrite the page bytes in place. Does not implicitly dirty the
    /// frame; call [`Self::mark_dirty`] to do so.
    pub fn write(&self, data: &[u8]) {
        let mut inner = self.pool.inner.lock();
        inner.frames[self.frame_idx].data[..data.len()].copy_from_slice(data);
    }

    /// Flag the held frame as modified.
    pub fn mark_dirty(&self) {
        self.pool.mark_dirty(self.frame_idx);
    }

    /// Force this frame to the device now, regardless of pin state.
    pub fn force(&self) -> Result<()> {
        self.pool.force_page(self.frame_idx)
    }
}

impl<'a, D: BlockDevice> Drop for PageGuard<'a, D> {
    fn drop(&mut self) {
        self.pool.unpin(self.frame_idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::fifo::FifoStrategy;
    use crate::buffer::lru::LruStrategy;
    use crate::buffer::clock::ClockStrategy;
    use crate::storage::FileBlockDevice;
    use tempfile::tempdir;

    fn new_pool(capacity: usize, strategy: Box<dyn ReplacementStrategy + Send>) -> (tempfile::TempDir, BufferPool<FileBlockDevice>) {
        crate::test_support::init_log();
        let dir = tempdir().unwrap();
        let path = dir.path().join("pool.bin");
        FileBlockDevice::create(&path).unwrap();
        let device = FileBlockDevice::open(&path).unwrap();
        (dir, BufferPool::new(device, capacity, strategy))
    }

    #[test]
    fn pin_unpin_round_trip() {
        let (_d, pool) = new_pool(3, Box::new(FifoStrategy::new()));
        {
            let guard = pool.pin(PageId::new(1)).unwrap();
            guard.write(b"hello");
            guard.mark_dirty();
        }
        pool.force_flush_pool().unwrap();
        let guard = pool.pin(PageId::new(1)).unwrap();
        assert_eq!(&guard.data()[..5], b"hello");
    }

    #[test]
    fn fifo_scenario_6() {
        let (_d, pool) = new_pool(3, Box::new(FifoStrategy::new()));
        for p in [1, 2, 3] {
            drop(pool.pin(PageId::new(p)).unwrap());
        }
        drop(pool.pin(PageId::new(4)).unwrap());
        let contents: Vec<i64> = pool.frame_contents().iter().map(|p| p.value()).collect();
        assert_eq!(contents, vec![4, 2, 3]);
        assert_eq!(pool.dirty_flags(), vec![false, false, false]);
    }

    #[test]
    fn lru_scenario_7() {
        let (_d, pool) = new_pool(3, Box::new(LruStrategy::new()));
        for p in [1, 2, 3, 1, 4] {
            drop(pool.pin(PageId::new(p)).unwrap());
        }
        let contents: Vec<i64> = pool.frame_contents().iter().map(|p| p.value()).collect();
        assert_eq!(contents, vec![1, 4, 3]);
    }

    #[test]
    fn clock_scenario_8() {
        let (_d, pool) = new_pool(3, Box::new(ClockStrategy::new()));
        for p in [1, 2, 3] {
            drop(pool.pin(PageId::new(p)).unwrap());
        }
        drop(pool.pin(PageId::new(1)).unwrap());
        drop(pool.pin(PageId::new(4)).unwrap());
        let contents: Vec<i64> = pool.frame_contents().iter().map(|p| p.value()).collect();
        assert_eq!(contents, vec![1, 4, 3]);
    }

    #[test]
    fn shutdown_with_pinned_page_fails() {
        let (_d, pool) = new_pool(2, Box::new(FifoStrategy::new()));
        let guard = pool.pin(PageId::new(1)).unwrap();
        assert!(matches!(pool.shutdown(), Err(StorageError::PinnedPages(1))));
        drop(guard);
        assert!(pool.shutdown().is_ok());
    }

    #[test]
    fn all_pinned_pool_returns_no_free_frame() {
        let (_d, pool) = new_pool(2, Box::new(FifoStrategy::new()));
        let _g1 = pool.pin(PageId::new(1)).unwrap();
        let _g2 = pool.pin(PageId::new(2)).unwrap();
        assert!(matches!(pool.pin(PageId::new(3)), Err(StorageError::NoFreeFrame)));
    }

    #[test]
    fn force_page_on_clean_frame_still_writes_and_counts_p4() {
        let (_d, pool) = new_pool(2, Box::new(FifoStrategy::new()));
        let guard = pool.pin(PageId::new(1)).unwrap();
        assert!(!pool.dirty_flags()[0]);
        assert_eq!(pool.write_count(), 0);
        guard.force().unwrap();
        assert_eq!(pool.write_count(), 1);
        assert!(!pool.dirty_flags()[0]);
    }
}
