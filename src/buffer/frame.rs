//! A single buffer pool frame.

use crate::storage::Page;
use crate::types::PageId;

/// One slot of the buffer pool.
///
/// Grounded in `buffer_mgr.c`'s `BM_PageHandle`/`PageFrame` bookkeeping:
/// page number, data, dirty bit, fix (pin) count, plus whatever scalar the
/// active eviction strategy needs to track (`meta`).
pub struct Frame {
    pub page_no: PageId,
    pub data: Box<Page>,
    pub dirty: bool,
    pub pin_count: u32,
    /// Policy-specific integer: FIFO doesn't use it, LRU stores the logical
    /// clock stamp, CLOCK stores the reference bit (0 or 1).
    pub meta: u64,
}

impl Frame {
    pub fn empty() -> Self {
        Self {
            page_no: PageId::NO_PAGE,
            data: Box::new([0u8; crate::types::PAGE_SIZE]),
            dirty: false,
            pin_count: 0,
            meta: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.page_no == PageId::NO_PAGE
    }
}
