//! A small single-process storage engine layering three cooperating
//! subsystems around a fixed-size paged file per logical object:
//!
//! - [`storage`]: the paged block device — a linear array of fixed-size
//!   pages on disk.
//! - [`buffer`]: a bounded in-memory page cache over one block device,
//!   with pluggable eviction (FIFO, LRU, CLOCK).
//! - [`btree`]: a value-keyed B+ tree index (insert/find/delete/scan) that
//!   pins pages through the buffer pool.
//! - [`record`]: a slotted tuple store, the buffer pool's second client.
//!
//! Each public operation returns a [`Result`] over the crate-wide
//! [`StorageError`] taxonomy. There is no crash-recovery log, no MVCC, and
//! the B+ tree does not persist its structure to its backing file across
//! process restarts — it uses the device only as an allocated backing
//! store (see [`btree::BTree::open`]'s doc comment).

pub mod btree;
pub mod buffer;
pub mod error;
pub mod record;
pub mod storage;
pub mod types;

pub use error::{Result, StorageError};
pub use types::{DataType, PageId, Rid, Value, PAGE_SIZE};

pub use btree::BTree;
pub use buffer::BufferPool;
pub use record::SlottedRecordStore;
pub use storage::{BlockDevice, FileBlockDevice};

/// Test-only logging setup, shared by every module's `#[cfg(test)]` block.
#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Once;

    static INIT: Once = Once::new();

    /// Install `env_logger` once per test binary so `log::trace!`/`warn!`
    /// from the buffer pool and record store surface under
    /// `cargo test -- --nocapture`.
    pub(crate) fn init_log() {
        INIT.call_once(|| {
            let _ = env_logger::Builder::from_default_env().is_test(true).try_init();
        });
    }
}
