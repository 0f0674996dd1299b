//! Error taxonomy for the storage engine.

use crate::types::{PageId, Rid};
use thiserror::Error;

/// Result type alias for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur across the block device, buffer pool, B+ tree and
/// record store.
#[derive(Error, Debug)]
pub enum StorageError {
    /// I/O error from the underlying file system, not otherwise classified
    /// below.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing page file does not exist.
    #[error("file not found: {0}")]
    FileNotFound(String),

    /// A read was attempted against a page past the end of the device, or
    /// with a negative page number.
    #[error("attempted to read non-existing page {0}")]
    ReadNonExisting(PageId),

    /// A write to the backing device failed.
    #[error("write failed for page {0}")]
    WriteFailed(PageId),

    /// Shutdown or close was requested while pages are still pinned.
    #[error("cannot shut down: {0} page(s) still pinned")]
    PinnedPages(usize),

    /// `unpin` was called enough times to drive a frame's pin count below
    /// zero.
    #[error("pin count for page {0} went negative")]
    PinNegative(PageId),

    /// Every frame in the pool is pinned; no victim is available.
    #[error("no free frame available to evict")]
    NoFreeFrame,

    /// Point lookup found no entry for the given key.
    #[error("key not found")]
    KeyNotFound,

    /// Insert was attempted for a key already present in the tree.
    #[error("key already exists")]
    KeyAlreadyExists,

    /// A scan cursor was advanced past its last entry.
    #[error("no more entries")]
    NoMoreEntries,

    /// A record-store scan was opened against a table with no records.
    #[error("no records to scan")]
    NoRecordsToScan,

    /// The tree's configured order parameter is too large to fit within a
    /// page.
    #[error("requested order is too high for the page size")]
    OrderTooHigh,

    /// A scan was advanced or closed using a condition/handle it was not
    /// opened with.
    #[error("scan condition not found")]
    ScanConditionNotFound,

    /// No tuple exists at the given record id (already deleted, or never
    /// written).
    #[error("no tuple with rid {0}")]
    NoTupleWithRid(Rid),
}
