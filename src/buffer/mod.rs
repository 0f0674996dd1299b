//! Buffer pool: bounded in-memory page cache with pluggable eviction.
//!
//! Pages are pinned for the duration of a scoped [`PageGuard`], which
//! releases its pin on drop; `mark_dirty` is always an explicit, separate
//! call (see design notes on resource scope).

mod clock;
mod eviction;
mod fifo;
mod frame;
mod lru;
mod pool;

pub use clock::ClockStrategy;
pub use eviction::ReplacementStrategy;
pub use fifo::FifoStrategy;
pub use frame::Frame;
pub use lru::LruStrategy;
pub use pool::{BufferPool, PageGuard};
