//! FIFO eviction: a monotonically advancing rear cursor.
//!
//! Grounded in `buffer_mgr.c`'s `FIFO` branch: `rearIndex` walks the frame
//! array modulo its capacity, skipping pinned slots, and is advanced past
//! whichever slot it picks. Per O-6, this cursor is kept entirely separate
//! from the pool's `read_count`/`write_count` I/O counters (the original
//! conflates the two).

use crate::buffer::eviction::{no_free_frame, ReplacementStrategy};
use crate::buffer::frame::Frame;
use crate::error::Result;

pub struct FifoStrategy {
    rear: usize,
}

impl FifoStrategy {
    pub fn new() -> Self {
        Self { rear: 0 }
    }
}

impl Default for FifoStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplacementStrategy for FifoStrategy {
    fn on_hit(&mut self, _frames: &mut [Frame], _index: usize) {}

    fn on_load(&mut self, _frames: &mut [Frame], _index: usize) {}

    fn pick_victim(&mut self, frames: &mut [Frame]) -> Result<usize> {
        let n = frames.len();
        for offset in 0..n {
            let idx = (self.rear + offset) % n;
            if frames[idx].pin_count == 0 {
                self.rear = (idx + 1) % n;
                return Ok(idx);
            }
        }
        Err(no_free_frame())
    }
}
