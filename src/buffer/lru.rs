//! LRU eviction: a global logical clock stamped on every pin.
//!
//! Grounded in `buffer_mgr.c`'s `LRU` branch: a counter incremented on
//! every pin (hit or miss) and stamped into the frame just touched; the
//! victim is the unpinned frame with the smallest stamp.

use crate::buffer::eviction::{no_free_frame, ReplacementStrategy};
use crate::buffer::frame::Frame;
use crate::error::Result;

pub struct LruStrategy {
    clock: u64,
}

impl LruStrategy {
    pub fn new() -> Self {
        Self { clock: 0 }
    }

    fn stamp(&mut self, frames: &mut [Frame], index: usize) {
        self.clock += 1;
        frames[index].meta = self.clock;
    }
}

impl Default for LruStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplacementStrategy for LruStrategy {
    fn on_hit(&mut self, frames: &mut [Frame], index: usize) {
        self.stamp(frames, index);
    }

    fn on_load(&mut self, frames: &mut [Frame], index: usize) {
        self.stamp(frames, index);
    }

    fn pick_victim(&mut self, frames: &mut [Frame]) -> Result<usize> {
        frames
            .iter()
            .enumerate()
            .filter(|(_, f)| f.pin_count == 0)
            .min_by_key(|(_, f)| f.meta)
            .map(|(idx, _)| idx)
            .ok_or_else(no_free_frame)
    }
}
