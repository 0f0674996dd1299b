//! CLOCK (second-chance) eviction.
//!
//! Grounded in `buffer_mgr.c`'s `CLOCK` branch: each frame carries a
//! reference bit in `Frame::meta` (0 or 1). A pin hit on a resident frame
//! sets its bit. The hand sweeps the frame array looking for an unpinned
//! frame with bit 0; along the way it clears set bits (giving pinned-over
//! frames a "second chance") and advances past them. A freshly loaded
//! frame starts with its bit clear — only a later hit raises it.

use crate::buffer::eviction::{no_free_frame, ReplacementStrategy};
use crate::buffer::frame::Frame;
use crate::error::Result;

pub struct ClockStrategy {
    hand: usize,
}

impl ClockStrategy {
    pub fn new() -> Self {
        Self { hand: 0 }
    }
}

impl Default for ClockStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplacementStrategy for ClockStrategy {
    fn on_hit(&mut self, frames: &mut [Frame], index: usize) {
        frames[index].meta = 1;
    }

    fn on_load(&mut self, _frames: &mut [Frame], _index: usize) {}

    fn pick_victim(&mut self, frames: &mut [Frame]) -> Result<usize> {
        let n = frames.len();
        if frames.iter().all(|f| f.pin_count > 0) {
            return Err(no_free_frame());
        }
        loop {
            let idx = self.hand;
            self.hand = (self.hand + 1) % n;
            if frames[idx].pin_count > 0 {
                continue;
            }
            if frames[idx].meta == 0 {
                return Ok(idx);
            }
            frames[idx].meta = 0;
        }
    }
}
