//! Endless `rodio` source that pulls audio out of the shared engine.
//!
//! The engine writes silence while nothing plays, so one source is appended
//! to the sink once and never replaced.

use std::time::Duration;

use rodio::Source;

use super::types::{SharedEngine, lock_engine};

const BLOCK_FRAMES: usize = 512;
const CHANNELS: u16 = 2;

pub(super) struct EngineSource {
    engine: SharedEngine,
    sample_rate: u32,
    block: Vec<f32>,
    pos: usize,
}

impl EngineSource {
    pub fn new(engine: SharedEngine, sample_rate: u32) -> Self {
        Self {
            engine,
            sample_rate,
            block: vec![0.0; BLOCK_FRAMES * usize::from(CHANNELS)],
            // Force a render on the first pull.
            pos: BLOCK_FRAMES * usize::from(CHANNELS),
        }
    }

    fn refill(&mut self) {
        lock_engine(&self.engine).render(&mut self.block);
        self.pos = 0;
    }
}

impl Iterator for EngineSource {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.pos >= self.block.len() {
            self.refill();
        }
        let sample = self.block[self.pos];
        self.pos += 1;
        Some(sample)
    }
}

impl Source for EngineSource {
    // Channel count and rate never change.
    fn current_span_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        CHANNELS
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}
