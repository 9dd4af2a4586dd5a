use std::collections::VecDeque;

use glam::Vec3;

use crate::config::PreFilterConfig;
use crate::net::RawSample;

/// Sliding-window mean over the last `window_size` positions.
///
/// Runs on the producer before packets go out. Spread passes through
/// unwindowed.
#[derive(Debug, Clone)]
pub struct PreFilter {
    positions: VecDeque<Vec3>,
    window_size: usize,
}

impl Default for PreFilter {
    fn default() -> Self {
        Self::new(PreFilterConfig::default())
    }
}

impl PreFilter {
    pub fn new(config: PreFilterConfig) -> Self {
        let window_size = config.window_size.max(1);
        Self {
            positions: VecDeque::with_capacity(window_size + 1),
            window_size,
        }
    }

    pub fn push(&mut self, sample: RawSample) -> RawSample {
        self.positions.push_back(sample.position);
        while self.positions.len() > self.window_size {
            self.positions.pop_front();
        }

        let sum: Vec3 = self.positions.iter().copied().sum();
        RawSample {
            position: sum / self.positions.len() as f32,
            finger_spread: sample.finger_spread,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }
}
