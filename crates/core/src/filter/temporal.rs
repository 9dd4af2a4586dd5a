use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::FilterConfig;
use crate::net::RawSample;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub last_position: Vec3,
    pub velocity: Vec3,
}

/// One-pole exponential low-pass with a velocity look-ahead.
///
/// Per axis, with `target` the sample mapped into entity space:
///
/// ```text
/// smoothed = last + alpha * (target - last)
/// velocity = smoothed - last
/// output   = smoothed + velocity * smooth_factor
/// last     = smoothed
/// ```
///
/// Only `smoothed` is fed back; the look-ahead never re-enters the state.
#[derive(Debug, Clone)]
pub struct TemporalFilter {
    config: FilterConfig,
    state: FilterState,
}

impl Default for TemporalFilter {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}

impl TemporalFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self {
            config,
            state: FilterState::default(),
        }
    }

    pub fn state(&self) -> FilterState {
        self.state
    }

    pub fn velocity(&self) -> Vec3 {
        self.state.velocity
    }

    pub fn reset(&mut self) {
        self.state = FilterState::default();
    }

    /// Camera-normalized coordinates into entity space.
    pub fn map_target(&self, position: Vec3) -> Vec3 {
        position * self.config.target_scale + self.config.target_offset
    }

    pub fn update(&mut self, sample: &RawSample) -> Vec3 {
        self.update_with(sample, self.config.filter_factor, self.config.smooth_factor)
    }

    pub fn update_with(&mut self, sample: &RawSample, alpha: f32, smooth_factor: f32) -> Vec3 {
        let target = self.map_target(sample.position);
        self.update_target(target, alpha, smooth_factor)
    }

    /// Advances the filter toward a target already in entity space.
    pub fn update_target(&mut self, target: Vec3, alpha: f32, smooth_factor: f32) -> Vec3 {
        let last = self.state.last_position;
        let smoothed = last + (target - last) * alpha;
        let velocity = smoothed - last;

        self.state = FilterState {
            last_position: smoothed,
            velocity,
        };

        smoothed + velocity * smooth_factor
    }
}
