use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::net::{DEFAULT_PORT, MAX_PACKET_SIZE};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("filter factor must be in (0, 1], got {0}")]
    FilterFactor(f32),
    #[error("smooth factor must be in [0, 1), got {0}")]
    SmoothFactor(f32),
    #[error("scale range is invalid: min {min} max {max}")]
    ScaleRange { min: f32, max: f32 },
    #[error("spread gain must be finite, got {0}")]
    SpreadGain(f32),
    #[error("gesture threshold must be finite and >= 0, got {0}")]
    GestureThreshold(f32),
    #[error("pre-filter window size must be at least 1")]
    WindowSize,
    #[error("receive buffer must hold at least {min} bytes, got {got}")]
    BufferSize { min: usize, got: usize },
    #[error("entity mapping must be finite")]
    Mapping,
}

/// Temporal filter tunables plus the camera-to-entity mapping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub filter_factor: f32,
    pub smooth_factor: f32,
    /// `target = sample * target_scale + target_offset`, per axis.
    pub target_scale: Vec3,
    pub target_offset: Vec3,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            filter_factor: 0.3,
            smooth_factor: 0.1,
            target_scale: Vec3::splat(10.0),
            target_offset: Vec3::new(-5.0, -5.0, 0.0),
        }
    }
}

impl FilterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.filter_factor > 0.0 && self.filter_factor <= 1.0) {
            return Err(ConfigError::FilterFactor(self.filter_factor));
        }
        if !(self.smooth_factor >= 0.0 && self.smooth_factor < 1.0) {
            return Err(ConfigError::SmoothFactor(self.smooth_factor));
        }
        if !self.target_scale.is_finite() || !self.target_offset.is_finite() {
            return Err(ConfigError::Mapping);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleRange {
    pub min_scale: f32,
    pub max_scale: f32,
    pub spread_gain: f32,
}

impl Default for ScaleRange {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 2.0,
            spread_gain: 10.0,
        }
    }
}

impl ScaleRange {
    pub fn new(min_scale: f32, max_scale: f32) -> Result<Self, ConfigError> {
        let range = Self {
            min_scale,
            max_scale,
            ..Default::default()
        };
        range.validate()?;
        Ok(range)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_scale.is_finite()
            || !self.max_scale.is_finite()
            || self.min_scale > self.max_scale
        {
            return Err(ConfigError::ScaleRange {
                min: self.min_scale,
                max: self.max_scale,
            });
        }
        if !self.spread_gain.is_finite() {
            return Err(ConfigError::SpreadGain(self.spread_gain));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureThreshold {
    pub z_threshold: f32,
}

impl Default for GestureThreshold {
    fn default() -> Self {
        Self { z_threshold: 0.1 }
    }
}

impl GestureThreshold {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.z_threshold.is_finite() && self.z_threshold >= 0.0) {
            return Err(ConfigError::GestureThreshold(self.z_threshold));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreFilterConfig {
    pub window_size: usize,
}

impl Default for PreFilterConfig {
    fn default() -> Self {
        Self { window_size: 3 }
    }
}

impl PreFilterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size == 0 {
            return Err(ConfigError::WindowSize);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Consumer bind address, producer destination.
    pub addr: SocketAddr,
    pub buffer_size: usize,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DEFAULT_PORT),
            buffer_size: MAX_PACKET_SIZE,
        }
    }
}

impl EndpointConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_size < MAX_PACKET_SIZE {
            return Err(ConfigError::BufferSize {
                min: MAX_PACKET_SIZE,
                got: self.buffer_size,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackingConfig {
    pub filter: FilterConfig,
    pub scale: ScaleRange,
    pub gesture: GestureThreshold,
    pub pre_filter: PreFilterConfig,
    pub endpoint: EndpointConfig,
}

impl TrackingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.filter.validate()?;
        self.scale.validate()?;
        self.gesture.validate()?;
        self.pre_filter.validate()?;
        self.endpoint.validate()
    }
}
