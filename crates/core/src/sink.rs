use glam::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub scale: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: 1.0,
        }
    }
}

/// Receiver of the computed transform, e.g. a scene object.
///
/// Assumed infallible and non-blocking; failures stay inside the sink.
pub trait TransformSink {
    fn set_transform(&mut self, position: Vec3, scale: f32);

    fn apply(&mut self, transform: &Transform) {
        self.set_transform(transform.position, transform.scale);
    }
}

impl<F: FnMut(Vec3, f32)> TransformSink for F {
    fn set_transform(&mut self, position: Vec3, scale: f32) {
        self(position, scale)
    }
}

/// Logs each applied transform at debug level.
#[derive(Debug, Clone, Default)]
pub struct LogSink {
    name: String,
    applied: u64,
}

impl LogSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            applied: 0,
        }
    }

    pub fn applied(&self) -> u64 {
        self.applied
    }
}

impl TransformSink for LogSink {
    fn set_transform(&mut self, position: Vec3, scale: f32) {
        self.applied += 1;
        log::debug!(
            "{}: position ({:.3}, {:.3}, {:.3}) scale {:.3}",
            self.name,
            position.x,
            position.y,
            position.z,
            scale
        );
    }
}
