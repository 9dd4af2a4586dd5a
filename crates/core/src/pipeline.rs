use glam::Vec3;

use crate::config::TrackingConfig;
use crate::filter::TemporalFilter;
use crate::gesture::GestureDetector;
use crate::net::{self, DecodeError, RawSample};
use crate::scale::ScaleMapper;
use crate::sink::Transform;

/// Everything the application side needs from one accepted sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUpdate {
    pub transform: Transform,
    pub velocity: Vec3,
    pub gesture: bool,
}

/// Consumer-side conditioning: filter, gesture detection, scale mapping.
///
/// Owns the only [`crate::filter::FilterState`]; callers serialize access by
/// owning the pipeline on a single thread.
#[derive(Debug, Clone)]
pub struct TrackingPipeline {
    filter: TemporalFilter,
    scale: ScaleMapper,
    gesture: GestureDetector,
    processed: u64,
}

impl Default for TrackingPipeline {
    fn default() -> Self {
        Self::new(&TrackingConfig::default())
    }
}

impl TrackingPipeline {
    pub fn new(config: &TrackingConfig) -> Self {
        Self {
            filter: TemporalFilter::new(config.filter),
            scale: ScaleMapper::new(config.scale),
            gesture: GestureDetector::new(config.gesture),
            processed: 0,
        }
    }

    pub fn filter(&self) -> &TemporalFilter {
        &self.filter
    }

    pub fn processed(&self) -> u64 {
        self.processed
    }

    /// Samples must already be validated; decoded packets always are.
    pub fn process(&mut self, sample: &RawSample) -> FrameUpdate {
        let position = self.filter.update(sample);
        let velocity = self.filter.velocity();
        let gesture = self.gesture.detect(velocity);
        let scale = self.scale.map(sample.finger_spread);

        self.processed += 1;

        if gesture {
            log::debug!("z velocity {:.3} over threshold", velocity.z);
        }
        log::trace!(
            "sample {} -> position {:?} scale {:.3}",
            self.processed,
            position,
            scale
        );

        FrameUpdate {
            transform: Transform { position, scale },
            velocity,
            gesture,
        }
    }

    pub fn process_packet(&mut self, data: &[u8]) -> Result<FrameUpdate, DecodeError> {
        let sample = net::decode(data)?;
        Ok(self.process(&sample))
    }
}
