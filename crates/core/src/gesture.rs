use glam::Vec3;

use crate::config::GestureThreshold;

/// Back-and-forth motion along z, judged from the filter's velocity.
///
/// Level-triggered: reports `true` on every update while the z velocity
/// magnitude exceeds the threshold. Wrap with [`GestureEdge`] for one event
/// per crossing.
#[derive(Debug, Clone, Copy, Default)]
pub struct GestureDetector {
    threshold: GestureThreshold,
}

impl GestureDetector {
    pub fn new(threshold: GestureThreshold) -> Self {
        Self { threshold }
    }

    pub fn detect(&self, velocity: Vec3) -> bool {
        detect(velocity, self.threshold.z_threshold)
    }
}

pub fn detect(velocity: Vec3, threshold: f32) -> bool {
    velocity.z.abs() > threshold
}

/// Rising-edge tracker over a level signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct GestureEdge {
    previous: bool,
}

impl GestureEdge {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` only when the level goes from low to high.
    pub fn update(&mut self, level: bool) -> bool {
        let rising = level && !self.previous;
        self.previous = level;
        rising
    }

    pub fn is_active(&self) -> bool {
        self.previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::TemporalFilter;
    use crate::net::RawSample;

    #[test]
    fn test_threshold_is_strict() {
        let detector = GestureDetector::default();
        assert!(!detector.detect(Vec3::new(0.0, 0.0, 0.1)));
        assert!(detector.detect(Vec3::new(0.0, 0.0, 0.11)));
        assert!(detector.detect(Vec3::new(0.0, 0.0, -0.5)));
        assert!(!detector.detect(Vec3::new(5.0, -5.0, 0.0)));
    }

    #[test]
    fn test_push_then_hold_fires_then_settles() {
        let mut filter = TemporalFilter::default();
        let detector = GestureDetector::default();

        filter.update(&RawSample::new(0.5, 0.5, 0.0, 0.1));
        assert!(!detector.detect(filter.velocity()));

        // z jumps from 0 to 0.1 -> target 1.0, velocity 0.3
        filter.update(&RawSample::new(0.5, 0.5, 0.1, 0.1));
        assert!(detector.detect(filter.velocity()));

        let mut settled = false;
        for _ in 0..20 {
            filter.update(&RawSample::new(0.5, 0.5, 0.1, 0.1));
            if !detector.detect(filter.velocity()) {
                settled = true;
                break;
            }
        }
        assert!(settled);
    }

    #[test]
    fn test_level_repeats_while_edge_fires_once() {
        let detector = GestureDetector::new(GestureThreshold { z_threshold: 0.1 });
        let mut edge = GestureEdge::new();
        let velocities = [0.0, 0.3, 0.25, 0.2, 0.05, 0.4];

        let levels: Vec<bool> = velocities
            .iter()
            .map(|&z| detector.detect(Vec3::new(0.0, 0.0, z)))
            .collect();
        assert_eq!(levels, [false, true, true, true, false, true]);

        let edges: Vec<bool> = levels.iter().map(|&level| edge.update(level)).collect();
        assert_eq!(edges, [false, true, false, false, false, true]);
        assert!(edge.is_active());
    }
}
