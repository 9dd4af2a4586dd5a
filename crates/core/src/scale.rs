use crate::config::ScaleRange;

/// Finger spread to uniform entity scale.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScaleMapper {
    range: ScaleRange,
}

impl ScaleMapper {
    pub fn new(range: ScaleRange) -> Self {
        Self { range }
    }

    /// `clamp(spread * gain, min_scale, max_scale)`.
    ///
    /// Written as max-then-min so a misordered range or stray NaN cannot panic.
    pub fn map(&self, finger_spread: f32) -> f32 {
        (finger_spread * self.range.spread_gain)
            .max(self.range.min_scale)
            .min(self.range.max_scale)
    }
}
