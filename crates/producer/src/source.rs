use std::f32::consts::TAU;

use glam::Vec2;
use handlink::{DecodeError, RawSample, finger_spread};

/// Parses one input line into a sample.
///
/// Accepted forms:
/// - wire format `x,y,z|spread`
/// - four whitespace-separated numbers `x y z spread`
/// - thirteen numbers: wrist `x y z` then thumb..pinky tip `x y` pairs
///
/// Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_line(line: &str) -> Result<Option<RawSample>, DecodeError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    if line.contains('|') {
        return handlink::net::decode(line.as_bytes()).map(Some);
    }

    let values = line
        .split_whitespace()
        .map(|token| {
            token
                .parse::<f32>()
                .map_err(|_| DecodeError::Malformed(format!("invalid number {:?}", token)))
        })
        .collect::<Result<Vec<f32>, _>>()?;

    let sample = match values.as_slice() {
        [x, y, z, spread] => RawSample::new(*x, *y, *z, *spread),
        [x, y, z, tips @ ..] if tips.len() == 10 => {
            let tips: [Vec2; 5] =
                std::array::from_fn(|i| Vec2::new(tips[i * 2], tips[i * 2 + 1]));
            RawSample::new(*x, *y, *z, finger_spread(&tips))
        }
        other => {
            return Err(DecodeError::Malformed(format!(
                "expected 4 or 13 values, found {}",
                other.len()
            )));
        }
    };

    sample.validate()?;
    Ok(Some(sample))
}

/// Synthetic hand: slow circle in x/y, periodic push toward the camera,
/// opening and closing fingers.
#[derive(Debug, Clone)]
pub struct DemoMotion {
    fps: f32,
    frame: u64,
}

impl DemoMotion {
    const CIRCLE_PERIOD_SECS: f32 = 4.0;
    const PUSH_PERIOD_SECS: f32 = 2.5;
    const SPREAD_PERIOD_SECS: f32 = 3.0;

    pub fn new(fps: f32) -> Self {
        Self {
            fps: fps.max(1.0),
            frame: 0,
        }
    }

    pub fn next_sample(&mut self) -> RawSample {
        let t = self.frame as f32 / self.fps;
        self.frame += 1;

        let angle = TAU * t / Self::CIRCLE_PERIOD_SECS;
        let x = 0.5 + 0.2 * angle.cos();
        let y = 0.5 + 0.2 * angle.sin();

        // Short push at the start of each period.
        let phase = (t % Self::PUSH_PERIOD_SECS) / Self::PUSH_PERIOD_SECS;
        let z = if phase < 0.1 {
            -0.15 * (phase / 0.1 * std::f32::consts::PI).sin()
        } else {
            0.0
        };

        let spread_phase = TAU * t / Self::SPREAD_PERIOD_SECS;
        let spread = 0.105 + 0.095 * spread_phase.sin();

        RawSample::new(x, y, z, spread)
    }
}
