use std::fmt::Write as _;

use glam::Vec3;
use serde::{Deserialize, Serialize};

pub const MAX_PACKET_SIZE: usize = 1024;
pub const DEFAULT_PORT: u16 = 12347;

const FIELD_SEPARATOR: char = '|';
const AXIS_SEPARATOR: char = ',';
const FRACTION_DIGITS: usize = 5;

/// One measurement per processed camera frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub position: Vec3,
    pub finger_spread: f32,
}

impl RawSample {
    pub fn new(x: f32, y: f32, z: f32, finger_spread: f32) -> Self {
        Self {
            position: Vec3::new(x, y, z),
            finger_spread,
        }
    }

    /// Rejects values the filter and scale mapper must never see.
    pub fn validate(&self) -> Result<(), DecodeError> {
        let fields = [
            ("x", self.position.x),
            ("y", self.position.y),
            ("z", self.position.z),
            ("finger_spread", self.finger_spread),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(DecodeError::NonFinite { field });
            }
        }
        if self.finger_spread < 0.0 {
            return Err(DecodeError::OutOfRange {
                field: "finger_spread",
                value: self.finger_spread,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed packet: {0}")]
    Malformed(String),
    #[error("non-finite value in field {field}")]
    NonFinite { field: &'static str },
    #[error("field {field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f32 },
}

impl DecodeError {
    /// Malformed payloads versus well-formed payloads carrying bad values.
    pub fn is_validation(&self) -> bool {
        !matches!(self, DecodeError::Malformed(_))
    }
}

/// `<x>,<y>,<z>|<finger_spread>` with five fractional digits.
pub fn encode(sample: &RawSample) -> Vec<u8> {
    let mut payload = String::with_capacity(48);
    let p = sample.position;
    let _ = write!(
        payload,
        "{:.prec$}{sep}{:.prec$}{sep}{:.prec$}{bar}{:.prec$}",
        p.x,
        p.y,
        p.z,
        sample.finger_spread,
        prec = FRACTION_DIGITS,
        sep = AXIS_SEPARATOR,
        bar = FIELD_SEPARATOR,
    );
    payload.into_bytes()
}

/// Parses and validates a payload. Digit count is not enforced.
pub fn decode(data: &[u8]) -> Result<RawSample, DecodeError> {
    let text = std::str::from_utf8(data)
        .map_err(|e| DecodeError::Malformed(format!("invalid utf-8: {}", e)))?;

    let (position, spread) = text
        .split_once(FIELD_SEPARATOR)
        .ok_or_else(|| DecodeError::Malformed("missing '|' separator".to_string()))?;

    let axes: Vec<&str> = position.split(AXIS_SEPARATOR).collect();
    if axes.len() != 3 {
        return Err(DecodeError::Malformed(format!(
            "expected 3 position values, found {}",
            axes.len()
        )));
    }

    let x = parse_float(axes[0])?;
    let y = parse_float(axes[1])?;
    let z = parse_float(axes[2])?;
    let finger_spread = parse_float(spread)?;

    let sample = RawSample::new(x, y, z, finger_spread);
    sample.validate()?;
    Ok(sample)
}

fn parse_float(token: &str) -> Result<f32, DecodeError> {
    let token = token.trim();
    token
        .parse::<f32>()
        .map_err(|_| DecodeError::Malformed(format!("invalid number {:?}", token)))
}
