//! Target band — the IELTS proficiency scale that parameterizes enhancement.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The supported band scale: 5.0 through 9.0 in half-band steps.
/// Mirrors the picker offered to users.
pub const SUPPORTED_BANDS: [f64; 9] = [5.0, 5.5, 6.0, 6.5, 7.0, 7.5, 8.0, 8.5, 9.0];

/// A validated target band. Construction is the only place band values are
/// checked; every later layer can rely on the value being in the scale.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Band(f64);

#[derive(Debug, Clone, PartialEq, Error)]
#[error("unsupported target band {0}: expected 5.0 to 9.0 in 0.5 steps")]
pub struct InvalidBand(pub f64);

impl Band {
    pub fn new(value: f64) -> Result<Self, InvalidBand> {
        if SUPPORTED_BANDS.contains(&value) {
            Ok(Band(value))
        } else {
            Err(InvalidBand(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Band {
    type Error = InvalidBand;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Band::new(value)
    }
}

impl From<Band> for f64 {
    fn from(band: Band) -> f64 {
        band.0
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.0)
    }
}
