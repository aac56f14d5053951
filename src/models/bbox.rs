use serde::{Deserialize, Serialize};

use crate::error::{ProcessingError, Result};

/// Axis-aligned lat/long rectangle, closed on every edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "[f64; 4]")]
pub struct BoundingBox {
    pub lat_min: f64,
    pub long_min: f64,
    pub lat_max: f64,
    pub long_max: f64,
}

impl BoundingBox {
    pub fn new(lat_min: f64, long_min: f64, lat_max: f64, long_max: f64) -> Result<Self> {
        let corners = [lat_min, long_min, lat_max, long_max];
        if corners.iter().any(|v| !v.is_finite()) {
            return Err(ProcessingError::Config(format!(
                "Bounding box {:?} contains a non-finite value",
                corners
            )));
        }

        if lat_min > lat_max || long_min > long_max {
            return Err(ProcessingError::Config(format!(
                "Bounding box {:?} has a minimum above its maximum",
                corners
            )));
        }

        Ok(Self {
            lat_min,
            long_min,
            lat_max,
            long_max,
        })
    }

    pub fn contains(&self, lat: f64, long: f64) -> bool {
        (self.lat_min..=self.lat_max).contains(&lat)
            && (self.long_min..=self.long_max).contains(&long)
    }
}

impl TryFrom<Vec<f64>> for BoundingBox {
    type Error = ProcessingError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        match values.as_slice() {
            [lat_min, long_min, lat_max, long_max] => {
                Self::new(*lat_min, *long_min, *lat_max, *long_max)
            }
            _ => Err(ProcessingError::Config(format!(
                "Bounding box needs exactly 4 values, got {}",
                values.len()
            ))),
        }
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(bbox: BoundingBox) -> Self {
        [bbox.lat_min, bbox.long_min, bbox.lat_max, bbox.long_max]
    }
}
