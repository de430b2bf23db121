use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{TideguardError, TideguardResult};

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Reject non-finite or out-of-range coordinates.
    pub fn validate(&self) -> TideguardResult<()> {
        if !self.lat.is_finite() || !self.lon.is_finite() {
            return Err(TideguardError::validation(format!(
                "position must be finite, got ({}, {})",
                self.lat, self.lon
            )));
        }
        if self.lat.abs() > 90.0 {
            return Err(TideguardError::validation(format!(
                "latitude {} is outside [-90, 90]",
                self.lat
            )));
        }
        if self.lon.abs() > 180.0 {
            return Err(TideguardError::validation(format!(
                "longitude {} is outside [-180, 180]",
                self.lon
            )));
        }
        Ok(())
    }
}

/// A quantized grid cell. Two positions share a cell when both coordinates
/// round to the same value at the configured decimal precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCell {
    pub lat_q: i64,
    pub lon_q: i64,
}

impl GridCell {
    /// Quantize a position at `precision_decimals` decimal places.
    pub fn from_point(point: GeoPoint, precision_decimals: u32) -> Self {
        let scale = 10f64.powi(precision_decimals as i32);
        Self {
            lat_q: (point.lat * scale).round() as i64,
            lon_q: (point.lon * scale).round() as i64,
        }
    }

    /// Center of the cell at the given precision.
    pub fn center(&self, precision_decimals: u32) -> GeoPoint {
        let scale = 10f64.powi(precision_decimals as i32);
        GeoPoint::new(self.lat_q as f64 / scale, self.lon_q as f64 / scale)
    }

    /// Stable string key, as stored in the `cell_key` column.
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.lat_q, self.lon_q)
    }
}

impl FromStr for GridCell {
    type Err = TideguardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(':')
            .ok_or_else(|| TideguardError::validation(format!("malformed cell key: {s}")))?;
        let parse = |part: &str| {
            part.parse::<i64>()
                .map_err(|e| TideguardError::validation(format!("malformed cell key {s}: {e}")))
        };
        Ok(Self {
            lat_q: parse(lat)?,
            lon_q: parse(lon)?,
        })
    }
}
