//! Thresholded colour classification of heat measurements.

use crate::constants::{HEAT_BIN_THRESHOLDS, HEAT_PALETTE};
use serde::{Deserialize, Serialize};

/// RGBA colour as consumed by the map layers (`[r, g, b, a]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    /// `#rrggbb`, alpha dropped
    pub fn to_hex(&self) -> String {
        let [r, g, b, _] = self.0;
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    pub fn rgb(&self) -> [u8; 3] {
        let [r, g, b, _] = self.0;
        [r, g, b]
    }
}

/// Ordered table of upper-bound thresholds with one colour per bucket.
///
/// A scale with `n` thresholds has `n + 1` colours; the last colour is the
/// open-ended top bucket. Buckets are right-open: a value equal to a
/// threshold belongs to the bucket above it.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorScale {
    thresholds: Vec<f64>,
    palette: Vec<Rgba>,
}

impl ColorScale {
    /// Build a scale, rejecting tables whose thresholds are not strictly
    /// increasing or whose palette is not exactly one entry longer.
    pub fn new(thresholds: Vec<f64>, palette: Vec<Rgba>) -> Option<Self> {
        if palette.len() != thresholds.len() + 1 {
            return None;
        }
        if thresholds.windows(2).any(|pair| !(pair[0] < pair[1])) {
            return None;
        }
        Some(ColorScale { thresholds, palette })
    }

    /// The seven-bucket heat-potential scale.
    pub fn heat_potential() -> Self {
        ColorScale {
            thresholds: HEAT_BIN_THRESHOLDS.to_vec(),
            palette: HEAT_PALETTE.iter().map(|&c| Rgba(c)).collect(),
        }
    }

    /// Index of the first bucket whose bound exceeds `value`, else the top bucket.
    ///
    /// Negative values and NaN land in bucket 0 and the top bucket respectively,
    /// without error.
    pub fn bucket_index(&self, value: f64) -> usize {
        self.thresholds
            .iter()
            .position(|&threshold| value < threshold)
            .unwrap_or(self.thresholds.len())
    }

    pub fn classify(&self, value: f64) -> Rgba {
        self.palette[self.bucket_index(value)]
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    pub fn palette(&self) -> &[Rgba] {
        &self.palette
    }

    pub fn bucket_count(&self) -> usize {
        self.palette.len()
    }

    /// Lower and upper bound of a bucket; `None` marks an open end.
    pub fn bucket_bounds(&self, index: usize) -> (Option<f64>, Option<f64>) {
        let lower = index.checked_sub(1).and_then(|i| self.thresholds.get(i).copied());
        let upper = self.thresholds.get(index).copied();
        (lower, upper)
    }
}

impl Default for ColorScale {
    fn default() -> Self {
        ColorScale::heat_potential()
    }
}
