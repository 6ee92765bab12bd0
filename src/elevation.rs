use crate::constants::{ELEVATION_REFERENCE_HIGH, ELEVATION_REFERENCE_LOW, MAX_HEIGHT};

/// Linear measurement-to-height mapping used for 3D extrusion.
///
/// `reference_low` maps to 0 and `reference_high` to `max_height`. The result
/// is clipped at `max_height` only; values under `reference_low` give
/// negative heights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElevationScaler {
    pub reference_low: f64,
    pub reference_high: f64,
    pub max_height: f64,
}

impl ElevationScaler {
    pub fn scale(&self, value: f64) -> f64 {
        let span = self.reference_high - self.reference_low;
        let scaled = (value - self.reference_low) / span * self.max_height;
        if scaled > self.max_height {
            self.max_height
        } else {
            scaled
        }
    }
}

impl Default for ElevationScaler {
    fn default() -> Self {
        ElevationScaler {
            reference_low: ELEVATION_REFERENCE_LOW,
            reference_high: ELEVATION_REFERENCE_HIGH,
            max_height: MAX_HEIGHT,
        }
    }
}

/// Height for a heat measurement on the default 50 000 .. 3 000 000 kJ/m² scale.
pub fn scaled_elevation(value: f64) -> f64 {
    ElevationScaler::default().scale(value)
}
