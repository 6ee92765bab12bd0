//! Zoom bands and the four parallel hexagon layers built from them.

use crate::constants::{ELEVATION_RANGE, ZOOM_BAND_TABLE};
use crate::record::DerivedRecord;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomBand {
    /// zoom ≤ 3
    Overview,
    /// zoom 4 - 7
    Regional,
    /// zoom 8 - 11
    District,
    /// zoom ≥ 12
    Street,
}

impl ZoomBand {
    pub const ALL: [ZoomBand; 4] = [
        ZoomBand::Overview,
        ZoomBand::Regional,
        ZoomBand::District,
        ZoomBand::Street,
    ];

    fn row(&self) -> (i32, i32, f64, f64) {
        ZOOM_BAND_TABLE[*self as usize]
    }

    pub fn for_zoom(zoom: i32) -> ZoomBand {
        ZoomBand::ALL
            .into_iter()
            .find(|band| band.contains(zoom))
            .unwrap_or(ZoomBand::Street)
    }

    pub fn contains(&self, zoom: i32) -> bool {
        let (low, high, _, _) = self.row();
        (low..=high).contains(&zoom)
    }

    /// Extrusion multiplier applied by the layer for this band.
    pub fn elevation_scale(&self) -> f64 {
        self.row().2
    }

    /// Share of records kept when rendering at this band.
    pub fn sample_fraction(&self) -> f64 {
        self.row().3
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ZoomBand::Overview => "overview",
            ZoomBand::Regional => "regional",
            ZoomBand::District => "district",
            ZoomBand::Street => "street",
        }
    }
}

/// One hexagon layer descriptor as handed to the renderer.
#[derive(Debug, Clone)]
pub struct HexLayer {
    pub id: String,
    pub band: ZoomBand,
    pub visible: bool,
    pub extruded: bool,
    pub elevation_scale: f64,
    pub elevation_range: [f64; 2],
    pub coverage: f64,
    pub pickable: bool,
    pub filled: bool,
    /// Shared by all layers of a render
    pub data: Arc<Vec<DerivedRecord>>,
}

/// Build one layer per zoom band over the same record set.
///
/// Only the layer whose band contains `zoom` is visible. Each layer carries
/// its band's elevation scale times `scale_multiplier`, or 0 when extrusion
/// is off.
pub fn compose_layers(
    data: Arc<Vec<DerivedRecord>>,
    zoom: i32,
    extruded: bool,
    scale_multiplier: f64,
) -> Vec<HexLayer> {
    ZoomBand::ALL
        .into_iter()
        .map(|band| HexLayer {
            id: format!("h3-hexagons-{}", band.as_str()),
            band,
            visible: band.contains(zoom),
            extruded,
            elevation_scale: if extruded {
                band.elevation_scale() * scale_multiplier
            } else {
                0.0
            },
            elevation_range: ELEVATION_RANGE,
            coverage: 1.0,
            pickable: true,
            filled: true,
            data: Arc::clone(&data),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_scale::Rgba;
    use crate::record::Record;
    use crate::spatial_binner::CellId;

    fn sample_data() -> Arc<Vec<DerivedRecord>> {
        let record = Record::at(53.2, 5.8, 600_000.0, "Leeuwarden");
        Arc::new(vec![DerivedRecord::from_record(&record, CellId(1), Rgba([0, 0, 0, 255]), 10.0)])
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(ZoomBand::for_zoom(1), ZoomBand::Overview);
        assert_eq!(ZoomBand::for_zoom(3), ZoomBand::Overview);
        assert_eq!(ZoomBand::for_zoom(4), ZoomBand::Regional);
        assert_eq!(ZoomBand::for_zoom(7), ZoomBand::Regional);
        assert_eq!(ZoomBand::for_zoom(8), ZoomBand::District);
        assert_eq!(ZoomBand::for_zoom(11), ZoomBand::District);
        assert_eq!(ZoomBand::for_zoom(12), ZoomBand::Street);
        assert_eq!(ZoomBand::for_zoom(15), ZoomBand::Street);
        assert_eq!(ZoomBand::for_zoom(-2), ZoomBand::Overview);
    }

    #[test]
    fn test_only_matching_band_is_visible() {
        let layers = compose_layers(sample_data(), 9, true, 1.0);

        assert_eq!(layers.len(), 4);
        let visible: Vec<ZoomBand> = layers.iter().filter(|l| l.visible).map(|l| l.band).collect();
        assert_eq!(visible, vec![ZoomBand::District]);
    }

    #[test]
    fn test_all_layers_share_data() {
        let data = sample_data();
        let layers = compose_layers(Arc::clone(&data), 2, false, 1.0);
        for layer in &layers {
            assert!(Arc::ptr_eq(&layer.data, &data));
        }
    }

    #[test]
    fn test_elevation_scales_per_band() {
        let layers = compose_layers(sample_data(), 13, true, 1.0);
        let scales: Vec<f64> = layers.iter().map(|l| l.elevation_scale).collect();
        assert_eq!(scales, vec![0.01, 0.05, 0.08, 0.10]);
        assert!(layers.iter().all(|l| l.extruded));
    }

    #[test]
    fn test_flat_map_forces_zero_elevation() {
        let layers = compose_layers(sample_data(), 13, false, 4.0);
        assert!(layers.iter().all(|l| l.elevation_scale == 0.0 && !l.extruded));
    }

    #[test]
    fn test_scale_multiplier() {
        let layers = compose_layers(sample_data(), 5, true, 2.0);
        assert_eq!(layers[1].elevation_scale, 0.10);
    }
}
