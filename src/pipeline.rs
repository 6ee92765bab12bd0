//! The render trigger: base table plus one [`RenderRequest`] in, layers and
//! camera out. Apart from the random source passed in, a render is a pure
//! function of its inputs and never touches the base table.

use crate::color_scale::ColorScale;
use crate::config::HeatMapConfig;
use crate::constants::DEFAULT_REGION;
use crate::dataset::Dataset;
use crate::deck::Tooltip;
use crate::elevation::ElevationScaler;
use crate::layer::{HexLayer, ZoomBand, compose_layers};
use crate::legend::Legend;
use crate::record::DerivedRecord;
use crate::record_filter::{RegionFilter, filter_by_region, sample_for_zoom};
use crate::resolution::resolution_for_zoom;
use crate::spatial_binner::{CellIndexer, H3Indexer, bin_records};
use crate::view::{RenderRequest, Scenario, ViewState, centroid};
use glam::DVec2;
use h3o::Resolution;
use rand::Rng;
use std::sync::Arc;

/// Record counts at each stage of a render.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub base_records: usize,
    pub region_records: usize,
    pub sampled_records: usize,
    pub dropped_records: usize,
    pub rendered_records: usize,
}

/// Everything the renderer needs for one map.
#[derive(Debug, Clone)]
pub struct MapRender {
    pub layers: Vec<HexLayer>,
    pub view_state: ViewState,
    pub map_style_url: String,
    pub tooltip: Tooltip,
    /// Scale the records were classified with
    pub color_scale: ColorScale,
    pub legend: Legend,
    pub resolution: Resolution,
    pub band: ZoomBand,
    pub scenario: Scenario,
    pub region_filter: RegionFilter,
    /// Messages meant for the user, e.g. the empty-selection fallback
    pub warnings: Vec<String>,
    pub stats: RenderStats,
}

impl MapRender {
    /// The layer shown at the requested zoom.
    pub fn visible_layer(&self) -> Option<&HexLayer> {
        self.layers.iter().find(|layer| layer.visible)
    }

    /// Records shared by every layer.
    pub fn records(&self) -> &[DerivedRecord] {
        self.layers.first().map(|layer| layer.data.as_slice()).unwrap_or(&[])
    }
}

pub struct HeatMapPipeline<I: CellIndexer = H3Indexer> {
    indexer: I,
    color_scale: ColorScale,
    elevation: ElevationScaler,
    default_region: String,
    scenario_scales_elevation: bool,
}

impl HeatMapPipeline<H3Indexer> {
    pub fn h3() -> Self {
        HeatMapPipeline::new(H3Indexer)
    }
}

impl<I: CellIndexer> HeatMapPipeline<I> {
    pub fn new(indexer: I) -> Self {
        HeatMapPipeline {
            indexer,
            color_scale: ColorScale::heat_potential(),
            elevation: ElevationScaler::default(),
            default_region: DEFAULT_REGION.to_string(),
            scenario_scales_elevation: false,
        }
    }

    pub fn from_config(indexer: I, config: &HeatMapConfig) -> Self {
        HeatMapPipeline::new(indexer)
            .with_default_region(&config.default_region)
            .with_scenario_scaling(config.scenario_scales_elevation)
    }

    pub fn with_default_region(mut self, region: &str) -> Self {
        self.default_region = region.to_string();
        self
    }

    pub fn with_scenario_scaling(mut self, enabled: bool) -> Self {
        self.scenario_scales_elevation = enabled;
        self
    }

    pub fn with_color_scale(mut self, color_scale: ColorScale) -> Self {
        self.color_scale = color_scale;
        self
    }

    pub fn with_elevation(mut self, elevation: ElevationScaler) -> Self {
        self.elevation = elevation;
        self
    }

    pub fn color_scale(&self) -> &ColorScale {
        &self.color_scale
    }

    /// Run region filter, sampling, cell lookup, colouring and extrusion
    /// scaling, then compose the four zoom-band layers.
    pub fn render<R>(&self, dataset: &Dataset, request: &RenderRequest, rng: &mut R) -> MapRender
    where
        R: Rng + ?Sized,
    {
        let zoom = request.zoom();
        let band = ZoomBand::for_zoom(zoom);
        let mut warnings = Vec::new();

        let region = filter_by_region(dataset.records(), zoom, &request.regions, &self.default_region);
        warnings.extend(region.warning.clone());
        let region_records = region.records.len();

        let center = centroid(region.records.iter().copied())
            .or_else(|| dataset.centroid())
            .unwrap_or(DVec2::ZERO);

        let sampled = sample_for_zoom(region.records, zoom, rng);
        let sampled_records = sampled.len();

        let resolution = resolution_for_zoom(zoom);
        let binned = bin_records(sampled, &self.indexer, resolution);

        let derived: Vec<DerivedRecord> = binned
            .cells
            .iter()
            .map(|(record, cell)| {
                let value = record.heat_kj_per_m2;
                DerivedRecord::from_record(
                    record,
                    *cell,
                    self.color_scale.classify(value),
                    self.elevation.scale(value),
                )
            })
            .collect();

        let stats = RenderStats {
            base_records: dataset.len(),
            region_records,
            sampled_records,
            dropped_records: binned.dropped,
            rendered_records: derived.len(),
        };

        let scale_multiplier = if self.scenario_scales_elevation {
            f64::from(request.scenario.multiplier())
        } else {
            1.0
        };
        let layers = compose_layers(Arc::new(derived), zoom, request.extruded, scale_multiplier);

        log::info!(
            "rendered {} record(s) at zoom {} ({} band, H3 resolution {})",
            stats.rendered_records,
            zoom,
            band.as_str(),
            u8::from(resolution)
        );

        MapRender {
            layers,
            view_state: ViewState::new(center, zoom),
            map_style_url: request.map_style.url(),
            tooltip: Tooltip::default(),
            color_scale: self.color_scale.clone(),
            legend: Legend::from_scale(&self.color_scale),
            resolution,
            band,
            scenario: request.scenario,
            region_filter: region.applied,
            warnings,
            stats,
        }
    }
}
