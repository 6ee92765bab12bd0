// End-to-end renders through the public API, against the real H3 index.

use approx::assert_abs_diff_eq;
use h3_heat_map::color_scale::ColorScale;
use h3_heat_map::constants::HEAT_PALETTE;
use h3_heat_map::dataset::Dataset;
use h3_heat_map::layer::ZoomBand;
use h3_heat_map::record::Record;
use h3_heat_map::record_filter::RegionFilter;
use h3_heat_map::view::RenderRequest;
use h3_heat_map::HeatMapPipeline;
use h3o::Resolution;
use more_asserts::{assert_ge, assert_le};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;

fn friesland() -> Dataset {
    let mut records = vec![Record::at(53.2, 5.8, 600_000.0, "Leeuwarden")];
    for i in 0..50 {
        records.push(Record::at(53.0 + i as f64 * 0.002, 5.6, 40_000.0 + i as f64 * 80_000.0, "Sneek"));
        records.push(Record::at(52.9 + i as f64 * 0.002, 5.9, 2_000_000.0, "Heerenveen"));
    }
    Dataset::from_records(records)
}

#[test]
fn test_leeuwarden_record_at_district_zoom() {
    let dataset = friesland();
    let request = RenderRequest::new(9)
        .unwrap()
        .with_regions(["Leeuwarden"])
        .with_extrusion(true);
    let mut rng = StdRng::seed_from_u64(2024);

    let render = HeatMapPipeline::h3().render(&dataset, &request, &mut rng);

    // retained: region match, no sampling in the 8-11 band
    assert_eq!(render.records().len(), 1);
    let record = &render.records()[0];
    assert_eq!(record.color.0, HEAT_PALETTE[4]);
    assert_abs_diff_eq!(record.scaled_elevation, 559.322, epsilon = 1e-3);

    let cell = record.cell.to_h3().expect("H3 cell");
    assert_eq!(cell.resolution(), Resolution::Eight);
    assert_eq!(render.resolution, Resolution::Eight);

    let visible: Vec<&_> = render.layers.iter().filter(|l| l.visible).collect();
    assert_eq!(visible.len(), 1);
    assert_eq!(visible[0].band, ZoomBand::District);
    assert_abs_diff_eq!(visible[0].elevation_scale, 0.08, epsilon = 1e-12);

    // every layer carries the same records
    for layer in &render.layers {
        assert!(Arc::ptr_eq(&layer.data, &render.layers[0].data));
    }
}

#[test]
fn test_overview_zoom_shows_all_regions_sampled() {
    let dataset = friesland();
    let request = RenderRequest::new(2).unwrap().with_regions(["Leeuwarden"]);
    let mut rng = StdRng::seed_from_u64(5);

    let render = HeatMapPipeline::h3().render(&dataset, &request, &mut rng);

    assert_eq!(render.region_filter, RegionFilter::Bypassed);
    assert_eq!(render.stats.region_records, 101);
    // round(0.05 * 101) = 5
    assert_eq!(render.stats.sampled_records, 5);
    assert_eq!(render.resolution, Resolution::Six);
    assert_eq!(render.visible_layer().map(|l| l.band), Some(ZoomBand::Overview));
}

#[test]
fn test_regional_zoom_samples_twenty_percent() {
    let dataset = friesland();
    let request = RenderRequest::new(6).unwrap();

    let render = HeatMapPipeline::h3().render(&dataset, &request, &mut StdRng::seed_from_u64(11));

    assert_eq!(render.stats.sampled_records, 20);
    assert_eq!(render.resolution, Resolution::Eight);
    for record in render.records() {
        assert_eq!(record.color, ColorScale::heat_potential().classify(record.heat_kj_per_m2));
    }
}

#[test]
fn test_cleared_selection_falls_back_to_leeuwarden() {
    let dataset = friesland();
    let request = RenderRequest::new(9).unwrap();

    let render = HeatMapPipeline::h3().render(&dataset, &request, &mut StdRng::seed_from_u64(1));

    assert_eq!(render.warnings.len(), 1);
    assert_eq!(render.region_filter, RegionFilter::FallbackToDefault("Leeuwarden".to_string()));
    assert!(render.records().iter().all(|r| r.place == "Leeuwarden"));
}

#[test]
fn test_street_zoom_uses_fine_cells_and_centres_on_selection() {
    let dataset = friesland();
    let request = RenderRequest::new(14)
        .unwrap()
        .with_regions(["Sneek"])
        .with_extrusion(true);

    let render = HeatMapPipeline::h3().render(&dataset, &request, &mut StdRng::seed_from_u64(1));

    assert_eq!(render.records().len(), 50);
    assert_eq!(render.resolution, Resolution::Twelve);
    assert_abs_diff_eq!(render.view_state.longitude, 5.6, epsilon = 1e-9);
    assert_abs_diff_eq!(render.view_state.latitude, 53.049, epsilon = 1e-9);
    assert_eq!(render.view_state.pitch, 40.5);

    for record in render.records() {
        assert_le!(record.scaled_elevation, 3000.0);
    }
    let lowest = render
        .records()
        .iter()
        .map(|r| r.scaled_elevation)
        .fold(f64::INFINITY, f64::min);
    assert_ge!(0.0, lowest, "values under 50 000 extrude below zero");
}

#[test]
fn test_same_seed_same_render() {
    let dataset = friesland();
    let request = RenderRequest::new(3).unwrap();
    let cells = |seed| {
        let render = HeatMapPipeline::h3().render(&dataset, &request, &mut StdRng::seed_from_u64(seed));
        render.records().iter().map(|r| r.cell).collect::<Vec<_>>()
    };

    assert_eq!(cells(77), cells(77));
}
