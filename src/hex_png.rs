/// Hexagon heat map PNG export
///
/// Rasterises the hexagons of a render into a PNG, for use without a
/// browser-side map renderer. Cells are projected equirectangularly with the
/// longitude axis shrunk by cos(latitude) so hexagons keep their shape at
/// Dutch latitudes, and the image is fitted to the data extent.

use crate::color_scale::ColorScale;
use crate::error::Result;
use crate::pipeline::MapRender;
use crate::record::DerivedRecord;
use glam::DVec2;
use h3o::{CellIndex, LatLng};
use image::{ImageBuffer, Rgb, RgbImage};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct HexPngConfig {
    pub width: u32,
    pub height: u32,
    /// Margin around the data extent as a fraction of that extent
    pub padding: f64,
    pub background: Rgb<u8>,
}

impl HexPngConfig {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            padding: 0.05,
            background: Rgb([242, 242, 242]),
        }
    }
}

/// One hexagon ready for drawing
#[derive(Debug, Clone)]
pub struct CellShape {
    pub cell_index: CellIndex,
    /// (longitude, latitude) corners in degrees
    pub corners: Vec<DVec2>,
    pub mean_value: f64,
    pub record_count: usize,
}

impl CellShape {
    fn from_cell_index(cell_index: CellIndex, mean_value: f64, record_count: usize) -> Self {
        let corners = cell_index
            .boundary()
            .iter()
            .map(|latlng: &LatLng| {
                DVec2::new(
                    latlng.lng_radians().to_degrees(),
                    latlng.lat_radians().to_degrees(),
                )
            })
            .collect();

        Self {
            cell_index,
            corners,
            mean_value,
            record_count,
        }
    }
}

/// Group records by cell and average their measurement. Ids that are not
/// H3 cells are skipped.
pub fn aggregate_cells(records: &[DerivedRecord]) -> Vec<CellShape> {
    let mut sums: BTreeMap<u64, (f64, usize)> = BTreeMap::new();
    for record in records {
        let entry = sums.entry(record.cell.0).or_insert((0.0, 0));
        entry.0 += record.heat_kj_per_m2;
        entry.1 += 1;
    }

    sums.into_iter()
        .filter_map(|(id, (sum, count))| {
            let cell_index = CellIndex::try_from(id).ok()?;
            Some(CellShape::from_cell_index(cell_index, sum / count as f64, count))
        })
        .collect()
}

/// Maps degrees to pixels for a fixed extent.
#[derive(Debug, Clone, Copy)]
struct Projection {
    origin: DVec2,
    lon_factor: f64,
    pixels_per_unit: f64,
    offset: DVec2,
    height: u32,
}

impl Projection {
    fn fit(cells: &[CellShape], config: &HexPngConfig) -> Option<Self> {
        let mut min = DVec2::splat(f64::INFINITY);
        let mut max = DVec2::splat(f64::NEG_INFINITY);
        for corner in cells.iter().flat_map(|c| c.corners.iter()) {
            min = min.min(*corner);
            max = max.max(*corner);
        }
        if !min.is_finite() || !max.is_finite() {
            return None;
        }

        let lon_factor = ((min.y + max.y) / 2.0).to_radians().cos().max(1e-6);
        let span = DVec2::new((max.x - min.x) * lon_factor, max.y - min.y).max(DVec2::splat(1e-9));
        let padded = span * (1.0 + 2.0 * config.padding);
        let pixels_per_unit = (config.width as f64 / padded.x).min(config.height as f64 / padded.y);

        // centre the extent in the image
        let used = span * pixels_per_unit;
        let offset = (DVec2::new(config.width as f64, config.height as f64) - used) / 2.0;

        Some(Projection {
            origin: min,
            lon_factor,
            pixels_per_unit,
            offset,
            height: config.height,
        })
    }

    fn to_pixel(&self, lon_lat: DVec2) -> (i32, i32) {
        let local = lon_lat - self.origin;
        let x = self.offset.x + local.x * self.lon_factor * self.pixels_per_unit;
        // flip Y for image coordinates
        let y = self.height as f64 - (self.offset.y + local.y * self.pixels_per_unit);
        (x.round() as i32, y.round() as i32)
    }
}

pub struct HexPngRenderer {
    pub config: HexPngConfig,
}

impl HexPngRenderer {
    pub fn new(config: HexPngConfig) -> Self {
        Self { config }
    }

    /// Draw the aggregated cells, coloured by `color_scale`; an empty set
    /// gives a blank image.
    pub fn rasterize(&self, records: &[DerivedRecord], color_scale: &ColorScale) -> RgbImage {
        let mut image: RgbImage =
            ImageBuffer::from_pixel(self.config.width, self.config.height, self.config.background);

        let cells = aggregate_cells(records);
        let Some(projection) = Projection::fit(&cells, &self.config) else {
            return image;
        };

        for cell in &cells {
            let coords: Vec<(i32, i32)> = cell.corners.iter().map(|c| projection.to_pixel(*c)).collect();
            let color = Rgb(color_scale.classify(cell.mean_value).rgb());
            self.fill_polygon_simple(&mut image, &coords, color);
        }

        log::debug!("rasterised {} cells from {} records", cells.len(), records.len());
        image
    }

    /// Render the visible layer of `render` to a PNG file, in the render's
    /// own colour scale.
    pub fn write_png<P: AsRef<Path>>(&self, render: &MapRender, path: P) -> Result<()> {
        let records = render.visible_layer().map(|layer| layer.data.as_slice()).unwrap_or(&[]);
        let image = self.rasterize(records, &render.color_scale);
        image.save(path.as_ref())?;
        log::info!(
            "wrote {}x{} PNG to {}",
            self.config.width,
            self.config.height,
            path.as_ref().display()
        );
        Ok(())
    }

    /// Scanline fill, even-odd rule
    fn fill_polygon_simple(&self, image: &mut RgbImage, coords: &[(i32, i32)], color: Rgb<u8>) {
        if coords.len() < 3 {
            return;
        }

        let min_y = coords.iter().map(|(_, y)| *y).min().unwrap_or(0).max(0);
        let max_y = coords
            .iter()
            .map(|(_, y)| *y)
            .max()
            .unwrap_or(0)
            .min(self.config.height as i32 - 1);

        for y in min_y..=max_y {
            let mut intersections = Vec::new();

            for i in 0..coords.len() {
                let p1 = coords[i];
                let p2 = coords[(i + 1) % coords.len()];

                if (p1.1 <= y && p2.1 > y) || (p2.1 <= y && p1.1 > y) {
                    let x = p1.0 + ((y - p1.1) * (p2.0 - p1.0)) / (p2.1 - p1.1);
                    intersections.push(x);
                }
            }

            intersections.sort();
            for chunk in intersections.chunks(2) {
                if let [x1, x2] = chunk {
                    let x1 = (*x1).clamp(0, self.config.width as i32 - 1);
                    let x2 = (*x2).clamp(0, self.config.width as i32 - 1);
                    for x in x1..=x2 {
                        image.put_pixel(x as u32, y as u32, color);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_scale::Rgba;
    use crate::constants::HEAT_PALETTE;
    use crate::record::Record;
    use crate::spatial_binner::{CellId, CellIndexer, H3Indexer};
    use h3o::Resolution;

    fn derived_at(lat: f64, lng: f64, value: f64) -> DerivedRecord {
        let cell = H3Indexer.cell_for(lat, lng, Resolution::Eight).unwrap();
        let record = Record::at(lat, lng, value, "Leeuwarden");
        DerivedRecord::from_record(&record, cell, Rgba(HEAT_PALETTE[0]), 0.0)
    }

    #[test]
    fn test_aggregate_averages_per_cell() {
        let records = vec![
            derived_at(53.2, 5.8, 100_000.0),
            derived_at(53.2, 5.8, 300_000.0),
            derived_at(52.37, 4.89, 10.0),
        ];
        let cells = aggregate_cells(&records);

        assert_eq!(cells.len(), 2);
        let leeuwarden = cells.iter().find(|c| c.record_count == 2).unwrap();
        assert_eq!(leeuwarden.mean_value, 200_000.0);
        assert_eq!(leeuwarden.corners.len(), 6);
    }

    #[test]
    fn test_non_h3_ids_are_skipped() {
        let record = Record::at(53.2, 5.8, 1.0, "A");
        let stub = DerivedRecord::from_record(&record, CellId(7), Rgba(HEAT_PALETTE[0]), 0.0);
        assert!(aggregate_cells(&[stub]).is_empty());
    }

    #[test]
    fn test_single_cell_fills_image_centre() {
        let renderer = HexPngRenderer::new(HexPngConfig::new(64, 48));
        let image = renderer.rasterize(&[derived_at(53.2, 5.8, 600_000.0)], &ColorScale::heat_potential());

        assert_eq!(image.dimensions(), (64, 48));
        assert_eq!(*image.get_pixel(32, 24), Rgb([217, 239, 139]));
        assert_eq!(*image.get_pixel(0, 0), Rgb([242, 242, 242]));
    }

    #[test]
    fn test_png_uses_the_render_colour_scale() {
        use crate::dataset::Dataset;
        use crate::pipeline::HeatMapPipeline;
        use crate::view::RenderRequest;
        use rand::SeedableRng;
        use rand::rngs::StdRng;

        let single = ColorScale::new(Vec::new(), vec![Rgba([10, 20, 30, 255])]).unwrap();
        let pipeline = HeatMapPipeline::h3().with_color_scale(single);
        let dataset = Dataset::from_records(vec![Record::at(53.2, 5.8, 600_000.0, "Leeuwarden")]);
        let request = RenderRequest::new(9).unwrap().with_regions(["Leeuwarden"]);
        let render = pipeline.render(&dataset, &request, &mut StdRng::seed_from_u64(1));

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("custom.png");
        HexPngRenderer::new(HexPngConfig::new(64, 48)).write_png(&render, &path).unwrap();

        let image = image::open(&path).unwrap().to_rgb8();
        assert_eq!(render.records()[0].color, Rgba([10, 20, 30, 255]));
        assert_eq!(*image.get_pixel(32, 24), Rgb([10, 20, 30]));
    }

    #[test]
    fn test_empty_records_give_background() {
        let renderer = HexPngRenderer::new(HexPngConfig::new(8, 8));
        let image = renderer.rasterize(&[], &ColorScale::heat_potential());
        assert!(image.pixels().all(|p| *p == Rgb([242, 242, 242])));
    }
}
