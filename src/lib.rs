pub mod color_scale;
pub mod config;
pub mod constants;
pub mod dataset;
pub mod deck;
pub mod elevation;
pub mod error;
pub mod hex_png;
pub mod layer;
pub mod legend;
pub mod pipeline;
pub mod record;
pub mod record_filter;
pub mod resolution;
pub mod spatial_binner;
pub mod view;

pub use error::{HeatMapError, Result};
pub use pipeline::{HeatMapPipeline, MapRender};
