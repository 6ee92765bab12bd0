use crate::constants::{DEFAULT_DATA_PATH, DEFAULT_REGION, DEFAULT_ZOOM, MAX_ZOOM, MIN_ZOOM};
use crate::error::{HeatMapError, Result};
use crate::view::MapStyle;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings read from an optional JSON file. Every field has a default, so
/// `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeatMapConfig {
    pub data_path: PathBuf,
    /// Field separator of the input table
    pub delimiter: char,
    /// Region shown when the user clears the region selection
    pub default_region: String,
    pub default_zoom: i32,
    pub map_style: MapStyle,
    /// Multiply layer elevation scales by the scenario multiplier
    pub scenario_scales_elevation: bool,
    pub png_width: u32,
    pub png_height: u32,
}

impl Default for HeatMapConfig {
    fn default() -> Self {
        HeatMapConfig {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            delimiter: ',',
            default_region: DEFAULT_REGION.to_string(),
            default_zoom: DEFAULT_ZOOM,
            map_style: MapStyle::default(),
            scenario_scales_elevation: false,
            png_width: 1600,
            png_height: 1200,
        }
    }
}

impl HeatMapConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| HeatMapError::io(path, e))?;
        Self::from_json_str(&json)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: HeatMapConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&self.default_zoom) {
            return Err(HeatMapError::Config(format!(
                "default_zoom {} is outside {}..={}",
                self.default_zoom, MIN_ZOOM, MAX_ZOOM
            )));
        }
        if self.default_region.trim().is_empty() {
            return Err(HeatMapError::Config("default_region must not be empty".to_string()));
        }
        if self.delimiter == '"' || self.delimiter == '\n' {
            return Err(HeatMapError::Config(format!(
                "{:?} cannot be used as a delimiter",
                self.delimiter
            )));
        }
        if self.png_width == 0 || self.png_height == 0 {
            return Err(HeatMapError::Config("png size must be non-zero".to_string()));
        }
        Ok(())
    }
}
