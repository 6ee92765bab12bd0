//! Everything the user picks for one render, and the camera handed to the
//! renderer.

use crate::constants::{
    MAP_STYLE_URL_PREFIX, MAP_STYLE_URL_SUFFIX, MAX_ZOOM, MIN_ZOOM, VIEW_BEARING, VIEW_PITCH,
};
use crate::error::{HeatMapError, Result};
use crate::record::Record;
use glam::DVec2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MapStyle {
    #[default]
    Light,
    Dark,
    Streets,
    Outdoors,
    Satellite,
    SatelliteStreets,
}

impl MapStyle {
    pub const ALL: [MapStyle; 6] = [
        MapStyle::Light,
        MapStyle::Dark,
        MapStyle::Streets,
        MapStyle::Outdoors,
        MapStyle::Satellite,
        MapStyle::SatelliteStreets,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MapStyle::Light => "light",
            MapStyle::Dark => "dark",
            MapStyle::Streets => "streets",
            MapStyle::Outdoors => "outdoors",
            MapStyle::Satellite => "satellite",
            MapStyle::SatelliteStreets => "satellite-streets",
        }
    }

    /// Display name, e.g. "Satellite-streets"
    pub fn label(&self) -> String {
        let slug = self.as_str();
        let mut chars = slug.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    pub fn url(&self) -> String {
        format!("{}{}{}", MAP_STYLE_URL_PREFIX, self.as_str(), MAP_STYLE_URL_SUFFIX)
    }
}

impl FromStr for MapStyle {
    type Err = HeatMapError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        MapStyle::ALL
            .into_iter()
            .find(|style| style.as_str() == wanted)
            .ok_or_else(|| HeatMapError::UnknownMapStyle(s.to_string()))
    }
}

impl fmt::Display for MapStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named extrusion scenario. Scenario 1 is the plain height; higher
/// scenarios exaggerate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Scenario {
    #[default]
    One,
    Two,
    Three,
    Four,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [Scenario::One, Scenario::Two, Scenario::Three, Scenario::Four];

    pub fn multiplier(&self) -> u8 {
        match self {
            Scenario::One => 1,
            Scenario::Two => 2,
            Scenario::Three => 3,
            Scenario::Four => 4,
        }
    }

    pub fn label(&self) -> String {
        format!("Scenario {}", self.multiplier())
    }
}

impl FromStr for Scenario {
    type Err = HeatMapError;

    /// Accepts "2", "scenario 2" or "Scenario-2".
    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.trim().to_lowercase();
        let digits = lowered
            .strip_prefix("scenario")
            .unwrap_or(lowered.as_str())
            .trim_start_matches([' ', '-', '_']);
        Scenario::ALL
            .into_iter()
            .find(|scenario| digits == scenario.multiplier().to_string())
            .ok_or_else(|| HeatMapError::UnknownScenario(s.to_string()))
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Immutable description of one render trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    zoom: i32,
    pub extruded: bool,
    pub scenario: Scenario,
    pub regions: Vec<String>,
    pub map_style: MapStyle,
}

impl RenderRequest {
    /// Flat, scenario 1, light style, no region selection. Zoom must be 1..=15.
    pub fn new(zoom: i32) -> Result<Self> {
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&zoom) {
            return Err(HeatMapError::InvalidZoom(zoom));
        }
        Ok(RenderRequest {
            zoom,
            extruded: false,
            scenario: Scenario::default(),
            regions: Vec::new(),
            map_style: MapStyle::default(),
        })
    }

    pub fn zoom(&self) -> i32 {
        self.zoom
    }

    pub fn with_extrusion(mut self, extruded: bool) -> Self {
        self.extruded = extruded;
        self
    }

    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.scenario = scenario;
        self
    }

    pub fn with_regions<S: Into<String>>(mut self, regions: impl IntoIterator<Item = S>) -> Self {
        self.regions = regions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_map_style(mut self, map_style: MapStyle) -> Self {
        self.map_style = map_style;
        self
    }
}

/// Initial camera for the map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub longitude: f64,
    pub latitude: f64,
    pub zoom: i32,
    pub min_zoom: i32,
    pub max_zoom: i32,
    pub pitch: f64,
    pub bearing: f64,
}

impl ViewState {
    pub fn new(center: DVec2, zoom: i32) -> Self {
        ViewState {
            longitude: center.x,
            latitude: center.y,
            zoom,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            pitch: VIEW_PITCH,
            bearing: VIEW_BEARING,
        }
    }
}

/// Mean position as (longitude, latitude); `None` for no records.
pub fn centroid<'r>(records: impl IntoIterator<Item = &'r Record>) -> Option<DVec2> {
    let (sum, count) = records
        .into_iter()
        .fold((DVec2::ZERO, 0usize), |(sum, count), record| {
            (sum + DVec2::new(record.longitude, record.latitude), count + 1)
        });
    (count > 0).then(|| sum / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_style_urls_and_labels() {
        assert_eq!(MapStyle::Light.url(), "mapbox://styles/mapbox/light-v9");
        assert_eq!(
            MapStyle::SatelliteStreets.url(),
            "mapbox://styles/mapbox/satellite-streets-v9"
        );
        assert_eq!(MapStyle::SatelliteStreets.label(), "Satellite-streets");
        assert_eq!(MapStyle::Dark.label(), "Dark");
    }

    #[test]
    fn test_style_parsing() {
        assert_eq!("Outdoors".parse::<MapStyle>().unwrap(), MapStyle::Outdoors);
        assert_eq!("satellite-streets".parse::<MapStyle>().unwrap(), MapStyle::SatelliteStreets);
        assert!(matches!("neon".parse::<MapStyle>(), Err(HeatMapError::UnknownMapStyle(_))));
    }

    #[test]
    fn test_scenario_parsing_and_multiplier() {
        assert_eq!("3".parse::<Scenario>().unwrap(), Scenario::Three);
        assert_eq!("Scenario 4".parse::<Scenario>().unwrap(), Scenario::Four);
        assert_eq!("scenario-2".parse::<Scenario>().unwrap(), Scenario::Two);
        assert!("5".parse::<Scenario>().is_err());
        assert_eq!(Scenario::Four.multiplier(), 4);
        assert_eq!(Scenario::One.to_string(), "Scenario 1");
    }

    #[test]
    fn test_request_validates_zoom() {
        assert!(RenderRequest::new(1).is_ok());
        assert!(RenderRequest::new(15).is_ok());
        assert!(matches!(RenderRequest::new(0), Err(HeatMapError::InvalidZoom(0))));
        assert!(RenderRequest::new(16).is_err());
    }

    #[test]
    fn test_request_builders() {
        let request = RenderRequest::new(9)
            .unwrap()
            .with_regions(["Leeuwarden", "Sneek"])
            .with_extrusion(true)
            .with_scenario(Scenario::Two)
            .with_map_style(MapStyle::Dark);

        assert_eq!(request.zoom(), 9);
        assert_eq!(request.regions, vec!["Leeuwarden".to_string(), "Sneek".to_string()]);
        assert!(request.extruded);
        assert_eq!(request.scenario, Scenario::Two);
        assert_eq!(request.map_style, MapStyle::Dark);
    }

    #[test]
    fn test_centroid_and_view_state() {
        let records = vec![
            Record::at(53.0, 5.0, 1.0, "A"),
            Record::at(53.4, 6.0, 1.0, "B"),
        ];
        let center = centroid(&records).unwrap();
        assert_abs_diff_eq!(center.x, 5.5, epsilon = 1e-12);
        assert_abs_diff_eq!(center.y, 53.2, epsilon = 1e-12);
        assert!(centroid(&Vec::<Record>::new()).is_none());

        let view = ViewState::new(center, 9);
        let json = serde_json::to_value(view).unwrap();
        assert_eq!(json["minZoom"], 1);
        assert_eq!(json["maxZoom"], 15);
        assert_eq!(json["pitch"], 40.5);
        assert_eq!(json["bearing"], 0.0);
    }
}
