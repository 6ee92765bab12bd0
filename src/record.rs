use crate::color_scale::Rgba;
use crate::spatial_binner::CellId;
use serde::{Deserialize, Serialize};

/// One building observation from the input table.
///
/// Serde names follow the input column headers so records round-trip
/// through JSON exactly as they appear in the source file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Heat intensity per unit area
    #[serde(rename = "kJ_per_m2")]
    pub heat_kj_per_m2: f64,
    #[serde(rename = "oppervlakte")]
    pub area_m2: Option<f64>,
    #[serde(rename = "woonplaats")]
    pub place: String,
    #[serde(rename = "Energieklasse")]
    pub energy_label: String,
    #[serde(rename = "huisnummer")]
    pub house_number: Option<i64>,
    #[serde(rename = "huisletter")]
    pub house_letter: Option<String>,
    pub postcode: String,
    #[serde(rename = "openbare_ruimte")]
    pub street: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Record {
    /// Minimal record for a coordinate and measurement; descriptive fields are left empty.
    pub fn at(latitude: f64, longitude: f64, heat_kj_per_m2: f64, place: &str) -> Self {
        Record {
            heat_kj_per_m2,
            area_m2: None,
            place: place.to_string(),
            energy_label: String::new(),
            house_number: None,
            house_letter: None,
            postcode: String::new(),
            street: String::new(),
            latitude,
            longitude,
        }
    }
}

/// A record projected to the columns the map layers and tooltip consume,
/// with its colour, hexagon and extrusion height attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DerivedRecord {
    #[serde(rename = "h3_index")]
    pub cell: CellId,
    #[serde(rename = "kJ_per_m2")]
    pub heat_kj_per_m2: f64,
    pub color: Rgba,
    #[serde(rename = "woonplaats")]
    pub place: String,
    #[serde(rename = "huisnummer")]
    pub house_number: Option<i64>,
    pub scaled_elevation: f64,
    #[serde(rename = "oppervlakte")]
    pub area_m2: Option<f64>,
    pub postcode: String,
    #[serde(rename = "Energieklasse")]
    pub energy_label: String,
    #[serde(rename = "openbare_ruimte")]
    pub street: String,
    #[serde(rename = "huisletter")]
    pub house_letter: Option<String>,
}

impl DerivedRecord {
    pub fn from_record(record: &Record, cell: CellId, color: Rgba, scaled_elevation: f64) -> Self {
        DerivedRecord {
            cell,
            heat_kj_per_m2: record.heat_kj_per_m2,
            color,
            place: record.place.clone(),
            house_number: record.house_number,
            scaled_elevation,
            area_m2: record.area_m2,
            postcode: record.postcode.clone(),
            energy_label: record.energy_label.clone(),
            street: record.street.clone(),
            house_letter: record.house_letter.clone(),
        }
    }
}
