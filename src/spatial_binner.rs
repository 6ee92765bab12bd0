//! Assigns each record to a hexagonal cell at the resolution chosen for
//! the current zoom. The cell lookup itself sits behind [`CellIndexer`] so
//! the pipeline can run against a stub index in tests.

use crate::record::Record;
use h3o::{CellIndex, LatLng, Resolution};
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Cell identifier; displays as the lowercase hex string used by H3 tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellId(pub u64);

impl CellId {
    /// The H3 cell behind this id, if it is one.
    pub fn to_h3(&self) -> Option<CellIndex> {
        CellIndex::try_from(self.0).ok()
    }
}

impl From<CellIndex> for CellId {
    fn from(cell: CellIndex) -> Self {
        CellId(u64::from(cell))
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:x}", self.0)
    }
}

impl Serialize for CellId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BinningError {
    #[error("coordinate ({latitude}, {longitude}) is outside the valid range")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
    #[error("cell lookup failed: {0}")]
    Index(String),
}

/// Maps a coordinate to a cell at a resolution. Must be deterministic.
pub trait CellIndexer {
    fn cell_for(
        &self,
        latitude: f64,
        longitude: f64,
        resolution: Resolution,
    ) -> Result<CellId, BinningError>;
}

impl<F> CellIndexer for F
where
    F: Fn(f64, f64, Resolution) -> Result<CellId, BinningError>,
{
    fn cell_for(
        &self,
        latitude: f64,
        longitude: f64,
        resolution: Resolution,
    ) -> Result<CellId, BinningError> {
        self(latitude, longitude, resolution)
    }
}

/// Cell lookup backed by the h3o hexagonal index.
#[derive(Debug, Clone, Copy, Default)]
pub struct H3Indexer;

impl CellIndexer for H3Indexer {
    fn cell_for(
        &self,
        latitude: f64,
        longitude: f64,
        resolution: Resolution,
    ) -> Result<CellId, BinningError> {
        validate_coordinate(latitude, longitude)?;
        let latlng =
            LatLng::new(latitude, longitude).map_err(|e| BinningError::Index(e.to_string()))?;
        Ok(CellId::from(latlng.to_cell(resolution)))
    }
}

/// Degrees, latitude within -90..=90 and longitude within -180..=180.
pub fn validate_coordinate(latitude: f64, longitude: f64) -> Result<(), BinningError> {
    let valid = latitude.is_finite()
        && longitude.is_finite()
        && (-90.0..=90.0).contains(&latitude)
        && (-180.0..=180.0).contains(&longitude);
    if valid {
        Ok(())
    } else {
        Err(BinningError::InvalidCoordinate {
            latitude,
            longitude,
        })
    }
}

/// Records that received a cell, plus how many were dropped on the way.
#[derive(Debug, Clone)]
pub struct BinnedRecords<'r> {
    pub resolution: Resolution,
    pub cells: Vec<(&'r Record, CellId)>,
    pub dropped: usize,
}

/// Look up a cell for every record. A record whose lookup fails is dropped
/// and counted; it never aborts the batch.
pub fn bin_records<'r, I>(
    records: impl IntoIterator<Item = &'r Record>,
    indexer: &I,
    resolution: Resolution,
) -> BinnedRecords<'r>
where
    I: CellIndexer + ?Sized,
{
    let mut cells = Vec::new();
    let mut dropped = 0;

    for record in records {
        match indexer.cell_for(record.latitude, record.longitude, resolution) {
            Ok(cell) => cells.push((record, cell)),
            Err(e) => {
                log::debug!("dropping record at {} {}: {}", record.postcode, record.street, e);
                dropped += 1;
            }
        }
    }

    if dropped > 0 {
        log::warn!("{} record(s) could not be assigned a cell and were left out", dropped);
    }

    BinnedRecords {
        resolution,
        cells,
        dropped,
    }
}
