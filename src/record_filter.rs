//! Region filtering and zoom-dependent density sampling, applied to the
//! base table before any cell lookup happens.

use crate::constants::{MIN_ZOOM, REGION_OVERVIEW_MAX_ZOOM};
use crate::layer::ZoomBand;
use crate::record::Record;
use rand::Rng;

/// How the region stage treated the records.
#[derive(Debug, Clone, PartialEq)]
pub enum RegionFilter {
    /// Overview zoom: every region is shown
    Bypassed,
    Selected(Vec<String>),
    /// Selection was empty; the default region was used instead
    FallbackToDefault(String),
}

#[derive(Debug, Clone)]
pub struct RegionFilterOutcome<'r> {
    pub records: Vec<&'r Record>,
    pub applied: RegionFilter,
    pub warning: Option<String>,
}

/// Region selection only takes effect outside the overview band (zoom 1 - 7).
pub fn region_filter_applies(zoom: i32) -> bool {
    !(MIN_ZOOM..=REGION_OVERVIEW_MAX_ZOOM).contains(&zoom)
}

/// Restrict records to the selected place names.
///
/// At overview zoom the selection is ignored and all records pass. An empty
/// selection falls back to `default_region` and produces a warning for the
/// user; a selection matching nothing yields an empty set.
pub fn filter_by_region<'r>(
    records: &'r [Record],
    zoom: i32,
    selection: &[String],
    default_region: &str,
) -> RegionFilterOutcome<'r> {
    if !region_filter_applies(zoom) {
        return RegionFilterOutcome {
            records: records.iter().collect(),
            applied: RegionFilter::Bypassed,
            warning: None,
        };
    }

    let (regions, applied, warning) = if selection.is_empty() {
        let message = format!("No region selected, showing {} instead.", default_region);
        log::warn!("{}", message);
        (
            vec![default_region.to_string()],
            RegionFilter::FallbackToDefault(default_region.to_string()),
            Some(message),
        )
    } else {
        (selection.to_vec(), RegionFilter::Selected(selection.to_vec()), None)
    };

    let kept: Vec<&Record> = records
        .iter()
        .filter(|record| regions.iter().any(|region| *region == record.place))
        .collect();

    if kept.is_empty() {
        log::info!("no records match regions {:?}", regions);
    }

    RegionFilterOutcome {
        records: kept,
        applied,
        warning,
    }
}

pub fn sample_fraction_for_zoom(zoom: i32) -> f64 {
    ZoomBand::for_zoom(zoom).sample_fraction()
}

/// Uniform random subset of `round(fraction * n)` records (halves round to
/// even), drawn without replacement. The subset keeps input order. A fraction of 1 or more
/// returns every record untouched.
pub fn sample_records<'r, R>(records: Vec<&'r Record>, fraction: f64, rng: &mut R) -> Vec<&'r Record>
where
    R: Rng + ?Sized,
{
    if fraction >= 1.0 {
        return records;
    }
    let total = records.len();
    let amount = ((fraction.max(0.0) * total as f64).round_ties_even() as usize).min(total);

    let mut indices = rand::seq::index::sample(rng, total, amount).into_vec();
    indices.sort_unstable();
    indices.into_iter().map(|i| records[i]).collect()
}

/// Apply the sampling rate of the band containing `zoom`.
pub fn sample_for_zoom<'r, R>(records: Vec<&'r Record>, zoom: i32, rng: &mut R) -> Vec<&'r Record>
where
    R: Rng + ?Sized,
{
    let fraction = sample_fraction_for_zoom(zoom);
    let total = records.len();
    let sampled = sample_records(records, fraction, rng);
    if sampled.len() < total {
        log::info!(
            "zoom {} keeps {:.0}% of records ({} of {})",
            zoom,
            fraction * 100.0,
            sampled.len(),
            total
        );
    }
    sampled
}
