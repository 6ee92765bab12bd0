use crate::constants::{FINEST_RESOLUTION, RESOLUTION_BREAKPOINTS};
use h3o::Resolution;

/// H3 resolution for a map zoom level: coarse hexagons when zoomed out,
/// fine ones at street level. Total over all integers.
pub fn resolution_for_zoom(zoom: i32) -> Resolution {
    let level = RESOLUTION_BREAKPOINTS
        .iter()
        .find(|(max_zoom, _)| zoom <= *max_zoom)
        .map(|(_, level)| *level)
        .unwrap_or(FINEST_RESOLUTION);

    // table entries are all valid H3 resolutions (0..=15)
    Resolution::try_from(level).unwrap_or(Resolution::Twelve)
}
