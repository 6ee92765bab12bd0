// Measurement thresholds (kJ per m²), strictly increasing.
pub const HEAT_BIN_THRESHOLDS: [f64; 6] = [
    50_000.0, 150_000.0, 300_000.0, 500_000.0, 1_000_000.0, 3_000_000.0,
];

// ColorBrewer RdYlGn, red (no potential) to dark green (very high potential)
pub const HEAT_PALETTE: [[u8; 4]; 7] = [
    [215, 48, 39, 255],   // no potential
    [252, 141, 89, 255],  // low
    [254, 224, 129, 255], // moderate
    [255, 255, 191, 255], // fair
    [217, 239, 139, 255], // good
    [145, 207, 96, 255],  // high
    [26, 152, 80, 255],   // very high
];

pub const LEGEND_TITLE: &str = "Warmtepotentieel (kJ/m²)";

// === Elevation ===
pub const MAX_HEIGHT: f64 = 3000.0; // 2500 - 5000 reads best
pub const ELEVATION_REFERENCE_LOW: f64 = 50_000.0;
pub const ELEVATION_REFERENCE_HIGH: f64 = 3_000_000.0;
pub const ELEVATION_RANGE: [f64; 2] = [0.0, 7000.0];

// === Zoom ===
pub const MIN_ZOOM: i32 = 1;
pub const MAX_ZOOM: i32 = 15;
pub const DEFAULT_ZOOM: i32 = 7;

// Region selection only applies above this zoom level
pub const REGION_OVERVIEW_MAX_ZOOM: i32 = 7;

// (highest zoom inclusive, H3 resolution)
pub const RESOLUTION_BREAKPOINTS: &[(i32, u8)] = &[
    (5, 6),  // large hexagons
    (10, 8), // medium hexagons
];
pub const FINEST_RESOLUTION: u8 = 12;

// Zoom bands: (lowest zoom, highest zoom, elevation scale, sample fraction)
pub const ZOOM_BAND_TABLE: &[(i32, i32, f64, f64)] = &[
    (i32::MIN, 3, 0.01, 0.05), // world / country, ~1500 - 5000 km
    (4, 7, 0.05, 0.20),        // cities and regions, ~70 - 700 km
    (8, 11, 0.08, 1.0),        // neighbourhoods, ~4 - 35 km
    (12, i32::MAX, 0.10, 1.0), // street level, ~200 m - 2 km
];

// === View ===
pub const VIEW_PITCH: f64 = 40.5;
pub const VIEW_BEARING: f64 = 0.0;
pub const MAP_STYLE_URL_PREFIX: &str = "mapbox://styles/mapbox/";
pub const MAP_STYLE_URL_SUFFIX: &str = "-v9";

// === Input ===
pub const DEFAULT_DATA_PATH: &str = "data_KJ.csv";
pub const DEFAULT_REGION: &str = "Leeuwarden";

pub const COL_MEASUREMENT: &str = "kJ_per_m2";
pub const COL_AREA: &str = "oppervlakte";
pub const COL_PLACE: &str = "woonplaats";
pub const COL_ENERGY_LABEL: &str = "Energieklasse";
pub const COL_HOUSE_NUMBER: &str = "huisnummer";
pub const COL_HOUSE_LETTER: &str = "huisletter";
pub const COL_POSTCODE: &str = "postcode";
pub const COL_STREET: &str = "openbare_ruimte";
pub const COL_LATITUDE: &str = "latitude";
pub const COL_LONGITUDE: &str = "longitude";

pub const REQUIRED_COLUMNS: [&str; 10] = [
    COL_MEASUREMENT,
    COL_AREA,
    COL_PLACE,
    COL_ENERGY_LABEL,
    COL_HOUSE_NUMBER,
    COL_HOUSE_LETTER,
    COL_POSTCODE,
    COL_STREET,
    COL_LATITUDE,
    COL_LONGITUDE,
];
