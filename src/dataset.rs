//! Loading the building table and keeping one parsed copy per file for the
//! life of the process.

use crate::constants::{
    COL_AREA, COL_ENERGY_LABEL, COL_HOUSE_LETTER, COL_HOUSE_NUMBER, COL_LATITUDE, COL_LONGITUDE,
    COL_MEASUREMENT, COL_PLACE, COL_POSTCODE, COL_STREET, REQUIRED_COLUMNS,
};
use crate::error::{HeatMapError, Result};
use crate::record::Record;
use crate::view::centroid;
use glam::DVec2;
use once_cell::sync::Lazy;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Parsed base tables keyed by path
static DATASET_CACHE: Lazy<Mutex<HashMap<PathBuf, Arc<Dataset>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

/// Row counts from a load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub rows: usize,
    pub loaded: usize,
    /// Rows without a usable latitude/longitude
    pub missing_coordinates: usize,
    /// Rows with unparseable values or the wrong number of fields
    pub malformed: usize,
}

/// The immutable base table.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<Record>,
    summary: LoadSummary,
}

impl Dataset {
    pub fn from_records(records: Vec<Record>) -> Self {
        let count = records.len();
        Dataset {
            records,
            summary: LoadSummary {
                rows: count,
                loaded: count,
                ..LoadSummary::default()
            },
        }
    }

    /// Read and parse a delimited text file.
    pub fn load<P: AsRef<Path>>(path: P, delimiter: char) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| HeatMapError::io(path, e))?;
        let dataset = Self::parse_str(&content, delimiter)?;
        log::info!(
            "loaded {} of {} rows from {} ({} without coordinates, {} malformed)",
            dataset.summary.loaded,
            dataset.summary.rows,
            path.display(),
            dataset.summary.missing_coordinates,
            dataset.summary.malformed
        );
        Ok(dataset)
    }

    /// Like [`Dataset::load`], but each path is parsed at most once per process.
    pub fn load_cached<P: AsRef<Path>>(path: P, delimiter: char) -> Result<Arc<Dataset>> {
        let path_buf = path.as_ref().to_path_buf();

        {
            let cache = DATASET_CACHE.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(dataset) = cache.get(&path_buf) {
                log::debug!("using cached table for {}", path_buf.display());
                return Ok(Arc::clone(dataset));
            }
        }

        let dataset = Arc::new(Self::load(&path_buf, delimiter)?);

        let mut cache = DATASET_CACHE.lock().unwrap_or_else(|e| e.into_inner());
        Ok(Arc::clone(cache.entry(path_buf).or_insert(dataset)))
    }

    /// Parse table content. The first non-empty record is the header and must
    /// name every required column; extra columns are ignored.
    pub fn parse_str(content: &str, delimiter: char) -> Result<Self> {
        let mut rows = split_records(content.trim_start_matches('\u{feff}'), delimiter)
            .into_iter()
            .filter(|row| !is_blank(&row.fields));

        let header = rows.next().ok_or(HeatMapError::EmptyFile)?;
        let columns = ColumnIndex::from_header(&header.fields)?;

        let mut records = Vec::new();
        let mut summary = LoadSummary::default();

        for row in rows {
            summary.rows += 1;
            match columns.parse_row(&row.fields) {
                Ok(Some(record)) => records.push(record),
                Ok(None) => summary.missing_coordinates += 1,
                Err(message) => {
                    log::warn!("skipping line {}: {}", row.line, message);
                    summary.malformed += 1;
                }
            }
        }
        summary.loaded = records.len();

        Ok(Dataset { records, summary })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn summary(&self) -> LoadSummary {
        self.summary
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct non-empty place names, sorted.
    pub fn regions(&self) -> Vec<String> {
        self.records
            .iter()
            .filter(|r| !r.place.is_empty())
            .map(|r| r.place.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Mean (longitude, latitude) of every record.
    pub fn centroid(&self) -> Option<DVec2> {
        centroid(&self.records)
    }
}

/// Drop every cached table.
pub fn clear_cache() {
    let mut cache = DATASET_CACHE.lock().unwrap_or_else(|e| e.into_inner());
    cache.clear();
}

pub fn cache_size() -> usize {
    let cache = DATASET_CACHE.lock().unwrap_or_else(|e| e.into_inner());
    cache.len()
}

/// Position of each required column in a row.
struct ColumnIndex {
    measurement: usize,
    area: usize,
    place: usize,
    energy_label: usize,
    house_number: usize,
    house_letter: usize,
    postcode: usize,
    street: usize,
    latitude: usize,
    longitude: usize,
    width: usize,
}

impl ColumnIndex {
    fn from_header(header: &[String]) -> Result<Self> {
        let position = |name: &str| header.iter().position(|h| h.trim() == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|&&name| position(name).is_none())
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(HeatMapError::MissingColumns(missing));
        }

        let find = |name: &str| position(name).unwrap_or_default();
        let index = ColumnIndex {
            measurement: find(COL_MEASUREMENT),
            area: find(COL_AREA),
            place: find(COL_PLACE),
            energy_label: find(COL_ENERGY_LABEL),
            house_number: find(COL_HOUSE_NUMBER),
            house_letter: find(COL_HOUSE_LETTER),
            postcode: find(COL_POSTCODE),
            street: find(COL_STREET),
            latitude: find(COL_LATITUDE),
            longitude: find(COL_LONGITUDE),
            width: 0,
        };
        let width = [
            index.measurement,
            index.area,
            index.place,
            index.energy_label,
            index.house_number,
            index.house_letter,
            index.postcode,
            index.street,
            index.latitude,
            index.longitude,
        ]
        .into_iter()
        .max()
        .map_or(0, |max| max + 1);

        Ok(ColumnIndex { width, ..index })
    }

    /// `Ok(None)` when the row has no usable coordinates.
    fn parse_row(&self, fields: &[String]) -> std::result::Result<Option<Record>, String> {
        if fields.len() < self.width {
            return Err(format!("expected at least {} fields, got {}", self.width, fields.len()));
        }

        let latitude = parse_optional_f64(&fields[self.latitude], COL_LATITUDE)?;
        let longitude = parse_optional_f64(&fields[self.longitude], COL_LONGITUDE)?;
        let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
            return Ok(None);
        };

        let heat_kj_per_m2 = parse_optional_f64(&fields[self.measurement], COL_MEASUREMENT)?
            .ok_or_else(|| format!("{} is empty", COL_MEASUREMENT))?;

        Ok(Some(Record {
            heat_kj_per_m2,
            area_m2: parse_optional_f64(&fields[self.area], COL_AREA)?,
            place: fields[self.place].trim().to_string(),
            energy_label: fields[self.energy_label].trim().to_string(),
            house_number: parse_optional_i64(&fields[self.house_number], COL_HOUSE_NUMBER)?,
            house_letter: optional_text(&fields[self.house_letter]),
            postcode: fields[self.postcode].trim().to_string(),
            street: fields[self.street].trim().to_string(),
            latitude,
            longitude,
        }))
    }
}

fn is_missing(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case("nan") || value.eq_ignore_ascii_case("null")
}

fn parse_optional_f64(value: &str, column: &str) -> std::result::Result<Option<f64>, String> {
    if is_missing(value) {
        return Ok(None);
    }
    value
        .trim()
        .parse::<f64>()
        .map(Some)
        .map_err(|_| format!("{}: expected number, got '{}'", column, value))
}

/// Integers may have been written as floats ("12.0") by the exporting tool.
fn parse_optional_i64(value: &str, column: &str) -> std::result::Result<Option<i64>, String> {
    if is_missing(value) {
        return Ok(None);
    }
    let trimmed = value.trim();
    if let Ok(number) = trimmed.parse::<i64>() {
        return Ok(Some(number));
    }
    match trimmed.parse::<f64>() {
        Ok(number) if number.fract() == 0.0 && number.is_finite() => Ok(Some(number as i64)),
        _ => Err(format!("{}: expected integer, got '{}'", column, value)),
    }
}

fn optional_text(value: &str) -> Option<String> {
    if is_missing(value) {
        None
    } else {
        Some(value.trim().to_string())
    }
}

/// One record of the table and the line it starts on (1-based).
struct RawRow {
    line: usize,
    fields: Vec<String>,
}

fn is_blank(fields: &[String]) -> bool {
    fields.iter().all(|f| f.trim().is_empty()) && fields.len() <= 1
}

/// Split content into records of `delimiter`-separated fields, honouring
/// double-quoted fields with `""` escapes. A quoted field may contain the
/// delimiter and line breaks.
fn split_records(content: &str, delimiter: char) -> Vec<RawRow> {
    let mut rows = Vec::new();
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut row_start = 1;
    let mut chars = content.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            c if c == delimiter && !in_quotes => fields.push(std::mem::take(&mut current)),
            '\r' if !in_quotes => {}
            '\n' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
                rows.push(RawRow {
                    line: row_start,
                    fields: std::mem::take(&mut fields),
                });
                line += 1;
                row_start = line;
            }
            '\n' => {
                current.push('\n');
                line += 1;
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() || !fields.is_empty() {
        fields.push(current);
        rows.push(RawRow {
            line: row_start,
            fields,
        });
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const HEADER: &str = "kJ_per_m2,oppervlakte,woonplaats,Energieklasse,huisnummer,huisletter,postcode,openbare_ruimte,latitude,longitude";

    #[test]
    fn test_parse_rows() {
        let content = format!(
            "{}\n600000,120.5,Leeuwarden,A,12,b,8911AB,Oosterstraat,53.2,5.8\n45000.5,80,Sneek,C,3.0,,8601AA,\"Kleine Kerkstraat, oost\",53.03,5.66\n",
            HEADER
        );
        let dataset = Dataset::parse_str(&content, ',').unwrap();

        assert_eq!(dataset.len(), 2);
        let first = &dataset.records()[0];
        assert_eq!(first.heat_kj_per_m2, 600_000.0);
        assert_eq!(first.house_letter.as_deref(), Some("b"));
        assert_eq!(first.house_number, Some(12));

        let second = &dataset.records()[1];
        assert_eq!(second.house_number, Some(3));
        assert_eq!(second.house_letter, None);
        assert_eq!(second.street, "Kleine Kerkstraat, oost");
    }

    #[test]
    fn test_column_order_and_extra_columns_do_not_matter() {
        let content = "latitude;longitude;extra;kJ_per_m2;oppervlakte;woonplaats;Energieklasse;huisnummer;huisletter;postcode;openbare_ruimte\n\
                       53.2;5.8;x;200000;90;Leeuwarden;B;1;;8911AB;Nieuwestad\n";
        let dataset = Dataset::parse_str(content, ';').unwrap();

        assert_eq!(dataset.len(), 1);
        assert_abs_diff_eq!(dataset.records()[0].latitude, 53.2, epsilon = 1e-12);
        assert_eq!(dataset.records()[0].place, "Leeuwarden");
    }

    #[test]
    fn test_missing_columns_is_fatal() {
        let content = "kJ_per_m2,woonplaats,latitude\n1,A,53\n";
        match Dataset::parse_str(content, ',') {
            Err(HeatMapError::MissingColumns(missing)) => {
                assert!(missing.contains(&"longitude".to_string()));
                assert!(missing.contains(&"oppervlakte".to_string()));
                assert!(!missing.contains(&"latitude".to_string()));
            }
            other => panic!("expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_content_is_fatal() {
        assert!(matches!(Dataset::parse_str("", ','), Err(HeatMapError::EmptyFile)));
        assert!(matches!(Dataset::parse_str("\n  \n", ','), Err(HeatMapError::EmptyFile)));
    }

    #[test]
    fn test_rows_without_coordinates_are_excluded() {
        let content = format!(
            "{}\n100,1,A,A,1,,p,s,,5.8\n100,1,A,A,1,,p,s,53.2,nan\n100,1,A,A,1,,p,s,53.2,5.8\n",
            HEADER
        );
        let dataset = Dataset::parse_str(&content, ',').unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.summary().missing_coordinates, 2);
        assert_eq!(dataset.summary().rows, 3);
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let content = format!(
            "{}\nlots,1,A,A,1,,p,s,53.2,5.8\n100,1,A\n,1,A,A,1,,p,s,53.2,5.8\n100,1,A,A,1,,p,s,53.2,5.8\n",
            HEADER
        );
        let dataset = Dataset::parse_str(&content, ',').unwrap();

        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.summary().malformed, 3);
    }

    #[test]
    fn test_regions_and_centroid() {
        let dataset = Dataset::from_records(vec![
            Record::at(53.0, 5.0, 1.0, "Sneek"),
            Record::at(53.2, 6.0, 1.0, "Leeuwarden"),
            Record::at(53.4, 7.0, 1.0, "Sneek"),
            Record::at(53.4, 7.0, 1.0, ""),
        ]);

        assert_eq!(dataset.regions(), vec!["Leeuwarden".to_string(), "Sneek".to_string()]);
        let center = dataset.centroid().unwrap();
        assert_abs_diff_eq!(center.x, 6.25, epsilon = 1e-12);
        assert_abs_diff_eq!(center.y, 53.25, epsilon = 1e-12);
    }

    fn fields(content: &str, delimiter: char) -> Vec<Vec<String>> {
        split_records(content, delimiter).into_iter().map(|row| row.fields).collect()
    }

    #[test]
    fn test_split_records_quotes() {
        assert_eq!(fields("a,\"b,c\",d", ','), vec![vec!["a", "b,c", "d"]]);
        assert_eq!(fields("\"say \"\"hi\"\"\",x", ','), vec![vec!["say \"hi\"", "x"]]);
        assert_eq!(fields("a,,", ','), vec![vec!["a", "", ""]]);
        assert_eq!(fields("a;b\r\nc;d\r\n", ';'), vec![vec!["a", "b"], vec!["c", "d"]]);
    }

    #[test]
    fn test_quoted_line_break_stays_in_one_record() {
        let rows = split_records("a,\"x\ny\"\nb,c\n", ',');

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fields, vec!["a", "x\ny"]);
        assert_eq!(rows[1].line, 3);
        assert_eq!(rows[1].fields, vec!["b", "c"]);
    }

    #[test]
    fn test_street_with_line_break_is_loaded() {
        let content = format!(
            "{}\n600000,120,Leeuwarden,A,12,,8911AB,\"Nieuwe\nstad\",53.2,5.8\n100,1,A,A,1,,p,s,53.1,5.7\n",
            HEADER
        );
        let dataset = Dataset::parse_str(&content, ',').unwrap();

        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.summary().rows, 2);
        assert_eq!(dataset.summary().malformed, 0);
        assert_eq!(dataset.records()[0].street, "Nieuwe\nstad");
        assert_eq!(dataset.records()[1].place, "A");
    }
}
