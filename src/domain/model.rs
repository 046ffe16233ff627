use crate::domain::ports::Counted;
use serde::{Deserialize, Serialize};

/// Default buffer distances offered to the user, in meters.
pub const DEFAULT_RADII: [u32; 6] = [2, 3, 5, 10, 15, 20];
pub const MIN_RADIUS: u32 = 1;
pub const MAX_RADIUS: u32 = 200;

/// GDA2020 / MGA zone 56.
pub const DEFAULT_SOURCE_CRS: &str = "EPSG:7856";
pub const WGS84: &str = "EPSG:4326";

pub const LONGITUDE_COLUMN: &str = "X";
pub const LATITUDE_COLUMN: &str = "Y";

pub const DEFAULT_CSV_OUTPUT: &str = "Updated CSV with x/y and radius marked.csv";
pub const DEFAULT_GEOJSON_OUTPUT: &str = "output.geojson";
pub const CSV_MIME: &str = "text/csv";
pub const GEOJSON_MIME: &str = "application/json";

/// Header row plus string cells, in file order. Cells are never reinterpreted
/// so untouched columns round-trip byte for byte.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RecordSet {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(String::as_str).unwrap_or(""))
    }
}

/// A planar point in the source CRS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Radii chosen for one run. Duplicates are dropped, first occurrence wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RadiusSelection(Vec<u32>);

impl RadiusSelection {
    pub fn new(radii: impl IntoIterator<Item = u32>) -> Self {
        let mut unique = Vec::new();
        for r in radii {
            if !unique.contains(&r) {
                unique.push(r);
            }
        }
        Self(unique)
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn column_name(radius: u32) -> String {
        format!("Within_{}m", radius)
    }
}

impl Default for RadiusSelection {
    fn default() -> Self {
        Self::new(DEFAULT_RADII)
    }
}

/// Input rows plus lon/lat and one 0/1 column per radius.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedRecordSet {
    pub records: RecordSet,
    pub easting_column: String,
    pub northing_column: String,
    pub lon: Vec<f64>,
    pub lat: Vec<f64>,
    pub flags: Vec<(u32, Vec<u8>)>,
}

impl AnnotatedRecordSet {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn flags_for(&self, radius: u32) -> Option<&[u8]> {
        self.flags
            .iter()
            .find(|(r, _)| *r == radius)
            .map(|(_, values)| values.as_slice())
    }

    pub fn output_headers(&self) -> Vec<String> {
        let mut headers = self.records.headers.clone();
        push_or_replace(&mut headers, LONGITUDE_COLUMN);
        push_or_replace(&mut headers, LATITUDE_COLUMN);
        for (radius, _) in &self.flags {
            push_or_replace(&mut headers, &RadiusSelection::column_name(*radius));
        }
        headers
    }
}

// 同名欄位會被覆寫而不是重複
fn push_or_replace(headers: &mut Vec<String>, name: &str) {
    if !headers.iter().any(|h| h == name) {
        headers.push(name.to_string());
    }
}

/// Serialized FeatureCollection plus the counts worth logging.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoJsonOutput {
    pub document: String,
    pub feature_count: usize,
    pub source_crs: String,
}

/// An uploaded zipped shapefile, still unopened.
#[derive(Debug, Clone)]
pub struct ShapefileBundle {
    pub name: String,
    pub bytes: Vec<u8>,
    pub entry_count: usize,
}

impl Counted for RecordSet {
    fn record_count(&self) -> usize {
        self.len()
    }
}

impl Counted for AnnotatedRecordSet {
    fn record_count(&self) -> usize {
        self.len()
    }
}

impl Counted for ShapefileBundle {
    fn record_count(&self) -> usize {
        self.entry_count
    }
}

impl Counted for GeoJsonOutput {
    fn record_count(&self) -> usize {
        self.feature_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radius_selection_dedups_in_order() {
        let radii = RadiusSelection::new([10, 5, 10, 2, 5]);
        assert_eq!(radii.as_slice(), &[10, 5, 2]);
    }

    #[test]
    fn test_default_radii() {
        assert_eq!(RadiusSelection::default().as_slice(), &[2, 3, 5, 10, 15, 20]);
        assert_eq!(RadiusSelection::column_name(15), "Within_15m");
    }

    #[test]
    fn test_output_headers_do_not_duplicate_existing_x_y() {
        let annotated = AnnotatedRecordSet {
            records: RecordSet::new(
                vec!["X".to_string(), "Y".to_string(), "id".to_string()],
                vec![],
            ),
            easting_column: "X".to_string(),
            northing_column: "Y".to_string(),
            lon: vec![],
            lat: vec![],
            flags: vec![(5, vec![])],
        };

        assert_eq!(annotated.output_headers(), vec!["X", "Y", "id", "Within_5m"]);
    }
}
