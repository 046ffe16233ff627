use crate::domain::model::{
    AnnotatedRecordSet, RadiusSelection, RecordSet, LATITUDE_COLUMN, LONGITUDE_COLUMN,
};
use crate::utils::error::{Result, SpatialError};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Parses comma-delimited text with a mandatory header row.
///
/// Rows shorter than the header are padded with empty cells (read later as
/// NaN); rows longer than the header are rejected.
pub fn read_records(data: &[u8]) -> Result<RecordSet> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(SpatialError::parse("no header row found"));
    }

    let mut rows = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result?;
        if record.len() > headers.len() {
            return Err(SpatialError::parse(format!(
                "row {}: expected {} fields, found {}",
                index + 1,
                headers.len(),
                record.len()
            )));
        }
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }

    Ok(RecordSet::new(headers, rows))
}

/// Reads a numeric column. Blank cells become NaN, anything else that does
/// not parse is an error naming the row.
pub fn numeric_column(records: &RecordSet, index: usize) -> Result<Vec<f64>> {
    let name = records.headers.get(index).cloned().unwrap_or_default();

    records
        .column(index)
        .enumerate()
        .map(|(row, cell)| {
            let cell = cell.trim();
            if cell.is_empty() || cell.eq_ignore_ascii_case("nan") {
                return Ok(f64::NAN);
            }
            cell.parse::<f64>().map_err(|_| {
                SpatialError::parse(format!(
                    "row {}: column '{}' has non-numeric value '{}'",
                    row + 1,
                    name,
                    cell
                ))
            })
        })
        .collect()
}

fn format_coordinate(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

/// Serializes without an index column. X, Y and Within_* replace existing
/// columns of the same name in place, otherwise they are appended.
pub fn write_annotated(annotated: &AnnotatedRecordSet) -> Result<Vec<u8>> {
    let headers = annotated.output_headers();
    let flag_columns: Vec<(String, &[u8])> = annotated
        .flags
        .iter()
        .map(|(r, values)| (RadiusSelection::column_name(*r), values.as_slice()))
        .collect();

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&headers)?;

    for (row_index, row) in annotated.records.rows.iter().enumerate() {
        let cells: Vec<String> = headers
            .iter()
            .enumerate()
            .map(|(col, header)| {
                if header == LONGITUDE_COLUMN {
                    format_coordinate(annotated.lon[row_index])
                } else if header == LATITUDE_COLUMN {
                    format_coordinate(annotated.lat[row_index])
                } else if let Some((_, values)) = flag_columns.iter().find(|(n, _)| n == header) {
                    values[row_index].to_string()
                } else {
                    row.get(col).cloned().unwrap_or_default()
                }
            })
            .collect();
        writer.write_record(&cells)?;
    }

    writer
        .into_inner()
        .map_err(|e| SpatialError::IoError(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_records_keeps_order_and_raw_cells() {
        let csv = "id,Easting,Northing,note\n1,500000,6250000, keep me \n2,500010,6250010,\n";
        let records = read_records(csv.as_bytes()).unwrap();

        assert_eq!(records.headers, vec!["id", "Easting", "Northing", "note"]);
        assert_eq!(records.len(), 2);
        assert_eq!(records.rows[0][3], " keep me ");
        assert_eq!(records.rows[1][0], "2");
    }

    #[test]
    fn test_read_records_strips_bom() {
        let mut data = b"\xEF\xBB\xBFEasting,Northing\n".to_vec();
        data.extend_from_slice(b"1,2\n");
        let records = read_records(&data).unwrap();
        assert_eq!(records.headers[0], "Easting");
    }

    #[test]
    fn test_long_rows_are_parse_errors() {
        let csv = "Easting,Northing\n1,2\n3,4,5\n";
        let err = read_records(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, SpatialError::ParseError { .. }));
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn test_short_rows_are_padded() {
        let records = read_records(b"id,Easting,Northing\na,1,2\nb,3\n").unwrap();

        assert_eq!(records.rows[1], vec!["b", "3", ""]);
        let northings = numeric_column(&records, 2).unwrap();
        assert_eq!(northings[0], 2.0);
        assert!(northings[1].is_nan());
    }

    #[test]
    fn test_empty_input_is_parse_error() {
        assert!(matches!(
            read_records(b"").unwrap_err(),
            SpatialError::ParseError { .. }
        ));
    }

    #[test]
    fn test_numeric_column() {
        let records = read_records(b"E,N\n 1.5 ,2\n,3\nNaN,4\n").unwrap();
        let values = numeric_column(&records, 0).unwrap();
        assert_eq!(values[0], 1.5);
        assert!(values[1].is_nan());
        assert!(values[2].is_nan());

        let bad = read_records(b"E,N\nabc,2\n").unwrap();
        let err = numeric_column(&bad, 0).unwrap_err();
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn test_write_annotated_appends_and_replaces() {
        let records = read_records(b"x,y,Within_5m\n0,0,old\n0,4,old\n").unwrap();
        let annotated = AnnotatedRecordSet {
            records,
            easting_column: "x".to_string(),
            northing_column: "y".to_string(),
            lon: vec![153.0, f64::NAN],
            lat: vec![-33.5, -33.25],
            flags: vec![(5, vec![1, 1]), (2, vec![0, 0])],
        };

        let output = String::from_utf8(write_annotated(&annotated).unwrap()).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(lines[0], "x,y,Within_5m,X,Y,Within_2m");
        assert_eq!(lines[1], "0,0,1,153,-33.5,0");
        assert_eq!(lines[2], "0,4,1,,-33.25,0");
    }
}
