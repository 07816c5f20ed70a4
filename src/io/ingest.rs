//! Property CSV ingest and normalization.
//!
//! This module turns a property-list CSV into clean `PropertyRecord`s that
//! are safe to score.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Row-level validation** (skip bad rows, but report what happened)
//! - **Deterministic behavior** (no hidden randomness)
//! - **Separation of concerns**: no encoding or prediction logic here

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::PropertyRecord;
use crate::error::AppError;

/// Required CSV columns, matched case-insensitively against the header row.
pub const REQUIRED_COLUMNS: [&str; 8] = [
    "id",
    "floor_area_m2",
    "bedrooms",
    "bathrooms",
    "property_type",
    "county",
    "ber_rating",
    "year_built",
];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone)]
pub struct RowError {
    pub line: usize,
    pub id: Option<String>,
    pub message: String,
}

/// Ingest output: validated records + row errors + counts.
#[derive(Debug, Clone)]
pub struct IngestedBatch {
    pub records: Vec<PropertyRecord>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

/// Load and validate a property CSV.
///
/// Rows with invalid numeric fields are skipped and reported; unknown
/// categorical labels are *not* an ingest error (they encode to the sentinel
/// downstream, with a warning).
pub fn load_property_csv(path: &Path) -> Result<IngestedBatch, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?
        .clone();

    let header_map = build_header_map(&headers);
    ensure_required_columns_exist(&header_map)?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (i, row) in reader.records().enumerate() {
        // Line 1 is the header; data starts at line 2.
        let line = i + 2;
        rows_read += 1;

        let row = match row {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    id: None,
                    message: format!("Unreadable CSV row: {e}"),
                });
                continue;
            }
        };

        match parse_row(&row, &header_map) {
            Ok(record) => match record.validate() {
                Ok(()) => records.push(record),
                Err(e) => row_errors.push(RowError {
                    line,
                    id: Some(record.id.clone()),
                    message: e.to_string(),
                }),
            },
            Err(message) => {
                let id = get_field(&row, &header_map, "id").map(str::to_string);
                row_errors.push(RowError { line, id, message });
            }
        }
    }

    if records.is_empty() {
        return Err(AppError::new(
            2,
            format!(
                "No usable rows in '{}' ({} read, {} rejected).",
                path.display(),
                rows_read,
                row_errors.len()
            ),
        ));
    }

    let rows_used = records.len();
    Ok(IngestedBatch {
        records,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| (h.trim().to_ascii_lowercase(), i))
        .collect()
}

fn ensure_required_columns_exist(header_map: &HashMap<String, usize>) -> Result<(), AppError> {
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !header_map.contains_key(*c))
        .collect();
    if !missing.is_empty() {
        return Err(AppError::new(
            2,
            format!(
                "CSV is missing required column(s): {}. Expected: {}.",
                missing.join(", "),
                REQUIRED_COLUMNS.join(", ")
            ),
        ));
    }
    Ok(())
}

fn get_field<'a>(
    row: &'a StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Option<&'a str> {
    header_map
        .get(name)
        .and_then(|&i| row.get(i))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn parse_row(
    row: &StringRecord,
    header_map: &HashMap<String, usize>,
) -> Result<PropertyRecord, String> {
    let text = |name: &str| -> Result<String, String> {
        get_field(row, header_map, name)
            .map(str::to_string)
            .ok_or_else(|| format!("Missing value for '{name}'."))
    };

    let floor_area_m2 = parse_num::<f64>(row, header_map, "floor_area_m2")?;
    let bedrooms = parse_num::<u32>(row, header_map, "bedrooms")?;
    let bathrooms = parse_num::<u32>(row, header_map, "bathrooms")?;
    let year_built = parse_num::<i32>(row, header_map, "year_built")?;

    Ok(PropertyRecord {
        id: text("id")?,
        floor_area_m2,
        bedrooms,
        bathrooms,
        property_type: text("property_type")?,
        county: text("county")?,
        ber_rating: text("ber_rating")?,
        year_built,
    })
}

fn parse_num<T: std::str::FromStr>(
    row: &StringRecord,
    header_map: &HashMap<String, usize>,
    name: &str,
) -> Result<T, String> {
    let raw = get_field(row, header_map, name).ok_or_else(|| format!("Missing value for '{name}'."))?;
    raw.parse::<T>()
        .map_err(|_| format!("Invalid value for '{name}': '{raw}'."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(name: &str, content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join("homecast-ingest-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_valid_rows_and_reports_bad_ones() {
        let path = write_csv(
            "mixed.csv",
            "id,floor_area_m2,bedrooms,bathrooms,property_type,county,ber_rating,year_built\n\
             P1,120,3,2,Detached,Dublin,B2,1995\n\
             P2,abc,3,2,Detached,Cork,C1,2001\n\
             P3,90,2,1,Apartment,Galway,A3,2015\n",
        );

        let batch = load_property_csv(&path).unwrap();
        assert_eq!(batch.rows_read, 3);
        assert_eq!(batch.rows_used, 2);
        assert_eq!(batch.row_errors.len(), 1);
        assert_eq!(batch.row_errors[0].line, 3);
        assert_eq!(batch.row_errors[0].id.as_deref(), Some("P2"));
    }

    #[test]
    fn out_of_bounds_rows_are_rejected_per_row() {
        let path = write_csv(
            "bounds.csv",
            "id,floor_area_m2,bedrooms,bathrooms,property_type,county,ber_rating,year_built\n\
             P1,5,3,2,Detached,Dublin,B2,1995\n\
             P2,90,2,1,Apartment,Galway,A3,2015\n",
        );

        let batch = load_property_csv(&path).unwrap();
        assert_eq!(batch.rows_used, 1);
        assert!(batch.row_errors[0].message.contains("Floor area"));
    }

    #[test]
    fn missing_columns_fail_with_usage_error() {
        let path = write_csv("missing.csv", "id,floor_area_m2\nP1,120\n");
        let err = load_property_csv(&path).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("county"));
    }

    #[test]
    fn unknown_labels_survive_ingest() {
        let path = write_csv(
            "labels.csv",
            "id,floor_area_m2,bedrooms,bathrooms,property_type,county,ber_rating,year_built\n\
             P1,120,3,2,Castle,Atlantis,Z9,1995\n",
        );

        let batch = load_property_csv(&path).unwrap();
        assert_eq!(batch.rows_used, 1);
        assert_eq!(batch.records[0].county, "Atlantis");
    }
}
