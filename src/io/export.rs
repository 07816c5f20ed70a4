//! Export scored results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream
//! scripts, so it carries the raw inputs alongside both predictions.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::ScoredProperty;
use crate::error::AppError;

/// Write per-property results to a CSV file.
pub fn write_results_csv(path: &Path, scored: &[ScoredProperty]) -> Result<(), AppError> {
    let mut file = File::create(path).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create export CSV '{}': {e}", path.display()),
        )
    })?;

    writeln!(
        file,
        "id,floor_area_m2,bedrooms,bathrooms,property_type,county,ber_rating,year_built,\
         class_index,category,price_eur,warnings"
    )
    .map_err(|e| AppError::new(2, format!("Failed to write export CSV header: {e}")))?;

    for s in scored {
        let r = &s.record;
        writeln!(
            file,
            "{},{:.2},{},{},{},{},{},{},{},{},{:.2},{}",
            r.id,
            r.floor_area_m2,
            r.bedrooms,
            r.bathrooms,
            r.property_type,
            r.county,
            r.ber_rating,
            r.year_built,
            s.class_index,
            s.category,
            s.price_eur,
            s.warnings.len(),
        )
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PropertyRecord;

    #[test]
    fn export_writes_one_line_per_property_plus_header() {
        let scored = vec![ScoredProperty {
            record: PropertyRecord::default_input(),
            class_index: 2,
            category: "Medium".to_string(),
            price_eur: 350000.7,
            warnings: vec![],
        }];

        let dir = std::env::temp_dir().join("homecast-export-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("results.csv");

        write_results_csv(&path, &scored).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("id,floor_area_m2"));
        assert!(lines[1].contains("Medium"));
        assert!(lines[1].contains("350000.70"));
    }
}
