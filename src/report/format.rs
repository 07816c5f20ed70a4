//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the encoding/prediction code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

use crate::app::pipeline::PredictionOutput;
use crate::domain::{PropertyRecord, ScoredProperty};
use crate::encode::{CategoryTables, encode_record};
use crate::feature::TargetSchema;
use crate::io::ingest::RowError;
use crate::models::ModelFile;

/// Format a price estimate as a truncated euro amount: `350000.7` -> `€350,000`.
///
/// Truncation (not rounding) matches the training pipeline's display.
pub fn fmt_eur(value: f64) -> String {
    let truncated = value.trunc() as i64;
    let negative = truncated < 0;
    let digits = truncated.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-€{grouped}")
    } else {
        format!("€{grouped}")
    }
}

/// Format the full one-shot prediction summary.
pub fn format_prediction_summary(record: &PropertyRecord, out: &PredictionOutput) -> String {
    let mut s = String::new();

    s.push_str("=== hcast - Ireland House Price Predictor ===\n");
    s.push_str(&format!(
        "Property: {} | {:.0} m2 | {} bed / {} bath | {} | {} | BER {} | built {}\n",
        record.id,
        record.floor_area_m2,
        record.bedrooms,
        record.bathrooms,
        record.property_type,
        record.county,
        record.ber_rating,
        record.year_built,
    ));

    for w in &out.warnings {
        s.push_str(&format!("warning: {w}\n"));
    }

    s.push_str(&format!(
        "Schema: classifier={} | regressor={}\n",
        out.clf_schema.source().display_name(),
        out.reg_schema.source().display_name(),
    ));

    s.push('\n');
    s.push_str(&format!(
        "Predicted category: {} (class {})\n",
        out.category, out.class_index
    ));
    s.push_str(&format!("Estimated price:    {}\n", fmt_eur(out.price_eur)));

    s
}

/// Format the batch scoring table (first `show_n` rows).
pub fn format_batch_table(scored: &[ScoredProperty], show_n: usize) -> String {
    let mut s = String::new();

    s.push_str(&format!(
        "{:<14} {:>8} {:>5} {:>5} {:<14} {:<10} {:>4} {:>6} {:<12} {:>12}\n",
        "id", "area_m2", "beds", "baths", "type", "county", "ber", "year", "category", "price"
    ));
    s.push_str(&format!(
        "{:-<14} {:-<8} {:-<5} {:-<5} {:-<14} {:-<10} {:-<4} {:-<6} {:-<12} {:-<12}\n",
        "", "", "", "", "", "", "", "", "", ""
    ));

    for item in scored.iter().take(show_n) {
        let r = &item.record;
        let flag = if item.warnings.is_empty() { "" } else { " !" };
        s.push_str(&format!(
            "{:<14} {:>8.0} {:>5} {:>5} {:<14} {:<10} {:>4} {:>6} {:<12} {:>12}{flag}\n",
            truncate(&r.id, 14),
            r.floor_area_m2,
            r.bedrooms,
            r.bathrooms,
            truncate(&r.property_type, 14),
            truncate(&r.county, 10),
            r.ber_rating,
            r.year_built,
            item.category,
            fmt_eur(item.price_eur),
        ));
    }

    if scored.len() > show_n {
        s.push_str(&format!("... and {} more row(s)\n", scored.len() - show_n));
    }

    let flagged = scored.iter().filter(|r| !r.warnings.is_empty()).count();
    if flagged > 0 {
        s.push_str(&format!(
            "\n{flagged} row(s) marked '!' contain out-of-training categories (sentinel encoding).\n"
        ));
    }

    s
}

/// Format row-level ingest errors.
pub fn format_row_errors(errors: &[RowError]) -> String {
    let mut s = String::new();
    for e in errors {
        let id = e.id.as_deref().unwrap_or("-");
        s.push_str(&format!("line {:>4} [{}]: {}\n", e.line, id, e.message));
    }
    s
}

/// Format the schema inspection report for both artifacts.
pub fn format_schema_report(
    classifier: &ModelFile,
    regressor: &ModelFile,
    tables: &CategoryTables,
) -> String {
    let mut s = String::new();
    s.push_str("=== hcast - model schemas ===\n\n");
    s.push_str(&format_one_schema("Classifier", classifier, tables));
    s.push('\n');
    s.push_str(&format_one_schema("Regressor", regressor, tables));
    s
}

fn format_one_schema(title: &str, model: &ModelFile, tables: &CategoryTables) -> String {
    let schema = resolve_schema_for(model, tables);

    let mut s = String::new();
    s.push_str(&format!(
        "{title}: tool={} | features={} | schema source: {}\n",
        model.tool,
        model.n_features(),
        schema.source().display_name(),
    ));
    for (i, col) in schema.columns().iter().enumerate() {
        s.push_str(&format!("  {:>2}. {col}\n", i + 1));
    }
    s
}

/// Resolve the schema an artifact would see for a default-form record.
pub fn resolve_schema_for(model: &ModelFile, tables: &CategoryTables) -> TargetSchema {
    let (encoded, _) = encode_record(&PropertyRecord::default_input(), tables);
    TargetSchema::resolve(model.feature_names(), &encoded)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fmt_eur_truncates_and_groups() {
        assert_eq!(fmt_eur(350000.7), "€350,000");
        assert_eq!(fmt_eur(999.99), "€999");
        assert_eq!(fmt_eur(1234567.0), "€1,234,567");
        assert_eq!(fmt_eur(0.4), "€0");
    }

    #[test]
    fn fmt_eur_handles_negative_estimates() {
        // A degraded prediction (sentinel inputs) can go negative; display
        // should not mangle it.
        assert_eq!(fmt_eur(-1200.5), "-€1,200");
    }

    #[test]
    fn batch_table_lists_rows_and_truncates_long_ids() {
        let mut record = crate::domain::PropertyRecord::default_input();
        record.id = "A-very-long-property-identifier".to_string();
        let scored = vec![ScoredProperty {
            record,
            class_index: 0,
            category: "High".to_string(),
            price_eur: 500000.0,
            warnings: vec!["x".to_string()],
        }];

        let table = format_batch_table(&scored, 10);
        assert!(table.contains("A-very-long-p."));
        assert!(table.contains("€500,000"));
        assert!(table.contains("sentinel encoding"));
    }
}
