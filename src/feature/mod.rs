//! Feature vector assembly.
//!
//! The trained models are order-sensitive tabular predictors: they interpret
//! inputs purely by column position and will not complain about misaligned
//! columns. This module owns the one guarantee that makes predictions
//! meaningful: an aligned row has exactly the target schema's columns, in
//! schema order, with absent columns defaulted to zero.

use serde::{Deserialize, Serialize};

use crate::domain::SchemaSource;

/// An insertion-ordered mapping from feature name to numeric value.
///
/// Produced by the category encoder: categorical labels have already been
/// replaced with ordinal codes (or the `-1` sentinel). Key order is
/// significant because it doubles as the fallback target schema when a model
/// does not declare one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EncodedRecord {
    fields: Vec<(String, f64)>,
}

impl EncodedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, preserving insertion order.
    pub fn push(&mut self, name: impl Into<String>, value: f64) {
        self.fields.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|&(_, v)| v)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// The ordered column list a model expects, plus how we learned it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSchema {
    columns: Vec<String>,
    source: SchemaSource,
}

impl TargetSchema {
    /// Two-branch schema resolution.
    ///
    /// Prefer the artifact's declared column order; fall back to the encoded
    /// record's own key order when the artifact is silent. The fallback is
    /// the degraded-confidence path and is labeled as such wherever the
    /// schema source is printed.
    pub fn resolve(declared: Option<&[String]>, record: &EncodedRecord) -> Self {
        match declared {
            Some(columns) => Self {
                columns: columns.to_vec(),
                source: SchemaSource::Declared,
            },
            None => Self {
                columns: record.names().map(str::to_string).collect(),
                source: SchemaSource::RecordOrder,
            },
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn source(&self) -> SchemaSource {
        self.source
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// A single-row tabular input aligned to a target schema.
///
/// This is the only artifact handed to the prediction collaborators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlignedRow {
    columns: Vec<String>,
    values: Vec<f64>,
}

impl AlignedRow {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| self.values[i])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Build an aligned row from an encoded record.
///
/// - schema columns present in the record copy their value
/// - schema columns absent from the record default to 0
/// - record keys absent from the schema are silently dropped
///
/// The output always has exactly `schema.len()` values, in schema order. No
/// type-level validation happens here (a sentinel `-1` in a column the model
/// treats as strictly non-negative flows through untouched).
pub fn align(record: &EncodedRecord, schema: &TargetSchema) -> AlignedRow {
    let values = schema
        .columns()
        .iter()
        .map(|col| record.get(col).unwrap_or(0.0))
        .collect();

    AlignedRow {
        columns: schema.columns().to_vec(),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, f64)]) -> EncodedRecord {
        let mut r = EncodedRecord::new();
        for &(n, v) in pairs {
            r.push(n, v);
        }
        r
    }

    fn schema(cols: &[&str]) -> TargetSchema {
        let cols: Vec<String> = cols.iter().map(|s| s.to_string()).collect();
        TargetSchema::resolve(Some(&cols), &EncodedRecord::new())
    }

    #[test]
    fn aligned_row_matches_schema_order_and_length() {
        let r = record(&[("x", 5.0), ("z", 9.0)]);
        let s = schema(&["x", "y", "z"]);
        let row = align(&r, &s);

        assert_eq!(row.len(), 3);
        assert_eq!(row.columns(), s.columns());
        assert_eq!(row.values(), &[5.0, 0.0, 9.0]);
    }

    #[test]
    fn missing_schema_columns_default_to_zero() {
        let r = record(&[("a", 1.0)]);
        let s = schema(&["a", "b"]);
        let row = align(&r, &s);
        assert_eq!(row.get("b"), Some(0.0));
    }

    #[test]
    fn extra_record_keys_are_dropped() {
        let r = record(&[("a", 1.0), ("junk", 42.0)]);
        let s = schema(&["a"]);
        let row = align(&r, &s);
        assert_eq!(row.len(), 1);
        assert_eq!(row.get("junk"), None);
    }

    #[test]
    fn resolve_prefers_declared_columns() {
        let r = record(&[("a", 1.0), ("b", 2.0)]);
        let declared = vec!["b".to_string(), "a".to_string()];
        let s = TargetSchema::resolve(Some(&declared), &r);

        assert_eq!(s.source(), crate::domain::SchemaSource::Declared);
        assert_eq!(s.columns(), &["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn resolve_falls_back_to_record_order() {
        let r = record(&[("a", 1.0), ("b", 2.0)]);
        let s = TargetSchema::resolve(None, &r);

        assert_eq!(s.source(), crate::domain::SchemaSource::RecordOrder);
        assert_eq!(s.columns(), &["a".to_string(), "b".to_string()]);
    }
}
