//! Categorical-to-ordinal encoding.
//!
//! The models were trained on ordinal codes: each category list is an ordered
//! sequence of labels where *position* encodes the trained value. The lists
//! below must match the training pipeline's order exactly, or predictions are
//! silently wrong — there is no runtime check that can catch a reordering.

use crate::domain::{
    FEATURE_BATHROOMS, FEATURE_BEDROOMS, FEATURE_BER, FEATURE_COUNTY, FEATURE_FLOOR_AREA,
    FEATURE_PRICE_PER_M2, FEATURE_PROPERTY_TYPE, FEATURE_YEAR, PropertyRecord,
};
use crate::feature::EncodedRecord;

/// Sentinel code for labels outside the training distribution.
///
/// Not an error: it flows through to the model, which may produce a degraded
/// prediction. Callers surface the accompanying warning instead of failing.
pub const UNKNOWN_CODE: i64 = -1;

/// Property type labels, in training order.
pub const PROPERTY_TYPE_ORDER: [&str; 10] = [
    "Detached",
    "Duplex",
    "Townhouse",
    "End Of Terrace",
    "Semi-D",
    "Terrace",
    "Bungalow",
    "House",
    "Apartment",
    "Studio",
];

/// BER energy rating labels, best to worst, in training order.
pub const BER_RATING_ORDER: [&str; 15] = [
    "A1", "A2", "A3", "B1", "B2", "B3", "C1", "C2", "C3", "D1", "D2", "E1", "E2", "F", "G",
];

/// County labels, in training order. `Other` is the catch-all bucket the
/// training data used for the remaining counties.
pub const COUNTY_ORDER: [&str; 10] = [
    "Dublin",
    "Cork",
    "Galway",
    "Limerick",
    "Waterford",
    "Mayo",
    "Meath",
    "Kildare",
    "Wicklow",
    "Other",
];

/// An ordered, immutable category list where position encodes the trained
/// ordinal value.
#[derive(Debug, Clone)]
pub struct OrdinalMap {
    labels: Vec<String>,
}

impl OrdinalMap {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            labels: labels.into_iter().map(Into::into).collect(),
        }
    }

    /// Zero-based position of `label`, or [`UNKNOWN_CODE`] when absent.
    ///
    /// Pure function of `(list, label)`; matching is exact (case-sensitive),
    /// like the training pipeline's.
    pub fn encode(&self, label: &str) -> i64 {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|p| p as i64)
            .unwrap_or(UNKNOWN_CODE)
    }

    /// Reverse lookup: the label at ordinal `code`, if in range.
    pub fn label(&self, code: i64) -> Option<&str> {
        usize::try_from(code)
            .ok()
            .and_then(|i| self.labels.get(i))
            .map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// The three ordinal lists, built once at startup and read-only thereafter.
#[derive(Debug, Clone)]
pub struct CategoryTables {
    pub property_type: OrdinalMap,
    pub county: OrdinalMap,
    pub ber_rating: OrdinalMap,
}

impl CategoryTables {
    /// Construct the tables in training order.
    pub fn training_order() -> Self {
        Self {
            property_type: OrdinalMap::new(PROPERTY_TYPE_ORDER),
            county: OrdinalMap::new(COUNTY_ORDER),
            ber_rating: OrdinalMap::new(BER_RATING_ORDER),
        }
    }
}

/// Encode a raw property record into feature space.
///
/// Numeric fields pass through; categorical labels are replaced with ordinal
/// codes; the `Price_per_m2` placeholder is injected with value 0. Field
/// order matches the training pipeline's record construction and serves as
/// the fallback schema for models that don't declare one.
///
/// Returns one warning per label that fell outside its training list (those
/// fields carry the sentinel code). Front-ends display the warnings; the
/// pipeline never halts on them.
pub fn encode_record(
    record: &PropertyRecord,
    tables: &CategoryTables,
) -> (EncodedRecord, Vec<String>) {
    let mut warnings = Vec::new();
    let mut encode = |map: &OrdinalMap, field: &str, label: &str| -> f64 {
        let code = map.encode(label);
        if code == UNKNOWN_CODE {
            warnings.push(format!(
                "{field} '{label}' is outside the training categories; encoded as {UNKNOWN_CODE}."
            ));
        }
        code as f64
    };

    let property_type = encode(
        &tables.property_type,
        FEATURE_PROPERTY_TYPE,
        &record.property_type,
    );
    let county = encode(&tables.county, FEATURE_COUNTY, &record.county);
    let ber = encode(&tables.ber_rating, FEATURE_BER, &record.ber_rating);

    let mut out = EncodedRecord::new();
    out.push(FEATURE_FLOOR_AREA, record.floor_area_m2);
    out.push(FEATURE_BEDROOMS, f64::from(record.bedrooms));
    out.push(FEATURE_BATHROOMS, f64::from(record.bathrooms));
    out.push(FEATURE_PROPERTY_TYPE, property_type);
    out.push(FEATURE_COUNTY, county);
    out.push(FEATURE_BER, ber);
    out.push(FEATURE_YEAR, f64::from(record.year_built));
    out.push(FEATURE_PRICE_PER_M2, 0.0);

    (out, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_returns_position_for_known_labels() {
        let map = OrdinalMap::new(["A", "B", "C"]);
        assert_eq!(map.encode("B"), 1);
    }

    #[test]
    fn encode_returns_sentinel_for_unknown_labels() {
        let map = OrdinalMap::new(["A", "B", "C"]);
        assert_eq!(map.encode("Z"), UNKNOWN_CODE);
    }

    #[test]
    fn encode_round_trips_through_label() {
        let map = OrdinalMap::new(BER_RATING_ORDER);
        for label in BER_RATING_ORDER {
            let code = map.encode(label);
            assert_eq!(map.label(code), Some(label));
        }
        assert_eq!(map.label(UNKNOWN_CODE), None);
    }

    #[test]
    fn training_tables_match_expected_ordinals() {
        let tables = CategoryTables::training_order();
        // Spot checks pinned to the training data's ordering.
        assert_eq!(tables.property_type.encode("Detached"), 0);
        assert_eq!(tables.property_type.encode("Studio"), 9);
        assert_eq!(tables.county.encode("Dublin"), 0);
        assert_eq!(tables.county.encode("Other"), 9);
        assert_eq!(tables.ber_rating.encode("A1"), 0);
        assert_eq!(tables.ber_rating.encode("G"), 14);
    }

    #[test]
    fn encode_record_keeps_training_field_order() {
        let tables = CategoryTables::training_order();
        let (encoded, warnings) = encode_record(&PropertyRecord::default_input(), &tables);

        let names: Vec<&str> = encoded.names().collect();
        assert_eq!(
            names,
            vec![
                FEATURE_FLOOR_AREA,
                FEATURE_BEDROOMS,
                FEATURE_BATHROOMS,
                FEATURE_PROPERTY_TYPE,
                FEATURE_COUNTY,
                FEATURE_BER,
                FEATURE_YEAR,
                FEATURE_PRICE_PER_M2,
            ]
        );
        assert!(warnings.is_empty());
        assert_eq!(encoded.get(FEATURE_PRICE_PER_M2), Some(0.0));
    }

    #[test]
    fn encode_record_warns_on_unknown_labels() {
        let tables = CategoryTables::training_order();
        let mut record = PropertyRecord::default_input();
        record.county = "Atlantis".to_string();

        let (encoded, warnings) = encode_record(&record, &tables);
        assert_eq!(encoded.get(FEATURE_COUNTY), Some(UNKNOWN_CODE as f64));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Atlantis"));
    }
}
