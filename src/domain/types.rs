//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during prediction
//! - exported to JSON/CSV
//! - reloaded later for batch comparisons

use std::path::PathBuf;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Canonical feature names used by the training pipeline.
///
/// These strings must match the column names the models were trained on
/// byte-for-byte; the feature assembler keys records by them.
pub const FEATURE_FLOOR_AREA: &str = "Floor Area (m2)";
pub const FEATURE_BEDROOMS: &str = "Number of Bedrooms";
pub const FEATURE_BATHROOMS: &str = "Number of Bathrooms";
pub const FEATURE_PROPERTY_TYPE: &str = "Property Type";
pub const FEATURE_COUNTY: &str = "County";
pub const FEATURE_BER: &str = "BER Rating";
pub const FEATURE_YEAR: &str = "Date of Construction";
/// Placeholder column carried through training; always 0 at inference time.
pub const FEATURE_PRICE_PER_M2: &str = "Price_per_m2";

/// Form bounds for user-supplied fields.
pub const FLOOR_AREA_MIN: f64 = 20.0;
pub const FLOOR_AREA_MAX: f64 = 500.0;
pub const ROOMS_MIN: u32 = 1;
pub const ROOMS_MAX: u32 = 10;
pub const YEAR_MIN: i32 = 1800;

/// Upper bound for the construction year (no future builds).
pub fn year_max() -> i32 {
    chrono::Local::now().year()
}

/// A raw, human-readable property description.
///
/// Categorical fields are kept as label strings here; the encoder turns them
/// into ordinal codes. Unknown labels are allowed at this level so that batch
/// CSVs with out-of-training categories still flow through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyRecord {
    pub id: String,
    pub floor_area_m2: f64,
    pub bedrooms: u32,
    pub bathrooms: u32,
    pub property_type: String,
    pub county: String,
    pub ber_rating: String,
    pub year_built: i32,
}

impl PropertyRecord {
    /// The form's initial values (mid-sized Dublin semi-detached).
    pub fn default_input() -> Self {
        Self {
            id: "property".to_string(),
            floor_area_m2: 100.0,
            bedrooms: 3,
            bathrooms: 2,
            property_type: "Semi-D".to_string(),
            county: "Dublin".to_string(),
            ber_rating: "C1".to_string(),
            year_built: 2000,
        }
    }

    /// Validate numeric bounds. Categorical labels are deliberately not
    /// checked here; unseen labels encode to the sentinel instead.
    pub fn validate(&self) -> Result<(), AppError> {
        if !self.floor_area_m2.is_finite()
            || self.floor_area_m2 < FLOOR_AREA_MIN
            || self.floor_area_m2 > FLOOR_AREA_MAX
        {
            return Err(AppError::new(
                2,
                format!(
                    "Floor area must be within [{FLOOR_AREA_MIN}, {FLOOR_AREA_MAX}] m2 (got {}).",
                    self.floor_area_m2
                ),
            ));
        }
        if !(ROOMS_MIN..=ROOMS_MAX).contains(&self.bedrooms) {
            return Err(AppError::new(
                2,
                format!(
                    "Bedroom count must be within [{ROOMS_MIN}, {ROOMS_MAX}] (got {}).",
                    self.bedrooms
                ),
            ));
        }
        if !(ROOMS_MIN..=ROOMS_MAX).contains(&self.bathrooms) {
            return Err(AppError::new(
                2,
                format!(
                    "Bathroom count must be within [{ROOMS_MIN}, {ROOMS_MAX}] (got {}).",
                    self.bathrooms
                ),
            ));
        }
        let max = year_max();
        if self.year_built < YEAR_MIN || self.year_built > max {
            return Err(AppError::new(
                2,
                format!(
                    "Construction year must be within [{YEAR_MIN}, {max}] (got {}).",
                    self.year_built
                ),
            ));
        }
        Ok(())
    }
}

/// How a model's target schema was resolved.
///
/// `RecordOrder` is the degraded-confidence path: the artifact did not declare
/// its expected column order, so we trust the encoded record's own key order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaSource {
    Declared,
    RecordOrder,
}

impl SchemaSource {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            SchemaSource::Declared => "declared by model",
            SchemaSource::RecordOrder => "record order (degraded)",
        }
    }
}

/// Where to look for model artifacts.
///
/// Resolution order: explicit paths, then `model_dir` (flag or
/// `HOMECAST_MODEL_DIR`), then the registry (`HOMECAST_MODEL_URL`), then the
/// interactive picker.
#[derive(Debug, Clone, Default)]
pub struct ModelPaths {
    pub classifier: Option<PathBuf>,
    pub regressor: Option<PathBuf>,
    pub model_dir: Option<PathBuf>,
}

/// Configuration for a single one-shot prediction run.
#[derive(Debug, Clone)]
pub struct PredictConfig {
    pub paths: ModelPaths,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export: Option<PathBuf>,
}

/// A per-property scored result (used for batch tables and exports).
#[derive(Debug, Clone)]
pub struct ScoredProperty {
    pub record: PropertyRecord,
    pub class_index: usize,
    pub category: String,
    /// Raw regressor estimate in euro (untruncated).
    pub price_eur: f64,
    /// Encoder warnings for this row (unknown-label sentinels).
    pub warnings: Vec<String>,
}

/// Configuration for a batch scoring run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub paths: ModelPaths,
    /// Property CSV to score. When absent, a synthetic sample is generated.
    pub input: Option<PathBuf>,
    pub sample_count: usize,
    pub sample_seed: u64,
    pub export: Option<PathBuf>,
    /// Rows shown in the terminal table (exports always contain everything).
    pub show_n: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_input_passes_validation() {
        PropertyRecord::default_input().validate().unwrap();
    }

    #[test]
    fn out_of_bounds_fields_are_rejected() {
        let mut r = PropertyRecord::default_input();
        r.floor_area_m2 = 10.0;
        assert_eq!(r.validate().unwrap_err().exit_code(), 2);

        let mut r = PropertyRecord::default_input();
        r.bedrooms = 11;
        assert!(r.validate().is_err());

        let mut r = PropertyRecord::default_input();
        r.year_built = 1700;
        assert!(r.validate().is_err());
    }

    #[test]
    fn unknown_labels_are_not_rejected_by_validate() {
        let mut r = PropertyRecord::default_input();
        r.county = "Atlantis".to_string();
        r.validate().unwrap();
    }
}
