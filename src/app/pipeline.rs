//! Shared prediction pipeline used by the CLI, batch, and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! raw record -> ordinal encoding -> schema resolution -> row alignment ->
//! classifier + regressor -> labeled outputs
//!
//! The front-ends can then focus on presentation (printing vs widgets).

use std::path::Path;

use rayon::prelude::*;

use crate::data::registry::RegistryClient;
use crate::domain::{
    FLOOR_AREA_MAX, FLOOR_AREA_MIN, ModelPaths, PropertyRecord, ScoredProperty,
};
use crate::encode::{CategoryTables, encode_record};
use crate::error::AppError;
use crate::feature::{AlignedRow, EncodedRecord, TargetSchema, align};
use crate::io::artifact::{dir_artifact_path, read_model_json};
use crate::models::{ModelFile, ModelTask};
use crate::report::category_label;

const ENV_MODEL_DIR: &str = "HOMECAST_MODEL_DIR";

/// Process-wide prediction context.
///
/// Constructed once at startup and read-only thereafter: the two loaded
/// collaborators plus the ordinal tables. Nothing mutates it after load, so
/// it can be shared by reference across threads (batch scoring relies on
/// this).
pub struct PredictContext {
    pub classifier: ModelFile,
    pub regressor: ModelFile,
    pub tables: CategoryTables,
}

impl PredictContext {
    /// Load both artifacts and build the ordinal tables.
    ///
    /// Resolution order per artifact: explicit path, then the model directory
    /// (flag or `HOMECAST_MODEL_DIR`), then the registry
    /// (`HOMECAST_MODEL_URL`), then the interactive picker.
    pub fn load(paths: &ModelPaths) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let registry = RegistryClient::from_env();

        let classifier = resolve_artifact(
            ModelTask::Classifier,
            paths.classifier.as_deref(),
            paths.model_dir.as_deref(),
            registry.as_ref(),
        )?;
        let regressor = resolve_artifact(
            ModelTask::Regressor,
            paths.regressor.as_deref(),
            paths.model_dir.as_deref(),
            registry.as_ref(),
        )?;

        Ok(Self {
            classifier,
            regressor,
            tables: CategoryTables::training_order(),
        })
    }
}

fn resolve_artifact(
    task: ModelTask,
    explicit: Option<&Path>,
    model_dir: Option<&Path>,
    registry: Option<&RegistryClient>,
) -> Result<ModelFile, AppError> {
    if let Some(path) = explicit {
        return read_model_json(path, task);
    }

    let dir = model_dir
        .map(Path::to_path_buf)
        .or_else(|| std::env::var(ENV_MODEL_DIR).ok().map(Into::into));
    if let Some(dir) = dir {
        let path = dir_artifact_path(&dir, task);
        if path.exists() {
            return read_model_json(&path, task);
        }
        return Err(AppError::new(
            3,
            format!(
                "Model directory '{}' has no {} artifact ({}).",
                dir.display(),
                task.display_name(),
                path.display()
            ),
        ));
    }

    if let Some(registry) = registry {
        return registry.fetch_model(task);
    }

    let path = crate::cli::picker::prompt_for_model_path(task)?;
    read_model_json(&path, task)
}

/// All computed outputs of a single prediction.
#[derive(Debug, Clone)]
pub struct PredictionOutput {
    pub encoded: EncodedRecord,
    pub clf_schema: TargetSchema,
    pub reg_schema: TargetSchema,
    pub clf_row: AlignedRow,
    pub reg_row: AlignedRow,
    pub class_index: usize,
    pub category: String,
    pub price_eur: f64,
    /// Encoder warnings (unknown-label sentinels), surfaced by front-ends.
    pub warnings: Vec<String>,
}

/// Execute the full prediction pipeline for one property.
///
/// Each artifact resolves its own schema and gets its own aligned row; the
/// two models may legitimately declare different column orders.
pub fn run_predict(
    ctx: &PredictContext,
    record: &PropertyRecord,
) -> Result<PredictionOutput, AppError> {
    record.validate()?;

    let (encoded, warnings) = encode_record(record, &ctx.tables);

    let clf_schema = TargetSchema::resolve(ctx.classifier.feature_names(), &encoded);
    let reg_schema = TargetSchema::resolve(ctx.regressor.feature_names(), &encoded);
    let clf_row = align(&encoded, &clf_schema);
    let reg_row = align(&encoded, &reg_schema);

    let class_index = ctx.classifier.predict_class(&clf_row)?;
    let price_eur = ctx.regressor.predict_value(&reg_row)?;

    Ok(PredictionOutput {
        encoded,
        clf_schema,
        reg_schema,
        clf_row,
        reg_row,
        class_index,
        category: category_label(class_index).to_string(),
        price_eur,
        warnings,
    })
}

/// Score many records in parallel.
///
/// The context is shared read-only across workers; the first hard failure
/// (artifact mismatch, non-finite prediction) aborts the batch.
pub fn run_batch(
    ctx: &PredictContext,
    records: &[PropertyRecord],
) -> Result<Vec<ScoredProperty>, AppError> {
    records
        .par_iter()
        .map(|record| {
            let out = run_predict(ctx, record)?;
            Ok(ScoredProperty {
                record: record.clone(),
                class_index: out.class_index,
                category: out.category,
                price_eur: out.price_eur,
                warnings: out.warnings,
            })
        })
        .collect()
}

/// Price sensitivity curve: regressor estimate as floor area sweeps the form
/// bounds, with every other field held at the given record's values.
///
/// Used by the TUI chart, the ASCII plot, and the debug bundle.
pub fn price_curve(
    ctx: &PredictContext,
    base: &PropertyRecord,
    n: usize,
) -> Result<Vec<(f64, f64)>, AppError> {
    let n = n.max(2);
    let mut curve = Vec::with_capacity(n);
    let mut probe = base.clone();

    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let area = FLOOR_AREA_MIN + u * (FLOOR_AREA_MAX - FLOOR_AREA_MIN);
        probe.floor_area_m2 = area;

        let (encoded, _) = encode_record(&probe, &ctx.tables);
        let schema = TargetSchema::resolve(ctx.regressor.feature_names(), &encoded);
        let row = align(&encoded, &schema);
        curve.push((area, ctx.regressor.predict_value(&row)?));
    }

    Ok(curve)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        FEATURE_BATHROOMS, FEATURE_BEDROOMS, FEATURE_BER, FEATURE_COUNTY, FEATURE_FLOOR_AREA,
        FEATURE_PRICE_PER_M2, FEATURE_PROPERTY_TYPE, FEATURE_YEAR, SchemaSource,
    };
    use crate::models::ModelParams;

    fn feature_names() -> Vec<String> {
        [
            FEATURE_FLOOR_AREA,
            FEATURE_BEDROOMS,
            FEATURE_BATHROOMS,
            FEATURE_PROPERTY_TYPE,
            FEATURE_COUNTY,
            FEATURE_BER,
            FEATURE_YEAR,
            FEATURE_PRICE_PER_M2,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }

    /// Classifier whose score for class k is k * (floor area); argmax is
    /// always the last class for positive areas.
    fn test_context(declare_schema: bool) -> PredictContext {
        let names = declare_schema.then(feature_names);

        let mut clf_coefs = Vec::new();
        for k in 0..5 {
            let mut row = vec![0.0; 8];
            row[0] = k as f64;
            clf_coefs.push(row);
        }

        let classifier = ModelFile {
            tool: "homecast-train".to_string(),
            feature_names_in: names.clone(),
            params: ModelParams::Classifier {
                coefficients: clf_coefs,
                intercepts: vec![0.0; 5],
            },
        };

        // Price = 3000 * area + 50_000.
        let mut reg_coefs = vec![0.0; 8];
        reg_coefs[0] = 3000.0;
        let regressor = ModelFile {
            tool: "homecast-train".to_string(),
            feature_names_in: names,
            params: ModelParams::Regressor {
                coefficients: reg_coefs,
                intercept: 50_000.0,
            },
        };

        PredictContext {
            classifier,
            regressor,
            tables: CategoryTables::training_order(),
        }
    }

    #[test]
    fn run_predict_produces_label_and_price() {
        let ctx = test_context(true);
        let out = run_predict(&ctx, &PropertyRecord::default_input()).unwrap();

        assert_eq!(out.class_index, 4);
        assert_eq!(out.category, "Low");
        assert!((out.price_eur - 350_000.0).abs() < 1e-9);
        assert_eq!(out.clf_schema.source(), SchemaSource::Declared);
        assert_eq!(out.clf_row.len(), 8);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn run_predict_falls_back_to_record_order_schema() {
        let ctx = test_context(false);
        let out = run_predict(&ctx, &PropertyRecord::default_input()).unwrap();
        assert_eq!(out.reg_schema.source(), SchemaSource::RecordOrder);
        assert!((out.price_eur - 350_000.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_county_warns_but_still_predicts() {
        let ctx = test_context(true);
        let mut record = PropertyRecord::default_input();
        record.county = "Atlantis".to_string();

        let out = run_predict(&ctx, &record).unwrap();
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(out.encoded.get(FEATURE_COUNTY), Some(-1.0));
    }

    #[test]
    fn invalid_record_is_rejected_before_encoding() {
        let ctx = test_context(true);
        let mut record = PropertyRecord::default_input();
        record.floor_area_m2 = 1.0;
        assert_eq!(run_predict(&ctx, &record).unwrap_err().exit_code(), 2);
    }

    #[test]
    fn batch_scores_every_record() {
        let ctx = test_context(true);
        let records = crate::data::generate_sample(25, 42).unwrap();
        let scored = run_batch(&ctx, &records).unwrap();
        assert_eq!(scored.len(), 25);
        for s in &scored {
            assert!(s.price_eur.is_finite());
            assert_ne!(s.category, "Unknown");
        }
    }

    #[test]
    fn price_curve_spans_the_form_bounds() {
        let ctx = test_context(true);
        let curve = price_curve(&ctx, &PropertyRecord::default_input(), 50).unwrap();
        assert_eq!(curve.len(), 50);
        assert!((curve[0].0 - FLOOR_AREA_MIN).abs() < 1e-9);
        assert!((curve[49].0 - FLOOR_AREA_MAX).abs() < 1e-9);
        // Linear test model: strictly increasing in area.
        assert!(curve[49].1 > curve[0].1);
    }
}
