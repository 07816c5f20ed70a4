//! Debug bundle writer for inspecting encoding, schema resolution, and model
//! inputs.

use std::fs::{File, create_dir_all};
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;

use crate::app::pipeline::{PredictContext, price_curve, run_predict};
use crate::domain::PropertyRecord;
use crate::encode::OrdinalMap;
use crate::error::AppError;
use crate::models::ModelFile;
use crate::report::fmt_eur;

/// Write a markdown bundle describing one full prediction in detail.
///
/// Returns the path of the written file.
pub fn write_debug_bundle(
    ctx: &PredictContext,
    record: &PropertyRecord,
) -> Result<PathBuf, AppError> {
    let dir = PathBuf::from("debug");
    create_dir_all(&dir)
        .map_err(|e| AppError::new(4, format!("Failed to create debug dir: {e}")))?;

    let ts = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("hcast_debug_{}_{ts}.md", record.id));

    let mut file = File::create(&path)
        .map_err(|e| AppError::new(4, format!("Failed to create debug file: {e}")))?;

    let out = run_predict(ctx, record)?;
    let curve = price_curve(ctx, record, 11)?;

    let mut w = |line: String| -> Result<(), AppError> {
        writeln!(file, "{line}").map_err(|e| AppError::new(4, format!("Failed to write debug: {e}")))
    };

    w("# hcast debug bundle".to_string())?;
    w(format!("- generated: {}", Local::now().to_rfc3339()))?;
    w(format!(
        "- property: {} | {:.0} m2 | {} bed / {} bath | {} | {} | BER {} | built {}",
        record.id,
        record.floor_area_m2,
        record.bedrooms,
        record.bathrooms,
        record.property_type,
        record.county,
        record.ber_rating,
        record.year_built,
    ))?;

    w("\n## Artifacts".to_string())?;
    w(artifact_line("classifier", &ctx.classifier))?;
    w(artifact_line("regressor", &ctx.regressor))?;
    w(format!(
        "- schema sources: classifier={} | regressor={}",
        out.clf_schema.source().display_name(),
        out.reg_schema.source().display_name(),
    ))?;

    w("\n## Ordinal tables".to_string())?;
    w(ordinal_line("property_type", &ctx.tables.property_type))?;
    w(ordinal_line("county", &ctx.tables.county))?;
    w(ordinal_line("ber_rating", &ctx.tables.ber_rating))?;

    w("\n## Encoded record".to_string())?;
    w("| feature | value |".to_string())?;
    w("| - | - |".to_string())?;
    for (name, value) in out.encoded.iter() {
        w(format!("| {name} | {value} |"))?;
    }
    for warning in &out.warnings {
        w(format!("- warning: {warning}"))?;
    }

    w("\n## Aligned rows".to_string())?;
    w(format!(
        "- classifier row ({} cols): {:?}",
        out.clf_row.len(),
        out.clf_row.values()
    ))?;
    w(format!(
        "- regressor row ({} cols): {:?}",
        out.reg_row.len(),
        out.reg_row.values()
    ))?;

    w("\n## Predictions".to_string())?;
    w(format!(
        "- category: {} (class {})",
        out.category, out.class_index
    ))?;
    w(format!("- price: {}", fmt_eur(out.price_eur)))?;

    w("\n## Price vs floor area".to_string())?;
    w("| area_m2 | price |".to_string())?;
    w("| - | - |".to_string())?;
    for (area, price) in curve {
        w(format!("| {area:.0} | {} |", fmt_eur(price)))?;
    }

    Ok(path)
}

fn artifact_line(name: &str, model: &ModelFile) -> String {
    format!(
        "- {name}: tool={} | task={} | features={} | declared_schema={}",
        model.tool,
        model.task().display_name(),
        model.n_features(),
        model.feature_names().is_some(),
    )
}

fn ordinal_line(name: &str, map: &OrdinalMap) -> String {
    format!("- {name} ({} labels): {}", map.len(), map.labels().join(", "))
}
