//! Read/write model artifact JSON files.
//!
//! Artifact JSON is the portable representation of a trained model:
//! - task tag + linear parameters
//! - optional declared input column order (`feature_names_in`)
//!
//! The schema is defined by `models::ModelFile`. Artifacts are produced by
//! the (external) training pipeline; we only ever read them at startup, plus
//! write them in tests and debug tooling.

use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::models::{ModelFile, ModelTask};

/// Conventional artifact file name inside a model directory.
pub fn dir_artifact_path(dir: &Path, task: ModelTask) -> PathBuf {
    match task {
        ModelTask::Classifier => dir.join("classification_model.json"),
        ModelTask::Regressor => dir.join("regression_model.json"),
    }
}

/// Read and structurally validate a model artifact.
pub fn read_model_json(path: &Path, expected_task: ModelTask) -> Result<ModelFile, AppError> {
    let file = File::open(path).map_err(|e| {
        AppError::new(
            3,
            format!("Failed to open model artifact '{}': {e}", path.display()),
        )
    })?;
    let model: ModelFile = serde_json::from_reader(file).map_err(|e| {
        AppError::new(
            3,
            format!("Invalid model artifact '{}': {e}", path.display()),
        )
    })?;

    if model.task() != expected_task {
        return Err(AppError::new(
            3,
            format!(
                "'{}' is a {}, expected a {}.",
                path.display(),
                model.task().display_name(),
                expected_task.display_name()
            ),
        ));
    }
    model.check_consistency()?;
    Ok(model)
}

/// Write a model artifact (tests and debug tooling only).
pub fn write_model_json(path: &Path, model: &ModelFile) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(
            3,
            format!("Failed to create model artifact '{}': {e}", path.display()),
        )
    })?;
    serde_json::to_writer_pretty(file, model)
        .map_err(|e| AppError::new(3, format!("Failed to write model artifact: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ModelParams;

    #[test]
    fn artifact_round_trips_through_json() {
        let model = ModelFile {
            tool: "homecast-train".to_string(),
            feature_names_in: Some(vec!["a".to_string(), "b".to_string()]),
            params: ModelParams::Regressor {
                coefficients: vec![1.5, -2.0],
                intercept: 100.0,
            },
        };

        let dir = std::env::temp_dir().join("homecast-artifact-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("regression_model.json");

        write_model_json(&path, &model).unwrap();
        let loaded = read_model_json(&path, ModelTask::Regressor).unwrap();
        assert_eq!(loaded.feature_names(), model.feature_names());
        assert_eq!(loaded.n_features(), 2);
    }

    #[test]
    fn task_mismatch_on_load_is_rejected() {
        let model = ModelFile {
            tool: "homecast-train".to_string(),
            feature_names_in: None,
            params: ModelParams::Regressor {
                coefficients: vec![1.0],
                intercept: 0.0,
            },
        };

        let dir = std::env::temp_dir().join("homecast-artifact-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("mismatched_model.json");

        write_model_json(&path, &model).unwrap();
        let err = read_model_json(&path, ModelTask::Classifier).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn classifier_json_wire_format_is_stable() {
        // The training pipeline emits this shape; keep deserialization pinned.
        let json = r#"{
            "tool": "homecast-train",
            "task": "classifier",
            "feature_names_in": ["x", "y"],
            "coefficients": [[1.0, 0.0], [0.0, 1.0]],
            "intercepts": [0.1, -0.1]
        }"#;
        let model: ModelFile = serde_json::from_str(json).unwrap();
        assert_eq!(model.task(), ModelTask::Classifier);
        assert_eq!(model.n_features(), 2);
        model.check_consistency().unwrap();
    }
}
