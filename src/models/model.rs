//! Deserialized model artifacts and their predict primitives.
//!
//! The models are trained and serialized elsewhere; this crate treats them as
//! black boxes exposing exactly two capabilities:
//!
//! - `predict(aligned row) -> value` (class index or price estimate)
//! - optionally, the expected input column order (`feature_names_in`)
//!
//! Coefficients are never inspected beyond what prediction needs.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::feature::AlignedRow;

/// Which task an artifact was trained for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTask {
    Classifier,
    Regressor,
}

impl ModelTask {
    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelTask::Classifier => "price-category classifier",
            ModelTask::Regressor => "price regressor",
        }
    }
}

/// Model parameters, tagged by task in the artifact JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "task", rename_all = "lowercase")]
pub enum ModelParams {
    /// Linear multi-class scorer: `class = argmax(W·x + b)`.
    Classifier {
        /// One coefficient row per class.
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    },
    /// Linear scorer: `value = w·x + b`.
    Regressor {
        coefficients: Vec<f64>,
        intercept: f64,
    },
}

/// A deserialized model artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    /// Name of the tool that produced the artifact (informational).
    pub tool: String,
    /// Expected input columns, in order, when the training pipeline recorded
    /// them. Absent in older artifacts; the schema then falls back to the
    /// encoded record's key order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names_in: Option<Vec<String>>,
    #[serde(flatten)]
    pub params: ModelParams,
}

impl ModelFile {
    pub fn task(&self) -> ModelTask {
        match self.params {
            ModelParams::Classifier { .. } => ModelTask::Classifier,
            ModelParams::Regressor { .. } => ModelTask::Regressor,
        }
    }

    /// Declared input column order, if the artifact carries one.
    pub fn feature_names(&self) -> Option<&[String]> {
        self.feature_names_in.as_deref()
    }

    /// Number of input columns the coefficients expect.
    pub fn n_features(&self) -> usize {
        match &self.params {
            ModelParams::Classifier { coefficients, .. } => {
                coefficients.first().map(Vec::len).unwrap_or(0)
            }
            ModelParams::Regressor { coefficients, .. } => coefficients.len(),
        }
    }

    /// Reject artifacts whose declared schema disagrees with the coefficient
    /// width. This is the only structural check we can do up front; column
    /// *meaning* is still entirely on the training pipeline.
    pub fn check_consistency(&self) -> Result<(), AppError> {
        if let ModelParams::Classifier {
            coefficients,
            intercepts,
        } = &self.params
        {
            if coefficients.is_empty() {
                return Err(AppError::new(3, "Classifier artifact has no classes."));
            }
            if coefficients.len() != intercepts.len() {
                return Err(AppError::new(
                    3,
                    format!(
                        "Classifier artifact is malformed: {} coefficient rows vs {} intercepts.",
                        coefficients.len(),
                        intercepts.len()
                    ),
                ));
            }
            let width = coefficients[0].len();
            if coefficients.iter().any(|row| row.len() != width) {
                return Err(AppError::new(
                    3,
                    "Classifier artifact is malformed: ragged coefficient rows.",
                ));
            }
        }
        if let Some(names) = self.feature_names() {
            if names.len() != self.n_features() {
                return Err(AppError::new(
                    3,
                    format!(
                        "Artifact declares {} feature names but its coefficients expect {}.",
                        names.len(),
                        self.n_features()
                    ),
                ));
            }
        }
        Ok(())
    }

    /// Predict a discrete class index for the aligned row.
    ///
    /// Ties resolve to the lowest class index, matching the training
    /// library's argmax convention.
    pub fn predict_class(&self, row: &AlignedRow) -> Result<usize, AppError> {
        let ModelParams::Classifier {
            coefficients,
            intercepts,
        } = &self.params
        else {
            return Err(AppError::new(
                3,
                "Artifact is a regressor; cannot predict a price category with it.",
            ));
        };

        let n_classes = coefficients.len();
        let width = self.n_features();
        check_width(width, row)?;

        let w = DMatrix::from_row_iterator(
            n_classes,
            width,
            coefficients.iter().flat_map(|r| r.iter().copied()),
        );
        let b = DVector::from_column_slice(intercepts);
        let x = DVector::from_column_slice(row.values());
        let scores = w * x + b;

        let mut best = 0usize;
        for (i, &s) in scores.iter().enumerate() {
            if !s.is_finite() {
                return Err(AppError::new(4, "Non-finite classifier score."));
            }
            if s > scores[best] {
                best = i;
            }
        }
        Ok(best)
    }

    /// Predict a continuous price estimate for the aligned row.
    pub fn predict_value(&self, row: &AlignedRow) -> Result<f64, AppError> {
        let ModelParams::Regressor {
            coefficients,
            intercept,
        } = &self.params
        else {
            return Err(AppError::new(
                3,
                "Artifact is a classifier; cannot predict a price value with it.",
            ));
        };

        check_width(coefficients.len(), row)?;

        let w = DVector::from_column_slice(coefficients);
        let x = DVector::from_column_slice(row.values());
        let value = w.dot(&x) + intercept;
        if !value.is_finite() {
            return Err(AppError::new(4, "Non-finite regressor prediction."));
        }
        Ok(value)
    }
}

// A width mismatch is a collaborator-level failure: the adapter guarantees
// schema order, not that the schema matches the coefficients.
fn check_width(expected: usize, row: &AlignedRow) -> Result<(), AppError> {
    if row.len() != expected {
        return Err(AppError::new(
            3,
            format!(
                "Model expects {expected} input columns, aligned row has {}.",
                row.len()
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::{EncodedRecord, TargetSchema, align};

    fn row(values: &[(&str, f64)]) -> AlignedRow {
        let mut record = EncodedRecord::new();
        for &(n, v) in values {
            record.push(n, v);
        }
        let schema = TargetSchema::resolve(None, &record);
        align(&record, &schema)
    }

    fn classifier(coefficients: Vec<Vec<f64>>, intercepts: Vec<f64>) -> ModelFile {
        ModelFile {
            tool: "homecast-train".to_string(),
            feature_names_in: None,
            params: ModelParams::Classifier {
                coefficients,
                intercepts,
            },
        }
    }

    #[test]
    fn classifier_returns_argmax_class() {
        let m = classifier(
            vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![-1.0, -1.0]],
            vec![0.0, 0.0, 0.0],
        );
        let idx = m.predict_class(&row(&[("a", 1.0), ("b", 3.0)])).unwrap();
        assert_eq!(idx, 1);
    }

    #[test]
    fn classifier_ties_resolve_to_lowest_index() {
        let m = classifier(vec![vec![1.0], vec![1.0]], vec![0.0, 0.0]);
        let idx = m.predict_class(&row(&[("a", 2.0)])).unwrap();
        assert_eq!(idx, 0);
    }

    #[test]
    fn regressor_is_a_dot_product_plus_intercept() {
        let m = ModelFile {
            tool: "homecast-train".to_string(),
            feature_names_in: None,
            params: ModelParams::Regressor {
                coefficients: vec![2.0, 3.0],
                intercept: 10.0,
            },
        };
        let v = m.predict_value(&row(&[("a", 1.0), ("b", 2.0)])).unwrap();
        assert!((v - 18.0).abs() < 1e-12);
    }

    #[test]
    fn width_mismatch_is_an_artifact_error() {
        let m = classifier(vec![vec![1.0, 1.0]], vec![0.0]);
        let err = m.predict_class(&row(&[("a", 1.0)])).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn task_mismatch_is_rejected() {
        let m = classifier(vec![vec![1.0]], vec![0.0]);
        assert!(m.predict_value(&row(&[("a", 1.0)])).is_err());
    }

    #[test]
    fn consistency_check_catches_declared_schema_width() {
        let mut m = classifier(vec![vec![1.0, 2.0]], vec![0.0]);
        m.feature_names_in = Some(vec!["a".to_string()]);
        assert_eq!(m.check_consistency().unwrap_err().exit_code(), 3);
    }
}
