//! Optional HTTP model registry.
//!
//! When `HOMECAST_MODEL_URL` is set (environment or `.env`), model artifacts
//! can be fetched from `<base>/<conventional-artifact-name>` instead of the
//! local filesystem. Fetches happen once at startup; artifacts are immutable
//! afterwards.

use reqwest::blocking::Client;

use crate::error::AppError;
use crate::models::{ModelFile, ModelTask};

const ENV_MODEL_URL: &str = "HOMECAST_MODEL_URL";

pub struct RegistryClient {
    client: Client,
    base_url: String,
}

impl RegistryClient {
    /// Build a client from the environment, or `None` when no registry is
    /// configured (local-only resolution).
    pub fn from_env() -> Option<Self> {
        dotenvy::dotenv().ok();
        let base_url = std::env::var(ENV_MODEL_URL).ok()?;
        Some(Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch and structurally validate one artifact.
    pub fn fetch_model(&self, task: ModelTask) -> Result<ModelFile, AppError> {
        let name = match task {
            ModelTask::Classifier => "classification_model.json",
            ModelTask::Regressor => "regression_model.json",
        };
        let url = format!("{}/{name}", self.base_url);

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| AppError::new(3, format!("Registry request failed for {url}: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::new(3, format!("Registry returned an error for {url}: {e}")))?;

        let model: ModelFile = resp
            .json()
            .map_err(|e| AppError::new(3, format!("Invalid artifact JSON from {url}: {e}")))?;

        if model.task() != task {
            return Err(AppError::new(
                3,
                format!(
                    "Registry served a {} where a {} was expected ({url}).",
                    model.task().display_name(),
                    task.display_name()
                ),
            ));
        }
        model.check_consistency()?;
        Ok(model)
    }
}
