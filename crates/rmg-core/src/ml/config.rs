use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const MODEL_DIR_ENV: &str = "RMG_ML_MODEL_DIR";
pub const DEFAULT_MODEL_DIR: &str = "models";

/// Where model identifiers resolve. Precedence: explicit directory, then
/// `RMG_ML_MODEL_DIR`, then `models` relative to the working directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EstimatorConfig {
    pub model_dir: PathBuf,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from(DEFAULT_MODEL_DIR),
        }
    }
}

impl EstimatorConfig {
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var_os(MODEL_DIR_ENV))
    }

    /// Empty values fall back to the default directory.
    pub fn from_env_value(value: Option<OsString>) -> Self {
        match value {
            Some(dir) if !dir.is_empty() => Self {
                model_dir: PathBuf::from(dir),
            },
            _ => Self::default(),
        }
    }

    pub fn with_model_dir(mut self, model_dir: impl Into<PathBuf>) -> Self {
        self.model_dir = model_dir.into();
        self
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    pub fn model_path(&self, model_name: &str) -> PathBuf {
        self.model_dir.join(format!("{model_name}.json"))
    }
}
