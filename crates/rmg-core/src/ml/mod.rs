//! Thermochemistry from a pretrained directed message-passing network with an
//! attention readout.

mod config;
mod estimator;
mod features;
mod model;

pub use config::{DEFAULT_MODEL_DIR, EstimatorConfig, MODEL_DIR_ENV};
pub use estimator::MlEstimator;
pub use features::{ATOM_FDIM, BOND_FDIM, MolGraph, atom_features, bond_features};
pub use model::{
    ARCHITECTURE, AttentionMpn, DenseLayer, HEAT_CAPACITY_TARGETS, ModelArtifact, OPTIONAL_TARGETS,
    REQUIRED_TARGETS, load_model_artifact,
};

use crate::domain::RmgError;
use crate::molecule::SmilesError;
use crate::thermo::ThermoError;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// How a descriptor reaches the network. Both paths featurize the same
/// heavy-atom graph; they differ in the structure built on the way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum InputMode {
    #[default]
    #[serde(rename = "from_smiles")]
    FromSmiles,
    #[serde(rename = "from_rdkit_mol")]
    FromMolecule,
}

impl InputMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FromSmiles => "from_smiles",
            Self::FromMolecule => "from_rdkit_mol",
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputMode {
    type Err = EstimatorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "from_smiles" | "smiles" => Ok(Self::FromSmiles),
            "from_rdkit_mol" | "from_rdkit" | "molecule" => Ok(Self::FromMolecule),
            _ => Err(EstimatorError::UnknownInputMode(value.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum EstimatorError {
    #[error("invalid model name '{0}'")]
    InvalidModelName(String),
    #[error("model '{name}' not found at '{}'", path.display())]
    ModelNotFound { name: String, path: PathBuf },
    #[error("failed to read model artifact '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse model artifact '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid model '{name}': {details}")]
    InvalidArtifact { name: String, details: String },
    #[error("unknown input mode '{0}' (expected from_smiles or from_rdkit_mol)")]
    UnknownInputMode(String),
    #[error(transparent)]
    Smiles(#[from] SmilesError),
    #[error("model '{name}' predicted a non-finite {target}")]
    NonFinitePrediction { name: String, target: String },
    #[error(transparent)]
    Thermo(#[from] ThermoError),
}

impl From<EstimatorError> for RmgError {
    fn from(error: EstimatorError) -> Self {
        match error {
            EstimatorError::Smiles(source) => source.into(),
            EstimatorError::Thermo(source) => source.into(),
            EstimatorError::Read { .. } => RmgError::io_system("IO.MODEL_READ", error.to_string()),
            EstimatorError::Parse { .. } | EstimatorError::InvalidArtifact { .. } => {
                RmgError::input_validation("INPUT.MODEL_ARTIFACT", error.to_string())
            }
            EstimatorError::InvalidModelName(_) | EstimatorError::ModelNotFound { .. } => {
                RmgError::input_validation("INPUT.MODEL", error.to_string())
            }
            EstimatorError::UnknownInputMode(_) => {
                RmgError::input_validation("INPUT.INPUT_MODE", error.to_string())
            }
            EstimatorError::NonFinitePrediction { .. } => {
                RmgError::computation("RUN.ML_PREDICTION", error.to_string())
            }
        }
    }
}
