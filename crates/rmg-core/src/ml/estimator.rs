use super::config::EstimatorConfig;
use super::features::MolGraph;
use super::model::{AttentionMpn, HEAT_CAPACITY_TARGETS, ModelArtifact, load_model_artifact};
use super::{EstimatorError, InputMode};
use crate::molecule::Molecule;
use crate::thermo::{ThermoData, standard_thermo_data};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const KJ_TO_J: f64 = 1000.0;

/// A loaded model. Construction reads and validates the artifact once;
/// predictions are pure functions of the descriptor.
#[derive(Debug, Clone)]
pub struct MlEstimator {
    name: String,
    artifact_path: Option<PathBuf>,
    network: AttentionMpn,
    targets: Vec<String>,
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl MlEstimator {
    /// Resolves `model_name` against [`EstimatorConfig::from_env`].
    pub fn new(model_name: &str) -> Result<Self, EstimatorError> {
        Self::with_config(model_name, &EstimatorConfig::from_env())
    }

    pub fn with_config(model_name: &str, config: &EstimatorConfig) -> Result<Self, EstimatorError> {
        if !is_valid_model_name(model_name) {
            return Err(EstimatorError::InvalidModelName(model_name.to_string()));
        }
        let path = config.model_path(model_name);
        if !path.is_file() {
            return Err(EstimatorError::ModelNotFound {
                name: model_name.to_string(),
                path,
            });
        }

        let artifact = load_model_artifact(&path)?;
        let mut estimator = Self::from_artifact(&artifact)?;
        estimator.name = model_name.to_string();
        info!(
            model = model_name,
            path = %path.display(),
            hidden_size = artifact.hidden_size,
            depth = artifact.depth,
            targets = artifact.targets.len(),
            "loaded ML thermo model"
        );
        estimator.artifact_path = Some(path);
        Ok(estimator)
    }

    /// Builds an estimator from weights already in memory. The model is named
    /// after the artifact.
    pub fn from_artifact(artifact: &ModelArtifact) -> Result<Self, EstimatorError> {
        let network = AttentionMpn::from_artifact(artifact)?;
        Ok(Self {
            name: artifact.name.clone(),
            artifact_path: None,
            network,
            targets: artifact.targets.clone(),
            means: artifact.target_means.clone(),
            stds: artifact.target_stds.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn artifact_path(&self) -> Option<&Path> {
        self.artifact_path.as_deref()
    }

    pub fn get_thermo_data(
        &self,
        smiles: &str,
        mode: InputMode,
    ) -> Result<ThermoData, EstimatorError> {
        let parsed = Molecule::from_smiles(smiles)?;
        let molecule = match mode {
            InputMode::FromSmiles => parsed.without_explicit_hydrogens(),
            InputMode::FromMolecule => {
                parsed.with_explicit_hydrogens().without_explicit_hydrogens()
            }
        };
        debug!(smiles, %mode, atoms = molecule.atom_count(), "estimating thermo");
        self.predict(&molecule, mode)
    }

    pub fn get_thermo_data_for_molecule(
        &self,
        molecule: &Molecule,
    ) -> Result<ThermoData, EstimatorError> {
        self.predict(&molecule.without_explicit_hydrogens(), InputMode::FromMolecule)
    }

    fn predict(&self, molecule: &Molecule, mode: InputMode) -> Result<ThermoData, EstimatorError> {
        let graph = MolGraph::from_molecule(molecule);
        let outputs = self.network.forward(&graph);

        let h298 = self.required(&outputs, "H298")? * KJ_TO_J;
        let s298 = self.required(&outputs, "S298")?;
        let heat_capacities = HEAT_CAPACITY_TARGETS
            .iter()
            .map(|target| self.required(&outputs, target))
            .collect::<Result<Vec<_>, _>>()?;
        let cp0 = match self.optional(&outputs, "Cp0")? {
            Some(value) => value,
            None => molecule.calculate_cp0(),
        };
        let cp_inf = match self.optional(&outputs, "CpInf")? {
            Some(value) => value,
            None => molecule.calculate_cp_inf(),
        };

        let comment = format!("ML Estimation using {} (model {})", mode.as_str(), self.name);
        Ok(standard_thermo_data(
            heat_capacities,
            h298,
            s298,
            cp0,
            cp_inf,
            comment,
        )?)
    }

    fn required(&self, outputs: &[f64], target: &str) -> Result<f64, EstimatorError> {
        self.optional(outputs, target)?
            .ok_or_else(|| EstimatorError::InvalidArtifact {
                name: self.name.clone(),
                details: format!("required target '{target}' is missing"),
            })
    }

    /// Denormalized prediction for `target`, if the model has that output.
    fn optional(&self, outputs: &[f64], target: &str) -> Result<Option<f64>, EstimatorError> {
        let Some(index) = self.targets.iter().position(|name| name == target) else {
            return Ok(None);
        };
        let value = outputs[index] * self.stds[index] + self.means[index];
        if !value.is_finite() {
            return Err(EstimatorError::NonFinitePrediction {
                name: self.name.clone(),
                target: target.to_string(),
            });
        }
        Ok(Some(value))
    }
}

/// Model identifiers name a file inside the model directory, never a path.
fn is_valid_model_name(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
