use super::EstimatorError;
use super::features::{ATOM_FDIM, BOND_FDIM, MolGraph};
use crate::numerics::{DenseMatrix, dense_matrix_from_rows, mat_vec};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

pub const ARCHITECTURE: &str = "attn_mpn";

pub const HEAT_CAPACITY_TARGETS: [&str; 9] = [
    "Cp300", "Cp400", "Cp500", "Cp600", "Cp800", "Cp1000", "Cp1500", "Cp2000", "Cp2400",
];

/// `H298` in kJ/mol, everything else in J/(mol*K).
pub const REQUIRED_TARGETS: [&str; 11] = [
    "H298", "S298", "Cp300", "Cp400", "Cp500", "Cp600", "Cp800", "Cp1000", "Cp1500", "Cp2000",
    "Cp2400",
];

pub const OPTIONAL_TARGETS: [&str; 2] = ["Cp0", "CpInf"];

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DenseLayer {
    pub weight: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

/// Serialized network weights plus output normalization.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ModelArtifact {
    pub name: String,
    pub architecture: String,
    pub hidden_size: usize,
    pub depth: usize,
    pub atom_fdim: usize,
    pub bond_fdim: usize,
    pub w_i: Vec<Vec<f64>>,
    pub w_h: Vec<Vec<f64>>,
    pub w_o: Vec<Vec<f64>>,
    pub b_o: Vec<f64>,
    pub w_a: Vec<Vec<f64>>,
    pub w_b: Vec<Vec<f64>>,
    pub b_b: Vec<f64>,
    pub ffn: Vec<DenseLayer>,
    pub targets: Vec<String>,
    pub target_means: Vec<f64>,
    pub target_stds: Vec<f64>,
}

impl ModelArtifact {
    pub fn validate(&self) -> Result<(), EstimatorError> {
        self.check_shapes().map_err(|details| EstimatorError::InvalidArtifact {
            name: self.name.clone(),
            details,
        })
    }

    pub fn target_index(&self, target: &str) -> Option<usize> {
        self.targets.iter().position(|name| name == target)
    }

    fn check_shapes(&self) -> Result<(), String> {
        if self.architecture != ARCHITECTURE {
            return Err(format!(
                "architecture '{}' is not supported (expected '{ARCHITECTURE}')",
                self.architecture
            ));
        }
        if self.atom_fdim != ATOM_FDIM || self.bond_fdim != BOND_FDIM {
            return Err(format!(
                "feature sizes {}/{} do not match the featurizer ({ATOM_FDIM}/{BOND_FDIM})",
                self.atom_fdim, self.bond_fdim
            ));
        }
        if self.hidden_size == 0 || self.depth == 0 {
            return Err("hidden_size and depth must be positive".to_string());
        }

        let hidden = self.hidden_size;
        check_matrix("w_i", &self.w_i, hidden, ATOM_FDIM + BOND_FDIM)?;
        check_matrix("w_h", &self.w_h, hidden, hidden)?;
        check_matrix("w_o", &self.w_o, hidden, ATOM_FDIM + hidden)?;
        check_vector("b_o", &self.b_o, hidden)?;
        check_matrix("w_a", &self.w_a, hidden, hidden)?;
        check_matrix("w_b", &self.w_b, hidden, hidden)?;
        check_vector("b_b", &self.b_b, hidden)?;

        if self.ffn.is_empty() {
            return Err("ffn has no layers".to_string());
        }
        let mut width = hidden;
        for (index, layer) in self.ffn.iter().enumerate() {
            let outputs = layer.weight.len();
            check_matrix(&format!("ffn[{index}].weight"), &layer.weight, outputs, width)?;
            check_vector(&format!("ffn[{index}].bias"), &layer.bias, outputs)?;
            width = outputs;
        }

        let targets = self.targets.len();
        if width != targets {
            return Err(format!("readout produces {width} values for {targets} targets"));
        }
        check_vector("target_means", &self.target_means, targets)?;
        check_vector("target_stds", &self.target_stds, targets)?;

        let mut seen = HashSet::new();
        if let Some(duplicate) = self.targets.iter().find(|target| !seen.insert(target.as_str())) {
            return Err(format!("target '{duplicate}' is listed twice"));
        }
        if let Some(missing) = REQUIRED_TARGETS
            .iter()
            .find(|target| self.target_index(target).is_none())
        {
            return Err(format!("required target '{missing}' is missing"));
        }
        Ok(())
    }
}

fn check_matrix(
    label: &str,
    rows: &[Vec<f64>],
    nrows: usize,
    ncols: usize,
) -> Result<(), String> {
    if rows.len() != nrows {
        return Err(format!("{label} has {} rows, expected {nrows}", rows.len()));
    }
    for (index, row) in rows.iter().enumerate() {
        if row.len() != ncols {
            return Err(format!(
                "{label} row {index} has {} columns, expected {ncols}",
                row.len()
            ));
        }
        if row.iter().any(|value| !value.is_finite()) {
            return Err(format!("{label} row {index} has a non-finite entry"));
        }
    }
    Ok(())
}

fn check_vector(label: &str, values: &[f64], len: usize) -> Result<(), String> {
    if values.len() != len {
        return Err(format!("{label} has {} entries, expected {len}", values.len()));
    }
    if values.iter().any(|value| !value.is_finite()) {
        return Err(format!("{label} has a non-finite entry"));
    }
    Ok(())
}

pub fn load_model_artifact(path: impl AsRef<Path>) -> Result<ModelArtifact, EstimatorError> {
    let path = path.as_ref();
    let source = fs::read_to_string(path).map_err(|source| EstimatorError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let artifact: ModelArtifact =
        serde_json::from_str(&source).map_err(|source| EstimatorError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    artifact.validate()?;
    Ok(artifact)
}

/// Validated network ready for inference.
#[derive(Debug, Clone)]
pub struct AttentionMpn {
    depth: usize,
    hidden_size: usize,
    w_i: DenseMatrix,
    w_h: DenseMatrix,
    w_o: DenseMatrix,
    b_o: Vec<f64>,
    w_a: DenseMatrix,
    w_b: DenseMatrix,
    b_b: Vec<f64>,
    ffn: Vec<(DenseMatrix, Vec<f64>)>,
}

impl AttentionMpn {
    pub fn from_artifact(artifact: &ModelArtifact) -> Result<Self, EstimatorError> {
        artifact.validate()?;
        Ok(Self {
            depth: artifact.depth,
            hidden_size: artifact.hidden_size,
            w_i: dense_matrix_from_rows(&artifact.w_i),
            w_h: dense_matrix_from_rows(&artifact.w_h),
            w_o: dense_matrix_from_rows(&artifact.w_o),
            b_o: artifact.b_o.clone(),
            w_a: dense_matrix_from_rows(&artifact.w_a),
            w_b: dense_matrix_from_rows(&artifact.w_b),
            b_b: artifact.b_b.clone(),
            ffn: artifact
                .ffn
                .iter()
                .map(|layer| (dense_matrix_from_rows(&layer.weight), layer.bias.clone()))
                .collect(),
        })
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    /// Normalized outputs, one per target.
    pub fn forward(&self, graph: &MolGraph) -> Vec<f64> {
        let atoms = self.encode(graph);
        let molecule = self.attention_readout(&atoms);
        let last = self.ffn.len().saturating_sub(1);
        self.ffn
            .iter()
            .enumerate()
            .fold(molecule, |input, (index, (weight, bias))| {
                let output = add(&mat_vec(weight, &input), bias);
                if index == last { output } else { relu(output) }
            })
    }

    /// Directed bond messages, then per-atom hidden states.
    pub fn encode(&self, graph: &MolGraph) -> Vec<Vec<f64>> {
        let initial: Vec<Vec<f64>> = (0..graph.edge_count())
            .map(|edge| {
                let source = graph.edge_source[edge];
                let input = concat(&graph.atom_features[source], &graph.edge_features[edge]);
                relu(mat_vec(&self.w_i, &input))
            })
            .collect();

        let mut messages = initial.clone();
        for _ in 1..self.depth {
            let incoming = self.sum_incoming(graph, &messages);
            messages = (0..graph.edge_count())
                .map(|edge| {
                    let source = graph.edge_source[edge];
                    let reverse = &messages[MolGraph::reverse_edge(edge)];
                    let gathered = sub(&incoming[source], reverse);
                    relu(add(&initial[edge], &mat_vec(&self.w_h, &gathered)))
                })
                .collect();
        }

        let incoming = self.sum_incoming(graph, &messages);
        (0..graph.atom_count())
            .map(|atom| {
                let input = concat(&graph.atom_features[atom], &incoming[atom]);
                relu(add(&mat_vec(&self.w_o, &input), &self.b_o))
            })
            .collect()
    }

    fn sum_incoming(&self, graph: &MolGraph, messages: &[Vec<f64>]) -> Vec<Vec<f64>> {
        graph
            .incoming
            .iter()
            .map(|edges| {
                edges.iter().fold(vec![0.0; self.hidden_size], |sum, edge| {
                    add(&sum, &messages[*edge])
                })
            })
            .collect()
    }

    /// Self-attention over atom states, residual sum, then the atom mean.
    fn attention_readout(&self, atoms: &[Vec<f64>]) -> Vec<f64> {
        if atoms.is_empty() {
            return vec![0.0; self.hidden_size];
        }
        let mut molecule = vec![0.0; self.hidden_size];
        for atom in atoms {
            let query = mat_vec(&self.w_a, atom);
            let scores: Vec<f64> = atoms.iter().map(|other| dot(&query, other)).collect();
            let weights = softmax(&scores);
            let context = atoms
                .iter()
                .zip(&weights)
                .fold(vec![0.0; self.hidden_size], |sum, (other, weight)| {
                    add(&sum, &scale(other, *weight))
                });
            let attended = relu(add(&mat_vec(&self.w_b, &context), &self.b_b));
            molecule = add(&molecule, &add(atom, &attended));
        }
        scale(&molecule, 1.0 / atoms.len() as f64)
    }
}

fn concat(left: &[f64], right: &[f64]) -> Vec<f64> {
    left.iter().chain(right).copied().collect()
}

fn add(left: &[f64], right: &[f64]) -> Vec<f64> {
    left.iter().zip(right).map(|(a, b)| a + b).collect()
}

fn sub(left: &[f64], right: &[f64]) -> Vec<f64> {
    left.iter().zip(right).map(|(a, b)| a - b).collect()
}

fn scale(values: &[f64], factor: f64) -> Vec<f64> {
    values.iter().map(|value| value * factor).collect()
}

fn dot(left: &[f64], right: &[f64]) -> f64 {
    left.iter().zip(right).map(|(a, b)| a * b).sum()
}

fn relu(mut values: Vec<f64>) -> Vec<f64> {
    for value in &mut values {
        *value = value.max(0.0);
    }
    values
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|score| (score - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.iter().map(|value| value / total).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{
        ARCHITECTURE, AttentionMpn, DenseLayer, ModelArtifact, OPTIONAL_TARGETS, REQUIRED_TARGETS,
        softmax,
    };
    use crate::ml::EstimatorError;
    use crate::ml::features::{ATOM_FDIM, BOND_FDIM, MolGraph};
    use crate::molecule::Molecule;

    /// Deterministic pseudo-random weights in [-0.5, 0.5).
    fn filled(rows: usize, cols: usize, seed: &mut u64) -> Vec<Vec<f64>> {
        (0..rows)
            .map(|_| {
                (0..cols)
                    .map(|_| {
                        *seed = seed
                            .wrapping_mul(6_364_136_223_846_793_005)
                            .wrapping_add(1_442_695_040_888_963_407);
                        ((*seed >> 11) as f64 / (1u64 << 53) as f64) - 0.5
                    })
                    .collect()
            })
            .collect()
    }

    pub(crate) fn random_artifact(hidden: usize, depth: usize, seed: u64) -> ModelArtifact {
        let mut state = seed;
        let targets: Vec<String> = REQUIRED_TARGETS
            .iter()
            .chain(OPTIONAL_TARGETS.iter())
            .map(|target| target.to_string())
            .collect();
        let outputs = targets.len();
        ModelArtifact {
            name: "random".to_string(),
            architecture: ARCHITECTURE.to_string(),
            hidden_size: hidden,
            depth,
            atom_fdim: ATOM_FDIM,
            bond_fdim: BOND_FDIM,
            w_i: filled(hidden, ATOM_FDIM + BOND_FDIM, &mut state),
            w_h: filled(hidden, hidden, &mut state),
            w_o: filled(hidden, ATOM_FDIM + hidden, &mut state),
            b_o: filled(1, hidden, &mut state).remove(0),
            w_a: filled(hidden, hidden, &mut state),
            w_b: filled(hidden, hidden, &mut state),
            b_b: filled(1, hidden, &mut state).remove(0),
            ffn: vec![
                DenseLayer {
                    weight: filled(hidden, hidden, &mut state),
                    bias: filled(1, hidden, &mut state).remove(0),
                },
                DenseLayer {
                    weight: filled(outputs, hidden, &mut state),
                    bias: filled(1, outputs, &mut state).remove(0),
                },
            ],
            targets,
            target_means: vec![0.0; outputs],
            target_stds: vec![1.0; outputs],
        }
    }

    /// One hidden unit. `w_i` reads the carbon and oxygen one-hots and the
    /// single/double bond slots, `w_o` reads the same one-hots plus the
    /// summed message. The FFN ends in `x - 1 -> relu -> x - 10`.
    fn single_unit_artifact(depth: usize) -> ModelArtifact {
        let mut w_i = vec![vec![0.0; ATOM_FDIM + BOND_FDIM]];
        w_i[0][1] = 1.0;
        w_i[0][3] = 2.0;
        w_i[0][ATOM_FDIM] = 0.5;
        w_i[0][ATOM_FDIM + 1] = 1.5;
        let mut w_o = vec![vec![0.0; ATOM_FDIM + 1]];
        w_o[0][1] = 1.0;
        w_o[0][3] = 0.5;
        w_o[0][ATOM_FDIM] = 1.0;

        let targets: Vec<String> = REQUIRED_TARGETS.iter().map(|t| t.to_string()).collect();
        let outputs = targets.len();
        ModelArtifact {
            name: "single_unit".to_string(),
            architecture: ARCHITECTURE.to_string(),
            hidden_size: 1,
            depth,
            atom_fdim: ATOM_FDIM,
            bond_fdim: BOND_FDIM,
            w_i,
            w_h: vec![vec![0.5]],
            w_o,
            b_o: vec![0.25],
            w_a: vec![vec![1.0]],
            w_b: vec![vec![2.0]],
            b_b: vec![-1.0],
            ffn: vec![
                DenseLayer {
                    weight: vec![vec![1.0]],
                    bias: vec![-1.0],
                },
                DenseLayer {
                    weight: vec![vec![1.0]; outputs],
                    bias: vec![-10.0; outputs],
                },
            ],
            targets,
            target_means: vec![0.0; outputs],
            target_stds: vec![1.0; outputs],
        }
    }

    fn encode(network: &AttentionMpn, smiles: &str) -> Vec<f64> {
        let molecule = Molecule::from_smiles(smiles).unwrap();
        network
            .encode(&MolGraph::from_molecule(&molecule))
            .into_iter()
            .map(|state| state[0])
            .collect()
    }

    fn assert_all_close(values: &[f64], expected: f64) {
        assert_eq!(values.len(), REQUIRED_TARGETS.len());
        for value in values {
            assert!((value - expected).abs() < 1.0e-12, "{value} vs {expected}");
        }
    }

    #[test]
    fn single_unit_ethane_matches_hand_calculation() {
        let network = AttentionMpn::from_artifact(&single_unit_artifact(1)).unwrap();
        // Both messages are relu(1 + 0.5) = 1.5, so each carbon is 1 + 1.5 + 0.25.
        assert_eq!(encode(&network, "CC"), vec![2.75, 2.75]);
        // Equal scores: context 2.75, attended relu(2 * 2.75 - 1) = 4.5, mean 7.25.
        assert_all_close(&predict(&network, "CC"), 7.25 - 1.0 - 10.0);

        let deeper = AttentionMpn::from_artifact(&single_unit_artifact(2)).unwrap();
        assert_eq!(encode(&deeper, "CC"), vec![2.75, 2.75]);
        assert_all_close(&predict(&deeper, "CC"), -3.75);
    }

    #[test]
    fn single_unit_formaldehyde_matches_hand_calculation() {
        for depth in [1, 2] {
            let network = AttentionMpn::from_artifact(&single_unit_artifact(depth)).unwrap();
            // C->O carries 1 + 1.5 = 2.5, O->C carries 2 + 1.5 = 3.5.
            assert_eq!(encode(&network, "C=O"), vec![4.75, 3.25]);

            // Share of attention each atom puts on the carbon.
            let from_carbon = 1.0 / (1.0 + (-4.75 * 1.5_f64).exp());
            let from_oxygen = 1.0 / (1.0 + (-3.25 * 1.5_f64).exp());
            let carbon_context = from_carbon * 4.75 + (1.0 - from_carbon) * 3.25;
            let oxygen_context = from_oxygen * 4.75 + (1.0 - from_oxygen) * 3.25;
            let carbon_attended = 2.0 * carbon_context - 1.0;
            let oxygen_attended = 2.0 * oxygen_context - 1.0;
            let molecule = (4.75 + carbon_attended + 3.25 + oxygen_attended) / 2.0;
            assert!((molecule - 12.487_428_009_194_765).abs() < 1.0e-12);
            assert_all_close(&predict(&network, "C=O"), molecule - 11.0);
        }
    }

    #[test]
    fn single_unit_propane_passes_messages_through_the_middle_atom() {
        let shallow = AttentionMpn::from_artifact(&single_unit_artifact(1)).unwrap();
        assert_eq!(encode(&shallow, "CCC"), vec![2.75, 4.25, 2.75]);
        assert_all_close(&predict(&shallow, "CCC"), -0.316_025_029_450_166_5);

        // Outward edges from the middle atom become relu(1.5 + 0.5 * (3 - 1.5)) = 2.25.
        let deeper = AttentionMpn::from_artifact(&single_unit_artifact(2)).unwrap();
        assert_eq!(encode(&deeper, "CCC"), vec![3.5, 4.25, 3.5]);
        assert_all_close(&predict(&deeper, "CCC"), 0.085_326_848_261_948_03);
    }

    fn predict(network: &AttentionMpn, smiles: &str) -> Vec<f64> {
        let molecule = Molecule::from_smiles(smiles).unwrap();
        network.forward(&MolGraph::from_molecule(&molecule))
    }

    #[test]
    fn forward_is_invariant_to_atom_order() {
        let network = AttentionMpn::from_artifact(&random_artifact(8, 3, 7)).unwrap();
        let first = predict(&network, "C1C2C1C2");
        let second = predict(&network, "C12CC1C2");
        assert_eq!(first.len(), 13);
        for (a, b) in first.iter().zip(&second) {
            assert!((a - b).abs() < 1.0e-9, "{a} vs {b}");
        }

        let ethanol = predict(&network, "CCO");
        let reversed = predict(&network, "OCC");
        for (a, b) in ethanol.iter().zip(&reversed) {
            assert!((a - b).abs() < 1.0e-9);
        }
    }

    #[test]
    fn forward_distinguishes_structures() {
        let network = AttentionMpn::from_artifact(&random_artifact(8, 3, 11)).unwrap();
        let propane = predict(&network, "CCC");
        let cyclopropane = predict(&network, "C1CC1");
        assert!(propane
            .iter()
            .zip(&cyclopropane)
            .any(|(a, b)| (a - b).abs() > 1.0e-6));
        assert!(predict(&network, "[Ar]").iter().all(|value| value.is_finite()));
    }

    #[test]
    fn validation_reports_shape_errors() {
        let mut artifact = random_artifact(4, 2, 3);
        artifact.w_h[2].pop();
        let error = artifact.validate().unwrap_err();
        assert!(matches!(
            &error,
            EstimatorError::InvalidArtifact { details, .. } if details.contains("w_h row 2")
        ));

        let mut artifact = random_artifact(4, 2, 3);
        artifact.targets.retain(|target| target != "S298");
        artifact.target_means.pop();
        artifact.target_stds.pop();
        artifact.ffn[1].weight.pop();
        artifact.ffn[1].bias.pop();
        let error = artifact.validate().unwrap_err();
        assert!(error.to_string().contains("S298"));

        let mut artifact = random_artifact(4, 2, 3);
        artifact.architecture = "dmpnn".to_string();
        assert!(artifact.validate().is_err());
    }

    #[test]
    fn softmax_is_normalized_and_stable() {
        let weights = softmax(&[1000.0, 1000.0, 998.0]);
        assert!((weights.iter().sum::<f64>() - 1.0).abs() < 1.0e-12);
        assert!((weights[0] - weights[1]).abs() < 1.0e-15);
        assert!(weights[2] < weights[0]);
    }
}
