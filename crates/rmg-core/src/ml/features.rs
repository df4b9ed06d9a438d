use crate::molecule::{Bond, BondOrder, Molecule};

/// Element one-hot (12), degree (6), formal charge (5), hydrogens (5),
/// aromatic, in ring, mass / 100.
pub const ATOM_FDIM: usize = 31;
/// Single, double, triple, aromatic, in ring.
pub const BOND_FDIM: usize = 5;

const ELEMENT_VOCABULARY: [u8; 11] = [1, 6, 7, 8, 9, 14, 15, 16, 17, 35, 53];
const MAX_DEGREE: usize = 5;
const MIN_CHARGE: i8 = -2;
const MAX_CHARGE: i8 = 2;
const MAX_HYDROGENS: usize = 4;

pub fn atom_features(molecule: &Molecule, index: usize) -> Vec<f64> {
    let atom = &molecule.atoms()[index];
    let mut features = vec![0.0; ATOM_FDIM];

    let element_slot = ELEMENT_VOCABULARY
        .iter()
        .position(|number| *number == atom.element.atomic_number())
        .unwrap_or(ELEMENT_VOCABULARY.len());
    features[element_slot] = 1.0;

    let mut offset = ELEMENT_VOCABULARY.len() + 1;
    features[offset + molecule.total_degree(index).min(MAX_DEGREE)] = 1.0;
    offset += MAX_DEGREE + 1;

    let charge = atom.charge.clamp(MIN_CHARGE, MAX_CHARGE);
    features[offset + usize::from(charge.abs_diff(MIN_CHARGE))] = 1.0;
    offset += usize::from(MAX_CHARGE.abs_diff(MIN_CHARGE)) + 1;

    features[offset + usize::from(atom.implicit_hydrogens).min(MAX_HYDROGENS)] = 1.0;
    offset += MAX_HYDROGENS + 1;

    features[offset] = f64::from(u8::from(atom.aromatic));
    features[offset + 1] = f64::from(u8::from(atom.in_ring));
    features[offset + 2] = atom.element.standard_weight() / 100.0;
    features
}

pub fn bond_features(bond: &Bond) -> Vec<f64> {
    let mut features = vec![0.0; BOND_FDIM];
    let slot = match bond.order {
        BondOrder::Single => 0,
        BondOrder::Double => 1,
        BondOrder::Triple => 2,
        BondOrder::Aromatic => 3,
    };
    features[slot] = 1.0;
    features[4] = f64::from(u8::from(bond.in_ring));
    features
}

/// Featurized graph with every bond split into two directed edges. Edge
/// `2k` runs `begin -> end` of bond `k` and edge `2k + 1` runs back.
#[derive(Debug, Clone, PartialEq)]
pub struct MolGraph {
    pub atom_features: Vec<Vec<f64>>,
    pub edge_features: Vec<Vec<f64>>,
    pub edge_source: Vec<usize>,
    pub edge_target: Vec<usize>,
    /// Edges arriving at each atom.
    pub incoming: Vec<Vec<usize>>,
}

impl MolGraph {
    pub fn from_molecule(molecule: &Molecule) -> Self {
        let atom_count = molecule.atoms().len();
        let atom_features = (0..atom_count)
            .map(|index| atom_features(molecule, index))
            .collect();

        let mut graph = Self {
            atom_features,
            edge_features: Vec::with_capacity(2 * molecule.bonds().len()),
            edge_source: Vec::with_capacity(2 * molecule.bonds().len()),
            edge_target: Vec::with_capacity(2 * molecule.bonds().len()),
            incoming: vec![Vec::new(); atom_count],
        };
        for bond in molecule.bonds() {
            let features = bond_features(bond);
            for (source, target) in [(bond.begin, bond.end), (bond.end, bond.begin)] {
                graph.incoming[target].push(graph.edge_source.len());
                graph.edge_source.push(source);
                graph.edge_target.push(target);
                graph.edge_features.push(features.clone());
            }
        }
        graph
    }

    pub fn atom_count(&self) -> usize {
        self.atom_features.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_source.len()
    }

    pub const fn reverse_edge(edge: usize) -> usize {
        edge ^ 1
    }
}

#[cfg(test)]
mod tests {
    use super::{ATOM_FDIM, BOND_FDIM, MolGraph, atom_features, bond_features};
    use crate::molecule::Molecule;

    #[test]
    fn atom_feature_layout() {
        let molecule = Molecule::from_smiles("C[O-]").unwrap();
        let carbon = atom_features(&molecule, 0);
        assert_eq!(carbon.len(), ATOM_FDIM);
        assert_eq!(carbon[1], 1.0);
        // Carbon: one heavy neighbour plus three hydrogens.
        assert_eq!(carbon[12 + 4], 1.0);
        assert_eq!(carbon[18 + 2], 1.0);
        assert_eq!(carbon[23 + 3], 1.0);
        assert!((carbon[30] - 0.12011).abs() < 1.0e-12);
        assert_eq!(carbon.iter().filter(|value| **value == 1.0).count(), 4);

        let oxygen = atom_features(&molecule, 1);
        assert_eq!(oxygen[3], 1.0);
        assert_eq!(oxygen[18 + 1], 1.0);
        assert_eq!(oxygen[23], 1.0);
    }

    #[test]
    fn unknown_elements_use_the_other_slot() {
        let molecule = Molecule::from_smiles("[Na+]").unwrap();
        assert_eq!(atom_features(&molecule, 0)[11], 1.0);
    }

    #[test]
    fn aromatic_ring_bond_features() {
        let benzene = Molecule::from_smiles("c1ccccc1").unwrap();
        let features = bond_features(&benzene.bonds()[0]);
        assert_eq!(features, vec![0.0, 0.0, 0.0, 1.0, 1.0]);
        assert_eq!(features.len(), BOND_FDIM);
        let carbon = atom_features(&benzene, 0);
        assert_eq!(carbon[28], 1.0);
        assert_eq!(carbon[29], 1.0);
    }

    #[test]
    fn directed_edges_pair_up() {
        let propane = Molecule::from_smiles("CCC").unwrap();
        let graph = MolGraph::from_molecule(&propane);
        assert_eq!(graph.atom_count(), 3);
        assert_eq!(graph.edge_count(), 4);
        for edge in 0..graph.edge_count() {
            let reverse = MolGraph::reverse_edge(edge);
            assert_eq!(graph.edge_source[edge], graph.edge_target[reverse]);
            assert_eq!(graph.edge_target[edge], graph.edge_source[reverse]);
        }
        assert_eq!(graph.incoming[1].len(), 2);
    }
}
