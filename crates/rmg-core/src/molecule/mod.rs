//! Heavy-atom molecular graph with implicit hydrogen counts.

pub mod smiles;

pub use smiles::SmilesError;

use crate::common::Element;
use crate::common::constants::GAS_CONSTANT;
use crate::domain::RmgError;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl BondOrder {
    /// Sigma-plus-pi valence used for hydrogen counting. Aromatic bonds count
    /// as one; the shared pi electron is added per atom.
    pub const fn valence(self) -> u8 {
        match self {
            Self::Single | Self::Aromatic => 1,
            Self::Double => 2,
            Self::Triple => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Atom {
    pub element: Element,
    pub charge: i8,
    pub implicit_hydrogens: u8,
    pub aromatic: bool,
    pub in_ring: bool,
}

impl Atom {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            charge: 0,
            implicit_hydrogens: 0,
            aromatic: false,
            in_ring: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bond {
    pub begin: usize,
    pub end: usize,
    pub order: BondOrder,
    pub in_ring: bool,
}

impl Bond {
    pub fn other(&self, atom: usize) -> Option<usize> {
        if self.begin == atom {
            Some(self.end)
        } else if self.end == atom {
            Some(self.begin)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Molecule {
    atoms: Vec<Atom>,
    bonds: Vec<Bond>,
}

impl Molecule {
    /// Builds the graph and perceives ring membership. Incoming `in_ring`
    /// flags are recomputed.
    pub fn new(atoms: Vec<Atom>, bonds: Vec<Bond>) -> Self {
        let mut molecule = Self { atoms, bonds };
        molecule.perceive_rings();
        molecule
    }

    pub fn from_smiles(smiles: &str) -> Result<Self, SmilesError> {
        smiles::parse_smiles(smiles)
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn neighbors(&self, atom: usize) -> Vec<usize> {
        self.bonds.iter().filter_map(|bond| bond.other(atom)).collect()
    }

    pub fn bonds_of(&self, atom: usize) -> impl Iterator<Item = &Bond> + '_ {
        self.bonds.iter().filter(move |bond| bond.other(atom).is_some())
    }

    /// Neighbours in the graph plus implicit hydrogens.
    pub fn total_degree(&self, atom: usize) -> usize {
        self.neighbors(atom).len() + usize::from(self.atoms[atom].implicit_hydrogens)
    }

    /// All atoms including implicit hydrogens.
    pub fn atom_count(&self) -> usize {
        self.atoms.len() + self.implicit_hydrogen_count()
    }

    pub fn heavy_atom_count(&self) -> usize {
        self.atoms
            .iter()
            .filter(|atom| !atom.element.is_hydrogen())
            .count()
    }

    fn implicit_hydrogen_count(&self) -> usize {
        self.atoms
            .iter()
            .map(|atom| usize::from(atom.implicit_hydrogens))
            .sum()
    }

    /// Every implicit hydrogen becomes a graph atom, appended after the
    /// existing atoms in atom order.
    pub fn with_explicit_hydrogens(&self) -> Self {
        let mut atoms = self.atoms.clone();
        let mut bonds = self.bonds.clone();
        for (index, atom) in self.atoms.iter().enumerate() {
            for _ in 0..atom.implicit_hydrogens {
                atoms.push(Atom::new(Element::hydrogen()));
                bonds.push(Bond {
                    begin: index,
                    end: atoms.len() - 1,
                    order: BondOrder::Single,
                    in_ring: false,
                });
            }
            atoms[index].implicit_hydrogens = 0;
        }
        Self::new(atoms, bonds)
    }

    /// Folds neutral, singly bonded hydrogens back into their heavy
    /// neighbour's implicit count. Hydrogens bonded to hydrogen stay.
    pub fn without_explicit_hydrogens(&self) -> Self {
        let removable: Vec<Option<usize>> = (0..self.atoms.len())
            .map(|index| {
                let atom = &self.atoms[index];
                if !atom.element.is_hydrogen() || atom.charge != 0 || atom.implicit_hydrogens != 0
                {
                    return None;
                }
                match self.bonds_of(index).collect::<Vec<_>>().as_slice() {
                    [bond] if bond.order == BondOrder::Single => bond
                        .other(index)
                        .filter(|parent| !self.atoms[*parent].element.is_hydrogen()),
                    _ => None,
                }
            })
            .collect();

        let mut remap = vec![usize::MAX; self.atoms.len()];
        let mut atoms = Vec::with_capacity(self.atoms.len());
        for (index, atom) in self.atoms.iter().enumerate() {
            if removable[index].is_none() {
                remap[index] = atoms.len();
                atoms.push(atom.clone());
            }
        }
        for parent in removable.iter().flatten() {
            let atom = &mut atoms[remap[*parent]];
            atom.implicit_hydrogens = atom.implicit_hydrogens.saturating_add(1);
        }

        let bonds = self
            .bonds
            .iter()
            .filter(|bond| removable[bond.begin].is_none() && removable[bond.end].is_none())
            .map(|bond| Bond {
                begin: remap[bond.begin],
                end: remap[bond.end],
                order: bond.order,
                in_ring: bond.in_ring,
            })
            .collect();
        Self::new(atoms, bonds)
    }

    /// g/mol, standard atomic weights.
    pub fn molecular_weight(&self) -> f64 {
        let hydrogen = Element::hydrogen().standard_weight();
        self.atoms
            .iter()
            .map(|atom| {
                atom.element.standard_weight() + f64::from(atom.implicit_hydrogens) * hydrogen
            })
            .sum()
    }

    /// Hill-order formula: C, then H, then the rest alphabetically. Without
    /// carbon every element is alphabetical.
    pub fn formula(&self) -> String {
        let mut counts: BTreeMap<&'static str, usize> = BTreeMap::new();
        for atom in &self.atoms {
            *counts.entry(atom.element.symbol()).or_default() += 1;
        }
        let implicit = self.implicit_hydrogen_count();
        if implicit > 0 {
            *counts.entry("H").or_default() += implicit;
        }

        let mut formula = String::new();
        let mut push = |symbol: &str, count: usize| {
            formula.push_str(symbol);
            if count > 1 {
                formula.push_str(&count.to_string());
            }
        };
        if let Some(carbon) = counts.remove("C") {
            push("C", carbon);
            if let Some(hydrogen) = counts.remove("H") {
                push("H", hydrogen);
            }
        }
        for (symbol, count) in counts {
            push(symbol, count);
        }
        formula
    }

    /// Linear when at most two atoms, or acyclic with every two-coordinate
    /// atom sp-hybridized (a triple bond or two double bonds).
    pub fn is_linear(&self) -> bool {
        match self.atom_count() {
            0 | 1 => return false,
            2 => return true,
            _ => {}
        }
        if self.bonds.iter().any(|bond| bond.in_ring) {
            return false;
        }

        (0..self.atoms.len()).all(|index| match self.total_degree(index) {
            0 | 1 => true,
            2 => {
                let orders: Vec<BondOrder> = self.bonds_of(index).map(|bond| bond.order).collect();
                orders.contains(&BondOrder::Triple)
                    || orders
                        .iter()
                        .filter(|order| **order == BondOrder::Double)
                        .count()
                        == 2
            }
            _ => false,
        })
    }

    /// Single, non-ring bonds whose ends both carry another substituent
    /// (hydrogens included) and neither end is sp-hybridized.
    pub fn rotor_count(&self) -> usize {
        self.bonds
            .iter()
            .filter(|bond| bond.order == BondOrder::Single && !bond.in_ring)
            .filter(|bond| {
                [bond.begin, bond.end].iter().all(|atom| {
                    self.total_degree(*atom) >= 2
                        && !self
                            .bonds_of(*atom)
                            .any(|other| other.order == BondOrder::Triple)
                })
            })
            .count()
    }

    /// Low-temperature limit of Cp, J/(mol*K).
    pub fn calculate_cp0(&self) -> f64 {
        if self.atom_count() == 1 {
            2.5 * GAS_CONSTANT
        } else if self.is_linear() {
            3.5 * GAS_CONSTANT
        } else {
            4.0 * GAS_CONSTANT
        }
    }

    /// High-temperature limit of Cp, J/(mol*K). Internal rotors count as
    /// free rotors (R/2) instead of oscillators (R).
    pub fn calculate_cp_inf(&self) -> f64 {
        let atoms = self.atom_count();
        if atoms == 1 {
            return self.calculate_cp0();
        }
        let vibrations = if self.is_linear() {
            3 * atoms - 5
        } else {
            3 * atoms - 6
        };
        let rotors = self.rotor_count().min(vibrations);
        self.calculate_cp0()
            + (vibrations - rotors) as f64 * GAS_CONSTANT
            + rotors as f64 * 0.5 * GAS_CONSTANT
    }

    /// A bond lies on a ring exactly when removing it leaves its ends
    /// connected.
    fn perceive_rings(&mut self) {
        for bond_index in 0..self.bonds.len() {
            let in_ring = self.connected_without(bond_index);
            self.bonds[bond_index].in_ring = in_ring;
        }
        for atom in &mut self.atoms {
            atom.in_ring = false;
        }
        for bond in &self.bonds {
            if bond.in_ring {
                self.atoms[bond.begin].in_ring = true;
                self.atoms[bond.end].in_ring = true;
            }
        }
    }

    fn connected_without(&self, skipped: usize) -> bool {
        let target = self.bonds[skipped].end;
        let mut visited = vec![false; self.atoms.len()];
        let mut queue = VecDeque::from([self.bonds[skipped].begin]);
        visited[self.bonds[skipped].begin] = true;

        while let Some(atom) = queue.pop_front() {
            for (index, bond) in self.bonds.iter().enumerate() {
                if index == skipped {
                    continue;
                }
                let Some(next) = bond.other(atom) else {
                    continue;
                };
                if next == target {
                    return true;
                }
                if !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }
        false
    }
}

impl From<SmilesError> for RmgError {
    fn from(error: SmilesError) -> Self {
        RmgError::input_validation("INPUT.SMILES", error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{BondOrder, Molecule};
    use crate::common::constants::GAS_CONSTANT;

    fn parse(smiles: &str) -> Molecule {
        Molecule::from_smiles(smiles).unwrap_or_else(|error| panic!("{smiles}: {error}"))
    }

    #[test]
    fn bicyclobutane_counts_and_rings() {
        let molecule = parse("C1C2C1C2");
        assert_eq!(molecule.heavy_atom_count(), 4);
        assert_eq!(molecule.atom_count(), 10);
        assert_eq!(molecule.formula(), "C4H6");
        assert!(molecule.atoms().iter().all(|atom| atom.in_ring));
        assert!(molecule.bonds().iter().all(|bond| bond.in_ring));
        assert_eq!(molecule.rotor_count(), 0);
        assert!((molecule.calculate_cp0() - 4.0 * GAS_CONSTANT).abs() < 1.0e-12);
        assert!((molecule.calculate_cp_inf() - 28.0 * GAS_CONSTANT).abs() < 1.0e-9);
    }

    #[test]
    fn chain_bonds_are_not_ring_bonds() {
        let molecule = parse("CC1CC1");
        assert!(!molecule.bonds()[0].in_ring);
        assert!(!molecule.atoms()[0].in_ring);
        assert!(molecule.atoms()[1].in_ring);
    }

    #[test]
    fn linearity_heuristic() {
        assert!(parse("O=C=O").is_linear());
        assert!(parse("C#N").is_linear());
        assert!(parse("C#C").is_linear());
        assert!(parse("[H][H]").is_linear());
        assert!(!parse("O").is_linear());
        assert!(!parse("C=C").is_linear());
        assert!(!parse("[Ar]").is_linear());
        assert!((parse("O=C=O").calculate_cp0() - 3.5 * GAS_CONSTANT).abs() < 1.0e-12);
        assert!((parse("[Ar]").calculate_cp_inf() - 2.5 * GAS_CONSTANT).abs() < 1.0e-12);
    }

    #[test]
    fn rotor_counting() {
        assert_eq!(parse("CC").rotor_count(), 1);
        assert_eq!(parse("CCO").rotor_count(), 2);
        assert_eq!(parse("C1CCCCC1").rotor_count(), 0);
        assert_eq!(parse("CC#C").rotor_count(), 0);
        // Ethane: 18 modes, one of them a free rotor.
        let ethane = parse("CC");
        let expected = 4.0 * GAS_CONSTANT + 17.0 * GAS_CONSTANT + 0.5 * GAS_CONSTANT;
        assert!((ethane.calculate_cp_inf() - expected).abs() < 1.0e-9);
    }

    #[test]
    fn explicit_hydrogens_round_trip() {
        let ethanol = parse("CCO");
        let explicit = ethanol.with_explicit_hydrogens();
        assert_eq!(explicit.atoms().len(), 9);
        assert!(explicit.atoms().iter().all(|atom| atom.implicit_hydrogens == 0));
        assert_eq!(explicit.atom_count(), ethanol.atom_count());
        assert_eq!(explicit.formula(), "C2H6O");

        let folded = explicit.without_explicit_hydrogens();
        assert_eq!(folded, ethanol);
    }

    #[test]
    fn molecular_weight_and_formula() {
        let water = parse("O");
        assert!((water.molecular_weight() - 18.015).abs() < 1.0e-9);
        assert_eq!(water.formula(), "H2O");
        assert_eq!(parse("[NH4+]").formula(), "H4N");
        assert_eq!(parse("ClC(Cl)Cl").formula(), "CHCl3");
    }

    #[test]
    fn aromatic_bonds_are_detected() {
        let benzene = parse("c1ccccc1");
        assert!(benzene
            .bonds()
            .iter()
            .all(|bond| bond.order == BondOrder::Aromatic && bond.in_ring));
        assert_eq!(benzene.formula(), "C6H6");
    }
}
