use super::modes::{HarmonicOscillator, IdealGasTranslation, Mode};
use crate::common::ScalarQuantity;
use crate::common::constants::GAS_CONSTANT;
use serde::Serialize;

/// Ground-state energy plus the molecular degrees of freedom.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conformer {
    /// Ground-state energy including zero-point energy, J/mol.
    pub e0: ScalarQuantity,
    pub modes: Vec<Mode>,
    pub spin_multiplicity: u32,
    pub optical_isomers: u32,
}

impl Conformer {
    pub fn new(
        e0: ScalarQuantity,
        modes: Vec<Mode>,
        spin_multiplicity: u32,
        optical_isomers: u32,
    ) -> Self {
        Self {
            e0,
            modes,
            spin_multiplicity,
            optical_isomers,
        }
    }

    pub fn translation(&self) -> Option<&IdealGasTranslation> {
        self.modes.iter().find_map(|mode| match mode {
            Mode::IdealGasTranslation(translation) => Some(translation),
            _ => None,
        })
    }

    pub fn rotor(&self) -> Option<&Mode> {
        self.modes.iter().find(|mode| mode.is_rotor())
    }

    pub fn harmonic_oscillator(&self) -> Option<&HarmonicOscillator> {
        self.modes.iter().find_map(|mode| match mode {
            Mode::HarmonicOscillator(oscillator) => Some(oscillator),
            _ => None,
        })
    }

    pub fn count_modes(&self, predicate: impl Fn(&Mode) -> bool) -> usize {
        self.modes.iter().filter(|mode| predicate(mode)).count()
    }

    pub fn partition_function(&self, temperature: f64) -> f64 {
        self.modes
            .iter()
            .map(|mode| mode.partition_function(temperature))
            .product::<f64>()
            * self.degeneracy()
    }

    pub fn heat_capacity(&self, temperature: f64) -> f64 {
        self.modes
            .iter()
            .map(|mode| mode.heat_capacity(temperature))
            .sum()
    }

    /// Thermal enthalpy above E0.
    pub fn enthalpy(&self, temperature: f64) -> f64 {
        self.modes.iter().map(|mode| mode.enthalpy(temperature)).sum()
    }

    pub fn entropy(&self, temperature: f64) -> f64 {
        self.modes
            .iter()
            .map(|mode| mode.entropy(temperature))
            .sum::<f64>()
            + GAS_CONSTANT * self.degeneracy().ln()
    }

    pub fn free_energy(&self, temperature: f64) -> f64 {
        self.enthalpy(temperature) - temperature * self.entropy(temperature)
    }

    pub fn zero_point_energy(&self) -> f64 {
        self.modes
            .iter()
            .map(|mode| match mode {
                Mode::HarmonicOscillator(oscillator) => oscillator.zero_point_energy(),
                _ => 0.0,
            })
            .sum()
    }

    fn degeneracy(&self) -> f64 {
        f64::from(self.spin_multiplicity.max(1)) * f64::from(self.optical_isomers.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::Conformer;
    use crate::common::constants::GAS_CONSTANT;
    use crate::common::{ArrayQuantity, ScalarQuantity, Units};
    use crate::statmech::{HarmonicOscillator, IdealGasTranslation, Mode, NonlinearRotor};

    fn water(spin_multiplicity: u32) -> Conformer {
        Conformer::new(
            ScalarQuantity::new(-1.0e5, Units::JPerMol),
            vec![
                Mode::IdealGasTranslation(IdealGasTranslation::new(ScalarQuantity::new(
                    18.010_565,
                    Units::Amu,
                ))),
                Mode::NonlinearRotor(NonlinearRotor::new(
                    ArrayQuantity::new(vec![0.614, 1.155, 1.769], Units::AmuAngstrom2),
                    2,
                )),
                Mode::HarmonicOscillator(HarmonicOscillator::new(ArrayQuantity::new(
                    vec![1594.6, 3656.7, 3755.8],
                    Units::CmInverse,
                ))),
            ],
            spin_multiplicity,
            1,
        )
    }

    #[test]
    fn accessors_find_each_kind_of_mode() {
        let conformer = water(1);
        assert!(conformer.translation().is_some());
        assert!(matches!(conformer.rotor(), Some(Mode::NonlinearRotor(_))));
        assert_eq!(conformer.harmonic_oscillator().map(HarmonicOscillator::len), Some(3));
        assert_eq!(conformer.count_modes(|mode| mode.is_rotor()), 1);
        assert_eq!(
            conformer.count_modes(|mode| matches!(mode, Mode::HarmonicOscillator(_))),
            1
        );
    }

    #[test]
    fn water_entropy_and_heat_capacity_are_physical() {
        let conformer = water(1);
        let entropy = conformer.entropy(298.15);
        assert!((entropy - 188.8).abs() < 1.0, "entropy {entropy}");
        let cp = conformer.heat_capacity(298.15);
        // Vibrations are barely excited at room temperature.
        let vibrational = cp - 4.0 * GAS_CONSTANT;
        assert!(vibrational > 0.0 && vibrational < 0.5, "cp {cp}");
        assert!((conformer.zero_point_energy() - 53_874.42).abs() < 0.1);
    }

    #[test]
    fn spin_degeneracy_adds_r_ln_multiplicity() {
        let singlet = water(1);
        let triplet = water(3);
        let difference = triplet.entropy(500.0) - singlet.entropy(500.0);
        assert!((difference - GAS_CONSTANT * 3.0_f64.ln()).abs() < 1.0e-10);
        assert_eq!(triplet.heat_capacity(500.0), singlet.heat_capacity(500.0));
        let free_energy = singlet.free_energy(500.0);
        assert!(
            (free_energy - (singlet.enthalpy(500.0) - 500.0 * singlet.entropy(500.0))).abs()
                < 1.0e-9
        );
    }
}
