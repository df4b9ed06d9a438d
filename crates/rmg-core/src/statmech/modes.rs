use crate::common::constants::{
    AVOGADRO, BOLTZMANN, GAS_CONSTANT, PI, PLANCK, SPEED_OF_LIGHT, STANDARD_PRESSURE,
};
use crate::common::{ArrayQuantity, ScalarQuantity};
use crate::numerics::{bessel_i0e, bessel_i1e};
use serde::Serialize;

/// Speed of light in cm/s, so `h * c * nu` takes wavenumbers directly.
const SPEED_OF_LIGHT_CM: f64 = SPEED_OF_LIGHT * 100.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Mode {
    IdealGasTranslation(IdealGasTranslation),
    LinearRotor(LinearRotor),
    NonlinearRotor(NonlinearRotor),
    HarmonicOscillator(HarmonicOscillator),
    HinderedRotor(HinderedRotor),
}

impl Mode {
    pub fn partition_function(&self, temperature: f64) -> f64 {
        match self {
            Self::IdealGasTranslation(mode) => mode.partition_function(temperature),
            Self::LinearRotor(mode) => mode.partition_function(temperature),
            Self::NonlinearRotor(mode) => mode.partition_function(temperature),
            Self::HarmonicOscillator(mode) => mode.partition_function(temperature),
            Self::HinderedRotor(mode) => mode.partition_function(temperature),
        }
    }

    pub fn heat_capacity(&self, temperature: f64) -> f64 {
        match self {
            Self::IdealGasTranslation(mode) => mode.heat_capacity(temperature),
            Self::LinearRotor(mode) => mode.heat_capacity(temperature),
            Self::NonlinearRotor(mode) => mode.heat_capacity(temperature),
            Self::HarmonicOscillator(mode) => mode.heat_capacity(temperature),
            Self::HinderedRotor(mode) => mode.heat_capacity(temperature),
        }
    }

    pub fn enthalpy(&self, temperature: f64) -> f64 {
        match self {
            Self::IdealGasTranslation(mode) => mode.enthalpy(temperature),
            Self::LinearRotor(mode) => mode.enthalpy(temperature),
            Self::NonlinearRotor(mode) => mode.enthalpy(temperature),
            Self::HarmonicOscillator(mode) => mode.enthalpy(temperature),
            Self::HinderedRotor(mode) => mode.enthalpy(temperature),
        }
    }

    pub fn entropy(&self, temperature: f64) -> f64 {
        match self {
            Self::IdealGasTranslation(mode) => mode.entropy(temperature),
            Self::LinearRotor(mode) => mode.entropy(temperature),
            Self::NonlinearRotor(mode) => mode.entropy(temperature),
            Self::HarmonicOscillator(mode) => mode.entropy(temperature),
            Self::HinderedRotor(mode) => mode.entropy(temperature),
        }
    }

    pub fn is_rotor(&self) -> bool {
        matches!(self, Self::LinearRotor(_) | Self::NonlinearRotor(_))
    }
}

/// Ideal-gas translation at the standard pressure. The `pV = RT` term is
/// included, so `Cp = 5/2 R`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdealGasTranslation {
    /// Amu.
    pub mass: ScalarQuantity,
}

impl IdealGasTranslation {
    pub fn new(mass: ScalarQuantity) -> Self {
        Self { mass }
    }

    pub fn partition_function(&self, temperature: f64) -> f64 {
        let mass = self.mass.value_si();
        let thermal = 2.0 * PI * mass * BOLTZMANN * temperature / (PLANCK * PLANCK);
        thermal.powf(1.5) * BOLTZMANN * temperature / STANDARD_PRESSURE
    }

    pub fn heat_capacity(&self, _temperature: f64) -> f64 {
        2.5 * GAS_CONSTANT
    }

    pub fn enthalpy(&self, temperature: f64) -> f64 {
        2.5 * GAS_CONSTANT * temperature
    }

    pub fn entropy(&self, temperature: f64) -> f64 {
        GAS_CONSTANT * (self.partition_function(temperature).ln() + 2.5)
    }
}

/// Classical rigid rotor, linear molecule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinearRotor {
    /// Amu*angstrom^2.
    pub inertia: ScalarQuantity,
    pub symmetry: u32,
}

impl LinearRotor {
    pub fn new(inertia: ScalarQuantity, symmetry: u32) -> Self {
        Self { inertia, symmetry }
    }

    pub fn partition_function(&self, temperature: f64) -> f64 {
        rotational_factor(self.inertia.value_si(), temperature) / f64::from(self.symmetry.max(1))
    }

    pub fn heat_capacity(&self, _temperature: f64) -> f64 {
        GAS_CONSTANT
    }

    pub fn enthalpy(&self, temperature: f64) -> f64 {
        GAS_CONSTANT * temperature
    }

    pub fn entropy(&self, temperature: f64) -> f64 {
        GAS_CONSTANT * (self.partition_function(temperature).ln() + 1.0)
    }
}

/// Classical rigid rotor with three principal moments.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NonlinearRotor {
    /// Amu*angstrom^2, three principal moments.
    pub inertia: ArrayQuantity,
    pub symmetry: u32,
}

impl NonlinearRotor {
    pub fn new(inertia: ArrayQuantity, symmetry: u32) -> Self {
        Self { inertia, symmetry }
    }

    pub fn partition_function(&self, temperature: f64) -> f64 {
        let product: f64 = self
            .inertia
            .values_si()
            .into_iter()
            .map(|moment| rotational_factor(moment, temperature))
            .product();
        PI.sqrt() * product.sqrt() / f64::from(self.symmetry.max(1))
    }

    pub fn heat_capacity(&self, _temperature: f64) -> f64 {
        1.5 * GAS_CONSTANT
    }

    pub fn enthalpy(&self, temperature: f64) -> f64 {
        1.5 * GAS_CONSTANT * temperature
    }

    pub fn entropy(&self, temperature: f64) -> f64 {
        GAS_CONSTANT * (self.partition_function(temperature).ln() + 1.5)
    }
}

/// Quantum harmonic oscillators referenced to their ground state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HarmonicOscillator {
    /// Wavenumbers in cm^-1, in the order they were read.
    pub frequencies: ArrayQuantity,
}

impl HarmonicOscillator {
    pub fn new(frequencies: ArrayQuantity) -> Self {
        Self { frequencies }
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn partition_function(&self, temperature: f64) -> f64 {
        self.reduced_energies(temperature)
            .map(|x| 1.0 / (1.0 - (-x).exp()))
            .product()
    }

    pub fn heat_capacity(&self, temperature: f64) -> f64 {
        GAS_CONSTANT
            * self
                .reduced_energies(temperature)
                .map(|x| {
                    let exp_minus = (-x).exp();
                    x * x * exp_minus / ((1.0 - exp_minus) * (1.0 - exp_minus))
                })
                .sum::<f64>()
    }

    pub fn enthalpy(&self, temperature: f64) -> f64 {
        GAS_CONSTANT
            * temperature
            * self
                .reduced_energies(temperature)
                .map(|x| x / x.exp_m1())
                .sum::<f64>()
    }

    pub fn entropy(&self, temperature: f64) -> f64 {
        GAS_CONSTANT
            * self
                .reduced_energies(temperature)
                .map(|x| x / x.exp_m1() - (-(-x).exp()).ln_1p())
                .sum::<f64>()
    }

    /// `sum(h c nu / 2) * N_A`, J/mol.
    pub fn zero_point_energy(&self) -> f64 {
        self.frequencies
            .values()
            .iter()
            .map(|wavenumber| 0.5 * PLANCK * SPEED_OF_LIGHT_CM * wavenumber * AVOGADRO)
            .sum()
    }

    fn reduced_energies(&self, temperature: f64) -> impl Iterator<Item = f64> + '_ {
        let scale = PLANCK * SPEED_OF_LIGHT_CM / (BOLTZMANN * temperature);
        self.frequencies
            .values()
            .iter()
            .filter(|wavenumber| **wavenumber > 0.0)
            .map(move |wavenumber| wavenumber * scale)
    }
}

/// One-dimensional classical rotor in `V(phi) = V0/2 (1 - cos(sigma phi))`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HinderedRotor {
    /// Reduced moment, amu*angstrom^2.
    pub inertia: ScalarQuantity,
    pub symmetry: u32,
    /// Barrier height V0, J/mol.
    pub barrier: ScalarQuantity,
}

impl HinderedRotor {
    pub fn new(inertia: ScalarQuantity, symmetry: u32, barrier: ScalarQuantity) -> Self {
        Self {
            inertia,
            symmetry,
            barrier,
        }
    }

    pub fn partition_function(&self, temperature: f64) -> f64 {
        self.log_partition_function(temperature).exp()
    }

    pub fn heat_capacity(&self, temperature: f64) -> f64 {
        let z = self.reduced_barrier(temperature);
        let ratio = bessel_ratio(z);
        GAS_CONSTANT * (0.5 + z * z * (1.0 - ratio * ratio) - z * ratio)
    }

    pub fn enthalpy(&self, temperature: f64) -> f64 {
        let ratio = bessel_ratio(self.reduced_barrier(temperature));
        0.5 * GAS_CONSTANT * temperature + 0.5 * self.barrier.value_si() * (1.0 - ratio)
    }

    pub fn entropy(&self, temperature: f64) -> f64 {
        GAS_CONSTANT * self.log_partition_function(temperature)
            + self.enthalpy(temperature) / temperature
    }

    fn log_partition_function(&self, temperature: f64) -> f64 {
        let inertia = self.inertia.value_si();
        let free = (8.0 * PI.powi(3) * inertia * BOLTZMANN * temperature).sqrt()
            / (f64::from(self.symmetry.max(1)) * PLANCK);
        // exp(-z) I0(z) is exactly the scaled Bessel function.
        free.ln() + bessel_i0e(self.reduced_barrier(temperature)).ln()
    }

    fn reduced_barrier(&self, temperature: f64) -> f64 {
        self.barrier.value_si() / (2.0 * GAS_CONSTANT * temperature)
    }
}

fn rotational_factor(inertia_si: f64, temperature: f64) -> f64 {
    8.0 * PI * PI * inertia_si * BOLTZMANN * temperature / (PLANCK * PLANCK)
}

fn bessel_ratio(z: f64) -> f64 {
    bessel_i1e(z) / bessel_i0e(z)
}
