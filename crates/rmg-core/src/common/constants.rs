//! Physical constants (CODATA 2018 exact or recommended values) and the unit
//! conversions used when reading electronic-structure logs.

pub const PI: f64 = std::f64::consts::PI;
pub const AVOGADRO: f64 = 6.022_140_76e23;
pub const BOLTZMANN: f64 = 1.380_649e-23;
pub const PLANCK: f64 = 6.626_070_15e-34;
pub const HBAR: f64 = PLANCK / (2.0 * PI);
/// Speed of light in m/s.
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;
pub const GAS_CONSTANT: f64 = AVOGADRO * BOLTZMANN;
/// Hartree energy in J.
pub const HARTREE: f64 = 4.359_744_722_207_1e-18;
/// Bohr radius in m.
pub const BOHR_RADIUS: f64 = 0.529_177_210_903e-10;
/// Atomic mass unit in kg.
pub const AMU: f64 = 1.660_539_066_60e-27;
pub const ANGSTROM: f64 = 1.0e-10;
pub const CALORIE: f64 = 4.184;

pub const HARTREE_TO_J_PER_MOL: f64 = HARTREE * AVOGADRO;
pub const KCAL_PER_MOL_TO_J_PER_MOL: f64 = 4184.0;
/// Hartree/bohr^2 to J/m^2.
pub const HESSIAN_AU_TO_SI: f64 = HARTREE / (BOHR_RADIUS * BOHR_RADIUS);
/// amu*angstrom^2 to kg*m^2.
pub const AMU_ANGSTROM2_TO_KG_M2: f64 = AMU * ANGSTROM * ANGSTROM;

/// Standard-state pressure in Pa.
pub const STANDARD_PRESSURE: f64 = 1.0e5;
/// Reference temperature for tabulated formation data, K.
pub const REFERENCE_TEMPERATURE: f64 = 298.15;
