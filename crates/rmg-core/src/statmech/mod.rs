//! Statistical-mechanics degrees of freedom and their aggregate, the
//! [`Conformer`].
//!
//! All thermodynamic functions are per mole, SI units, and take `T > 0` K.
//! Enthalpies are relative to the ground state (E0 excluded).

pub mod conformer;
pub mod modes;

pub use conformer::Conformer;
pub use modes::{
    HarmonicOscillator, HinderedRotor, IdealGasTranslation, LinearRotor, Mode, NonlinearRotor,
};
