//! Reader for Psi4 output logs.

pub mod parser;

use crate::common::constants::{HARTREE_TO_J_PER_MOL, HESSIAN_AU_TO_SI, KCAL_PER_MOL_TO_J_PER_MOL};
use crate::domain::EssProgram;
use crate::ess::{EssAdapter, Geometry, LogError};
use crate::numerics::DenseMatrix;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A Psi4 log held in memory. Construction fails if the job reported an
/// error, so every query runs against a log of a completed calculation.
#[derive(Debug, Clone)]
pub struct Psi4Log {
    path: PathBuf,
    text: String,
}

impl Psi4Log {
    pub fn new(path: impl AsRef<Path>) -> Result<Self, LogError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| LogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_text(path, text)
    }

    pub fn from_text(path: impl Into<PathBuf>, text: String) -> Result<Self, LogError> {
        let path = path.into();
        if let Some((line, reason)) = parser::find_failure(&text) {
            return Err(LogError::ReportedFailure {
                program: EssProgram::Psi4,
                path,
                line,
                reason,
            });
        }
        if !parser::terminated_normally(&text) {
            warn!(
                path = %path.display(),
                "log lacks '{}'; the job may have been interrupted",
                parser::SUCCESS_MARKER
            );
        }
        debug!(path = %path.display(), bytes = text.len(), "loaded Psi4 log");
        Ok(Self { path, text })
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl EssAdapter for Psi4Log {
    fn program(&self) -> EssProgram {
        EssProgram::Psi4
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn load_geometry(&self) -> Result<Geometry, LogError> {
        parser::parse_geometry(&self.text).map(|(geometry, _)| geometry)
    }

    fn load_energy(&self) -> Result<f64, LogError> {
        Ok(parser::parse_energy(&self.text)? * HARTREE_TO_J_PER_MOL)
    }

    fn load_zero_point_energy(&self) -> Result<f64, LogError> {
        Ok(parser::parse_zero_point_energy(&self.text)? * KCAL_PER_MOL_TO_J_PER_MOL)
    }

    fn load_force_constant_matrix(&self) -> Result<DenseMatrix, LogError> {
        let atoms = self.get_number_of_atoms()?;
        let hessian = parser::parse_hessian(&self.text)?;
        if hessian.dimension != 3 * atoms {
            return Err(LogError::DimensionMismatch {
                section: "Hessian",
                expected: 3 * atoms,
                actual: hessian.dimension,
            });
        }

        let dimension = hessian.dimension;
        let mut matrix = DenseMatrix::zeros(dimension, dimension);
        for row in 0..dimension {
            for col in 0..dimension {
                matrix[(row, col)] = hessian.values[row * dimension + col] * HESSIAN_AU_TO_SI;
            }
        }
        debug!(path = %self.path.display(), dimension, "loaded force-constant matrix");
        Ok(matrix)
    }

    fn load_frequencies(&self) -> Result<Vec<f64>, LogError> {
        parser::parse_frequencies(&self.text)
    }

    fn load_spin_multiplicity(&self) -> Result<u32, LogError> {
        parser::parse_geometry(&self.text).map(|(_, multiplicity)| multiplicity)
    }

    fn load_rotational_symmetry_number(&self) -> Result<u32, LogError> {
        Ok(parser::parse_rotational_symmetry_number(&self.text)?.unwrap_or(1))
    }
}

#[cfg(test)]
mod tests {
    use super::Psi4Log;
    use crate::common::Units;
    use crate::ess::{EssAdapter, LogError};
    use crate::statmech::Mode;

    const MINIMAL_LOG: &str = "\
  Psi4: An Open-Source Ab Initio Electronic Structure Package

    Geometry (in Angstrom), charge = 0, multiplicity = 2:

       Center              X                  Y                   Z               Mass
    ------------   -----------------  -----------------  -----------------  -----------------
         H            0.000000000000     0.000000000000     0.000000000000     1.007825032230

    Total Energy =                        -0.4982329107
";

    #[test]
    fn single_atom_conformer_has_translation_only() {
        let log = Psi4Log::from_text("h.out", MINIMAL_LOG.to_string()).expect("log");
        assert_eq!(log.get_number_of_atoms().expect("atoms"), 1);
        assert_eq!(log.load_spin_multiplicity().expect("spin"), 2);
        assert_eq!(log.load_rotational_symmetry_number().expect("symmetry"), 1);

        let (conformer, frequencies) = log.load_conformer().expect("conformer");
        assert_eq!(conformer.modes.len(), 1);
        assert!(frequencies.is_empty());
        assert_eq!(conformer.spin_multiplicity, 2);
        assert!((conformer.e0.value_si() - log.load_energy().expect("energy")).abs() < 1.0e-9);
    }

    const CARBON_DIOXIDE_LOG: &str = "\
  Psi4: An Open-Source Ab Initio Electronic Structure Package

    Geometry (in Angstrom), charge = 0, multiplicity = 1:

       Center              X                  Y                   Z               Mass
    ------------   -----------------  -----------------  -----------------  -----------------
         C            0.000000000000     0.000000000000     0.000000000000    12.000000000000
         O            0.000000000000     0.000000000000    -1.160000000000    15.994914619570
         O            0.000000000000     0.000000000000     1.160000000000    15.994914619570

    Total Energy =                      -187.6254031543

  ==> Harmonic Vibrational Analysis <==
  Freq [cm^-1]                   667.3811           667.3811          1372.5310
  Freq [cm^-1]                   2436.9014

  ==> Thermochemistry Components <==
  Rotational symmetry number = 2
  Correction ZPE                  7.214 [kcal/mol]      30.183 [kJ/mol]

    Psi4 exiting successfully. Buy a developer a beer!
";

    #[test]
    fn linear_molecule_gets_a_linear_rotor() {
        let log = Psi4Log::from_text("co2.out", CARBON_DIOXIDE_LOG.to_string()).expect("log");
        assert!(log.load_geometry().expect("geometry").is_linear().expect("linearity"));
        assert_eq!(log.load_rotational_symmetry_number().expect("symmetry"), 2);

        let (conformer, frequencies) = log.load_conformer().expect("conformer");
        assert_eq!(conformer.modes.len(), 3);
        assert!(matches!(conformer.modes[0], Mode::IdealGasTranslation(_)));
        match &conformer.modes[1] {
            Mode::LinearRotor(rotor) => {
                let expected = 2.0 * 15.994_914_619_57 * 1.16 * 1.16;
                assert!((rotor.inertia.value - expected).abs() < 1.0e-9);
                assert_eq!(rotor.inertia.units, Units::AmuAngstrom2);
                assert_eq!(rotor.symmetry, 2);
            }
            other => panic!("expected a linear rotor, got {other:?}"),
        }
        match &conformer.modes[2] {
            Mode::HarmonicOscillator(oscillator) => {
                // 3N - 5 for a linear triatomic.
                assert_eq!(oscillator.frequencies.len(), 4);
                assert_eq!(oscillator.frequencies.values(), frequencies.as_slice());
            }
            other => panic!("expected harmonic oscillator, got {other:?}"),
        }
        assert_eq!(frequencies, vec![667.3811, 667.3811, 1372.531, 2436.9014]);

        let e0 = log.load_energy().expect("energy") + log.load_zero_point_energy().expect("zpe");
        assert!((conformer.e0.value_si() - e0).abs() < 1.0e-6);
    }

    #[test]
    fn reported_failure_rejects_construction() {
        let text = format!("{MINIMAL_LOG}\nCould not converge SCF iterations in 100 iterations.\n");
        let error = Psi4Log::from_text("scf.out", text).expect_err("failed job");
        match error {
            LogError::ReportedFailure { line, reason, .. } => {
                assert_eq!(line, 11);
                assert!(reason.starts_with("Could not converge SCF"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_sections_surface_as_log_errors() {
        let log = Psi4Log::from_text("h.out", MINIMAL_LOG.to_string()).expect("log");
        assert!(matches!(
            log.load_force_constant_matrix(),
            Err(LogError::MissingSection { section: "Hessian" })
        ));
        assert!(matches!(
            log.load_negative_frequency(),
            Err(LogError::MissingSection { .. })
        ));
    }
}
