//! Readers for electronic-structure-software (ESS) output logs.
//!
//! Every reader implements [`EssAdapter`]. Programs only have to expose the
//! raw sections of their logs; assembling a [`Conformer`] and locating the
//! imaginary frequency of a transition state are shared.

pub mod error;
pub mod geometry;
pub mod psi4;

pub use error::LogError;
pub use geometry::Geometry;
pub use psi4::Psi4Log;

use crate::common::{ArrayQuantity, ScalarQuantity, Units};
use crate::domain::EssProgram;
use crate::numerics::DenseMatrix;
use crate::statmech::{
    Conformer, HarmonicOscillator, IdealGasTranslation, LinearRotor, Mode, NonlinearRotor,
};
use std::fs;
use std::path::Path;
use tracing::debug;

pub trait EssAdapter: Send + Sync {
    fn program(&self) -> EssProgram;

    fn path(&self) -> &Path;

    fn get_number_of_atoms(&self) -> Result<usize, LogError> {
        Ok(self.load_geometry()?.len())
    }

    /// Final geometry of the job.
    fn load_geometry(&self) -> Result<Geometry, LogError>;

    /// Final electronic energy, J/mol.
    fn load_energy(&self) -> Result<f64, LogError>;

    /// Zero-point energy, J/mol. `MissingSection` when the job ran no
    /// thermochemistry.
    fn load_zero_point_energy(&self) -> Result<f64, LogError>;

    /// Cartesian force constants, J/m^2, atom-major ordering.
    fn load_force_constant_matrix(&self) -> Result<DenseMatrix, LogError>;

    /// All vibrational wavenumbers in log order, imaginary ones negative.
    fn load_frequencies(&self) -> Result<Vec<f64>, LogError>;

    fn load_spin_multiplicity(&self) -> Result<u32, LogError>;

    fn load_rotational_symmetry_number(&self) -> Result<u32, LogError>;

    /// Conformer with modes `[translation, rotor, oscillator]` and the
    /// unscaled real frequencies carried by the oscillator.
    fn load_conformer(&self) -> Result<(Conformer, Vec<f64>), LogError> {
        let geometry = self.load_geometry()?;
        let spin_multiplicity = self.load_spin_multiplicity()?;
        let energy = self.load_energy()?;
        let e0 = match self.load_zero_point_energy() {
            Ok(zero_point_energy) => energy + zero_point_energy,
            Err(LogError::MissingSection { .. }) => {
                debug!(
                    path = %self.path().display(),
                    "no thermochemistry, E0 is the electronic energy"
                );
                energy
            }
            Err(error) => return Err(error),
        };

        let mut modes = vec![Mode::IdealGasTranslation(IdealGasTranslation::new(
            ScalarQuantity::new(geometry.total_mass(), Units::Amu),
        ))];
        let mut frequencies = Vec::new();

        if geometry.len() > 1 {
            let symmetry = self.load_rotational_symmetry_number()?;
            let moments = geometry.principal_moments_of_inertia()?;
            if geometry.is_linear()? {
                modes.push(Mode::LinearRotor(LinearRotor::new(
                    ScalarQuantity::new(moments[2], Units::AmuAngstrom2),
                    symmetry,
                )));
            } else {
                modes.push(Mode::NonlinearRotor(NonlinearRotor::new(
                    ArrayQuantity::new(moments.to_vec(), Units::AmuAngstrom2),
                    symmetry,
                )));
            }

            frequencies = self
                .load_frequencies()?
                .into_iter()
                .filter(|frequency| *frequency > 0.0)
                .collect();
            modes.push(Mode::HarmonicOscillator(HarmonicOscillator::new(
                ArrayQuantity::new(frequencies.clone(), Units::CmInverse),
            )));
        }

        debug!(
            path = %self.path().display(),
            modes = modes.len(),
            frequencies = frequencies.len(),
            "assembled conformer"
        );
        let conformer = Conformer::new(
            ScalarQuantity::new(e0, Units::JPerMol),
            modes,
            spin_multiplicity,
            1,
        );
        Ok((conformer, frequencies))
    }

    /// The single imaginary frequency of a transition state, as a negative
    /// wavenumber.
    fn load_negative_frequency(&self) -> Result<f64, LogError> {
        let imaginary: Vec<f64> = self
            .load_frequencies()?
            .into_iter()
            .filter(|frequency| *frequency < 0.0)
            .collect();
        match imaginary.as_slice() {
            [] => Err(LogError::NoNegativeFrequency),
            [frequency] => Ok(*frequency),
            _ => Err(LogError::MultipleNegativeFrequencies {
                count: imaginary.len(),
            }),
        }
    }
}

/// Sniffs the program banner and returns the matching reader.
pub fn ess_factory(path: impl AsRef<Path>) -> Result<Box<dyn EssAdapter>, LogError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|source| LogError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let program = EssProgram::all()
        .iter()
        .copied()
        .find(|program| text.contains(program.banner()))
        .ok_or_else(|| LogError::UnsupportedProgram {
            path: path.to_path_buf(),
        })?;
    debug!(path = %path.display(), %program, "identified log program");

    match program {
        EssProgram::Psi4 => Ok(Box::new(Psi4Log::from_text(path, text)?)),
    }
}
