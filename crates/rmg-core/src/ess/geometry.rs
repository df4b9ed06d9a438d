use crate::numerics::{DenseMatrix, LinalgError, symmetric_eigen};
use serde::Serialize;

/// Smallest principal moment (amu*angstrom^2) below which a geometry counts
/// as linear.
pub const LINEAR_MOMENT_THRESHOLD: f64 = 1.0e-4;

/// Cartesian structure as printed by an electronic-structure program.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Geometry {
    /// Angstrom.
    pub coordinates: Vec<[f64; 3]>,
    pub symbols: Vec<String>,
    pub atomic_numbers: Vec<u8>,
    /// Amu.
    pub masses: Vec<f64>,
}

impl Geometry {
    pub fn len(&self) -> usize {
        self.coordinates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    pub fn total_mass(&self) -> f64 {
        self.masses.iter().sum()
    }

    pub fn center_of_mass(&self) -> [f64; 3] {
        let total = self.total_mass();
        if total <= 0.0 {
            return [0.0; 3];
        }

        let mut center = [0.0; 3];
        for (position, mass) in self.coordinates.iter().zip(&self.masses) {
            for axis in 0..3 {
                center[axis] += mass * position[axis];
            }
        }
        center.map(|component| component / total)
    }

    /// Inertia tensor about the center of mass, amu*angstrom^2.
    pub fn inertia_tensor(&self) -> DenseMatrix {
        let center = self.center_of_mass();
        let mut tensor = DenseMatrix::zeros(3, 3);
        for (position, mass) in self.coordinates.iter().zip(&self.masses) {
            let r = [
                position[0] - center[0],
                position[1] - center[1],
                position[2] - center[2],
            ];
            let r2 = r[0] * r[0] + r[1] * r[1] + r[2] * r[2];
            for row in 0..3 {
                for col in 0..3 {
                    let diagonal = if row == col { r2 } else { 0.0 };
                    tensor[(row, col)] += mass * (diagonal - r[row] * r[col]);
                }
            }
        }
        tensor
    }

    /// Principal moments of inertia, ascending, amu*angstrom^2.
    pub fn principal_moments_of_inertia(&self) -> Result<[f64; 3], LinalgError> {
        let eigen = symmetric_eigen(&self.inertia_tensor())?;
        // Round-off can leave the vanishing moment of a linear molecule
        // slightly negative.
        Ok([
            eigen.values[0].max(0.0),
            eigen.values[1].max(0.0),
            eigen.values[2].max(0.0),
        ])
    }

    pub fn is_linear(&self) -> Result<bool, LinalgError> {
        if self.len() < 2 {
            return Ok(false);
        }
        Ok(self.principal_moments_of_inertia()?[0] < LINEAR_MOMENT_THRESHOLD)
    }
}
