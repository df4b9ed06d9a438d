use super::ThermoError;
use crate::common::constants::REFERENCE_TEMPERATURE;
use crate::numerics::{dense_matrix_from_rows, lu_solve};
use serde::Serialize;

/// Wilhoit heat-capacity polynomial.
///
/// With `y = T / (T + B)`:
/// `Cp(T) = Cp0 + (CpInf - Cp0) y^2 [1 + (y - 1)(a0 + a1 y + a2 y^2 + a3 y^3)]`.
/// `h0` is the enthalpy at 0 K and `s0` the entropy integration constant.
/// All values in SI units.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wilhoit {
    pub cp0: f64,
    pub cp_inf: f64,
    pub a0: f64,
    pub a1: f64,
    pub a2: f64,
    pub a3: f64,
    pub b: f64,
    pub h0: f64,
    pub s0: f64,
    pub comment: String,
}

impl Wilhoit {
    /// Fits `a0..a3` to `(tdata, cpdata)` by linear least squares with the
    /// given limits and scale temperature, then pins `h0` and `s0` so the
    /// fit reproduces `h298` and `s298` at 298.15 K.
    pub fn fit_to_data(
        tdata: &[f64],
        cpdata: &[f64],
        cp0: f64,
        cp_inf: f64,
        h298: f64,
        s298: f64,
        b: f64,
    ) -> Result<Self, ThermoError> {
        if tdata.len() != cpdata.len() {
            return Err(ThermoError::LengthMismatch {
                tdata: tdata.len(),
                cpdata: cpdata.len(),
            });
        }
        if tdata.len() < 4 {
            return Err(ThermoError::TooFewPoints {
                required: 4,
                actual: tdata.len(),
            });
        }
        if !(b.is_finite() && b > 0.0) {
            return Err(ThermoError::InvalidScaleTemperature(b));
        }

        let delta = cp_inf - cp0;
        let coefficients = if delta.abs() <= f64::EPSILON * cp_inf.abs().max(1.0) {
            [0.0; 4]
        } else {
            solve_shape_coefficients(tdata, cpdata, cp0, delta, b)?
        };

        let mut wilhoit = Self {
            cp0,
            cp_inf,
            a0: coefficients[0],
            a1: coefficients[1],
            a2: coefficients[2],
            a3: coefficients[3],
            b,
            h0: 0.0,
            s0: 0.0,
            comment: String::new(),
        };
        wilhoit.h0 = h298 - wilhoit.enthalpy(REFERENCE_TEMPERATURE);
        wilhoit.s0 = s298 - wilhoit.entropy(REFERENCE_TEMPERATURE);
        Ok(wilhoit)
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    pub fn heat_capacity(&self, temperature: f64) -> f64 {
        let y = self.reduced(temperature);
        let polynomial = self.a0 + y * (self.a1 + y * (self.a2 + y * self.a3));
        self.cp0 + (self.cp_inf - self.cp0) * y * y * (1.0 + (y - 1.0) * polynomial)
    }

    pub fn enthalpy(&self, temperature: f64) -> f64 {
        let y = self.reduced(temperature);
        let coefficients = [self.a0, self.a1, self.a2, self.a3];
        let coefficient_sum: f64 = coefficients.iter().sum();

        // sum_j a_j sum_{k=1}^{j+2} y^k / k
        let mut partial_sums = 0.0;
        let mut power = 1.0;
        let mut harmonic = 0.0;
        let mut truncated = [0.0; 6];
        for (k, slot) in truncated.iter_mut().enumerate().skip(1) {
            power *= y;
            harmonic += power / k as f64;
            *slot = harmonic;
        }
        for (j, coefficient) in coefficients.iter().enumerate() {
            partial_sums += coefficient * truncated[j + 2];
        }

        let integral = -y - (2.0 + coefficient_sum) * (-y).ln_1p() - partial_sums;
        self.h0 + self.cp_inf * temperature - (self.cp_inf - self.cp0) * self.b * integral
    }

    pub fn entropy(&self, temperature: f64) -> f64 {
        let y = self.reduced(temperature);
        let series = y
            * (1.0
                + y * (self.a0 / 2.0
                    + y * (self.a1 / 3.0 + y * (self.a2 / 4.0 + y * self.a3 / 5.0))));
        self.s0 + self.cp_inf * temperature.ln() - (self.cp_inf - self.cp0) * (y.ln() + series)
    }

    pub fn free_energy(&self, temperature: f64) -> f64 {
        self.enthalpy(temperature) - temperature * self.entropy(temperature)
    }

    fn reduced(&self, temperature: f64) -> f64 {
        temperature / (temperature + self.b)
    }
}

/// Normal equations for the residual `cp - cp0 - delta y^2`, linear in
/// `a0..a3` with basis `delta y^2 (y - 1) y^j`.
fn solve_shape_coefficients(
    tdata: &[f64],
    cpdata: &[f64],
    cp0: f64,
    delta: f64,
    b: f64,
) -> Result<[f64; 4], ThermoError> {
    let mut normal = vec![vec![0.0; 4]; 4];
    let mut rhs = vec![0.0; 4];
    for (temperature, cp) in tdata.iter().zip(cpdata) {
        let y = temperature / (temperature + b);
        let scale = delta * y * y * (y - 1.0);
        let basis = [scale, scale * y, scale * y * y, scale * y * y * y];
        let target = cp - cp0 - delta * y * y;
        for row in 0..4 {
            rhs[row] += basis[row] * target;
            for col in 0..4 {
                normal[row][col] += basis[row] * basis[col];
            }
        }
    }

    let solution = lu_solve(&dense_matrix_from_rows(&normal), &rhs)?;
    Ok([solution[0], solution[1], solution[2], solution[3]])
}
