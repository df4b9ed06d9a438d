//! Thermodynamic property representations.

pub mod data;
pub mod wilhoit;

pub use data::{STANDARD_TEMPERATURES, ThermoData, standard_thermo_data};
pub use wilhoit::Wilhoit;

use crate::domain::RmgError;
use crate::numerics::LinalgError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ThermoError {
    #[error("{tdata} temperatures but {cpdata} heat capacities")]
    LengthMismatch { tdata: usize, cpdata: usize },
    #[error("temperatures must be positive and strictly increasing (index {index})")]
    NonMonotonicTemperatures { index: usize },
    #[error("need at least {required} heat-capacity points, got {actual}")]
    TooFewPoints { required: usize, actual: usize },
    #[error("non-finite {quantity}")]
    NonFinite { quantity: &'static str },
    #[error("Wilhoit scale temperature must be positive, got {0} K")]
    InvalidScaleTemperature(f64),
    #[error("Wilhoit least-squares fit failed: {0}")]
    Fit(#[from] LinalgError),
}

impl From<ThermoError> for RmgError {
    fn from(error: ThermoError) -> Self {
        match error {
            ThermoError::Fit(_) => RmgError::computation("RUN.WILHOIT_FIT", error.to_string()),
            _ => RmgError::input_validation("INPUT.THERMO", error.to_string()),
        }
    }
}
