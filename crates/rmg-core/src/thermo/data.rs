use super::{ThermoError, Wilhoit};
use crate::common::constants::REFERENCE_TEMPERATURE;
use crate::common::{ArrayQuantity, ScalarQuantity, Units};
use serde::Serialize;

/// Temperatures at which estimators report heat capacities, K.
pub const STANDARD_TEMPERATURES: [f64; 9] =
    [300.0, 400.0, 500.0, 600.0, 800.0, 1000.0, 1500.0, 2000.0, 2400.0];

/// Tabulated heat capacities plus formation enthalpy and entropy at 298.15 K.
///
/// Between table points the heat capacity is linear in `T`. Below the first
/// point it is linear between `(0 K, cp0)` and the first sample; above the
/// last point it stays at the last sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThermoData {
    tdata: ArrayQuantity,
    cpdata: ArrayQuantity,
    h298: ScalarQuantity,
    s298: ScalarQuantity,
    cp0: ScalarQuantity,
    cp_inf: ScalarQuantity,
    comment: String,
}

impl ThermoData {
    pub fn new(
        tdata: ArrayQuantity,
        cpdata: ArrayQuantity,
        h298: ScalarQuantity,
        s298: ScalarQuantity,
        cp0: ScalarQuantity,
        cp_inf: ScalarQuantity,
        comment: impl Into<String>,
    ) -> Result<Self, ThermoError> {
        if tdata.len() != cpdata.len() {
            return Err(ThermoError::LengthMismatch {
                tdata: tdata.len(),
                cpdata: cpdata.len(),
            });
        }
        if tdata.is_empty() {
            return Err(ThermoError::TooFewPoints {
                required: 1,
                actual: 0,
            });
        }

        let temperatures = tdata.values_si();
        for (index, temperature) in temperatures.iter().enumerate() {
            let previous = if index == 0 { 0.0 } else { temperatures[index - 1] };
            if !temperature.is_finite() || *temperature <= previous {
                return Err(ThermoError::NonMonotonicTemperatures { index });
            }
        }
        if cpdata.values().iter().any(|value| !value.is_finite()) {
            return Err(ThermoError::NonFinite {
                quantity: "heat capacity",
            });
        }
        for (quantity, value) in [
            ("H298", h298.value),
            ("S298", s298.value),
            ("Cp0", cp0.value),
            ("CpInf", cp_inf.value),
        ] {
            if !value.is_finite() {
                return Err(ThermoError::NonFinite { quantity });
            }
        }

        Ok(Self {
            tdata,
            cpdata,
            h298,
            s298,
            cp0,
            cp_inf,
            comment: comment.into(),
        })
    }

    pub fn tdata(&self) -> &ArrayQuantity {
        &self.tdata
    }

    pub fn cpdata(&self) -> &ArrayQuantity {
        &self.cpdata
    }

    pub fn h298(&self) -> ScalarQuantity {
        self.h298
    }

    pub fn s298(&self) -> ScalarQuantity {
        self.s298
    }

    pub fn cp0(&self) -> ScalarQuantity {
        self.cp0
    }

    pub fn cp_inf(&self) -> ScalarQuantity {
        self.cp_inf
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// J/(mol*K).
    pub fn heat_capacity(&self, temperature: f64) -> f64 {
        let (slope, intercept) = self
            .segments()
            .into_iter()
            .find(|segment| temperature <= segment.upper)
            .map(|segment| (segment.slope, segment.intercept))
            .unwrap_or((0.0, self.last_cp()));
        intercept + slope * temperature
    }

    /// J/mol.
    pub fn enthalpy(&self, temperature: f64) -> f64 {
        self.h298.value_si()
            + self.integrate(REFERENCE_TEMPERATURE, temperature, |segment, lo, hi| {
                segment.intercept * (hi - lo) + 0.5 * segment.slope * (hi * hi - lo * lo)
            })
    }

    /// J/(mol*K).
    pub fn entropy(&self, temperature: f64) -> f64 {
        self.s298.value_si()
            + self.integrate(REFERENCE_TEMPERATURE, temperature, |segment, lo, hi| {
                segment.intercept * (hi / lo).ln() + segment.slope * (hi - lo)
            })
    }

    /// J/mol.
    pub fn free_energy(&self, temperature: f64) -> f64 {
        self.enthalpy(temperature) - temperature * self.entropy(temperature)
    }

    /// Least-squares Wilhoit fit through this table with scale temperature
    /// `b` (K).
    pub fn to_wilhoit(&self, b: f64) -> Result<Wilhoit, ThermoError> {
        Wilhoit::fit_to_data(
            &self.tdata.values_si(),
            &self.cpdata.values_si(),
            self.cp0.value_si(),
            self.cp_inf.value_si(),
            self.h298.value_si(),
            self.s298.value_si(),
            b,
        )
        .map(|wilhoit| wilhoit.with_comment(self.comment.clone()))
    }

    fn last_cp(&self) -> f64 {
        self.cpdata.values_si().last().copied().unwrap_or(0.0)
    }

    /// Linear pieces `cp = intercept + slope * T` valid up to `upper`, the
    /// last one ending at infinity.
    fn segments(&self) -> Vec<Segment> {
        let temperatures = self.tdata.values_si();
        let heat_capacities = self.cpdata.values_si();
        let mut segments = Vec::with_capacity(temperatures.len() + 1);

        let mut previous = (0.0, self.cp0.value_si());
        for (temperature, cp) in temperatures.iter().zip(&heat_capacities) {
            let slope = (cp - previous.1) / (temperature - previous.0);
            segments.push(Segment {
                upper: *temperature,
                slope,
                intercept: previous.1 - slope * previous.0,
            });
            previous = (*temperature, *cp);
        }
        segments.push(Segment {
            upper: f64::INFINITY,
            slope: 0.0,
            intercept: previous.1,
        });
        segments
    }

    /// Signed sum of `piece(segment, lo, hi)` over the overlap of each
    /// segment with `[from, to]`.
    fn integrate(&self, from: f64, to: f64, piece: impl Fn(&Segment, f64, f64) -> f64) -> f64 {
        let (lo, hi, sign) = if to >= from {
            (from, to, 1.0)
        } else {
            (to, from, -1.0)
        };

        let mut lower = 0.0_f64;
        let mut total = 0.0;
        for segment in self.segments() {
            let start = lower.max(lo);
            let end = segment.upper.min(hi);
            if end > start {
                total += piece(&segment, start, end);
            }
            lower = segment.upper;
            if lower >= hi {
                break;
            }
        }
        sign * total
    }
}

#[derive(Debug, Clone, Copy)]
struct Segment {
    upper: f64,
    slope: f64,
    intercept: f64,
}

/// Builds the table an estimator reports: nine heat capacities at
/// [`STANDARD_TEMPERATURES`], all values in SI.
pub fn standard_thermo_data(
    heat_capacities: Vec<f64>,
    h298: f64,
    s298: f64,
    cp0: f64,
    cp_inf: f64,
    comment: impl Into<String>,
) -> Result<ThermoData, ThermoError> {
    ThermoData::new(
        ArrayQuantity::new(STANDARD_TEMPERATURES.to_vec(), Units::Kelvin),
        ArrayQuantity::new(heat_capacities, Units::JPerMolK),
        ScalarQuantity::new(h298, Units::JPerMol),
        ScalarQuantity::new(s298, Units::JPerMolK),
        ScalarQuantity::new(cp0, Units::JPerMolK),
        ScalarQuantity::new(cp_inf, Units::JPerMolK),
        comment,
    )
}
