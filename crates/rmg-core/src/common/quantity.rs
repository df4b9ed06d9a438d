use super::constants::{AMU, AMU_ANGSTROM2_TO_KG_M2, CALORIE, HARTREE_TO_J_PER_MOL};
use serde::Serialize;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Units {
    #[serde(rename = "cm^-1")]
    CmInverse,
    #[serde(rename = "J/mol")]
    JPerMol,
    #[serde(rename = "kJ/mol")]
    KjPerMol,
    #[serde(rename = "kcal/mol")]
    KcalPerMol,
    #[serde(rename = "hartree")]
    Hartree,
    #[serde(rename = "J/(mol*K)")]
    JPerMolK,
    #[serde(rename = "cal/(mol*K)")]
    CalPerMolK,
    #[serde(rename = "K")]
    Kelvin,
    #[serde(rename = "amu")]
    Amu,
    #[serde(rename = "amu*angstrom^2")]
    AmuAngstrom2,
    #[serde(rename = "kg*m^2")]
    KgM2,
    #[serde(rename = "J/m^2")]
    JPerM2,
    #[serde(rename = "")]
    Dimensionless,
}

impl Units {
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::CmInverse => "cm^-1",
            Self::JPerMol => "J/mol",
            Self::KjPerMol => "kJ/mol",
            Self::KcalPerMol => "kcal/mol",
            Self::Hartree => "hartree",
            Self::JPerMolK => "J/(mol*K)",
            Self::CalPerMolK => "cal/(mol*K)",
            Self::Kelvin => "K",
            Self::Amu => "amu",
            Self::AmuAngstrom2 => "amu*angstrom^2",
            Self::KgM2 => "kg*m^2",
            Self::JPerM2 => "J/m^2",
            Self::Dimensionless => "",
        }
    }

    /// Multiplier taking a value in these units to SI.
    ///
    /// Wavenumbers are left in cm^-1: every consumer works in spectroscopic
    /// units and converts with `h c` where needed.
    pub const fn si_factor(self) -> f64 {
        match self {
            Self::CmInverse => 1.0,
            Self::JPerMol => 1.0,
            Self::KjPerMol => 1.0e3,
            Self::KcalPerMol => 1.0e3 * CALORIE,
            Self::Hartree => HARTREE_TO_J_PER_MOL,
            Self::JPerMolK => 1.0,
            Self::CalPerMolK => CALORIE,
            Self::Kelvin => 1.0,
            Self::Amu => AMU,
            Self::AmuAngstrom2 => AMU_ANGSTROM2_TO_KG_M2,
            Self::KgM2 => 1.0,
            Self::JPerM2 => 1.0,
            Self::Dimensionless => 1.0,
        }
    }
}

impl Display for Units {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScalarQuantity {
    pub value: f64,
    pub units: Units,
}

impl ScalarQuantity {
    pub const fn new(value: f64, units: Units) -> Self {
        Self { value, units }
    }

    pub fn value_si(&self) -> f64 {
        self.value * self.units.si_factor()
    }
}

impl Display for ScalarQuantity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.value, self.units)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArrayQuantity {
    pub values: Vec<f64>,
    pub units: Units,
}

impl ArrayQuantity {
    pub fn new(values: Vec<f64>, units: Units) -> Self {
        Self { values, units }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn values_si(&self) -> Vec<f64> {
        let factor = self.units.si_factor();
        self.values.iter().map(|value| value * factor).collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{ArrayQuantity, ScalarQuantity, Units};

    #[test]
    fn scalar_quantities_convert_to_si() {
        let zpe = ScalarQuantity::new(14.548, Units::KcalPerMol);
        assert!((zpe.value_si() - 60_868.832).abs() < 1.0e-6);

        let h298 = ScalarQuantity::new(-12.5, Units::KjPerMol);
        assert_eq!(h298.value_si(), -12_500.0);
        assert_eq!(h298.to_string(), "-12.5 kJ/mol");
    }

    #[test]
    fn array_quantities_keep_raw_values_and_convert_on_request() {
        let cp = ArrayQuantity::new(vec![1.0, 2.0], Units::CalPerMolK);
        assert_eq!(cp.values(), &[1.0, 2.0]);
        assert_eq!(cp.len(), 2);
        assert!(!cp.is_empty());
        let si = cp.values_si();
        assert!((si[1] - 8.368).abs() < 1.0e-12);
    }

    #[test]
    fn units_serialize_as_their_symbols() {
        let json = serde_json::to_string(&ScalarQuantity::new(1.0, Units::CmInverse))
            .expect("serialize");
        assert_eq!(json, r#"{"value":1.0,"units":"cm^-1"}"#);
    }
}
