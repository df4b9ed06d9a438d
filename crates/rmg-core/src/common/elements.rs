//! Element table covering the main-group chemistry the readers and the
//! structure parser handle.

use serde::Serialize;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq)]
struct ElementRecord {
    number: u8,
    symbol: &'static str,
    /// Most abundant isotope, amu.
    isotope_mass: f64,
    /// Standard atomic weight, g/mol.
    standard_weight: f64,
    valences: &'static [u8],
}

#[rustfmt::skip]
const ELEMENTS: &[ElementRecord] = &[
    ElementRecord { number: 1, symbol: "H", isotope_mass: 1.007_825_032_23, standard_weight: 1.008, valences: &[1] },
    ElementRecord { number: 2, symbol: "He", isotope_mass: 4.002_603_254_13, standard_weight: 4.002_6, valences: &[0] },
    ElementRecord { number: 3, symbol: "Li", isotope_mass: 7.016_003_436_6, standard_weight: 6.94, valences: &[1] },
    ElementRecord { number: 4, symbol: "Be", isotope_mass: 9.012_183_065, standard_weight: 9.012_2, valences: &[2] },
    ElementRecord { number: 5, symbol: "B", isotope_mass: 11.009_305_36, standard_weight: 10.81, valences: &[3] },
    ElementRecord { number: 6, symbol: "C", isotope_mass: 12.0, standard_weight: 12.011, valences: &[4] },
    ElementRecord { number: 7, symbol: "N", isotope_mass: 14.003_074_004_43, standard_weight: 14.007, valences: &[3, 5] },
    ElementRecord { number: 8, symbol: "O", isotope_mass: 15.994_914_619_57, standard_weight: 15.999, valences: &[2] },
    ElementRecord { number: 9, symbol: "F", isotope_mass: 18.998_403_162_73, standard_weight: 18.998, valences: &[1] },
    ElementRecord { number: 10, symbol: "Ne", isotope_mass: 19.992_440_176_2, standard_weight: 20.180, valences: &[0] },
    ElementRecord { number: 11, symbol: "Na", isotope_mass: 22.989_769_282, standard_weight: 22.990, valences: &[1] },
    ElementRecord { number: 12, symbol: "Mg", isotope_mass: 23.985_041_697, standard_weight: 24.305, valences: &[2] },
    ElementRecord { number: 13, symbol: "Al", isotope_mass: 26.981_538_53, standard_weight: 26.982, valences: &[3] },
    ElementRecord { number: 14, symbol: "Si", isotope_mass: 27.976_926_534_65, standard_weight: 28.085, valences: &[4] },
    ElementRecord { number: 15, symbol: "P", isotope_mass: 30.973_761_998_42, standard_weight: 30.974, valences: &[3, 5] },
    ElementRecord { number: 16, symbol: "S", isotope_mass: 31.972_071_174_4, standard_weight: 32.06, valences: &[2, 4, 6] },
    ElementRecord { number: 17, symbol: "Cl", isotope_mass: 34.968_852_682, standard_weight: 35.45, valences: &[1] },
    ElementRecord { number: 18, symbol: "Ar", isotope_mass: 39.962_383_123_7, standard_weight: 39.95, valences: &[0] },
    ElementRecord { number: 19, symbol: "K", isotope_mass: 38.963_706_486_4, standard_weight: 39.098, valences: &[1] },
    ElementRecord { number: 20, symbol: "Ca", isotope_mass: 39.962_590_863, standard_weight: 40.078, valences: &[2] },
    ElementRecord { number: 35, symbol: "Br", isotope_mass: 78.918_337_6, standard_weight: 79.904, valences: &[1] },
    ElementRecord { number: 53, symbol: "I", isotope_mass: 126.904_472, standard_weight: 126.904, valences: &[1] },
];

/// Handle into the element table. Only constructible for known elements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Element(&'static ElementRecord);

impl Element {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        ELEMENTS
            .iter()
            .find(|record| record.symbol.eq_ignore_ascii_case(symbol))
            .map(Element)
    }

    pub fn from_atomic_number(number: u8) -> Option<Self> {
        ELEMENTS
            .iter()
            .find(|record| record.number == number)
            .map(Element)
    }

    pub fn hydrogen() -> Self {
        Element(&ELEMENTS[0])
    }

    pub fn symbol(self) -> &'static str {
        self.0.symbol
    }

    pub fn atomic_number(self) -> u8 {
        self.0.number
    }

    pub fn isotope_mass(self) -> f64 {
        self.0.isotope_mass
    }

    pub fn standard_weight(self) -> f64 {
        self.0.standard_weight
    }

    /// Allowed neutral valences, ascending.
    pub fn default_valences(self) -> &'static [u8] {
        self.0.valences
    }

    pub fn is_hydrogen(self) -> bool {
        self.0.number == 1
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl Serialize for Element {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::Element;

    #[test]
    fn lookup_by_symbol_is_case_insensitive() {
        let oxygen = Element::from_symbol("o").expect("oxygen");
        assert_eq!(oxygen.symbol(), "O");
        assert_eq!(oxygen.atomic_number(), 8);
        assert_eq!(Element::from_symbol("CL").map(Element::symbol), Some("Cl"));
        assert!(Element::from_symbol("Xx").is_none());
    }

    #[test]
    fn lookup_by_number_matches_symbol_lookup() {
        for number in [1_u8, 6, 7, 8, 9, 14, 15, 16, 17, 35, 53] {
            let element = Element::from_atomic_number(number).expect("known element");
            assert_eq!(Element::from_symbol(element.symbol()), Some(element));
        }
        assert!(Element::from_atomic_number(0).is_none());
    }

    #[test]
    fn masses_and_valences_are_consistent() {
        let carbon = Element::from_symbol("C").expect("carbon");
        assert_eq!(carbon.isotope_mass(), 12.0);
        assert!((carbon.standard_weight() - 12.011).abs() < 1.0e-12);
        assert_eq!(carbon.default_valences(), &[4]);
        assert_eq!(
            Element::from_symbol("S").map(Element::default_valences),
            Some(&[2_u8, 4, 6][..])
        );
        assert!(Element::hydrogen().is_hydrogen());
    }
}
