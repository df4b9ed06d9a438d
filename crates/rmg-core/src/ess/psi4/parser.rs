//! Section grammar of Psi4 text output.
//!
//! Every function takes the full log text and looks at the *last* matching
//! section, since optimizations print intermediate geometries, energies and
//! Hessians before the final ones.

use crate::common::Element;
use crate::ess::{Geometry, LogError};

pub const SUCCESS_MARKER: &str = "Psi4 exiting successfully";

const FAILURE_MARKERS: &[&str] = &[
    "PSIO_ERROR",
    "Psi4 encountered an error",
    "Could not converge SCF iterations",
    "SCF iterations failed to converge",
    "Could not converge geometry optimization",
    "Traceback (most recent call last)",
];

const GEOMETRY_HEADER: &str = "Geometry (in Angstrom)";
const FINAL_ENERGY_LABEL: &str = "Final energy is";
const TOTAL_ENERGY_LABEL: &str = "Total Energy =";
const ZPE_LABEL: &str = "Correction ZPE";
const HESSIAN_HEADER: &str = "## Hessian";
const VIBRATION_HEADER: &str = "Harmonic Vibrational Analysis";
const FREQUENCY_LABEL: &str = "Freq [cm^-1]";
const THERMO_HEADER: &str = "==> Thermochemistry";
const SYMMETRY_LABEL: &str = "Rotational symmetry number =";

/// Square Hessian block in Hartree/bohr^2, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct RawHessian {
    pub dimension: usize,
    pub values: Vec<f64>,
}

/// First line (1-based) carrying a failure marker, and its trimmed text.
pub fn find_failure(text: &str) -> Option<(usize, String)> {
    text.lines().enumerate().find_map(|(index, line)| {
        FAILURE_MARKERS
            .iter()
            .any(|marker| line.contains(marker))
            .then(|| (index + 1, line.trim().to_string()))
    })
}

pub fn terminated_normally(text: &str) -> bool {
    text.contains(SUCCESS_MARKER)
}

/// Last geometry table and the multiplicity from its header.
pub fn parse_geometry(text: &str) -> Result<(Geometry, u32), LogError> {
    let lines: Vec<&str> = text.lines().collect();
    let header_index = lines
        .iter()
        .rposition(|line| line.trim_start().starts_with(GEOMETRY_HEADER))
        .ok_or(LogError::MissingSection {
            section: "geometry",
        })?;
    let multiplicity = parse_multiplicity(lines[header_index], header_index + 1)?;

    let separator_index = lines[header_index..]
        .iter()
        .position(|line| line.trim_start().starts_with("---"))
        .map(|offset| header_index + offset)
        .ok_or_else(|| parse_error("geometry", header_index + 1, "table has no separator"))?;

    let mut geometry = Geometry {
        coordinates: Vec::new(),
        symbols: Vec::new(),
        atomic_numbers: Vec::new(),
        masses: Vec::new(),
    };
    for (offset, line) in lines[separator_index + 1..].iter().enumerate() {
        if line.trim().is_empty() {
            break;
        }
        let line_number = separator_index + offset + 2;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 4 {
            return Err(parse_error("geometry", line_number, "expected symbol and x y z"));
        }

        let label: String = tokens[0]
            .chars()
            .take_while(char::is_ascii_alphabetic)
            .collect();
        let element = Element::from_symbol(&label).ok_or_else(|| {
            parse_error("geometry", line_number, format!("unknown element '{}'", tokens[0]))
        })?;
        let mut coordinate = [0.0; 3];
        for (axis, token) in tokens[1..4].iter().enumerate() {
            coordinate[axis] = parse_float(token, "geometry", line_number)?;
        }
        let mass = match tokens.get(4) {
            Some(token) => parse_float(token, "geometry", line_number)?,
            None => element.isotope_mass(),
        };

        geometry.coordinates.push(coordinate);
        geometry.symbols.push(element.symbol().to_string());
        geometry.atomic_numbers.push(element.atomic_number());
        geometry.masses.push(mass);
    }

    if geometry.is_empty() {
        return Err(parse_error("geometry", separator_index + 2, "table has no atoms"));
    }
    Ok((geometry, multiplicity))
}

fn parse_multiplicity(header: &str, line_number: usize) -> Result<u32, LogError> {
    let (_, rest) = header
        .split_once("multiplicity =")
        .ok_or_else(|| parse_error("geometry header", line_number, "no multiplicity"))?;
    let token = rest.trim().trim_end_matches(':').trim();
    token.parse::<u32>().map_err(|_| {
        parse_error(
            "geometry header",
            line_number,
            format!("invalid multiplicity '{token}'"),
        )
    })
}

/// Final electronic energy in Hartree: the last `Final energy is` line of an
/// optimization, else the last SCF `Total Energy =`.
pub fn parse_energy(text: &str) -> Result<f64, LogError> {
    if let Some(energy) = last_value_after(text, FINAL_ENERGY_LABEL, "final energy")? {
        return Ok(energy);
    }
    last_value_after(text, TOTAL_ENERGY_LABEL, "total energy")?.ok_or(LogError::MissingSection {
        section: "energy",
    })
}

/// Zero-point correction in kcal/mol.
pub fn parse_zero_point_energy(text: &str) -> Result<f64, LogError> {
    last_value_after(text, ZPE_LABEL, "zero-point energy")?.ok_or(LogError::MissingSection {
        section: "thermochemistry",
    })
}

pub fn parse_rotational_symmetry_number(text: &str) -> Result<Option<u32>, LogError> {
    let Some((index, line)) = last_line_containing(text, SYMMETRY_LABEL) else {
        return Ok(None);
    };
    let token = after_label(line, SYMMETRY_LABEL).unwrap_or_default();
    token.parse::<u32>().map(Some).map_err(|_| {
        parse_error(
            "rotational symmetry number",
            index + 1,
            format!("invalid value '{token}'"),
        )
    })
}

/// Last printed Hessian. Psi4 prints it in column blocks: a header line of
/// column indices followed by one line per row, `row value value ...`.
pub fn parse_hessian(text: &str) -> Result<RawHessian, LogError> {
    let lines: Vec<&str> = text.lines().collect();
    let header_index = lines
        .iter()
        .rposition(|line| line.contains(HESSIAN_HEADER))
        .ok_or(LogError::MissingSection { section: "Hessian" })?;

    let (size_offset, size_line) = lines[header_index + 1..]
        .iter()
        .enumerate()
        .find(|(_, line)| !line.trim().is_empty())
        .ok_or_else(|| parse_error("Hessian", header_index + 1, "missing size line"))?;
    let size_line_number = header_index + size_offset + 2;
    let dimension = parse_hessian_size(size_line, size_line_number)?;

    let mut values = vec![0.0; dimension * dimension];
    let mut filled = vec![false; dimension * dimension];
    let mut columns: Vec<usize> = Vec::new();
    let mut remaining = dimension * dimension;

    for (offset, line) in lines[header_index + size_offset + 2..].iter().enumerate() {
        if remaining == 0 {
            break;
        }
        let line_number = header_index + size_offset + offset + 3;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }

        if tokens.iter().all(|token| is_index_token(token)) {
            columns = tokens
                .iter()
                .map(|token| parse_index(token, dimension, line_number))
                .collect::<Result<_, _>>()?;
            continue;
        }

        if columns.is_empty() || tokens.len() != columns.len() + 1 || !is_index_token(tokens[0]) {
            return Err(parse_error(
                "Hessian",
                line_number,
                format!("unexpected line '{}'", line.trim()),
            ));
        }
        let row = parse_index(tokens[0], dimension, line_number)?;
        for (column, token) in columns.iter().zip(&tokens[1..]) {
            let slot = row * dimension + column;
            values[slot] = parse_float(token, "Hessian", line_number)?;
            if !filled[slot] {
                filled[slot] = true;
                remaining -= 1;
            }
        }
    }

    if remaining != 0 {
        return Err(parse_error(
            "Hessian",
            size_line_number,
            format!("block ended with {remaining} of {} entries missing", dimension * dimension),
        ));
    }
    Ok(RawHessian { dimension, values })
}

fn parse_hessian_size(line: &str, line_number: usize) -> Result<usize, LogError> {
    // `Irrep: 1 Size: 9 x 9`
    let invalid = || {
        parse_error(
            "Hessian",
            line_number,
            format!("invalid size line '{}'", line.trim()),
        )
    };
    let (_, size) = line.split_once("Size:").ok_or_else(invalid)?;
    let (rows, cols) = size.split_once('x').ok_or_else(invalid)?;
    let rows = rows.trim().parse::<usize>().map_err(|_| invalid())?;
    let cols = cols.trim().parse::<usize>().map_err(|_| invalid())?;
    if rows != cols || rows == 0 {
        return Err(LogError::DimensionMismatch {
            section: "Hessian",
            expected: rows,
            actual: cols,
        });
    }
    Ok(rows)
}

/// Wavenumbers from the `Freq [cm^-1]` rows of the last vibrational
/// analysis. `653.3950i` is returned as `-653.3950`.
pub fn parse_frequencies(text: &str) -> Result<Vec<f64>, LogError> {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines
        .iter()
        .rposition(|line| line.contains(VIBRATION_HEADER))
        .ok_or(LogError::MissingSection {
            section: "vibrational analysis",
        })?;

    let mut frequencies = Vec::new();
    for (offset, line) in lines[start..].iter().enumerate() {
        if line.contains(THERMO_HEADER) {
            break;
        }
        let Some(values) = line.trim_start().strip_prefix(FREQUENCY_LABEL) else {
            continue;
        };
        let line_number = start + offset + 1;
        for token in values.split_whitespace() {
            frequencies.push(parse_wavenumber(token, line_number)?);
        }
    }

    if frequencies.is_empty() {
        return Err(LogError::MissingSection {
            section: "vibrational frequencies",
        });
    }
    Ok(frequencies)
}

fn parse_wavenumber(token: &str, line_number: usize) -> Result<f64, LogError> {
    match token.strip_suffix('i') {
        Some(magnitude) => Ok(-parse_float(magnitude, "frequencies", line_number)?),
        None => parse_float(token, "frequencies", line_number),
    }
}

fn last_line_containing<'a>(text: &'a str, label: &str) -> Option<(usize, &'a str)> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| line.contains(label))
        .last()
}

fn after_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    line.split_once(label)
        .and_then(|(_, rest)| rest.split_whitespace().next())
}

fn last_value_after(
    text: &str,
    label: &str,
    section: &'static str,
) -> Result<Option<f64>, LogError> {
    let Some((index, line)) = last_line_containing(text, label) else {
        return Ok(None);
    };
    let token = after_label(line, label)
        .ok_or_else(|| parse_error(section, index + 1, "no value after label"))?;
    parse_float(token, section, index + 1).map(Some)
}

fn is_index_token(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|byte| byte.is_ascii_digit())
}

/// One-based index in the log, zero-based in the result.
fn parse_index(token: &str, dimension: usize, line_number: usize) -> Result<usize, LogError> {
    match token.parse::<usize>() {
        Ok(index) if (1..=dimension).contains(&index) => Ok(index - 1),
        _ => Err(parse_error(
            "Hessian",
            line_number,
            format!("index '{token}' outside 1..={dimension}"),
        )),
    }
}

fn parse_float(token: &str, section: &'static str, line_number: usize) -> Result<f64, LogError> {
    token
        .parse::<f64>()
        .map_err(|_| parse_error(section, line_number, format!("invalid number '{token}'")))
}

fn parse_error(section: &'static str, line: usize, details: impl Into<String>) -> LogError {
    LogError::Parse {
        section,
        line,
        details: details.into(),
    }
}
