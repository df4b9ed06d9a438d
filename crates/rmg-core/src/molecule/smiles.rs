//! SMILES reader for the organic subset, bracket atoms, branches, ring
//! closures and dot-disconnected fragments. Stereo marks are accepted and
//! dropped.

use super::{Atom, Bond, BondOrder, Molecule};
use crate::common::Element;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SmilesError {
    #[error("empty SMILES string")]
    Empty,
    #[error("unexpected character '{character}' at offset {offset}")]
    UnexpectedCharacter { character: char, offset: usize },
    #[error("unknown element '{symbol}' at offset {offset}")]
    UnknownElement { symbol: String, offset: usize },
    #[error("unbalanced branch at offset {offset}")]
    UnbalancedBranch { offset: usize },
    #[error("ring closure {label} opened at offset {offset} is never closed")]
    UnclosedRing { label: u16, offset: usize },
    #[error("unterminated bracket atom starting at offset {offset}")]
    UnterminatedBracket { offset: usize },
    #[error("conflicting bond orders for ring closure {label} at offset {offset}")]
    ConflictingRingBond { label: u16, offset: usize },
    #[error("bond at offset {offset} has no atom on one side")]
    DanglingBond { offset: usize },
    #[error("{quantity} of the atom at offset {offset} is out of range")]
    OutOfRange {
        quantity: &'static str,
        offset: usize,
    },
}

pub fn parse_smiles(smiles: &str) -> Result<Molecule, SmilesError> {
    let trimmed = smiles.trim();
    if trimmed.is_empty() {
        return Err(SmilesError::Empty);
    }
    let leading = smiles.len() - smiles.trim_start().len();
    let mut parser = Parser::new(trimmed, leading);
    parser.run()?;
    parser.finish()
}

#[derive(Debug)]
struct ParsedAtom {
    element: Element,
    aromatic: bool,
    charge: i8,
    /// Explicit count from a bracket atom; `None` for organic-subset atoms.
    hydrogens: Option<u8>,
    offset: usize,
}

#[derive(Debug, Clone, Copy)]
struct RingOpening {
    atom: usize,
    order: Option<BondOrder>,
    offset: usize,
}

struct Parser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    base: usize,
    pos: usize,
    atoms: Vec<ParsedAtom>,
    bonds: Vec<(usize, usize, Option<BondOrder>)>,
    branches: Vec<(usize, usize)>,
    previous: Option<usize>,
    pending: Option<(BondOrder, usize)>,
    rings: BTreeMap<u16, RingOpening>,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str, base: usize) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            base,
            pos: 0,
            atoms: Vec::new(),
            bonds: Vec::new(),
            branches: Vec::new(),
            previous: None,
            pending: None,
            rings: BTreeMap::new(),
        }
    }

    fn offset(&self, pos: usize) -> usize {
        self.base + pos
    }

    fn unexpected(&self, pos: usize) -> SmilesError {
        let character = self.text[pos..].chars().next().unwrap_or('\0');
        SmilesError::UnexpectedCharacter {
            character,
            offset: self.offset(pos),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn run(&mut self) -> Result<(), SmilesError> {
        while let Some(byte) = self.peek() {
            let start = self.pos;
            match byte {
                b'B' | b'C' | b'N' | b'O' | b'P' | b'S' | b'F' | b'I' => {
                    let symbol = match (byte, self.bytes.get(start + 1)) {
                        (b'B', Some(b'r')) => "Br",
                        (b'C', Some(b'l')) => "Cl",
                        _ => &self.text[start..start + 1],
                    };
                    self.pos += symbol.len();
                    let element = Element::from_symbol(symbol).ok_or_else(|| {
                        SmilesError::UnknownElement {
                            symbol: symbol.to_string(),
                            offset: self.offset(start),
                        }
                    })?;
                    self.add_atom(organic(element, false, self.offset(start)))?;
                }
                b'b' | b'c' | b'n' | b'o' | b'p' | b's' => {
                    self.pos += 1;
                    let symbol = &self.text[start..start + 1];
                    let element = Element::from_symbol(symbol).ok_or_else(|| {
                        SmilesError::UnknownElement {
                            symbol: symbol.to_string(),
                            offset: self.offset(start),
                        }
                    })?;
                    self.add_atom(organic(element, true, self.offset(start)))?;
                }
                b'[' => {
                    let atom = self.bracket_atom()?;
                    self.add_atom(atom)?;
                }
                b'(' => {
                    let Some(previous) = self.previous else {
                        return Err(self.unexpected(start));
                    };
                    if self.pending.is_some() {
                        return Err(self.unexpected(start));
                    }
                    self.branches.push((previous, start));
                    self.pos += 1;
                }
                b')' => {
                    if self.pending.is_some() {
                        return Err(SmilesError::DanglingBond {
                            offset: self.offset(start),
                        });
                    }
                    let (atom, _) = self.branches.pop().ok_or(SmilesError::UnbalancedBranch {
                        offset: self.offset(start),
                    })?;
                    self.previous = Some(atom);
                    self.pos += 1;
                }
                b'-' | b'=' | b'#' | b':' | b'/' | b'\\' => {
                    if self.pending.is_some() || self.previous.is_none() {
                        return Err(SmilesError::DanglingBond {
                            offset: self.offset(start),
                        });
                    }
                    let order = match byte {
                        b'=' => BondOrder::Double,
                        b'#' => BondOrder::Triple,
                        b':' => BondOrder::Aromatic,
                        _ => BondOrder::Single,
                    };
                    self.pending = Some((order, start));
                    self.pos += 1;
                }
                b'0'..=b'9' => {
                    self.pos += 1;
                    self.ring_closure(u16::from(byte - b'0'), start)?;
                }
                b'%' => {
                    let digits = self.bytes.get(start + 1..start + 3);
                    let label = match digits {
                        Some([tens @ b'0'..=b'9', ones @ b'0'..=b'9']) => {
                            u16::from(tens - b'0') * 10 + u16::from(ones - b'0')
                        }
                        _ => return Err(self.unexpected(start)),
                    };
                    self.pos += 3;
                    self.ring_closure(label, start)?;
                }
                b'.' => {
                    if self.pending.is_some() || self.previous.is_none() {
                        return Err(self.unexpected(start));
                    }
                    self.previous = None;
                    self.pos += 1;
                }
                _ => return Err(self.unexpected(start)),
            }
        }

        if let Some((_, offset)) = self.pending {
            return Err(SmilesError::DanglingBond {
                offset: self.offset(offset),
            });
        }
        if let Some((_, offset)) = self.branches.last() {
            return Err(SmilesError::UnbalancedBranch {
                offset: self.offset(*offset),
            });
        }
        if let Some((label, opening)) = self.rings.iter().next() {
            return Err(SmilesError::UnclosedRing {
                label: *label,
                offset: self.offset(opening.offset),
            });
        }
        if self.atoms.is_empty() {
            return Err(SmilesError::Empty);
        }
        Ok(())
    }

    fn add_atom(&mut self, atom: ParsedAtom) -> Result<(), SmilesError> {
        let index = self.atoms.len();
        self.atoms.push(atom);
        match (self.previous, self.pending.take()) {
            (Some(previous), pending) => {
                self.bonds
                    .push((previous, index, pending.map(|(order, _)| order)));
            }
            (None, Some((_, offset))) => {
                return Err(SmilesError::DanglingBond {
                    offset: self.offset(offset),
                });
            }
            (None, None) => {}
        }
        self.previous = Some(index);
        Ok(())
    }

    fn ring_closure(&mut self, label: u16, start: usize) -> Result<(), SmilesError> {
        let Some(atom) = self.previous else {
            return Err(self.unexpected(start));
        };
        let order = self.pending.take().map(|(order, _)| order);

        match self.rings.remove(&label) {
            Some(opening) => {
                if opening.atom == atom {
                    return Err(self.unexpected(start));
                }
                let order = match (opening.order, order) {
                    (Some(first), Some(second)) if first != second => {
                        return Err(SmilesError::ConflictingRingBond {
                            label,
                            offset: self.offset(start),
                        });
                    }
                    (first, second) => first.or(second),
                };
                self.bonds.push((opening.atom, atom, order));
            }
            None => {
                self.rings.insert(
                    label,
                    RingOpening {
                        atom,
                        order,
                        offset: start,
                    },
                );
            }
        }
        Ok(())
    }

    /// `[` isotope? symbol chirality? (H count)? charge? (: class)? `]`
    fn bracket_atom(&mut self) -> Result<ParsedAtom, SmilesError> {
        let open = self.offset(self.pos);
        self.pos += 1;
        let unterminated = || SmilesError::UnterminatedBracket { offset: open };

        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }

        let symbol_start = self.pos;
        let (element, aromatic) = match self.peek() {
            Some(first) if first.is_ascii_uppercase() => {
                let length = match self.bytes.get(symbol_start + 1) {
                    Some(second) if second.is_ascii_lowercase() => 2,
                    _ => 1,
                };
                self.pos += length;
                let symbol = &self.text[symbol_start..symbol_start + length];
                let element =
                    Element::from_symbol(symbol).ok_or_else(|| SmilesError::UnknownElement {
                        symbol: symbol.to_string(),
                        offset: self.offset(symbol_start),
                    })?;
                (element, false)
            }
            Some(b'b' | b'c' | b'n' | b'o' | b'p' | b's') => {
                self.pos += 1;
                let symbol = &self.text[symbol_start..symbol_start + 1];
                let element =
                    Element::from_symbol(symbol).ok_or_else(|| SmilesError::UnknownElement {
                        symbol: symbol.to_string(),
                        offset: self.offset(symbol_start),
                    })?;
                (element, true)
            }
            Some(_) => {
                let end = self.text[symbol_start..]
                    .find(|c: char| !c.is_ascii_alphabetic())
                    .map_or(self.text.len(), |length| symbol_start + length);
                if end == symbol_start {
                    return Err(self.unexpected(symbol_start));
                }
                return Err(SmilesError::UnknownElement {
                    symbol: self.text[symbol_start..end].to_string(),
                    offset: self.offset(symbol_start),
                });
            }
            None => return Err(unterminated()),
        };

        while self.peek() == Some(b'@') {
            self.pos += 1;
        }

        let out_of_range = |quantity| SmilesError::OutOfRange {
            quantity,
            offset: open,
        };

        let mut hydrogens = 0u8;
        if self.peek() == Some(b'H') {
            self.pos += 1;
            hydrogens = match self.read_number() {
                Some(count) => {
                    u8::try_from(count).map_err(|_| out_of_range("hydrogen count"))?
                }
                None => 1,
            };
        }

        let mut charge = 0i8;
        if let Some(sign @ (b'+' | b'-')) = self.peek() {
            let unit: i8 = if sign == b'+' { 1 } else { -1 };
            self.pos += 1;
            charge = match self.read_number() {
                Some(magnitude) => {
                    unit * i8::try_from(magnitude).map_err(|_| out_of_range("charge"))?
                }
                None => {
                    let mut total = unit;
                    while self.peek() == Some(sign) {
                        self.pos += 1;
                        total = total
                            .checked_add(unit)
                            .ok_or_else(|| out_of_range("charge"))?;
                    }
                    total
                }
            };
        }

        if self.peek() == Some(b':') {
            self.pos += 1;
            if self.read_number().is_none() {
                return Err(match self.peek() {
                    Some(_) => self.unexpected(self.pos),
                    None => unterminated(),
                });
            }
        }

        match self.peek() {
            Some(b']') => {
                self.pos += 1;
                Ok(ParsedAtom {
                    element,
                    aromatic,
                    charge,
                    hydrogens: Some(hydrogens),
                    offset: open,
                })
            }
            Some(_) => Err(self.unexpected(self.pos)),
            None => Err(unterminated()),
        }
    }

    /// Saturates at `u32::MAX`; callers range-check.
    fn read_number(&mut self) -> Option<u32> {
        let start = self.pos;
        while matches!(self.peek(), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        if start == self.pos {
            return None;
        }
        Some(self.text[start..self.pos].parse::<u32>().unwrap_or(u32::MAX))
    }

    fn finish(self) -> Result<Molecule, SmilesError> {
        let bonds: Vec<Bond> = self
            .bonds
            .iter()
            .map(|&(begin, end, order)| Bond {
                begin,
                end,
                order: order.unwrap_or(
                    if self.atoms[begin].aromatic && self.atoms[end].aromatic {
                        BondOrder::Aromatic
                    } else {
                        BondOrder::Single
                    },
                ),
                in_ring: false,
            })
            .collect();

        let atoms = self
            .atoms
            .iter()
            .enumerate()
            .map(|(index, parsed)| {
                let implicit_hydrogens = match parsed.hydrogens {
                    Some(count) => count,
                    None => implicit_hydrogens(parsed, index, &bonds)?,
                };
                Ok(Atom {
                    element: parsed.element,
                    charge: parsed.charge,
                    implicit_hydrogens,
                    aromatic: parsed.aromatic,
                    in_ring: false,
                })
            })
            .collect::<Result<Vec<_>, SmilesError>>()?;

        Ok(Molecule::new(atoms, bonds))
    }
}

fn organic(element: Element, aromatic: bool, offset: usize) -> ParsedAtom {
    ParsedAtom {
        element,
        aromatic,
        charge: 0,
        hydrogens: None,
        offset,
    }
}

/// Lowest default valence that covers the bonded valence. An aromatic atom
/// also spends one valence on the pi system when its lowest valence leaves
/// room for it; otherwise it donates a lone pair and takes no hydrogen.
fn implicit_hydrogens(
    atom: &ParsedAtom,
    index: usize,
    bonds: &[Bond],
) -> Result<u8, SmilesError> {
    let used = bonds
        .iter()
        .filter(|bond| bond.other(index).is_some())
        .try_fold(0u8, |sum, bond| sum.checked_add(bond.order.valence()))
        .ok_or(SmilesError::OutOfRange {
            quantity: "bonded valence",
            offset: atom.offset,
        })?;
    let valences = atom.element.default_valences();

    if atom.aromatic {
        let lowest = valences.first().copied().unwrap_or(0);
        return Ok(lowest.saturating_sub(used.saturating_add(1)));
    }
    Ok(valences
        .iter()
        .find(|valence| **valence >= used)
        .map_or(0, |valence| valence - used))
}
