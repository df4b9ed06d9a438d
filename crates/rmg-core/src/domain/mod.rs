pub mod errors;

pub use errors::{RmgError, RmgErrorCategory};

use std::fmt::{Display, Formatter};

/// Electronic-structure programs whose logs can be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum EssProgram {
    Psi4,
}

impl EssProgram {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Psi4 => "Psi4",
        }
    }

    /// Banner text printed near the top of every log the program writes.
    pub const fn banner(self) -> &'static str {
        match self {
            Self::Psi4 => "Psi4: An Open-Source Ab Initio Electronic Structure Package",
        }
    }

    pub const fn all() -> &'static [EssProgram] {
        &[Self::Psi4]
    }
}

impl Display for EssProgram {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str((*self).as_str())
    }
}
