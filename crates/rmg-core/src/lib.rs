pub mod common;
pub mod domain;
pub mod ess;
pub mod ml;
pub mod molecule;
pub mod numerics;
pub mod statmech;
pub mod thermo;

pub use domain::{RmgError, RmgErrorCategory};
