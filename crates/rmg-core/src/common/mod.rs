pub mod constants;
pub mod elements;
pub mod quantity;

pub use elements::Element;
pub use quantity::{ArrayQuantity, ScalarQuantity, Units};
