//! Price normalization: raw storefront price strings to comparable
//! per-unit figures.

pub mod normalizer;

pub use normalizer::{normalize, parse_price, UnitPrice};
