//! Content model - product data and the page sections derived from it

pub mod blocks;
pub(crate) mod product;

pub use product::{Product, ProductError, ProductFacts};
