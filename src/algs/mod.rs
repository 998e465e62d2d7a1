//! Constructions combining whole topologies.

pub mod extrude;

pub use extrude::{ProductOptions, extrude, product, product_with};
