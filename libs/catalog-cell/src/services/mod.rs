// libs/catalog-cell/src/services/mod.rs
pub mod catalog;

pub use catalog::*;
