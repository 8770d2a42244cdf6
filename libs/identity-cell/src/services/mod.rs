// libs/identity-cell/src/services/mod.rs
pub mod roles;

pub use roles::*;
