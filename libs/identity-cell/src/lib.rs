// libs/identity-cell/src/lib.rs
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::*;
pub use router::identity_routes;
pub use services::roles::RoleService;
