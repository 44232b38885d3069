// exported modules
pub mod api;
pub mod auth;
pub mod error;
pub mod model;
pub mod session;

// re-exports
pub use auth::{AuthMethod, AuthRegistry};
pub use error::*;
pub use model::*;
pub use session::{Session, SigningRequest, VaultSession};
