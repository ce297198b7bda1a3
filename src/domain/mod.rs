//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no config loading).

pub mod entities;
pub mod error;

pub use entities::*;
pub use error::DomainError;
