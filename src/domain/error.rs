//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent violated invariants of a run's parameters.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("template parameter '{name}' is required in {mode} mode")]
    MissingParameter { name: &'static str, mode: &'static str },
}
