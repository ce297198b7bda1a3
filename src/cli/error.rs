//! CLI-level errors (wraps infrastructure errors)

use std::io;

use thiserror::Error;

use crate::application::ApplicationError;
use crate::exitcode;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Infra(#[from] InfraError),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    ///
    /// A failing client's own exit code is passed through unchanged.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Infra(InfraError::Io { .. }) => exitcode::IOERR,
            CliError::Infra(InfraError::Application(e)) => match e {
                ApplicationError::TemplateNotFound { .. } | ApplicationError::Config { .. } => {
                    exitcode::CONFIG
                }
                ApplicationError::Domain(_) | ApplicationError::Render { .. } => exitcode::DATAERR,
                ApplicationError::ClientFailed { code, .. } => *code,
                ApplicationError::ClientSpawn { source, .. } => match source.kind() {
                    io::ErrorKind::NotFound => exitcode::NOTFOUND,
                    io::ErrorKind::PermissionDenied => exitcode::NOEXEC,
                    _ => exitcode::OSERR,
                },
                ApplicationError::OperationFailed { .. } => exitcode::IOERR,
            },
        }
    }
}
