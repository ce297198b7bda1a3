//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add application-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("template not found\nExpected at: {}\nMake sure the template is installed next to the executable or pass --template-dir.", path.display())]
    TemplateNotFound { path: PathBuf },

    #[error("failed to render template {template}")]
    Render {
        template: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("{client} exited with code {code}")]
    ClientFailed { client: String, code: i32 },

    #[error("cannot run {program}")]
    ClientSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
