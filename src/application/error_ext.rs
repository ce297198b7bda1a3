//! Error conversion helpers for I/O on script and template files

use std::io;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

/// Extension trait for converting `io::Result` to `ApplicationResult` with context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// fs.write(&script_path, sql)
    ///     .with_path_context("write SQL script", &script_path)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;

    /// Map a failed spawn/wait of `program` into `ClientSpawn`.
    fn with_program_context(self, program: &str) -> ApplicationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }

    fn with_program_context(self, program: &str) -> ApplicationResult<T> {
        self.map_err(|source| ApplicationError::ClientSpawn {
            program: program.to_string(),
            source,
        })
    }
}
