//! Service container for dependency injection
//!
//! Wires up the renderer and the invoker with their dependencies.

use std::path::PathBuf;
use std::sync::Arc;

use crate::application::services::{InvokeService, RenderService};
use crate::config::Settings;
use crate::infrastructure::traits::{CommandRunner, FileSystem, RealCommandRunner, RealFileSystem};
use crate::infrastructure::InfraError;

/// Container holding the shared dependencies of one run.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Command runner abstraction
    pub cmd: Arc<dyn CommandRunner>,

    /// Directory receiving temporary scripts (the process working directory)
    pub work_dir: PathBuf,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Result<Self, InfraError> {
        let work_dir = std::env::current_dir()
            .map_err(|e| InfraError::io("determine working directory", e))?;
        Ok(Self::with_deps(
            settings,
            Arc::new(RealFileSystem),
            Arc::new(RealCommandRunner),
            work_dir,
        ))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        cmd: Arc<dyn CommandRunner>,
        work_dir: PathBuf,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            cmd,
            work_dir,
        }
    }

    /// Renderer reading templates from `template_dir`.
    pub fn render_service(&self, template_dir: PathBuf) -> RenderService {
        RenderService::new(Arc::clone(&self.fs), template_dir)
    }

    pub fn invoke_service(&self) -> InvokeService {
        InvokeService::new(
            Arc::clone(&self.fs),
            Arc::clone(&self.cmd),
            Arc::clone(&self.settings),
            self.work_dir.clone(),
        )
    }
}
