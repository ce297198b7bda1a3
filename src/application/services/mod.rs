//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, CommandRunner)
//! but are themselves concrete structs, not traits.

mod invoke;
mod render;

pub use invoke::{InvokeService, PreparedRun, ScriptFileGuard};
pub use render::RenderService;
