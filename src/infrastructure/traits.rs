//! I/O boundary traits for testability
//!
//! These traits abstract external I/O operations, allowing services
//! to be tested with mock implementations.

use std::io;
use std::path::Path;
use std::process::ExitStatus;

use tracing::debug;

use crate::domain::ClientCommand;
use crate::exitcode;

/// Filesystem abstraction for testability.
pub trait FileSystem: Send + Sync {
    /// Read file contents to string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Write string content to file.
    fn write(&self, path: &Path, content: &str) -> io::Result<()>;

    /// Check if path is a file.
    fn is_file(&self, path: &Path) -> bool;

    /// Remove a file.
    fn remove_file(&self, path: &Path) -> io::Result<()>;
}

/// External command runner abstraction.
pub trait CommandRunner: Send + Sync {
    /// Run a client to completion with stdout/stderr inherited.
    ///
    /// `stdin` is written to the child and then closed; `None` leaves the
    /// child attached to our own stdin. Returns the exit code, with
    /// signal terminations mapped to `128 + signal`.
    fn run_streaming(&self, command: &ClientCommand, stdin: Option<&str>) -> io::Result<i32>;
}

// ============================================================
// REAL IMPLEMENTATIONS
// ============================================================

/// Real filesystem implementation.
#[derive(Debug, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> io::Result<()> {
        std::fs::write(path, content)
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }
}

/// Real command runner implementation.
#[derive(Debug, Default)]
pub struct RealCommandRunner;

impl CommandRunner for RealCommandRunner {
    fn run_streaming(&self, command: &ClientCommand, stdin: Option<&str>) -> io::Result<i32> {
        use std::io::Write;
        use std::process::{Command, Stdio};

        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args);
        for (key, value) in &command.env {
            cmd.env(key, value.expose());
        }
        if stdin.is_some() {
            cmd.stdin(Stdio::piped());
        }

        let mut child = cmd.spawn()?;
        debug!("run_streaming: spawned {} (pid {})", command.program, child.id());

        if let Some(input) = stdin {
            if let Some(mut child_stdin) = child.stdin.take() {
                // A client that stops on the first error closes its stdin early.
                match child_stdin.write_all(input.as_bytes()) {
                    Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                        debug!("run_streaming: client closed stdin early");
                    }
                    other => other?,
                }
            }
        }

        let status = child.wait()?;
        Ok(exit_code(status))
    }
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return exitcode::SIGNAL_BASE + signal;
        }
    }
    exitcode::SOFTWARE
}
