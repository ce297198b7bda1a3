//! Locating the installation directory
//!
//! Templates ship next to the executable, so every lookup starts from the
//! directory of the running binary with symlinks resolved. A binary invoked
//! through `~/bin/dbreplace -> /opt/dbreplace/dbreplace` finds
//! `/opt/dbreplace/templates/query`.

use std::io;
use std::path::{Path, PathBuf};

/// Directory name of the shipped templates below the install dir.
pub const TEMPLATE_SUBDIR: [&str; 2] = ["templates", "query"];

/// Directory containing the running executable.
pub fn install_dir() -> io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    install_dir_of(&exe)
}

/// Directory containing `exe` after resolving symlinks.
///
/// Falls back to the unresolved path when it cannot be canonicalized
/// (e.g. the binary was deleted while running).
pub fn install_dir_of(exe: &Path) -> io::Result<PathBuf> {
    let resolved = exe.canonicalize().unwrap_or_else(|_| exe.to_path_buf());
    resolved
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("executable has no parent directory: {}", resolved.display()),
            )
        })
}

/// Template directory below an install dir.
pub fn template_dir_in(install_dir: &Path) -> PathBuf {
    TEMPLATE_SUBDIR
        .iter()
        .fold(install_dir.to_path_buf(), |dir, part| dir.join(part))
}

/// `<install dir>/templates/query`
pub fn default_template_dir() -> io::Result<PathBuf> {
    install_dir().map(|dir| template_dir_in(&dir))
}
