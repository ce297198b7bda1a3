//! Process exit codes (BSD sysexits.h compatible where applicable)
//!
//! A failing database client is not listed here: its own exit code is
//! passed through unchanged.

/// Successful termination
pub const OK: i32 = 0;

/// Template not found or settings unusable
pub const CONFIG: i32 = 2;

/// Command line usage error
pub const USAGE: i32 = 64;

/// Template could not be rendered
pub const DATAERR: i32 = 65;

/// Internal software error
pub const SOFTWARE: i32 = 70;

/// System error (e.g., can't fork)
pub const OSERR: i32 = 71;

/// Input/output error
pub const IOERR: i32 = 74;

/// Client binary exists but cannot be executed
pub const NOEXEC: i32 = 126;

/// Client binary not found
pub const NOTFOUND: i32 = 127;

/// Offset added to a signal number when the client was killed by a signal
pub const SIGNAL_BASE: i32 = 128;
