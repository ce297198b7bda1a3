//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use std::error::Error;

use colored::Colorize;

/// Print error (red bold "error:" prefix) to stderr, followed by its causes
pub fn error(err: &(dyn Error + 'static)) {
    eprintln!("{}: {}", "error".red().bold(), err);
    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  {}: {}", "caused by".yellow(), cause);
        source = cause.source();
    }
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print plain output (no color, for SQL text)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}
