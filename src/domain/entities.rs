//! Domain entities: core data structures

use std::fmt;
use std::path::PathBuf;

use clap::ValueEnum;
use zeroize::Zeroizing;

/// Database family targeted by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum Dialect {
    Postgres,
    #[value(alias = "mysql")]
    Mariadb,
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Postgres => "postgres",
            Dialect::Mariadb => "mariadb",
        }
    }

    /// Port used when none was given on the command line.
    pub fn default_port(&self) -> u16 {
        match self {
            Dialect::Postgres => 5432,
            Dialect::Mariadb => 3306,
        }
    }

    /// Name of the client binary looked up on `PATH` by default.
    pub fn default_client(&self) -> &'static str {
        match self {
            Dialect::Postgres => "psql",
            Dialect::Mariadb => "mysql",
        }
    }

    /// Environment variable the client reads its password from.
    pub fn password_env(&self) -> &'static str {
        match self {
            Dialect::Postgres => "PGPASSWORD",
            Dialect::Mariadb => "MYSQL_PWD",
        }
    }

    /// Template file name, e.g. `postgres.sql.j2`.
    pub fn template_name(&self) -> String {
        format!("{}.sql.j2", self.as_str())
    }

    /// Render `value` as a single-quoted SQL string literal.
    ///
    /// MariaDB treats backslash as an escape character inside literals,
    /// PostgreSQL (with `standard_conforming_strings`) does not.
    pub fn quote_literal(&self, value: &str) -> String {
        let escaped = match self {
            Dialect::Postgres => value.replace('\'', "''"),
            Dialect::Mariadb => value.replace('\\', "\\\\").replace('\'', "''"),
        };
        format!("'{}'", escaped)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a run only reports matches or also rewrites them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Search,
    Replace,
}

impl Mode {
    /// Replace mode iff a replacement text was supplied.
    pub fn from_replace_text(replace_text: Option<&str>) -> Self {
        match replace_text {
            Some(_) => Mode::Replace,
            None => Mode::Search,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Search => "search",
            Mode::Replace => "replace",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Secret string, zeroed on drop and redacted in debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(Zeroizing<String>);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Zeroizing::new(value.into()))
    }

    /// Access the plaintext. Only for handing it to a child process environment.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Everything one run needs, resolved from CLI flags and settings.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub dialect: Dialect,
    pub database: String,
    pub user: String,
    pub password: Secret,
    pub host: String,
    /// Explicit port; `None` means the dialect default.
    pub port: Option<u16>,
    pub search_text: String,
    pub replace_text: Option<String>,
    /// Container to `exec` the client in
    pub container: Option<String>,
    /// Client binary for the selected dialect
    pub client_binary_path: String,
}

impl RunConfig {
    pub fn mode(&self) -> Mode {
        Mode::from_replace_text(self.replace_text.as_deref())
    }

    /// Port passed to the client.
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.dialect.default_port())
    }
}

/// SQL text produced by the renderer, consumed once by the invoker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedScript(String);

impl RenderedScript {
    pub fn new(sql: impl Into<String>) -> Self {
        Self(sql.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// How the client receives the SQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptInput {
    /// Piped through the child's stdin
    Stdin,
    /// Read by the client from a file (`psql -f <path>`)
    File(PathBuf),
}

/// Fully built client invocation.
///
/// Secrets only ever live in `env`; `args` is safe to print.
#[derive(Debug, Clone)]
pub struct ClientCommand {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, Secret)>,
    pub input: ScriptInput,
}

impl ClientCommand {
    /// Printable command line (program and arguments, space separated).
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Expand environment variables in a path string.
///
/// Supports:
/// - `$VAR` syntax
/// - `${VAR}` syntax
/// - `~` for home directory
///
/// Uses shellexpand crate for robust expansion.
pub fn expand_env_vars(path: &str) -> String {
    shellexpand::full(path)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| path.to_string())
}
