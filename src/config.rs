//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/dbreplace/dbreplace.toml`
//! 3. Environment variables: `DBREPLACE_*` prefix
//! 4. Command line flags (applied by the CLI layer)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::{expand_env_vars, Dialect};

/// Default name of the temporary script written for local PostgreSQL runs.
pub const DEFAULT_SCRIPT_FILE: &str = ".pg_bulk_find_replace.sql";

/// Unified configuration for dbreplace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Directory holding `<dialect>.sql.j2` (default: `<install dir>/templates/query`)
    pub template_dir: Option<PathBuf>,
    /// Binary used to exec into containers
    pub container_runtime: String,
    /// psql binary (PostgreSQL)
    pub psql_path: String,
    /// mysql binary (MariaDB/MySQL)
    pub mysql_path: String,
    /// File name of the temporary script, created in the working directory
    pub script_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            template_dir: None,
            container_runtime: "docker".into(),
            psql_path: Dialect::Postgres.default_client().into(),
            mysql_path: Dialect::Mariadb.default_client().into(),
            script_file: DEFAULT_SCRIPT_FILE.into(),
        }
    }
}

/// Raw settings for intermediate parsing (`None` → not specified, keep base).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RawSettings {
    pub template_dir: Option<PathBuf>,
    pub container_runtime: Option<String>,
    pub psql_path: Option<String>,
    pub mysql_path: Option<String>,
    pub script_file: Option<String>,
}

/// Get the XDG config directory for dbreplace.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "dbreplace").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("dbreplace.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Client binary configured for `dialect`.
    pub fn client_path(&self, dialect: Dialect) -> &str {
        match dialect {
            Dialect::Postgres => &self.psql_path,
            Dialect::Mariadb => &self.mysql_path,
        }
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            template_dir: overlay
                .template_dir
                .clone()
                .or_else(|| self.template_dir.clone()),
            container_runtime: overlay
                .container_runtime
                .clone()
                .unwrap_or_else(|| self.container_runtime.clone()),
            psql_path: overlay
                .psql_path
                .clone()
                .unwrap_or_else(|| self.psql_path.clone()),
            mysql_path: overlay
                .mysql_path
                .clone()
                .unwrap_or_else(|| self.mysql_path.clone()),
            script_file: overlay
                .script_file
                .clone()
                .unwrap_or_else(|| self.script_file.clone()),
        }
    }

    /// Expand `~`, `$VAR` and `${VAR}` in path-like fields.
    fn expand_paths(&mut self) {
        if let Some(dir) = &self.template_dir {
            self.template_dir = Some(PathBuf::from(expand_env_vars(&dir.to_string_lossy())));
        }
        self.container_runtime = expand_env_vars(&self.container_runtime);
        self.psql_path = expand_env_vars(&self.psql_path);
        self.mysql_path = expand_env_vars(&self.mysql_path);
    }

    fn validate(&self) -> Result<(), ApplicationError> {
        let script = Path::new(&self.script_file);
        if self.script_file.is_empty() || script.components().count() != 1 {
            return Err(ApplicationError::Config {
                message: format!(
                    "script_file must be a plain file name, got '{}'",
                    self.script_file
                ),
            });
        }
        if self.container_runtime.trim().is_empty() {
            return Err(ApplicationError::Config {
                message: "container_runtime must not be empty".into(),
            });
        }
        Ok(())
    }

    /// Load settings with layered precedence from the global config file.
    pub fn load() -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref())
    }

    /// Load settings using `config_file` in place of the global config.
    ///
    /// A missing file is not an error; an unreadable or malformed one is.
    pub fn load_from(config_file: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(path) = config_file {
            if path.exists() {
                debug!("load: config file {}", path.display());
                let raw = load_raw_settings(path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();
        current.validate()?;

        Ok(current)
    }

    /// Apply DBREPLACE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("DBREPLACE").prefix_separator("_"))
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("template_dir") {
            settings.template_dir = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_string("container_runtime") {
            settings.container_runtime = val;
        }
        if let Ok(val) = config.get_string("psql_path") {
            settings.psql_path = val;
        }
        if let Ok(val) = config.get_string("mysql_path") {
            settings.mysql_path = val;
        }
        if let Ok(val) = config.get_string("script_file") {
            settings.script_file = val;
        }

        Ok(settings)
    }
}
