//! Template rendering service
//!
//! Loads `<template_dir>/<dialect>.sql.j2` and renders it with `mode`,
//! `search_text` and `replace_text`. Undefined variables are fatal.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use minijinja::{context, AutoEscape, Environment, ErrorKind, UndefinedBehavior};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{Dialect, DomainError, Mode, RenderedScript};
use crate::infrastructure::traits::FileSystem;

/// Renders the dialect-specific SQL script.
pub struct RenderService {
    fs: Arc<dyn FileSystem>,
    template_dir: PathBuf,
}

impl RenderService {
    /// Create a renderer reading templates from `template_dir`.
    pub fn new(fs: Arc<dyn FileSystem>, template_dir: PathBuf) -> Self {
        Self { fs, template_dir }
    }

    pub fn template_dir(&self) -> &Path {
        &self.template_dir
    }

    /// Where the template for `dialect` is expected.
    pub fn template_path(&self, dialect: Dialect) -> PathBuf {
        self.template_dir.join(dialect.template_name())
    }

    /// Render the script for one run.
    ///
    /// # Errors
    /// - `MissingParameter` when `mode` is replace but no replace text is given
    /// - `TemplateNotFound` when the dialect template does not exist
    /// - `Render` for any template error, including undefined variables
    #[instrument(skip(self, search_text, replace_text))]
    pub fn render(
        &self,
        dialect: Dialect,
        mode: Mode,
        search_text: &str,
        replace_text: Option<&str>,
    ) -> ApplicationResult<RenderedScript> {
        if mode == Mode::Replace && replace_text.is_none() {
            return Err(DomainError::MissingParameter {
                name: "replace_text",
                mode: mode.as_str(),
            }
            .into());
        }

        let path = self.template_path(dialect);
        if !self.fs.is_file(&path) {
            return Err(ApplicationError::TemplateNotFound { path });
        }
        debug!("render: template={}", path.display());

        let name = dialect.template_name();
        let env = self.environment(dialect);
        let render_err = |source: minijinja::Error| ApplicationError::Render {
            template: name.clone(),
            source,
        };

        let template = env.get_template(&name).map_err(render_err)?;
        let sql = template
            .render(context! {
                mode => mode.as_str(),
                search_text => search_text,
                replace_text => replace_text,
            })
            .map_err(render_err)?;

        debug!("render: produced {} bytes of SQL", sql.len());
        Ok(RenderedScript::new(sql))
    }

    fn environment(&self, dialect: Dialect) -> Environment<'static> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_keep_trailing_newline(true);
        env.add_filter("sql_literal", move |value: String| {
            dialect.quote_literal(&value)
        });

        let fs = Arc::clone(&self.fs);
        let dir = self.template_dir.clone();
        env.set_loader(move |name| {
            if name.split('/').any(|segment| segment == "..") {
                return Ok(None);
            }
            let path = dir.join(name);
            if !fs.is_file(&path) {
                return Ok(None);
            }
            fs.read_to_string(&path).map(Some).map_err(|e| {
                minijinja::Error::new(
                    ErrorKind::InvalidOperation,
                    format!("cannot read template {}", path.display()),
                )
                .with_source(e)
            })
        });
        env
    }
}
