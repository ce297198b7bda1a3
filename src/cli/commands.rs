//! Command execution: flags → RunConfig → render → invoke

use std::path::PathBuf;

use tracing::{debug, info, instrument};

use crate::cli::args::Cli;
use crate::cli::output;
use crate::cli::CliResult;
use crate::config::Settings;
use crate::domain::{expand_env_vars, Dialect, RunConfig};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::util::install;

/// Load settings, wire up real services and run.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let settings = Settings::load()?;
    debug!("settings: {:?}", settings);
    let container = ServiceContainer::new(settings)?;
    run(cli, &container)
}

/// Resolve the run parameters; CLI flags win over settings.
pub fn build_run_config(cli: &Cli, settings: &Settings) -> RunConfig {
    let client_override = match cli.dialect {
        Dialect::Postgres => cli.psql_path.as_deref(),
        Dialect::Mariadb => cli.mysql_path.as_deref(),
    };
    let client_binary_path = client_override
        .map(expand_env_vars)
        .unwrap_or_else(|| settings.client_path(cli.dialect).to_string());

    RunConfig {
        dialect: cli.dialect,
        database: cli.database.clone(),
        user: cli.user.clone(),
        password: cli.password.clone(),
        host: cli.host.clone(),
        port: cli.port,
        search_text: cli.search.clone(),
        replace_text: cli.replace.clone(),
        container: cli.container.clone(),
        client_binary_path,
    }
}

/// `--template-dir`, then settings, then `<install dir>/templates/query`.
pub fn resolve_template_dir(cli: &Cli, settings: &Settings) -> CliResult<PathBuf> {
    if let Some(dir) = &cli.template_dir {
        return Ok(PathBuf::from(expand_env_vars(&dir.to_string_lossy())));
    }
    if let Some(dir) = &settings.template_dir {
        return Ok(dir.clone());
    }
    let dir = install::default_template_dir()
        .map_err(|e| InfraError::io("locate installation directory", e))?;
    Ok(dir)
}

/// Run one search/replace against the services in `container`.
#[instrument(skip_all)]
pub fn run(cli: &Cli, container: &ServiceContainer) -> CliResult<()> {
    let config = build_run_config(cli, &container.settings);
    info!(
        "{} mode: dialect={}, database={}, host={}:{}, container={:?}",
        config.mode(),
        config.dialect,
        config.database,
        config.host,
        config.effective_port(),
        config.container
    );

    let template_dir = resolve_template_dir(cli, &container.settings)?;
    let renderer = container.render_service(template_dir);
    let script = renderer.render(
        config.dialect,
        config.mode(),
        &config.search_text,
        config.replace_text.as_deref(),
    )?;

    let invoker = container.invoke_service();
    if cli.dry_run {
        let command = invoker.build_command(&config);
        output::action("Would execute", &command.command_line());
        output::header(&format!("-- {} ({} mode)", config.dialect.template_name(), config.mode()));
        output::info(script.as_str());
        return Ok(());
    }

    let prepared = invoker.prepare(&config, &script)?;
    output::action("Executing", &prepared.command.command_line());
    invoker.run(prepared)?;
    Ok(())
}
