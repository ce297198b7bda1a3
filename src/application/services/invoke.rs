//! Database client invocation service
//!
//! Builds the `psql`/`mysql` command for a run, optionally wrapped in
//! `<runtime> exec -i`, delivers the SQL and propagates the exit code.
//!
//! The password is only ever placed in the child environment:
//! - local: `PGPASSWORD` / `MYSQL_PWD` on the client process
//! - container: same variable on the runtime process, forwarded with `-e NAME`

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{ClientCommand, Dialect, RenderedScript, RunConfig, ScriptInput};
use crate::infrastructure::traits::{CommandRunner, FileSystem};

/// Temporary SQL script, removed when dropped.
pub struct ScriptFileGuard {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl ScriptFileGuard {
    /// Write `content` to `path` and take ownership of the file.
    pub fn create(fs: Arc<dyn FileSystem>, path: PathBuf, content: &str) -> ApplicationResult<Self> {
        fs.write(&path, content)
            .with_path_context("write SQL script", &path)?;
        debug!("script file created: {}", path.display());
        Ok(Self { fs, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScriptFileGuard {
    fn drop(&mut self) {
        match self.fs.remove_file(&self.path) {
            Ok(()) => debug!("script file removed: {}", self.path.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!("cannot remove {}: {}", self.path.display(), e),
        }
    }
}

/// A command ready to run, holding the script file (if any) alive.
pub struct PreparedRun<'a> {
    pub command: ClientCommand,
    client: String,
    stdin: Option<&'a str>,
    script_file: Option<ScriptFileGuard>,
}

impl PreparedRun<'_> {
    /// Path of the temporary script, when the client reads from a file.
    pub fn script_file(&self) -> Option<&Path> {
        self.script_file.as_ref().map(ScriptFileGuard::path)
    }
}

/// Runs the rendered script through the external database client.
pub struct InvokeService {
    fs: Arc<dyn FileSystem>,
    cmd: Arc<dyn CommandRunner>,
    settings: Arc<Settings>,
    work_dir: PathBuf,
}

impl InvokeService {
    /// Create an invoker writing temporary scripts into `work_dir`.
    pub fn new(
        fs: Arc<dyn FileSystem>,
        cmd: Arc<dyn CommandRunner>,
        settings: Arc<Settings>,
        work_dir: PathBuf,
    ) -> Self {
        Self {
            fs,
            cmd,
            settings,
            work_dir,
        }
    }

    /// Location of the temporary script for local PostgreSQL runs.
    pub fn script_path(&self) -> PathBuf {
        self.work_dir.join(&self.settings.script_file)
    }

    /// Client arguments shared by local and container execution.
    fn client_args(config: &RunConfig) -> Vec<String> {
        let port = config.effective_port().to_string();
        match config.dialect {
            Dialect::Postgres => vec![
                "-v".into(),
                "ON_ERROR_STOP=1".into(),
                "-h".into(),
                config.host.clone(),
                "-p".into(),
                port,
                "-U".into(),
                config.user.clone(),
                "-d".into(),
                config.database.clone(),
            ],
            Dialect::Mariadb => vec![
                "-h".into(),
                config.host.clone(),
                "-P".into(),
                port,
                "-u".into(),
                config.user.clone(),
                config.database.clone(),
                "--protocol=TCP".into(),
            ],
        }
    }

    /// Name reported when the run fails, e.g. `docker exec db1 mysql`.
    pub fn client_label(&self, config: &RunConfig) -> String {
        match &config.container {
            Some(container) => format!(
                "{} exec {} {}",
                self.settings.container_runtime, container, config.client_binary_path
            ),
            None => config.client_binary_path.clone(),
        }
    }

    /// Build the full command for `config` without touching the filesystem.
    pub fn build_command(&self, config: &RunConfig) -> ClientCommand {
        let password_env = config.dialect.password_env();
        let env = vec![(password_env.to_string(), config.password.clone())];
        let client_args = Self::client_args(config);

        match &config.container {
            Some(container) => {
                let mut args: Vec<String> = vec![
                    "exec".into(),
                    "-i".into(),
                    "-e".into(),
                    password_env.into(),
                    container.clone(),
                    config.client_binary_path.clone(),
                ];
                args.extend(client_args);
                if config.dialect == Dialect::Postgres {
                    args.extend(["-f".to_string(), "-".to_string()]);
                }
                ClientCommand {
                    program: self.settings.container_runtime.clone(),
                    args,
                    env,
                    input: ScriptInput::Stdin,
                }
            }
            None => match config.dialect {
                Dialect::Postgres => {
                    let script = self.script_path();
                    let mut args = client_args;
                    args.extend(["-f".to_string(), script.display().to_string()]);
                    ClientCommand {
                        program: config.client_binary_path.clone(),
                        args,
                        env,
                        input: ScriptInput::File(script),
                    }
                }
                Dialect::Mariadb => ClientCommand {
                    program: config.client_binary_path.clone(),
                    args: client_args,
                    env,
                    input: ScriptInput::Stdin,
                },
            },
        }
    }

    /// Build the command and materialize its input.
    ///
    /// For file input the script is written now and removed when the
    /// returned `PreparedRun` is dropped.
    pub fn prepare<'a>(
        &self,
        config: &RunConfig,
        script: &'a RenderedScript,
    ) -> ApplicationResult<PreparedRun<'a>> {
        let command = self.build_command(config);
        let (stdin, script_file) = match &command.input {
            ScriptInput::Stdin => (Some(script.as_str()), None),
            ScriptInput::File(path) => {
                let guard =
                    ScriptFileGuard::create(Arc::clone(&self.fs), path.clone(), script.as_str())?;
                (None, Some(guard))
            }
        };
        Ok(PreparedRun {
            command,
            client: self.client_label(config),
            stdin,
            script_file,
        })
    }

    /// Run a prepared command and wait for it.
    ///
    /// The script file is removed before this returns, on every path.
    #[instrument(skip_all, fields(program = %prepared.command.program))]
    pub fn run(&self, prepared: PreparedRun<'_>) -> ApplicationResult<()> {
        let code = self
            .cmd
            .run_streaming(&prepared.command, prepared.stdin)
            .with_program_context(&prepared.command.program)?;
        debug!("run: exit code {}", code);

        if code != 0 {
            return Err(ApplicationError::ClientFailed {
                client: prepared.client.clone(),
                code,
            });
        }
        Ok(())
    }

    /// Prepare and run in one step.
    pub fn execute(&self, config: &RunConfig, script: &RenderedScript) -> ApplicationResult<()> {
        let prepared = self.prepare(config, script)?;
        self.run(prepared)
    }
}
