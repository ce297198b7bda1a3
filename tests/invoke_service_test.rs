//! Tests for InvokeService

use std::io;
use std::path::Path;
use std::sync::{Arc, Mutex};

use rstest::rstest;
use tempfile::TempDir;

use dbreplace::application::services::InvokeService;
use dbreplace::application::ApplicationError;
use dbreplace::config::{Settings, DEFAULT_SCRIPT_FILE};
use dbreplace::domain::{ClientCommand, Dialect, RenderedScript, RunConfig, ScriptInput, Secret};
use dbreplace::infrastructure::traits::{CommandRunner, RealFileSystem};
use dbreplace::util::testing;

const PASSWORD: &str = "pa55-w0rd!";

#[ctor::ctor]
fn init() {
    testing::init_test_setup();
}

/// What the runner saw for one invocation
#[derive(Debug, Clone)]
struct RecordedCall {
    program: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
    stdin: Option<String>,
    /// Content of the script file at the time the client ran
    script_on_disk: Option<String>,
}

/// Mock runner that records invocations and returns a fixed exit code
struct RecordingRunner {
    exit_code: i32,
    spawn_error: Option<io::ErrorKind>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl RecordingRunner {
    fn exiting_with(exit_code: i32) -> Self {
        Self {
            exit_code,
            spawn_error: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing_to_spawn(kind: io::ErrorKind) -> Self {
        Self {
            exit_code: 0,
            spawn_error: Some(kind),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run_streaming(&self, command: &ClientCommand, stdin: Option<&str>) -> io::Result<i32> {
        if let Some(kind) = self.spawn_error {
            return Err(io::Error::new(kind, "spawn failed"));
        }
        let script_on_disk = match &command.input {
            ScriptInput::File(path) => std::fs::read_to_string(path).ok(),
            ScriptInput::Stdin => None,
        };
        self.calls.lock().unwrap().push(RecordedCall {
            program: command.program.clone(),
            args: command.args.clone(),
            env: command
                .env
                .iter()
                .map(|(k, v)| (k.clone(), v.expose().to_string()))
                .collect(),
            stdin: stdin.map(String::from),
            script_on_disk,
        });
        Ok(self.exit_code)
    }
}

fn run_config(dialect: Dialect) -> RunConfig {
    RunConfig {
        dialect,
        database: "shop".into(),
        user: "admin".into(),
        password: Secret::new(PASSWORD),
        host: "db.local".into(),
        port: None,
        search_text: "foo".into(),
        replace_text: None,
        container: None,
        client_binary_path: dialect.default_client().into(),
    }
}

fn service(work_dir: &Path, runner: Arc<RecordingRunner>) -> InvokeService {
    InvokeService::new(
        Arc::new(RealFileSystem),
        runner,
        Arc::new(Settings::default()),
        work_dir.to_path_buf(),
    )
}

fn script() -> RenderedScript {
    RenderedScript::new("SELECT 1;\n")
}

// ============================================================
// local PostgreSQL: script file
// ============================================================

#[test]
fn given_local_postgres_when_execute_then_psql_reads_script_file() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let runner = Arc::new(RecordingRunner::exiting_with(0));
    let service = service(temp.path(), runner.clone());
    let config = run_config(Dialect::Postgres);
    let script_path = temp.path().join(DEFAULT_SCRIPT_FILE);

    // Act
    service.execute(&config, &script()).unwrap();

    // Assert
    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    let call = &calls[0];
    assert_eq!(call.program, "psql");
    assert_eq!(
        call.args,
        vec![
            "-v",
            "ON_ERROR_STOP=1",
            "-h",
            "db.local",
            "-p",
            "5432",
            "-U",
            "admin",
            "-d",
            "shop",
            "-f",
            script_path.to_str().unwrap(),
        ]
    );
    assert_eq!(call.env, vec![("PGPASSWORD".to_string(), PASSWORD.to_string())]);
    assert_eq!(call.stdin, None);
    assert_eq!(call.script_on_disk.as_deref(), Some("SELECT 1;\n"));
    assert!(!script_path.exists(), "script file must be removed after run");
}

#[test]
fn given_local_postgres_when_client_fails_then_code_propagates_and_file_removed() {
    let temp = TempDir::new().unwrap();
    let runner = Arc::new(RecordingRunner::exiting_with(3));
    let service = service(temp.path(), runner.clone());

    let err = service
        .execute(&run_config(Dialect::Postgres), &script())
        .unwrap_err();

    match err {
        ApplicationError::ClientFailed { client, code } => {
            assert_eq!(client, "psql");
            assert_eq!(code, 3);
        }
        other => panic!("expected ClientFailed, got {other:?}"),
    }
    assert!(runner.calls()[0].script_on_disk.is_some());
    assert!(!temp.path().join(DEFAULT_SCRIPT_FILE).exists());
}

#[test]
fn given_missing_client_binary_when_execute_then_spawn_error_and_file_removed() {
    let temp = TempDir::new().unwrap();
    let runner = Arc::new(RecordingRunner::failing_to_spawn(io::ErrorKind::NotFound));
    let service = service(temp.path(), runner);

    let err = service
        .execute(&run_config(Dialect::Postgres), &script())
        .unwrap_err();

    assert!(matches!(err, ApplicationError::ClientSpawn { ref program, .. } if program == "psql"));
    assert!(!temp.path().join(DEFAULT_SCRIPT_FILE).exists());
}

#[test]
fn given_prepared_run_when_dropped_without_running_then_file_removed() {
    let temp = TempDir::new().unwrap();
    let runner = Arc::new(RecordingRunner::exiting_with(0));
    let service = service(temp.path(), runner.clone());
    let script = script();

    let prepared = service
        .prepare(&run_config(Dialect::Postgres), &script)
        .unwrap();
    let path = prepared.script_file().unwrap().to_path_buf();
    assert!(path.exists());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "SELECT 1;\n");

    drop(prepared);

    assert!(!path.exists());
    assert!(runner.calls().is_empty());
}

#[test]
fn given_build_command_only_then_no_script_file_written() {
    let temp = TempDir::new().unwrap();
    let runner = Arc::new(RecordingRunner::exiting_with(0));
    let service = service(temp.path(), runner);

    let command = service.build_command(&run_config(Dialect::Postgres));

    assert_eq!(
        command.input,
        ScriptInput::File(temp.path().join(DEFAULT_SCRIPT_FILE))
    );
    assert!(!temp.path().join(DEFAULT_SCRIPT_FILE).exists());
}

// ============================================================
// local MariaDB: stdin
// ============================================================

#[test]
fn given_local_mariadb_when_execute_then_sql_on_stdin_and_port_3306() {
    let temp = TempDir::new().unwrap();
    let runner = Arc::new(RecordingRunner::exiting_with(0));
    let service = service(temp.path(), runner.clone());

    service
        .execute(&run_config(Dialect::Mariadb), &script())
        .unwrap();

    let call = &runner.calls()[0];
    assert_eq!(call.program, "mysql");
    assert_eq!(
        call.args,
        vec!["-h", "db.local", "-P", "3306", "-u", "admin", "shop", "--protocol=TCP"]
    );
    assert_eq!(call.env, vec![("MYSQL_PWD".to_string(), PASSWORD.to_string())]);
    assert_eq!(call.stdin.as_deref(), Some("SELECT 1;\n"));
    assert!(!temp.path().join(DEFAULT_SCRIPT_FILE).exists());
}

#[rstest]
#[case(Dialect::Mariadb, None, "3306")]
#[case(Dialect::Mariadb, Some(3307), "3307")]
#[case(Dialect::Mariadb, Some(5432), "5432")]
#[case(Dialect::Postgres, None, "5432")]
#[case(Dialect::Postgres, Some(6543), "6543")]
fn given_port_when_build_command_then_effective_port_used(
    #[case] dialect: Dialect,
    #[case] port: Option<u16>,
    #[case] expected: &str,
) {
    let temp = TempDir::new().unwrap();
    let service = service(temp.path(), Arc::new(RecordingRunner::exiting_with(0)));
    let config = RunConfig {
        port,
        ..run_config(dialect)
    };

    let command = service.build_command(&config);

    let flag = match dialect {
        Dialect::Postgres => "-p",
        Dialect::Mariadb => "-P",
    };
    let idx = command.args.iter().position(|a| a == flag).unwrap();
    assert_eq!(command.args[idx + 1], expected);
}

// ============================================================
// container execution
// ============================================================

#[test]
fn given_container_mariadb_replace_when_execute_then_docker_exec_with_stdin() {
    let temp = TempDir::new().unwrap();
    let runner = Arc::new(RecordingRunner::exiting_with(0));
    let service = service(temp.path(), runner.clone());
    let config = RunConfig {
        replace_text: Some("bar".into()),
        container: Some("db1".into()),
        ..run_config(Dialect::Mariadb)
    };

    service.execute(&config, &script()).unwrap();

    let call = &runner.calls()[0];
    assert_eq!(call.program, "docker");
    assert_eq!(
        call.args,
        vec![
            "exec",
            "-i",
            "-e",
            "MYSQL_PWD",
            "db1",
            "mysql",
            "-h",
            "db.local",
            "-P",
            "3306",
            "-u",
            "admin",
            "shop",
            "--protocol=TCP",
        ]
    );
    assert_eq!(call.env, vec![("MYSQL_PWD".to_string(), PASSWORD.to_string())]);
    assert_eq!(call.stdin.as_deref(), Some("SELECT 1;\n"));
}

#[test]
fn given_container_postgres_when_execute_then_psql_reads_stdin_and_no_file() {
    let temp = TempDir::new().unwrap();
    let runner = Arc::new(RecordingRunner::exiting_with(0));
    let service = service(temp.path(), runner.clone());
    let config = RunConfig {
        container: Some("pg".into()),
        ..run_config(Dialect::Postgres)
    };

    service.execute(&config, &script()).unwrap();

    let call = &runner.calls()[0];
    assert_eq!(call.program, "docker");
    assert_eq!(&call.args[..6], &["exec", "-i", "-e", "PGPASSWORD", "pg", "psql"]);
    assert_eq!(&call.args[call.args.len() - 2..], &["-f", "-"]);
    assert_eq!(call.stdin.as_deref(), Some("SELECT 1;\n"));
    assert_eq!(call.script_on_disk, None);
    assert!(!temp.path().join(DEFAULT_SCRIPT_FILE).exists());
}

#[test]
fn given_custom_runtime_and_client_path_when_build_command_then_used() {
    let temp = TempDir::new().unwrap();
    let settings = Settings {
        container_runtime: "podman".into(),
        ..Settings::default()
    };
    let service = InvokeService::new(
        Arc::new(RealFileSystem),
        Arc::new(RecordingRunner::exiting_with(0)),
        Arc::new(settings),
        temp.path().to_path_buf(),
    );
    let config = RunConfig {
        container: Some("pg".into()),
        client_binary_path: "/usr/lib/postgresql/16/bin/psql".into(),
        ..run_config(Dialect::Postgres)
    };

    let command = service.build_command(&config);

    assert_eq!(command.program, "podman");
    assert_eq!(command.args[5], "/usr/lib/postgresql/16/bin/psql");
}

#[test]
fn given_container_run_when_runtime_fails_then_error_names_runtime_exec() {
    let temp = TempDir::new().unwrap();
    let runner = Arc::new(RecordingRunner::exiting_with(125));
    let service = service(temp.path(), runner);
    let config = RunConfig {
        container: Some("db1".into()),
        ..run_config(Dialect::Mariadb)
    };

    let err = service.execute(&config, &script()).unwrap_err();

    match &err {
        ApplicationError::ClientFailed { client, code } => {
            assert_eq!(client, "docker exec db1 mysql");
            assert_eq!(*code, 125);
        }
        other => panic!("expected ClientFailed, got {other:?}"),
    }
    assert_eq!(err.to_string(), "docker exec db1 mysql exited with code 125");
}

// ============================================================
// secrets
// ============================================================

#[rstest]
fn given_any_configuration_when_build_command_then_password_not_in_command_line(
    #[values(Dialect::Postgres, Dialect::Mariadb)] dialect: Dialect,
    #[values(None, Some("db1"))] container: Option<&str>,
) {
    let temp = TempDir::new().unwrap();
    let service = service(temp.path(), Arc::new(RecordingRunner::exiting_with(0)));
    let config = RunConfig {
        container: container.map(String::from),
        ..run_config(dialect)
    };

    let command = service.build_command(&config);

    assert!(!command.command_line().contains(PASSWORD));
    assert!(command.args.iter().all(|a| !a.contains(PASSWORD)));
    assert_eq!(command.env.len(), 1);
    assert_eq!(command.env[0].0, dialect.password_env());
    assert_eq!(command.env[0].1.expose(), PASSWORD);
}
