//! CLI argument definitions using clap

use std::convert::Infallible;
use std::path::PathBuf;

use clap::builder::NonEmptyStringValueParser;
use clap::{ArgAction, Parser, ValueHint};

use crate::domain::{Dialect, Secret};

fn parse_secret(value: &str) -> Result<Secret, Infallible> {
    Ok(Secret::new(value))
}

/// Bulk search (and optional replace) across all text/varchar columns in a database
#[derive(Parser, Debug)]
#[command(name = "dbreplace")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Database type
    #[arg(short = 't', long = "type", value_enum, default_value_t = Dialect::Postgres)]
    pub dialect: Dialect,

    /// Database name
    #[arg(short, long)]
    pub database: String,

    /// Database user
    #[arg(short = 'U', long, default_value = "postgres")]
    pub user: String,

    /// Database password (passed to the client via its environment, never argv)
    #[arg(
        short,
        long,
        env = "DBREPLACE_PASSWORD",
        hide_env_values = true,
        value_parser = parse_secret
    )]
    pub password: Secret,

    /// Database host
    #[arg(short = 'H', long, default_value = "localhost")]
    pub host: String,

    /// Database port [default: 5432 for postgres, 3306 for mariadb]
    #[arg(short = 'P', long)]
    pub port: Option<u16>,

    /// Search text
    #[arg(short, long, value_parser = NonEmptyStringValueParser::new())]
    pub search: String,

    /// Replacement text; if provided → replace mode
    #[arg(short, long)]
    pub replace: Option<String>,

    /// Docker container name to run the client in
    #[arg(short, long)]
    pub container: Option<String>,

    /// Path to the psql binary (PostgreSQL) [default: psql]
    #[arg(long, value_hint = ValueHint::CommandName)]
    pub psql_path: Option<String>,

    /// Path to the mysql binary (MariaDB/MySQL) [default: mysql]
    #[arg(long, value_hint = ValueHint::CommandName)]
    pub mysql_path: Option<String>,

    /// Directory containing <type>.sql.j2 [default: <install dir>/templates/query]
    #[arg(long, value_hint = ValueHint::DirPath)]
    pub template_dir: Option<PathBuf>,

    /// Print the command and the rendered SQL without executing
    #[arg(long)]
    pub dry_run: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
