//! dbreplace: bulk search/replace across all text columns of a database
//!
//! Renders a dialect-specific SQL template (`postgres.sql.j2`,
//! `mariadb.sql.j2`) and runs it through `psql` or `mysql`, locally or
//! inside a running container.
//!
//! Layers:
//! - `domain`: run parameters, dialects, secrets (no I/O)
//! - `application`: rendering and client invocation services
//! - `infrastructure`: filesystem/process boundaries and wiring
//! - `cli`: flags, dispatch and terminal output

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
