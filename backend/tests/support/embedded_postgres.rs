//! Database provisioning on an embedded cluster.
//!
//! Creation and teardown go through the synchronous `postgres` client so
//! `DROP DATABASE` never runs inside a Diesel transaction. Schema setup uses
//! the crate's own embedded migrations, so tests exercise exactly what the
//! server applies at startup.

use bikerent::outbound::persistence::run_migrations;
use pg_embedded_setup_unpriv::TestCluster;
use postgres::{Client, NoTls};
use tokio::runtime::Runtime;
use uuid::Uuid;

use super::format_postgres_error;

/// Create an empty, uniquely named database and return its URL.
///
/// Unique names keep parallel tests on a shared cluster apart.
pub fn fresh_database(cluster: &TestCluster) -> Result<String, String> {
    let name = format!("rental_{}", Uuid::new_v4().simple());
    let admin_url = cluster.connection().database_url("postgres");
    let mut client =
        Client::connect(&admin_url, NoTls).map_err(|err| format_postgres_error(&err))?;
    client
        .batch_execute(&format!(
            "DROP DATABASE IF EXISTS \"{name}\" WITH (FORCE); CREATE DATABASE \"{name}\";"
        ))
        .map_err(|err| format_postgres_error(&err))?;
    Ok(cluster.connection().database_url(&name))
}

/// Apply the embedded migrations and return how many ran.
pub fn migrate_schema(runtime: &Runtime, url: &str) -> Result<usize, String> {
    runtime
        .block_on(run_migrations(url))
        .map_err(|err| format!("migration: {err}"))
}
