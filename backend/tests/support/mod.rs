//! Helpers shared by the PostgreSQL-backed integration suites.
//!
//! Each file under `backend/tests/` compiles as its own crate, so suites pull
//! these in with `mod support;` rather than through the library.

mod cluster_skip;
mod embedded_postgres;
mod pg_embed;

pub use cluster_skip::handle_cluster_setup_failure;
pub use embedded_postgres::{fresh_database, migrate_schema};
pub use pg_embed::test_cluster;

/// Render a `postgres` error with its SQLSTATE and server message.
///
/// The plain `Display` output collapses server errors to `db error`, which
/// says nothing useful in CI logs.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    match error.as_db_error() {
        Some(db_error) => {
            let mut summary = format!(
                "postgres error {:?}: {}",
                db_error.code(),
                db_error.message()
            );
            if let Some(detail) = db_error.detail() {
                summary.push_str("; detail: ");
                summary.push_str(detail);
            }
            summary
        }
        None => error.to_string(),
    }
}
