//! Server settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `BIKERENT_*` environment variables and an
//! optional configuration file, in that order of precedence.

use std::net::{Ipv4Addr, SocketAddr};

use ortho_config::OrthoConfig;
use serde::Deserialize;

use bikerent::outbound::persistence::PoolConfig;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_POOL_MAX_SIZE: u32 = 10;

/// Configuration values controlling the rental server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "BIKERENT")]
pub struct RentalSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<SocketAddr>,
    /// PostgreSQL connection string. Without one the in-memory store is used.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub pool_max_size: Option<u32>,
    /// Apply pending migrations before serving.
    pub run_migrations: Option<bool>,
}

impl RentalSettings {
    /// Configured listen address, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
            .unwrap_or_else(|| SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)))
    }

    /// Pool settings when a database is configured.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        self.database_url.as_ref().map(|url| {
            PoolConfig::new(url.clone())
                .with_max_size(self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE))
        })
    }

    /// Whether migrations run at startup. Defaults to `true`.
    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 4] = [
        "BIKERENT_BIND_ADDR",
        "BIKERENT_DATABASE_URL",
        "BIKERENT_POOL_MAX_SIZE",
        "BIKERENT_RUN_MIGRATIONS",
    ];

    fn load_from_empty_args() -> RentalSettings {
        RentalSettings::load_from_iter([OsString::from("bikerent")]).expect("config should load")
    }

    #[rstest]
    fn defaults_select_in_memory_store() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(settings.bind_addr(), "0.0.0.0:8080".parse().expect("addr"));
        assert!(settings.pool_config().is_none());
        assert!(settings.run_migrations());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("BIKERENT_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "BIKERENT_DATABASE_URL",
                Some("postgres://localhost/bikerent".to_owned()),
            ),
            ("BIKERENT_POOL_MAX_SIZE", Some("4".to_owned())),
            ("BIKERENT_RUN_MIGRATIONS", Some("false".to_owned())),
        ]);

        let settings = load_from_empty_args();
        let pool = settings.pool_config().expect("database configured");
        assert_eq!(settings.bind_addr(), "127.0.0.1:9000".parse().expect("addr"));
        assert_eq!(pool.database_url(), "postgres://localhost/bikerent");
        assert_eq!(pool.max_size(), 4);
        assert!(!settings.run_migrations());
    }
}
