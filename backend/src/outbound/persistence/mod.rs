//! PostgreSQL persistence adapter using Diesel ORM.
//!
//! Provides the Diesel implementation of [`crate::domain::ports::RentalRepository`]
//! backed by `diesel-async` and a `bb8` connection pool.
//!
//! # Architecture
//!
//! - **Thin adapter**: the repository translates between Diesel rows and
//!   domain entities and enforces reference checks inside transactions.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Strongly typed errors**: pool and Diesel failures are mapped to
//!   [`crate::domain::ports::RentalRepositoryError`].
//!
//! # Example
//!
//! ```ignore
//! use bikerent::outbound::persistence::{DbPool, DieselRentalRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/bikerent")).await?;
//! let repo = DieselRentalRepository::new(pool);
//! ```

mod diesel_rental_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_rental_repository::DieselRentalRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
