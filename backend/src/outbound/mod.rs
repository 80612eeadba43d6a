//! Outbound adapters implementing domain ports.
//!
//! - **persistence**: PostgreSQL-backed rental repository using Diesel ORM.
//! - **memory**: ledger-backed rental repository for development and tests.
//!
//! Adapters translate between domain types and infrastructure
//! representations. Relationship rules live in the domain; the adapters
//! apply them atomically.

pub mod memory;
pub mod persistence;
