//! Bicycle rental backend.
//!
//! The [`domain`] module holds the rental entities, the relationship ledger
//! that keeps their associations consistent, and the ports the adapters in
//! [`inbound`] and [`outbound`] plug into.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
