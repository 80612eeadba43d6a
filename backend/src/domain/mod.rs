//! Domain primitives, ports and services.
//!
//! Public surface:
//! - Error (alias to `error::Error`): transport-agnostic failure payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - TraceId: request correlation identifier.
//! - RentalService: implementation of the rental driving ports.

pub mod error;
pub mod ports;
pub mod rental;
mod rental_service;
mod trace_id;

pub use self::error::{Error, ErrorCode};
pub use self::rental_service::RentalService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
