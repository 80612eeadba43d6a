//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on the driving ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{RentalCommand, RentalQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub command: Arc<dyn RentalCommand>,
    pub query: Arc<dyn RentalQuery>,
}

impl HttpState {
    /// Bundle the write and read ports.
    pub fn new(command: Arc<dyn RentalCommand>, query: Arc<dyn RentalQuery>) -> Self {
        Self { command, query }
    }

    /// Build state from one service implementing both ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use bikerent::domain::RentalService;
    /// use bikerent::inbound::http::state::HttpState;
    /// use bikerent::outbound::memory::InMemoryRentalRepository;
    ///
    /// let service = RentalService::new(Arc::new(InMemoryRentalRepository::new()));
    /// let _state = HttpState::from_service(Arc::new(service));
    /// ```
    pub fn from_service<S>(service: Arc<S>) -> Self
    where
        S: RentalCommand + RentalQuery + 'static,
    {
        Self {
            command: service.clone(),
            query: service,
        }
    }
}
