//! Domain ports for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod rental_command;
mod rental_query;
mod rental_repository;

#[cfg(test)]
pub use rental_command::MockRentalCommand;
pub use rental_command::RentalCommand;
#[cfg(test)]
pub use rental_query::MockRentalQuery;
pub use rental_query::RentalQuery;
#[cfg(test)]
pub use rental_repository::MockRentalRepository;
pub use rental_repository::{RentalRepository, RentalRepositoryError};
