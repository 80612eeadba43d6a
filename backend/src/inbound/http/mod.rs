//! HTTP inbound adapter exposing the rental REST endpoints.

use actix_web::web;

pub mod addresses;
pub mod bikes;
pub mod clients;
pub mod comments;
pub mod dto;
pub mod error;
pub mod health;
pub mod orders;
pub mod schemas;
pub mod state;
pub mod storages;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;

/// Register every rental endpoint. Mount under `/api/v1`.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.configure(error::configure_extractors)
        .configure(addresses::configure)
        .configure(storages::configure)
        .configure(bikes::configure)
        .configure(clients::configure)
        .configure(comments::configure)
        .configure(orders::configure);
}
