//! Server construction and adapter wiring.

mod config;

pub use config::RentalSettings;

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::{info, warn};

use bikerent::Trace;
#[cfg(debug_assertions)]
use bikerent::doc::ApiDoc;
use bikerent::domain::RentalService;
use bikerent::inbound::http::configure_api;
use bikerent::inbound::http::health::{HealthState, live, ready};
use bikerent::inbound::http::state::HttpState;
use bikerent::outbound::memory::InMemoryRentalRepository;
use bikerent::outbound::persistence::{DbPool, DieselRentalRepository, run_migrations};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Build the HTTP state over PostgreSQL when configured, otherwise in memory.
///
/// # Errors
/// Returns [`std::io::Error`] when migrations fail or the pool cannot be built.
pub async fn build_http_state(settings: &RentalSettings) -> std::io::Result<HttpState> {
    let Some(pool_config) = settings.pool_config() else {
        warn!("no database configured; rental data lives in memory only");
        let service = RentalService::new(Arc::new(InMemoryRentalRepository::new()));
        return Ok(HttpState::from_service(Arc::new(service)));
    };

    if settings.run_migrations() {
        let applied = run_migrations(pool_config.database_url())
            .await
            .map_err(|err| std::io::Error::other(format!("migrations failed: {err}")))?;
        info!(applied, "database migrations applied");
    }

    let pool = DbPool::new(pool_config)
        .await
        .map_err(|err| std::io::Error::other(format!("database pool setup failed: {err}")))?;
    let service = RentalService::new(Arc::new(DieselRentalRepository::new(pool)));
    Ok(HttpState::from_service(Arc::new(service)))
}

fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(web::scope("/api/v1").configure(configure_api))
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct the Actix HTTP server.
///
/// Readiness is flagged once the listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    http_state: HttpState,
    bind_addr: SocketAddr,
) -> std::io::Result<Server> {
    let http_state = web::Data::new(http_state);
    let server_health_state = health_state.clone();

    let server = HttpServer::new(move || build_app(server_health_state.clone(), http_state.clone()))
        .bind(bind_addr)?
        .run();

    health_state.mark_ready();
    info!(%bind_addr, "rental server listening");
    Ok(server)
}
