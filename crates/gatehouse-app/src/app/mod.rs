pub mod api;

use std::sync::Arc;

use salvo::Router;
use salvo::logging::Logger;

use gatehouse_core::config::ServerConfig;
use gatehouse_service::context::AppServices;

use crate::middleware::client_ip::ClientAddressHandler;
use crate::services_handler::ServicesHandler;

/// ## Summary
/// The complete application router over `services`.
#[must_use]
pub fn router(services: Arc<AppServices>, server: &ServerConfig) -> Router {
    Router::new()
        .hoop(Logger::new())
        .hoop(ClientAddressHandler {
            trust_forwarded_for: server.trust_forwarded_for,
        })
        .hoop(ServicesHandler { services })
        .push(api::routes())
}
