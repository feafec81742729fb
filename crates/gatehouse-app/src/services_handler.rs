use std::sync::Arc;

use salvo::async_trait;

use gatehouse_core::error::CoreError;
use gatehouse_service::context::AppServices;

use crate::error::AppResult;

/// Injects the shared service context into the depot of every request.
pub struct ServicesHandler {
    pub services: Arc<AppServices>,
}

#[async_trait]
impl salvo::Handler for ServicesHandler {
    #[tracing::instrument(skip_all)]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(self.services.clone());
    }
}

/// ## Summary
/// Retrieves the service context from the depot.
///
/// ## Errors
/// Returns an error if `ServicesHandler` did not run for this request.
pub fn get_services_from_depot(depot: &salvo::Depot) -> AppResult<Arc<AppServices>> {
    depot
        .obtain::<Arc<AppServices>>()
        .cloned()
        .map_err(|_err| CoreError::InvariantViolation("Service context not found in depot").into())
}
