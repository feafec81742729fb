use salvo::Depot;
use salvo::writing::Json;

use gatehouse_core::constants::API_ROUTE_PREFIX;

use crate::error::AppError;
use crate::middleware::auth::current_identity;
use crate::response::Envelope;
use crate::services_handler::get_services_from_depot;

/// Request path as matched against menu grants, without the API prefix.
#[must_use]
pub fn grant_path(path: &str) -> &str {
    path.strip_prefix(API_ROUTE_PREFIX)
        .filter(|rest| rest.is_empty() || rest.starts_with('/'))
        .unwrap_or(path)
}

/// ## Summary
/// When strict authorization is enabled, rejects requests whose path is not
/// covered by the caller's menu tree. Runs after [`super::auth::AuthMiddleware`].
///
/// ## Errors
/// Answers 403 with "no permission to access this resource".
pub struct StrictAuthMiddleware;

#[salvo::async_trait]
impl salvo::Handler for StrictAuthMiddleware {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(path = %req.uri().path()))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        let path = grant_path(req.uri().path()).to_owned();
        let checked = async {
            let services = get_services_from_depot(depot)?;
            if !services.gate.is_strict() {
                return Ok(());
            }
            let identity = current_identity(depot)?;
            services
                .gate
                .authorize(&identity, &path)
                .await
                .map_err(AppError::from)
        }
        .await;

        if let Err(e) = checked {
            let status = e.status();
            tracing::debug!(error = %e, %status, "Request not authorized");
            res.status_code(status);
            res.render(Json(Envelope::<()>::failure(e.public_message())));
            ctrl.skip_rest();
        }
    }
}
