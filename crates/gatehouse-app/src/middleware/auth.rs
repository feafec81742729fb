use salvo::Depot;
use salvo::http::StatusCode;
use salvo::writing::Json;

use gatehouse_service::auth::identity::Identity;
use gatehouse_service::error::ServiceError;

use crate::error::{AppError, AppResult};
use crate::request::authorization;
use crate::response::Envelope;
use crate::services_handler::get_services_from_depot;

/// ## Summary
/// Authenticates the bearer token and stores the caller's [`Identity`] in the depot.
///
/// ## Errors
/// Answers 401 with the failure envelope when the token is missing, invalid,
/// expired or revoked.
pub struct AuthMiddleware;

#[salvo::async_trait]
impl salvo::Handler for AuthMiddleware {
    #[tracing::instrument(skip(self, req, depot, res, ctrl), fields(
        method = %req.method(),
        path = %req.uri().path()
    ))]
    async fn handle(
        &self,
        req: &mut salvo::Request,
        depot: &mut Depot,
        res: &mut salvo::Response,
        ctrl: &mut salvo::FlowCtrl,
    ) {
        let services = match get_services_from_depot(depot) {
            Ok(services) => services,
            Err(e) => {
                tracing::error!(error = ?e, "Failed to get services from depot");
                res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
                res.render(Json(Envelope::<()>::failure("internal server error")));
                ctrl.skip_rest();
                return;
            }
        };

        match services.gate.authenticate(authorization(req)) {
            Ok(identity) => {
                tracing::trace!(user_id = identity.user_id, "Request authenticated");
                depot.inject(identity);
            }
            Err(e) => {
                let e = AppError::from(e);
                tracing::debug!(error = %e, "Request not authenticated");
                res.status_code(e.status());
                res.render(Json(Envelope::<()>::failure(e.public_message())));
                ctrl.skip_rest();
            }
        }
    }
}

/// ## Summary
/// Retrieves the identity stored by [`AuthMiddleware`].
///
/// ## Errors
/// Returns `NotAuthenticated` if the middleware did not run for this route.
pub fn current_identity(depot: &Depot) -> AppResult<Identity> {
    depot
        .obtain::<Identity>()
        .cloned()
        .map_err(|_err| ServiceError::NotAuthenticated("missing token".to_owned()).into())
}
