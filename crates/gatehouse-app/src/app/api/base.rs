use salvo::{Depot, Request, Router, handler};

use gatehouse_db::model::user::User;
use gatehouse_service::auth::session::{CaptchaResponse, LoginOutcome, LoginRequest};
use gatehouse_service::user::service::CreateUser;

use crate::middleware::auth::current_identity;
use crate::middleware::client_ip::client_address;
use crate::request::json_body;
use crate::response::{ApiResult, done, ok};
use crate::services_handler::get_services_from_depot;

#[handler]
async fn health() -> &'static str {
    "OK"
}

#[handler]
#[tracing::instrument(skip_all)]
async fn login(req: &mut Request, depot: &mut Depot) -> ApiResult<LoginOutcome> {
    let services = get_services_from_depot(depot)?;
    let client = client_address(depot);
    let body: LoginRequest = json_body(req).await?;
    let outcome = services.sessions.login(body, &client).await?;
    ok(outcome, "login succeeded")
}

#[handler]
async fn captcha(depot: &mut Depot) -> ApiResult<CaptchaResponse> {
    let services = get_services_from_depot(depot)?;
    ok(services.sessions.captcha(&client_address(depot)), "captcha generated")
}

#[handler]
#[tracing::instrument(skip_all)]
async fn register(req: &mut Request, depot: &mut Depot) -> ApiResult<User> {
    let services = get_services_from_depot(depot)?;
    let body: CreateUser = json_body(req).await?;
    ok(services.sessions.register(body).await?, "registered")
}

#[handler]
async fn logout(depot: &mut Depot) -> ApiResult<()> {
    let services = get_services_from_depot(depot)?;
    let identity = current_identity(depot)?;
    services.sessions.logout(&identity).await?;
    done("logged out")
}

#[must_use]
pub fn public_routes() -> Router {
    Router::new()
        .push(Router::with_path("health").get(health))
        .push(
            Router::with_path("login")
                .post(login)
                .push(Router::with_path("captcha").get(captcha)),
        )
        .push(Router::with_path("register").post(register))
}

#[must_use]
pub fn session_routes() -> Router {
    Router::with_path("login/logout").post(logout)
}
