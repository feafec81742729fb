use salvo::{Depot, Request, Router, handler};
use serde::Deserialize;

use gatehouse_core::types::PageResult;
use gatehouse_db::model::user::User;
use gatehouse_service::user::service::{CreateUser, ProfileUpdate, UpdateUser};

use crate::middleware::auth::current_identity;
use crate::request::{json_body, page_query, path_id};
use crate::response::{ApiResult, done, ok};
use crate::services_handler::get_services_from_depot;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordChange {
    password: String,
    new_password: String,
}

#[derive(Debug, Deserialize)]
struct PasswordReset {
    password: String,
}

#[handler]
async fn current(depot: &mut Depot) -> ApiResult<User> {
    let services = get_services_from_depot(depot)?;
    let identity = current_identity(depot)?;
    ok(services.users.current(&identity).await?, "ok")
}

#[handler]
#[tracing::instrument(skip_all)]
async fn change_password(req: &mut Request, depot: &mut Depot) -> ApiResult<()> {
    let services = get_services_from_depot(depot)?;
    let identity = current_identity(depot)?;
    let change: PasswordChange = json_body(req).await?;
    services
        .users
        .change_password(&identity, &change.password, &change.new_password)
        .await?;
    done("password changed")
}

#[handler]
async fn update_profile(req: &mut Request, depot: &mut Depot) -> ApiResult<User> {
    let services = get_services_from_depot(depot)?;
    let identity = current_identity(depot)?;
    let profile: ProfileUpdate = json_body(req).await?;
    ok(
        services.users.update_profile(&identity, profile).await?,
        "profile updated",
    )
}

#[handler]
async fn list(req: &mut Request, depot: &mut Depot) -> ApiResult<PageResult<User>> {
    let services = get_services_from_depot(depot)?;
    ok(services.users.list(page_query(req)).await?, "ok")
}

#[handler]
#[tracing::instrument(skip_all)]
async fn create(req: &mut Request, depot: &mut Depot) -> ApiResult<User> {
    let services = get_services_from_depot(depot)?;
    let input: CreateUser = json_body(req).await?;
    ok(services.users.create(input).await?, "user created")
}

#[handler]
async fn update(req: &mut Request, depot: &mut Depot) -> ApiResult<User> {
    let services = get_services_from_depot(depot)?;
    let id = path_id(req)?;
    let input: UpdateUser = json_body(req).await?;
    ok(services.users.update(id, input).await?, "user updated")
}

#[handler]
async fn delete(req: &mut Request, depot: &mut Depot) -> ApiResult<()> {
    let services = get_services_from_depot(depot)?;
    services.users.delete(path_id(req)?).await?;
    done("user deleted")
}

#[handler]
#[tracing::instrument(skip_all)]
async fn reset_password(req: &mut Request, depot: &mut Depot) -> ApiResult<()> {
    let services = get_services_from_depot(depot)?;
    let id = path_id(req)?;
    let reset: PasswordReset = json_body(req).await?;
    services.users.reset_password(id, &reset.password).await?;
    done("password reset")
}

/// Routes that act on the caller's own account.
#[must_use]
pub fn self_routes() -> Router {
    Router::with_path("user")
        .push(Router::with_path("current").get(current))
        .push(Router::with_path("changePassword").post(change_password))
        .push(Router::with_path("profile").put(update_profile))
}

#[must_use]
pub fn admin_routes() -> Router {
    Router::with_path("user").get(list).post(create).push(
        Router::with_path("{id:num}")
            .put(update)
            .delete(delete)
            .push(Router::with_path("resetPassword").post(reset_password)),
    )
}
