use salvo::{Depot, Request, Router, handler};
use serde::Deserialize;

use gatehouse_db::model::authority::Authority;
use gatehouse_service::authority::service::AuthorityInput;
use gatehouse_service::menu::tree::MenuNode;

use crate::error::AppError;
use crate::middleware::auth::current_identity;
use crate::request::json_body;
use crate::response::{ApiResult, done, ok};
use crate::services_handler::get_services_from_depot;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AuthorityRef {
    authority_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MenuGrant {
    authority_id: String,
    #[serde(default)]
    menu_ids: Vec<i64>,
}

#[handler]
async fn get_menus(depot: &mut Depot) -> ApiResult<Vec<MenuNode>> {
    let services = get_services_from_depot(depot)?;
    let identity = current_identity(depot)?;
    ok(services.authorities.get_menus(&identity).await?, "ok")
}

#[handler]
async fn list(depot: &mut Depot) -> ApiResult<Vec<Authority>> {
    let services = get_services_from_depot(depot)?;
    ok(services.authorities.list().await?, "ok")
}

#[handler]
async fn create(req: &mut Request, depot: &mut Depot) -> ApiResult<Authority> {
    let services = get_services_from_depot(depot)?;
    let input: AuthorityInput = json_body(req).await?;
    ok(services.authorities.create(input).await?, "role created")
}

#[handler]
async fn update(req: &mut Request, depot: &mut Depot) -> ApiResult<Authority> {
    let services = get_services_from_depot(depot)?;
    let input: AuthorityInput = json_body(req).await?;
    ok(services.authorities.update(input).await?, "role updated")
}

#[handler]
async fn delete(req: &mut Request, depot: &mut Depot) -> ApiResult<()> {
    let services = get_services_from_depot(depot)?;
    let target: AuthorityRef = json_body(req).await?;
    services.authorities.delete(&target.authority_id).await?;
    done("role deleted")
}

#[handler]
async fn set_menus(req: &mut Request, depot: &mut Depot) -> ApiResult<()> {
    let services = get_services_from_depot(depot)?;
    let grant: MenuGrant = json_body(req).await?;
    services
        .authorities
        .set_menus(&grant.authority_id, &grant.menu_ids)
        .await?;
    done("menus granted")
}

#[handler]
async fn get_menus_by_role(req: &mut Request, depot: &mut Depot) -> ApiResult<Vec<MenuNode>> {
    let services = get_services_from_depot(depot)?;
    let authority_id = req
        .query::<String>("authorityId")
        .ok_or_else(|| AppError::BadRequest("authorityId is required".to_owned()))?;
    ok(
        services.authorities.get_menus_by_role(&authority_id).await?,
        "ok",
    )
}

/// Routes any signed-in user may call.
#[must_use]
pub fn self_routes() -> Router {
    Router::with_path("authority/getMenus").get(get_menus)
}

#[must_use]
pub fn admin_routes() -> Router {
    Router::with_path("authority")
        .push(Router::with_path("list").get(list))
        .push(Router::with_path("create").post(create))
        .push(Router::with_path("update").put(update))
        .push(Router::with_path("delete").delete(delete))
        .push(Router::with_path("setMenus").post(set_menus))
        .push(Router::with_path("getMenusByRole").get(get_menus_by_role))
}
