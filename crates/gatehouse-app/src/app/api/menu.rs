use salvo::{Depot, Request, Router, handler};

use gatehouse_db::model::menu::{Menu, MenuDraft};
use gatehouse_service::menu::tree::MenuNode;

use crate::request::{json_body, path_id};
use crate::response::{ApiResult, done, ok};
use crate::services_handler::get_services_from_depot;

#[handler]
async fn list(depot: &mut Depot) -> ApiResult<Vec<MenuNode>> {
    let services = get_services_from_depot(depot)?;
    ok(services.menus.list().await?, "ok")
}

#[handler]
async fn create(req: &mut Request, depot: &mut Depot) -> ApiResult<Menu> {
    let services = get_services_from_depot(depot)?;
    let draft: MenuDraft = json_body(req).await?;
    ok(services.menus.create(draft).await?, "menu created")
}

#[handler]
async fn get(req: &mut Request, depot: &mut Depot) -> ApiResult<Menu> {
    let services = get_services_from_depot(depot)?;
    ok(services.menus.get(path_id(req)?).await?, "ok")
}

#[handler]
async fn update(req: &mut Request, depot: &mut Depot) -> ApiResult<Menu> {
    let services = get_services_from_depot(depot)?;
    let id = path_id(req)?;
    let draft: MenuDraft = json_body(req).await?;
    ok(services.menus.update(id, draft).await?, "menu updated")
}

#[handler]
async fn delete(req: &mut Request, depot: &mut Depot) -> ApiResult<()> {
    let services = get_services_from_depot(depot)?;
    services.menus.delete(path_id(req)?).await?;
    done("menu deleted")
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("menu").get(list).post(create).push(
        Router::with_path("{id:num}")
            .get(get)
            .put(update)
            .delete(delete),
    )
}
