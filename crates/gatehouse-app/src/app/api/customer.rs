use salvo::{Depot, Request, Router, handler};

use gatehouse_core::types::PageResult;
use gatehouse_db::model::customer::Customer;
use gatehouse_service::customer::service::CustomerInput;

use crate::request::{json_body, page_query, path_id};
use crate::response::{ApiResult, done, ok};
use crate::services_handler::get_services_from_depot;

#[handler]
async fn list(req: &mut Request, depot: &mut Depot) -> ApiResult<PageResult<Customer>> {
    let services = get_services_from_depot(depot)?;
    let keyword = req.query::<String>("keyword");
    ok(
        services
            .customers
            .list(page_query(req), keyword.as_deref())
            .await?,
        "ok",
    )
}

#[handler]
async fn create(req: &mut Request, depot: &mut Depot) -> ApiResult<Customer> {
    let services = get_services_from_depot(depot)?;
    let input: CustomerInput = json_body(req).await?;
    ok(services.customers.create(input).await?, "customer created")
}

#[handler]
async fn get(req: &mut Request, depot: &mut Depot) -> ApiResult<Customer> {
    let services = get_services_from_depot(depot)?;
    ok(services.customers.get(path_id(req)?).await?, "ok")
}

#[handler]
async fn update(req: &mut Request, depot: &mut Depot) -> ApiResult<Customer> {
    let services = get_services_from_depot(depot)?;
    let id = path_id(req)?;
    let input: CustomerInput = json_body(req).await?;
    ok(services.customers.update(id, input).await?, "customer updated")
}

#[handler]
async fn delete(req: &mut Request, depot: &mut Depot) -> ApiResult<()> {
    let services = get_services_from_depot(depot)?;
    services.customers.delete(path_id(req)?).await?;
    done("customer deleted")
}

#[must_use]
pub fn routes() -> Router {
    Router::with_path("customer").get(list).post(create).push(
        Router::with_path("{id:num}")
            .get(get)
            .put(update)
            .delete(delete),
    )
}
