mod authority;
mod base;
mod customer;
mod menu;
mod user;

use salvo::Router;

use crate::middleware::{auth::AuthMiddleware, strict::StrictAuthMiddleware};

pub use gatehouse_core::constants::{API_ROUTE_COMPONENT, API_ROUTE_PREFIX};

/// ## Summary
/// All API routes under the `/api` prefix.
///
/// Three groups: public, authenticated, and administrative. The last also
/// runs strict path authorization when it is enabled.
#[must_use]
pub fn routes() -> Router {
    Router::with_path(API_ROUTE_COMPONENT)
        .push(base::public_routes())
        .push(
            Router::new()
                .hoop(AuthMiddleware)
                .push(base::session_routes())
                .push(authority::self_routes())
                .push(user::self_routes()),
        )
        .push(
            Router::new()
                .hoop(AuthMiddleware)
                .hoop(StrictAuthMiddleware)
                .push(authority::admin_routes())
                .push(menu::routes())
                .push(user::admin_routes())
                .push(customer::routes()),
        )
}
