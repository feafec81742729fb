//! First-start data for an empty database.

use gatehouse_core::config::SystemConfig;
use gatehouse_core::constants::{DEFAULT_ROUTER, ROOT_PARENT_ID, SUPER_ADMIN_AUTHORITY_ID};
use gatehouse_db::model::authority::NewAuthority;
use gatehouse_db::model::menu::{MenuDraft, MenuMeta};
use gatehouse_db::model::user::NewUser;
use gatehouse_db::store::Store;

use crate::auth::password::hash_password;
use crate::error::ServiceResult;

pub const ADMIN_USERNAME: &str = "admin";

/// `(path, title, icon, children as (path, title, icon))`
const STARTER_MENUS: &[(&str, &str, &str, &[(&str, &str, &str)])] = &[
    (DEFAULT_ROUTER, "Dashboard", "odometer", &[]),
    (
        "admin",
        "Administration",
        "user",
        &[
            ("authority", "Roles", "avatar"),
            ("menu", "Menus", "tickets"),
            ("user", "Users", "coordinate"),
        ],
    ),
    ("customer", "Customers", "user-filled", &[]),
];

fn menu_draft(parent_id: &str, path: &str, title: &str, icon: &str, sort: i32) -> MenuDraft {
    MenuDraft {
        parent_id: parent_id.to_owned(),
        path: path.to_owned(),
        name: path.to_owned(),
        hidden: false,
        component: format!("view/{path}/index.vue"),
        sort,
        enable: true,
        meta: MenuMeta {
            title: title.to_owned(),
            icon: icon.to_owned(),
            default_menu: path == DEFAULT_ROUTER,
            ..MenuMeta::default()
        },
    }
}

async fn seed_menus<S: Store>(store: &S) -> ServiceResult<Vec<i64>> {
    if !store.list_menus().await?.is_empty() {
        return Ok(Vec::new());
    }

    let mut ids = Vec::new();
    for (sort, (path, title, icon, children)) in (1..).zip(STARTER_MENUS) {
        let parent = store
            .insert_menu(&menu_draft(ROOT_PARENT_ID, path, title, icon, sort))
            .await?;
        ids.push(parent.id);
        for (child_sort, (child_path, child_title, child_icon)) in (1..).zip(children.iter()) {
            let child = store
                .insert_menu(&menu_draft(
                    &parent.id.to_string(),
                    child_path,
                    child_title,
                    child_icon,
                    child_sort,
                ))
                .await?;
            ids.push(child.id);
        }
    }
    Ok(ids)
}

/// ## Summary
/// Creates the super-admin role, a starter menu tree granted to it and an
/// `admin` user, but only when no user exists yet.
///
/// Returns `true` when seeding happened.
///
/// ## Errors
/// Returns a storage error if any write fails.
#[tracing::instrument(skip_all)]
pub async fn seed_defaults<S: Store>(store: &S, system: &SystemConfig) -> ServiceResult<bool> {
    if store.count_users().await? > 0 {
        tracing::debug!("Users present, skipping seed");
        return Ok(false);
    }

    if store.find_authority(SUPER_ADMIN_AUTHORITY_ID).await?.is_none() {
        store
            .insert_authority(&NewAuthority {
                authority_id: SUPER_ADMIN_AUTHORITY_ID.to_owned(),
                authority_name: "Super Admin".to_owned(),
                parent_id: ROOT_PARENT_ID.to_owned(),
                default_router: DEFAULT_ROUTER.to_owned(),
                enable: true,
            })
            .await?;
    }

    let menu_ids = seed_menus(store).await?;
    if !menu_ids.is_empty() {
        store
            .replace_authority_menus(SUPER_ADMIN_AUTHORITY_ID, &menu_ids)
            .await?;
    }

    store
        .insert_user(&NewUser {
            username: ADMIN_USERNAME.to_owned(),
            password_hash: hash_password(&system.seed_admin_password)?,
            nick_name: "Administrator".to_owned(),
            header_img: String::new(),
            authority_id: SUPER_ADMIN_AUTHORITY_ID.to_owned(),
            enable: true,
        })
        .await?;

    tracing::warn!(
        username = ADMIN_USERNAME,
        "Seeded administrator account; change its password"
    );
    Ok(true)
}
