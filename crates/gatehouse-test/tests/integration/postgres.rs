//! Store behavior against a real PostgreSQL database.
//!
//! Runs only when `TEST_DATABASE_URL` names a database the tests may migrate.
//! Every test uses its own role id, so runs can share one database.

use chrono::Utc;
use diesel_async::scoped_futures::ScopedFutureExt;
use gatehouse_core::config::DatabaseConfig;
use gatehouse_db::db::DbProvider;
use gatehouse_db::db::connection::{DbPool, create_pool};
use gatehouse_db::db::migrate::run_migrations;
use gatehouse_db::db::query;
use gatehouse_db::db::transaction::with_transaction;
use gatehouse_db::error::DbError;
use gatehouse_db::model::authority::NewAuthority;
use gatehouse_db::model::menu::{MenuDraft, MenuMeta};
use gatehouse_db::model::user::NewUser;
use gatehouse_db::store::pg::PgStore;
use gatehouse_db::store::{AuthorityRepository, MenuRepository, UserRepository};

async fn connect() -> Option<DbPool> {
    let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
        tracing::warn!("TEST_DATABASE_URL not set, skipping Postgres store test");
        return None;
    };
    run_migrations(&url).await.expect("migrations should apply");
    let config = DatabaseConfig {
        url,
        max_connections: 2,
    };
    Some(create_pool(&config).await.expect("pool should connect"))
}

fn unique(prefix: &str) -> String {
    format!(
        "{prefix}-{}",
        Utc::now().timestamp_nanos_opt().unwrap_or_default()
    )
}

fn role(authority_id: &str) -> NewAuthority {
    NewAuthority {
        authority_id: authority_id.to_owned(),
        authority_name: authority_id.to_owned(),
        parent_id: "0".to_owned(),
        default_router: "dashboard".to_owned(),
        enable: true,
    }
}

fn draft(path: &str) -> MenuDraft {
    MenuDraft {
        parent_id: "0".to_owned(),
        path: path.to_owned(),
        name: path.to_owned(),
        hidden: false,
        component: String::new(),
        sort: 0,
        enable: true,
        meta: MenuMeta::default(),
    }
}

async fn granted_ids(store: &PgStore, authority_id: &str) -> Vec<i64> {
    store
        .menus_for_authority(authority_id)
        .await
        .expect("grants should load")
        .iter()
        .map(|menu| menu.id)
        .collect()
}

#[test_log::test(tokio::test)]
async fn replacing_grants_swaps_the_whole_set() {
    let Some(pool) = connect().await else {
        return;
    };
    let store = PgStore::new(pool);
    let role_id = unique("swap");
    store.insert_authority(&role(&role_id)).await.expect("role");
    let first = store.insert_menu(&draft(&unique("first"))).await.expect("menu");
    let second = store.insert_menu(&draft(&unique("second"))).await.expect("menu");

    store
        .replace_authority_menus(&role_id, &[first.id, second.id])
        .await
        .expect("grant both");
    assert_eq!(granted_ids(&store, &role_id).await, [first.id, second.id]);

    store
        .replace_authority_menus(&role_id, &[second.id, i64::MAX])
        .await
        .expect("grant one");
    assert_eq!(granted_ids(&store, &role_id).await, [second.id]);

    let _role_deleted = store.delete_authority(&role_id).await;
    let _first_deleted = store.delete_menu(first.id).await;
    let _second_deleted = store.delete_menu(second.id).await;
}

#[test_log::test(tokio::test)]
async fn failed_transaction_keeps_previous_grants() {
    let Some(pool) = connect().await else {
        return;
    };
    let store = PgStore::new(pool.clone());
    let role_id = unique("rollback");
    store.insert_authority(&role(&role_id)).await.expect("role");
    let menu = store.insert_menu(&draft(&unique("kept"))).await.expect("menu");
    store
        .replace_authority_menus(&role_id, &[menu.id])
        .await
        .expect("grant");

    let mut conn = pool.get_connection().await.expect("connection");
    let cleared_for = role_id.clone();
    let outcome: Result<(), DbError> = with_transaction(&mut conn, |conn| {
        async move {
            query::authority::clear_menus(conn, &cleared_for).await?;
            Err::<(), DbError>(DbError::UniqueViolation("forced rollback".to_owned()))
        }
        .scope_boxed()
    })
    .await;
    drop(conn);

    assert!(matches!(outcome, Err(DbError::UniqueViolation(_))));
    assert_eq!(granted_ids(&store, &role_id).await, [menu.id]);

    let _role_deleted = store.delete_authority(&role_id).await;
    let _menu_deleted = store.delete_menu(menu.id).await;
}

#[test_log::test(tokio::test)]
async fn role_held_by_a_user_reports_the_foreign_key() {
    let Some(pool) = connect().await else {
        return;
    };
    let store = PgStore::new(pool);
    let role_id = unique("held");
    store.insert_authority(&role(&role_id)).await.expect("role");
    let user = store
        .insert_user(&NewUser {
            username: unique("holder"),
            password_hash: "hash".to_owned(),
            nick_name: unique("Holder"),
            header_img: String::new(),
            authority_id: role_id.clone(),
            enable: true,
        })
        .await
        .expect("user");

    assert_eq!(
        store.count_authority_users(&role_id).await.expect("count"),
        1
    );
    let err = store
        .delete_authority(&role_id)
        .await
        .expect_err("role is still referenced");
    assert!(matches!(err, DbError::ForeignKeyViolation(ref c) if c == "fk_sys_user_authority"));

    let _user_deleted = store.delete_user(user.id).await;
    assert!(store.delete_authority(&role_id).await.expect("delete"));
}
