//! Fixtures shared by the unit tests of this crate.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use gatehouse_core::clock::ManualClock;
use gatehouse_core::config::{
    CaptchaConfig, DatabaseConfig, JwtConfig, LoggingConfig, ServerConfig, Settings, SystemConfig,
};
use gatehouse_db::model::authority::NewAuthority;
use gatehouse_db::model::menu::{Menu, MenuDraft, MenuMeta};
use gatehouse_db::store::memory::MemoryStore;

use crate::auth::token::TokenCodec;
use crate::context::AppServices;
use crate::seed::seed_defaults;

pub(crate) fn epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap()
}

pub(crate) fn clock() -> ManualClock {
    ManualClock::new(epoch())
}

pub(crate) fn jwt_config(signing_key: &str) -> JwtConfig {
    JwtConfig {
        signing_key: signing_key.to_owned(),
        expires_time: "1h".to_owned(),
        buffer_time: "10m".to_owned(),
        issuer: "gatehouse".to_owned(),
        audience: "gatehouse".to_owned(),
    }
}

pub(crate) fn codec(clock: &ManualClock) -> Arc<TokenCodec> {
    Arc::new(TokenCodec::new(&jwt_config("unit-test-key"), Arc::new(clock.clone())).unwrap())
}

pub(crate) fn captcha_config(threshold: u32) -> CaptchaConfig {
    CaptchaConfig {
        key_long: 6,
        img_width: 240,
        img_height: 80,
        open_captcha: threshold,
        open_captcha_timeout: 3600,
        expire_secs: 300,
    }
}

pub(crate) fn settings(threshold: u32) -> Settings {
    Settings {
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 1,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_owned(),
            port: 0,
            trust_forwarded_for: true,
        },
        logging: LoggingConfig {
            level: "debug".to_owned(),
        },
        jwt: jwt_config("unit-test-key"),
        captcha: captcha_config(threshold),
        system: SystemConfig {
            use_strict_auth: true,
            seed_admin_password: "123456".to_owned(),
        },
    }
}

pub(crate) fn menu(id: i64, parent: &str, path: &str, sort: i32) -> Menu {
    Menu {
        id,
        parent_id: parent.to_owned(),
        path: path.to_owned(),
        name: path.to_owned(),
        hidden: false,
        component: format!("view/{path}/index.vue"),
        sort,
        enable: true,
        meta: MenuMeta {
            title: path.to_owned(),
            ..MenuMeta::default()
        },
        created_at: epoch(),
        updated_at: epoch(),
    }
}

pub(crate) fn draft(parent: &str, path: &str, sort: i32) -> MenuDraft {
    MenuDraft {
        parent_id: parent.to_owned(),
        path: path.to_owned(),
        name: path.to_owned(),
        hidden: false,
        component: format!("view/{path}/index.vue"),
        sort,
        enable: true,
        meta: MenuMeta {
            title: path.to_owned(),
            ..MenuMeta::default()
        },
    }
}

pub(crate) fn role(authority_id: &str) -> NewAuthority {
    NewAuthority {
        authority_id: authority_id.to_owned(),
        authority_name: format!("role {authority_id}"),
        parent_id: "0".to_owned(),
        default_router: "dashboard".to_owned(),
        enable: true,
    }
}

/// Fully wired services over a seeded in-memory store.
pub(crate) struct TestServices {
    pub store: Arc<MemoryStore>,
    pub clock: ManualClock,
    pub services: AppServices,
}

impl TestServices {
    pub async fn new(threshold: u32) -> Self {
        let settings = settings(threshold);
        let store = Arc::new(MemoryStore::new());
        let clock = clock();
        seed_defaults(store.as_ref(), &settings.system).await.unwrap();
        let services = AppServices::new(&settings, store.clone(), Arc::new(clock.clone())).unwrap();
        Self {
            store,
            clock,
            services,
        }
    }
}
