//! Gatehouse admin server - integration test support.
//!
//! Builds the full salvo router over an in-memory store and a manual clock,
//! so HTTP-level tests need no database and control time explicitly.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use salvo::Service;

use gatehouse_core::clock::ManualClock;
use gatehouse_core::config::{
    CaptchaConfig, DatabaseConfig, JwtConfig, LoggingConfig, ServerConfig, Settings, SystemConfig,
};
use gatehouse_db::store::memory::MemoryStore;
use gatehouse_service::context::AppServices;
use gatehouse_service::seed::seed_defaults;

pub use gatehouse_service::seed::ADMIN_USERNAME;

pub const ADMIN_PASSWORD: &str = "admin-pass";

/// Instant every test clock starts at.
#[must_use]
pub fn test_epoch() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default()
}

/// ## Summary
/// Settings for tests: one-hour tokens, a captcha after three failures and
/// strict authorization as requested.
#[must_use]
pub fn test_settings(strict: bool) -> Settings {
    Settings {
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 1,
        },
        server: ServerConfig {
            host: "127.0.0.1".to_owned(),
            port: 5800,
            trust_forwarded_for: true,
        },
        logging: LoggingConfig {
            level: "debug".to_owned(),
        },
        jwt: JwtConfig {
            signing_key: "integration-test-key".to_owned(),
            expires_time: "1h".to_owned(),
            buffer_time: "10m".to_owned(),
            issuer: "gatehouse".to_owned(),
            audience: "gatehouse".to_owned(),
        },
        captcha: CaptchaConfig {
            key_long: 6,
            img_width: 240,
            img_height: 80,
            open_captcha: 3,
            open_captcha_timeout: 3600,
            expire_secs: 300,
        },
        system: SystemConfig {
            use_strict_auth: strict,
            seed_admin_password: ADMIN_PASSWORD.to_owned(),
        },
    }
}

/// A seeded application ready to receive requests.
pub struct TestApp {
    pub service: Service,
    pub services: Arc<AppServices>,
    pub store: Arc<MemoryStore>,
    pub clock: ManualClock,
}

impl TestApp {
    pub async fn new(strict: bool) -> Self {
        Self::with_settings(test_settings(strict)).await
    }

    /// ## Panics
    /// Panics if seeding or wiring fails.
    #[expect(clippy::expect_used, reason = "Test setup failure is fatal")]
    pub async fn with_settings(settings: Settings) -> Self {
        let store = Arc::new(MemoryStore::new());
        let clock = ManualClock::new(test_epoch());

        seed_defaults(store.as_ref(), &settings.system)
            .await
            .expect("seeding the in-memory store should succeed");
        let services = Arc::new(
            AppServices::new(&settings, store.clone(), Arc::new(clock.clone()))
                .expect("test settings should be valid"),
        );

        Self {
            service: Service::new(gatehouse_app::app::router(services.clone(), &settings.server)),
            services,
            store,
            clock,
        }
    }
}
