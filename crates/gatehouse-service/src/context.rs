use std::sync::Arc;

use gatehouse_core::clock::SharedClock;
use gatehouse_core::config::Settings;
use gatehouse_db::store::{
    AuthorityRepository, CustomerRepository, MenuRepository, RevocationRepository, Store,
    UserRepository,
};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::auth::captcha::CaptchaStore;
use crate::auth::gate::RequestGate;
use crate::auth::guard::BruteForceGuard;
use crate::auth::revocation::RevocationStore;
use crate::auth::session::SessionService;
use crate::auth::token::TokenCodec;
use crate::authority::resolver::AuthorizationResolver;
use crate::authority::service::AuthorityService;
use crate::customer::service::CustomerService;
use crate::error::ServiceResult;
use crate::menu::service::MenuService;
use crate::user::service::UserService;

const LOGIN_STATE_PURGE_INTERVAL: std::time::Duration = std::time::Duration::from_secs(60);

/// ## Summary
/// Every service the HTTP layer needs, wired over one store and one clock.
#[derive(Clone)]
pub struct AppServices {
    pub codec: Arc<TokenCodec>,
    pub revocation: Arc<RevocationStore>,
    pub guard: Arc<BruteForceGuard>,
    pub captcha: Arc<CaptchaStore>,
    pub resolver: Arc<AuthorizationResolver>,
    pub gate: Arc<RequestGate>,
    pub sessions: Arc<SessionService>,
    pub users: Arc<UserService>,
    pub authorities: Arc<AuthorityService>,
    pub menus: Arc<MenuService>,
    pub customers: Arc<CustomerService>,
}

impl AppServices {
    /// ## Errors
    /// Returns `ServiceError::InvalidConfiguration` when the signing key is
    /// empty, or a core error when a configured duration does not parse.
    pub fn new<S: Store>(settings: &Settings, store: Arc<S>, clock: SharedClock) -> ServiceResult<Self> {
        let revocations: Arc<dyn RevocationRepository> = store.clone();
        let authority_repo: Arc<dyn AuthorityRepository> = store.clone();
        let menu_repo: Arc<dyn MenuRepository> = store.clone();
        let user_repo: Arc<dyn UserRepository> = store.clone();
        let customer_repo: Arc<dyn CustomerRepository> = store;

        let codec = Arc::new(TokenCodec::new(&settings.jwt, clock.clone())?);
        let revocation = Arc::new(RevocationStore::new(revocations, codec.clone(), clock.clone()));
        let guard = Arc::new(BruteForceGuard::from_config(&settings.captcha, clock.clone()));
        let captcha = Arc::new(CaptchaStore::new(&settings.captcha, clock.clone()));
        let resolver = Arc::new(AuthorizationResolver::new(authority_repo.clone()));
        let gate = Arc::new(RequestGate::new(
            codec.clone(),
            revocation.clone(),
            resolver.clone(),
            settings.system.use_strict_auth,
        ));

        let users = Arc::new(UserService::new(
            user_repo.clone(),
            authority_repo.clone(),
            clock.clone(),
        ));
        let sessions = Arc::new(SessionService::new(
            user_repo,
            users.clone(),
            codec.clone(),
            revocation.clone(),
            guard.clone(),
            captcha.clone(),
        ));
        let authorities = Arc::new(AuthorityService::new(
            authority_repo,
            resolver.clone(),
            clock.clone(),
        ));

        tracing::debug!(strict = settings.system.use_strict_auth, "Services wired");

        Ok(Self {
            codec,
            revocation,
            guard,
            captcha,
            resolver,
            gate,
            sessions,
            users,
            authorities,
            menus: Arc::new(MenuService::new(menu_repo)),
            customers: Arc::new(CustomerService::new(customer_repo, clock)),
        })
    }

    /// ## Summary
    /// Drops captcha answers and failure counters past their deadline.
    ///
    /// Returns the number of entries removed from both caches.
    pub fn purge_login_state(&self) -> usize {
        let answers = self.captcha.purge_expired();
        let counters = self.guard.purge_expired();
        if answers > 0 || counters > 0 {
            tracing::debug!(answers, counters, "Purged expired login state");
        }
        answers.saturating_add(counters)
    }

    /// Runs [`AppServices::purge_login_state`] every minute.
    pub fn spawn_login_state_janitor(&self) -> JoinHandle<()> {
        let services = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(LOGIN_STATE_PURGE_INTERVAL);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                services.purge_login_state();
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use gatehouse_db::store::memory::MemoryStore;

    use super::*;
    use crate::error::ServiceError;
    use crate::testing::{clock, settings};

    #[test_log::test]
    fn empty_signing_key_is_rejected() {
        let mut settings = settings(3);
        settings.jwt.signing_key = String::new();

        let result = AppServices::new(&settings, Arc::new(MemoryStore::new()), Arc::new(clock()));
        assert!(matches!(result, Err(ServiceError::InvalidConfiguration(_))));
    }

    #[test_log::test]
    fn strict_flag_reaches_the_gate() {
        let mut settings = settings(3);
        settings.system.use_strict_auth = false;

        let services =
            AppServices::new(&settings, Arc::new(MemoryStore::new()), Arc::new(clock())).unwrap();
        assert!(!services.gate.is_strict());
    }

    #[test_log::test]
    fn abandoned_login_state_is_reclaimed() {
        let clock = clock();
        let services =
            AppServices::new(&settings(3), Arc::new(MemoryStore::new()), Arc::new(clock.clone()))
                .unwrap();

        for n in 0..50 {
            let _challenge = services.captcha.generate();
            services.guard.record_failure(&format!("10.0.0.{n}"));
        }
        assert_eq!(services.captcha.pending(), 50);
        assert_eq!(services.guard.tracked_clients(), 50);
        assert_eq!(services.purge_login_state(), 0);

        clock.advance(chrono::Duration::minutes(6));
        assert_eq!(services.purge_login_state(), 50);
        assert_eq!(services.captcha.pending(), 0);
        assert_eq!(services.guard.tracked_clients(), 50);

        clock.advance(chrono::Duration::hours(1));
        assert_eq!(services.purge_login_state(), 50);
        assert_eq!(services.guard.tracked_clients(), 0);
    }

    #[test_log::test(tokio::test)]
    async fn janitor_runs_a_purge_on_start() {
        let clock = clock();
        let services =
            AppServices::new(&settings(3), Arc::new(MemoryStore::new()), Arc::new(clock.clone()))
                .unwrap();
        let _challenge = services.captcha.generate();
        clock.advance(chrono::Duration::days(1));

        let janitor = services.spawn_login_state_janitor();
        for _ in 0..100 {
            if services.captcha.pending() == 0 {
                break;
            }
            tokio::task::yield_now().await;
        }
        janitor.abort();
        assert_eq!(services.captcha.pending(), 0);
    }
}
