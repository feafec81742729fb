use std::sync::Arc;

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use gatehouse_core::clock::SharedClock;
use gatehouse_db::store::RevocationRepository;
use tokio::task::JoinHandle;

use crate::auth::cache::ExpiringCache;
use crate::auth::token::{TokenCodec, strip_bearer};
use crate::error::{ServiceError, ServiceResult};

const SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(24 * 60 * 60);

/// ## Summary
/// Tracks tokens that must be rejected before they expire.
///
/// Every revocation is written to the durable repository and to an in-memory
/// cache keyed by the bare token. Request-time checks only read the cache;
/// [`RevocationStore::load_from_store`] rebuilds it after a restart.
pub struct RevocationStore {
    repository: Arc<dyn RevocationRepository>,
    codec: Arc<TokenCodec>,
    cache: ExpiringCache<String, ()>,
    clock: SharedClock,
    default_ttl: Duration,
}

impl std::fmt::Debug for RevocationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RevocationStore")
            .field("cached", &self.cache.len())
            .field("default_ttl", &self.default_ttl)
            .finish_non_exhaustive()
    }
}

impl RevocationStore {
    /// Uses the codec's token lifetime as the TTL for tokens whose expiry cannot be read.
    #[must_use]
    pub fn new(
        repository: Arc<dyn RevocationRepository>,
        codec: Arc<TokenCodec>,
        clock: SharedClock,
    ) -> Self {
        let default_ttl = codec.expires_in();
        Self {
            repository,
            cache: ExpiringCache::new(clock.clone()),
            codec,
            clock,
            default_ttl,
        }
    }

    /// Time left until the token expires on its own.
    fn remaining_validity(&self, token: &str) -> Duration {
        match self.codec.inspect(token) {
            Ok(claims) => claims.expires_at() - self.clock.now(),
            Err(error) => {
                tracing::debug!(%error, "Unreadable revoked token, using default TTL");
                self.default_ttl
            }
        }
    }

    /// ## Summary
    /// Revokes a token. Revoking the same token again is not an error.
    ///
    /// ## Side Effects
    /// The in-memory entry is written before the durable record, so the token
    /// is rejected by this process even when the durable write fails.
    ///
    /// ## Errors
    /// Returns `ServiceError::ValidationError` for an empty token, or the
    /// storage error if the durable write fails.
    #[tracing::instrument(skip_all)]
    pub async fn revoke(&self, token: &str) -> ServiceResult<()> {
        let key = strip_bearer(token);
        if key.is_empty() {
            return Err(ServiceError::ValidationError("token is empty".to_owned()));
        }

        let ttl = self.remaining_validity(key);
        if !self.cache.insert(key.to_owned(), (), ttl) {
            tracing::debug!("Revoked token is already expired, not caching");
        }

        match self.repository.insert_revoked(key).await {
            Ok(inserted) => {
                tracing::debug!(inserted, "Token revoked");
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%error, "Failed to persist revoked token");
                Err(error.into())
            }
        }
    }

    /// Whether the token has been revoked. Never touches durable storage.
    #[must_use]
    pub fn is_revoked(&self, token: &str) -> bool {
        self.cache.contains(strip_bearer(token))
    }

    /// ## Summary
    /// Loads every durable record that has not yet expired into the cache.
    ///
    /// Returns the number of cached tokens.
    ///
    /// ## Errors
    /// Returns the storage error if the records cannot be read.
    #[tracing::instrument(skip(self))]
    pub async fn load_from_store(&self) -> ServiceResult<usize> {
        let records = self.repository.list_revoked().await?;
        let loaded = records
            .into_iter()
            .filter(|record| {
                let ttl = self.remaining_validity(&record.jwt);
                self.cache.insert(record.jwt.clone(), (), ttl)
            })
            .count();

        tracing::info!(loaded, "Revoked tokens loaded");
        Ok(loaded)
    }

    /// ## Summary
    /// Deletes durable records whose token has expired or no longer verifies.
    ///
    /// Returns the number of deleted records.
    ///
    /// ## Errors
    /// Returns the storage error if records cannot be read or deleted.
    #[tracing::instrument(skip(self))]
    pub async fn sweep_expired(&self) -> ServiceResult<usize> {
        let now = self.clock.now();
        let expired: Vec<i64> = self
            .repository
            .list_revoked()
            .await?
            .into_iter()
            .filter(|record| {
                self.codec
                    .inspect(&record.jwt)
                    .map_or(true, |claims| claims.expires_at() <= now)
            })
            .map(|record| record.id)
            .collect();

        let deleted = if expired.is_empty() {
            0
        } else {
            self.repository.delete_revoked(&expired).await?
        };
        let purged = self.cache.purge_expired();

        tracing::info!(deleted, purged, "Revocation sweep complete");
        Ok(deleted)
    }

    /// ## Summary
    /// Starts the daily sweep: first at the next local midnight, then every 24 hours.
    ///
    /// Sweep failures are logged and retried on the next run.
    pub fn spawn_sweeper(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let first_run = until_next_midnight(&Local::now());
            tracing::info!(delay_secs = first_run.as_secs(), "Revocation sweeper scheduled");
            tokio::time::sleep(first_run).await;

            let mut interval = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                interval.tick().await;
                if let Err(error) = self.sweep_expired().await {
                    tracing::error!(%error, "Revocation sweep failed");
                }
            }
        })
    }
}

/// Time from `now` until the next midnight in `now`'s time zone.
pub(crate) fn until_next_midnight<Tz: TimeZone>(now: &DateTime<Tz>) -> std::time::Duration {
    now.date_naive()
        .succ_opt()
        .and_then(|tomorrow| tomorrow.and_hms_opt(0, 0, 0))
        .and_then(|midnight| now.timezone().from_local_datetime(&midnight).earliest())
        .and_then(|next| {
            (next.with_timezone(&Utc) - now.with_timezone(&Utc))
                .to_std()
                .ok()
        })
        .unwrap_or(SWEEP_INTERVAL)
}
