//! Address resolution - orchestrates cache, provider chain and retry policy.
//!
//! This is the high-level API for geocoding:
//! 1. Check the shared response cache (no network on a hit)
//! 2. Walk the ordered provider chain; per provider, route failures
//!    through the retry policy (auth -> refresh and retry once, anything
//!    else -> fall through to the next provider)
//! 3. Cache and return the first success, tagged with its provider
//!
//! Unresolvable addresses are an answer (`Ok(None)`), never an error; the
//! only errors callers see are their own misuse (empty address, missing
//! provider configuration).

use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};

use crate::config::Config;
use crate::error::{Error, Result};

use super::cache::ResponseCache;
use super::domain::{Coordinate, GeocodeError, InputRecord, ResolvedLocation};
use super::kakao::{KakaoClient, KakaoProvider};
use super::retry::{FailureAction, RetryPolicy};
use super::sgis::{SgisClient, SgisProvider};
use super::token::TokenManager;
use super::traits::GeocodeProvider;

/// Log batch progress every this many addresses.
const PROGRESS_EVERY: usize = 100;

/// Service for resolving free-text addresses to coordinates.
pub struct AddressResolver {
    providers: Vec<Arc<dyn GeocodeProvider>>,
    cache: Arc<ResponseCache>,
    policy: RetryPolicy,
    pool_size: usize,
}

impl AddressResolver {
    /// Create a resolver from explicit parts.
    ///
    /// The provider list is tried in order; it must not be empty.
    pub fn new(
        providers: Vec<Arc<dyn GeocodeProvider>>,
        cache: Arc<ResponseCache>,
        policy: RetryPolicy,
        pool_size: usize,
    ) -> Result<Self> {
        if providers.is_empty() {
            return Err(Error::config("at least one geocoding provider is required"));
        }
        Ok(Self {
            providers,
            cache,
            policy,
            pool_size: pool_size.max(1),
        })
    }

    /// Wire up the standard SGIS -> Kakao chain from configuration.
    ///
    /// A provider is included only when its credentials are configured;
    /// configuring neither is an error.
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut providers: Vec<Arc<dyn GeocodeProvider>> = Vec::new();

        let sgis = &config.providers.sgis;
        if let (Some(service_id), Some(security_key)) = (&sgis.service_id, &sgis.security_key) {
            let client = Arc::new(SgisClient::new(
                service_id.as_str(),
                security_key.as_str(),
                sgis.base_url.as_str(),
                std::time::Duration::from_millis(sgis.timeout_ms),
            ));
            let tokens = Arc::new(TokenManager::new(
                client.clone(),
                chrono::Duration::seconds(sgis.token_margin_secs),
            ));
            providers.push(Arc::new(SgisProvider::new(
                client,
                tokens,
                std::time::Duration::from_millis(sgis.min_interval_ms),
            )));
        }

        let kakao = &config.providers.kakao;
        if let Some(rest_api_key) = &kakao.rest_api_key {
            let client = Arc::new(KakaoClient::new(
                rest_api_key.as_str(),
                kakao.base_url.as_str(),
                std::time::Duration::from_millis(kakao.timeout_ms),
            ));
            providers.push(Arc::new(KakaoProvider::new(
                client,
                std::time::Duration::from_millis(kakao.min_interval_ms),
            )));
        }

        Self::new(
            providers,
            Arc::new(ResponseCache::new(config.cache.ttl())),
            RetryPolicy::new(config.resolver.auth_retries),
            config.resolver.pool_size,
        )
    }

    /// Resolve a single address.
    ///
    /// Returns `Ok(None)` when every provider came up empty; errors only
    /// for caller misuse (blank address).
    pub async fn resolve(&self, address: &str) -> Result<Option<ResolvedLocation>> {
        let address = address.trim();
        if address.is_empty() {
            return Err(Error::invalid_input("address must not be empty"));
        }

        if let Some(hit) = self.cache.get(address) {
            tracing::trace!(address, "cache hit");
            return Ok(Some(hit));
        }

        for provider in &self.providers {
            match self.attempt_provider(provider.as_ref(), address).await {
                Ok(coordinate) => {
                    let resolved = ResolvedLocation {
                        address: address.to_string(),
                        coordinate,
                        source: provider.source(),
                        resolved_at: Utc::now(),
                    };
                    self.cache.insert(address, resolved.clone());
                    return Ok(Some(resolved));
                }
                Err(e) => {
                    tracing::debug!(provider = provider.name(), error = %e, "provider failed, falling back");
                }
            }
        }

        tracing::warn!(address, "address unresolved by all providers");
        Ok(None)
    }

    /// Run one provider through the retry policy.
    async fn attempt_provider(
        &self,
        provider: &dyn GeocodeProvider,
        address: &str,
    ) -> std::result::Result<Coordinate, GeocodeError> {
        let mut auth_attempts = 0;
        loop {
            match provider.resolve(address).await {
                Ok(coordinate) => return Ok(coordinate),
                Err(error) => match self.policy.action_for(&error, auth_attempts) {
                    FailureAction::RefreshAndRetry => {
                        auth_attempts += 1;
                        tracing::info!(
                            provider = provider.name(),
                            "auth failure, refreshing credentials"
                        );
                        // A failed refresh exhausts this provider.
                        provider.refresh_credentials().await?;
                    }
                    FailureAction::Fallback => return Err(error),
                },
            }
        }
    }

    /// Resolve a batch of addresses with bounded concurrency.
    ///
    /// Results keep input order. A batch is never aborted by one bad
    /// address: per-address failures (including blank addresses) are
    /// logged and yield `None` at that position.
    pub async fn resolve_batch(&self, addresses: &[String]) -> Vec<Option<ResolvedLocation>> {
        let total = addresses.len();
        stream::iter(addresses.iter().enumerate())
            .map(|(i, address)| async move {
                let result = match self.resolve(address).await {
                    Ok(resolved) => resolved,
                    Err(e) => {
                        tracing::warn!(address = %address, error = %e, "skipping address");
                        None
                    }
                };
                if (i + 1) % PROGRESS_EVERY == 0 {
                    tracing::info!("resolved {}/{} addresses", i + 1, total);
                }
                result
            })
            .buffered(self.pool_size)
            .collect()
            .await
    }

    /// Resolve a batch of input records, honouring pre-existing coordinates.
    ///
    /// A record that already carries a valid coordinate skips resolution
    /// entirely and is tagged [`super::domain::GeocodeSource::Provided`].
    pub async fn resolve_records(&self, records: &[InputRecord]) -> Vec<Option<ResolvedLocation>> {
        stream::iter(records.iter())
            .map(|record| async move {
                if let Some(coordinate) = record.coordinate
                    && coordinate.is_valid()
                {
                    return Some(ResolvedLocation {
                        address: record.address.trim().to_string(),
                        coordinate,
                        source: super::domain::GeocodeSource::Provided,
                        resolved_at: Utc::now(),
                    });
                }
                match self.resolve(&record.address).await {
                    Ok(resolved) => resolved,
                    Err(e) => {
                        tracing::warn!(address = %record.address, error = %e, "skipping record");
                        None
                    }
                }
            })
            .buffered(self.pool_size)
            .collect()
            .await
    }
}
