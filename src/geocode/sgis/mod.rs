//! SGIS (Statistics Korea) geocoding provider - the primary in the chain.
//!
//! Auth flow: a consumer key/secret pair is exchanged for a time-limited
//! access token whose expiry is embedded in the auth response and checked
//! client-side before every call. Token ownership lives in
//! [`TokenManager`]; this module wires the client, the token lifecycle and
//! the per-provider throttle into one [`GeocodeProvider`].

mod adapter;
mod client;
pub mod dto;

pub use client::SgisClient;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::geocode::domain::{Coordinate, GeocodeError, GeocodeSource};
use crate::geocode::throttle::Throttle;
use crate::geocode::token::TokenManager;
use crate::geocode::traits::GeocodeProvider;

/// The token-authenticated primary provider.
pub struct SgisProvider {
    client: Arc<SgisClient>,
    tokens: Arc<TokenManager>,
    throttle: Throttle,
    /// Generation of the newest token the service has REJECTED. Recorded
    /// only on auth failure: a refresh request then names a known-bad
    /// generation, so the manager can tell a stale complaint (token already
    /// replaced - reuse it) from a fresh one (refresh once, shared).
    rejected_generation: AtomicU64,
}

impl SgisProvider {
    pub fn new(client: Arc<SgisClient>, tokens: Arc<TokenManager>, min_interval: Duration) -> Self {
        Self {
            client,
            tokens,
            throttle: Throttle::new(min_interval),
            rejected_generation: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl GeocodeProvider for SgisProvider {
    fn name(&self) -> &'static str {
        "sgis"
    }

    fn source(&self) -> GeocodeSource {
        GeocodeSource::Sgis
    }

    async fn resolve(&self, address: &str) -> Result<Coordinate, GeocodeError> {
        self.throttle.acquire().await;
        let token = self.tokens.valid_token().await?;
        let result = self.client.geocode(&token.value, address).await;
        if matches!(result, Err(GeocodeError::Auth(_))) {
            self.rejected_generation
                .store(token.generation, Ordering::SeqCst);
        }
        result
    }

    async fn refresh_credentials(&self) -> Result<(), GeocodeError> {
        self.tokens
            .force_refresh(self.rejected_generation.load(Ordering::SeqCst))
            .await
            .map(|_| ())
    }
}
