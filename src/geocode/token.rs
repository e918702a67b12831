//! Access-token lifecycle for token-authenticated providers.
//!
//! The primary provider issues short-lived access tokens with an embedded
//! expiry. [`TokenManager`] owns one such token: it hands out the current
//! token while it is comfortably inside its validity window, refreshes it
//! proactively when the expiry is within a safety margin, and serializes
//! refreshes so that N workers hitting an expired token at once produce
//! exactly one network call.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use super::domain::GeocodeError;

/// An access token with its provider-declared expiry.
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// Opaque token value sent with each request
    pub value: String,
    /// Expiry embedded in the auth response, checked client-side
    pub expires_at: DateTime<Utc>,
    /// Monotonic refresh counter, used to deduplicate concurrent refreshes
    pub generation: u64,
}

impl AccessToken {
    fn expires_within(&self, margin: Duration) -> bool {
        Utc::now() + margin >= self.expires_at
    }
}

/// Issues fresh tokens from a provider's auth endpoint.
#[async_trait]
pub trait TokenIssuer: Send + Sync {
    /// Request a new token; returns the value and its embedded expiry.
    async fn issue(&self) -> Result<(String, DateTime<Utc>), GeocodeError>;
}

/// Owns the token for one provider.
///
/// The whole state lives behind one async mutex that is held across the
/// refresh network call: that lock IS the singleton critical section. A
/// caller that waited out someone else's refresh sees a bumped generation
/// and reuses that token instead of issuing a duplicate request.
pub struct TokenManager {
    issuer: Arc<dyn TokenIssuer>,
    margin: Duration,
    state: tokio::sync::Mutex<TokenState>,
}

#[derive(Default)]
struct TokenState {
    current: Option<AccessToken>,
    generation: u64,
}

impl TokenManager {
    pub fn new(issuer: Arc<dyn TokenIssuer>, margin: Duration) -> Self {
        Self {
            issuer,
            margin,
            state: tokio::sync::Mutex::new(TokenState::default()),
        }
    }

    /// Get a token that is valid for at least the safety margin.
    ///
    /// Refreshes proactively if the held token expires within the margin,
    /// so callers never race an imminent expiry.
    pub async fn valid_token(&self) -> Result<AccessToken, GeocodeError> {
        let mut state = self.state.lock().await;
        if let Some(token) = &state.current
            && !token.expires_within(self.margin)
        {
            return Ok(token.clone());
        }
        self.refresh_locked(&mut state).await
    }

    /// Replace the token after a provider rejected it.
    ///
    /// `observed_generation` is the generation of the token that failed.
    /// If another caller already refreshed past it while we waited for the
    /// lock, their token is returned without a second network call.
    pub async fn force_refresh(
        &self,
        observed_generation: u64,
    ) -> Result<AccessToken, GeocodeError> {
        let mut state = self.state.lock().await;
        if state.generation > observed_generation
            && let Some(token) = &state.current
        {
            return Ok(token.clone());
        }
        tracing::info!("refreshing provider access token");
        self.refresh_locked(&mut state).await
    }

    async fn refresh_locked(&self, state: &mut TokenState) -> Result<AccessToken, GeocodeError> {
        let (value, expires_at) = self.issuer.issue().await?;
        state.generation += 1;
        let token = AccessToken {
            value,
            expires_at,
            generation: state.generation,
        };
        state.current = Some(token.clone());
        Ok(token)
    }
}
