//! Trait definitions for geocoding providers.
//!
//! The resolver only ever sees this trait, so providers are interchangeable
//! and the fallback chain is an ordered list rather than named branches.
//! Adding a third provider is a wiring change, not a resolver change.
//!
//! Tests substitute mock implementations for the real provider structs.

use async_trait::async_trait;

use super::domain::{Coordinate, GeocodeError, GeocodeSource};

/// One external geocoding service, viewed through a uniform capability.
#[async_trait]
pub trait GeocodeProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &'static str;

    /// Tag applied to resolutions this provider produces.
    fn source(&self) -> GeocodeSource;

    /// Resolve a free-text address to a coordinate.
    async fn resolve(&self, address: &str) -> Result<Coordinate, GeocodeError>;

    /// Attempt to recover from an [`GeocodeError::Auth`] failure.
    ///
    /// Providers with a refreshable token lifecycle override this; providers
    /// with static keys keep the default, which tells the resolver to fall
    /// through to the next provider instead of retrying.
    async fn refresh_credentials(&self) -> Result<(), GeocodeError> {
        Err(GeocodeError::Auth(
            "provider credentials cannot be refreshed".to_string(),
        ))
    }
}
