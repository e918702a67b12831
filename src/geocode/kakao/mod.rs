//! Kakao Local geocoding provider - the fallback in the chain.
//!
//! Static-key auth means there is nothing to refresh: an auth failure here
//! is a configuration problem, so the provider keeps the trait's default
//! `refresh_credentials` (unsupported) and the resolver falls through.

mod adapter;
mod client;
pub mod dto;

pub use client::KakaoClient;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::geocode::domain::{Coordinate, GeocodeError, GeocodeSource};
use crate::geocode::throttle::Throttle;
use crate::geocode::traits::GeocodeProvider;

/// The static-key secondary provider.
pub struct KakaoProvider {
    client: Arc<KakaoClient>,
    throttle: Throttle,
}

impl KakaoProvider {
    pub fn new(client: Arc<KakaoClient>, min_interval: Duration) -> Self {
        Self {
            client,
            throttle: Throttle::new(min_interval),
        }
    }
}

#[async_trait]
impl GeocodeProvider for KakaoProvider {
    fn name(&self) -> &'static str {
        "kakao"
    }

    fn source(&self) -> GeocodeSource {
        GeocodeSource::Kakao
    }

    async fn resolve(&self, address: &str) -> Result<Coordinate, GeocodeError> {
        self.throttle.acquire().await;
        self.client.geocode(address).await
    }
}
