//! SGIS HTTP client
//!
//! Handles communication with the SGIS OpenAPI.
//!
//! The service authenticates with a consumer key/secret pair exchanged for
//! a time-limited access token (`auth/authentication.json`); geocoding uses
//! that token (`addr/geocodewgs84.json`, which returns WGS-84 directly so
//! no projection step is needed). Application failures arrive inside a
//! 200-status envelope; transport failures use HTTP status codes.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::StatusCode;

use super::{adapter, dto};
use crate::geocode::domain::{Coordinate, GeocodeError};
use crate::geocode::token::TokenIssuer;

/// SGIS OpenAPI client
pub struct SgisClient {
    http_client: reqwest::Client,
    base_url: String,
    service_id: String,
    security_key: String,
}

impl SgisClient {
    /// Create a new client.
    ///
    /// `timeout` bounds every request; an elapsed deadline surfaces as
    /// [`GeocodeError::Timeout`].
    pub fn new(
        service_id: impl Into<String>,
        security_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            base_url: base_url.into(),
            service_id: service_id.into(),
            security_key: security_key.into(),
        }
    }

    /// Exchange the consumer key/secret for a fresh access token.
    pub async fn authenticate(&self) -> Result<(String, DateTime<Utc>), GeocodeError> {
        let url = format!(
            "{}/auth/authentication.json?consumer_key={}&consumer_secret={}",
            self.base_url,
            urlencoding::encode(&self.service_id),
            urlencoding::encode(&self.security_key)
        );

        let envelope = self.send(&url).await?;
        adapter::to_access_token(envelope)
    }

    /// Geocode an address using a previously issued access token.
    pub async fn geocode(
        &self,
        access_token: &str,
        address: &str,
    ) -> Result<Coordinate, GeocodeError> {
        let url = format!(
            "{}/addr/geocodewgs84.json?accessToken={}&address={}",
            self.base_url,
            urlencoding::encode(access_token),
            urlencoding::encode(address)
        );

        let envelope = self.send(&url).await?;
        adapter::to_coordinate(envelope)
    }

    /// Send a GET, map transport-level failures, and parse the envelope.
    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<dto::Envelope<T>, GeocodeError> {
        let response = self.http_client.get(url).send().await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(GeocodeError::Auth(format!("HTTP {status}")));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }
        if !status.is_success() {
            return Err(GeocodeError::Unavailable(format!(
                "HTTP {}: {}",
                status,
                status.canonical_reason().unwrap_or("Unknown")
            )));
        }

        response
            .json::<dto::Envelope<T>>()
            .await
            .map_err(|e| GeocodeError::Parse(e.to_string()))
    }
}

#[async_trait]
impl TokenIssuer for SgisClient {
    async fn issue(&self) -> Result<(String, DateTime<Utc>), GeocodeError> {
        self.authenticate().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = SgisClient::new(
            "key",
            "secret",
            "https://sgisapi.kostat.go.kr/OpenAPI3",
            Duration::from_secs(5),
        );
        assert_eq!(client.base_url, "https://sgisapi.kostat.go.kr/OpenAPI3");
        assert_eq!(client.service_id, "key");
    }

    #[test]
    fn test_credentials_are_url_encoded() {
        // Keys can contain '+' and '='; the query builder must escape them.
        let encoded = urlencoding::encode("a+b=c");
        assert_eq!(encoded, "a%2Bb%3Dc");
    }
}
