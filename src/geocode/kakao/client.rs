//! Kakao Local API HTTP client
//!
//! Authentication is a static REST key sent as `Authorization: KakaoAK
//! {key}` on every request - there is no token lifecycle to manage, which
//! is exactly why this service sits second in the chain: it can answer
//! while the primary's auth is being sorted out.

use std::time::Duration;

use reqwest::StatusCode;

use super::{adapter, dto};
use crate::geocode::domain::{Coordinate, GeocodeError};

/// Kakao Local API client
pub struct KakaoClient {
    http_client: reqwest::Client,
    base_url: String,
    rest_api_key: String,
}

impl KakaoClient {
    pub fn new(
        rest_api_key: impl Into<String>,
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
            rest_api_key: rest_api_key.into(),
        }
    }

    /// Search for an address and return the best candidate's coordinate.
    pub async fn geocode(&self, address: &str) -> Result<Coordinate, GeocodeError> {
        let url = format!("{}/v2/local/search/address.json", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("query", address)])
            .header(
                reqwest::header::AUTHORIZATION,
                format!("KakaoAK {}", self.rest_api_key),
            )
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            // Try to surface the service's own message
            if let Ok(error) = response.json::<dto::ApiError>().await {
                return Err(GeocodeError::Auth(error.msg));
            }
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

        let parsed = response
            .json::<dto::AddressSearchResponse>()
            .await
            .map_err(|e| GeocodeError::Parse(e.to_string()))?;
        adapter::to_coordinate(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = KakaoClient::new("kakao-key", "https://dapi.kakao.com", Duration::from_secs(5));
        assert_eq!(client.base_url, "https://dapi.kakao.com");
        assert_eq!(client.rest_api_key, "kakao-key");
    }
}
