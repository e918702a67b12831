//! Geocoding subsystem - resolves free-text addresses to coordinates.
//!
//! # Architecture
//!
//! This module follows a clean separation between:
//! - **Domain models** (`domain.rs`) - Internal types that represent our business logic
//! - **API DTOs** (`sgis/dto.rs`, `kakao/dto.rs`) - Exact API response shapes
//! - **Adapters** - Convert DTOs to domain models
//! - **Clients** - HTTP clients for external APIs
//! - **Resolver** - High-level orchestration: cache, provider chain, retry policy
//!
//! Supporting services are explicit, injected instances rather than
//! globals: [`ResponseCache`] (TTL cache shared by the worker pool),
//! [`TokenManager`] (primary provider token lifecycle) and a per-provider
//! [`throttle::Throttle`] (global rate-limit gate).
//!
//! # Usage
//!
//! ```ignore
//! use propgeo::geocode::AddressResolver;
//!
//! let resolver = AddressResolver::from_config(&config)?;
//! let resolved = resolver.resolve_batch(&addresses).await;
//! ```

pub mod cache;
pub mod domain;
pub mod kakao;
pub mod resolver;
pub mod retry;
pub mod sgis;
pub mod throttle;
pub mod token;
pub mod traits;

pub use cache::ResponseCache;
pub use domain::{Coordinate, GeocodeError, GeocodeSource, InputRecord, ResolvedLocation};
pub use kakao::{KakaoClient, KakaoProvider};
pub use resolver::AddressResolver;
pub use retry::{FailureAction, RetryPolicy};
pub use sgis::{SgisClient, SgisProvider};
pub use token::{AccessToken, TokenIssuer, TokenManager};
pub use traits::GeocodeProvider;
