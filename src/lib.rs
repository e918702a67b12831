//! Geocoding and spatial feature enrichment for property-transaction records.
//!
//! The engine turns raw transaction addresses into geographically enriched
//! rows in two stages, each exposed as a batch entry point:
//!
//! 1. **Resolution** ([`AddressResolver`]): free-text address -> WGS-84
//!    coordinate, via a cache-fronted, rate-limited chain of external
//!    geocoding providers with token-lifecycle handling and fallback.
//! 2. **Enrichment** ([`enrich_records`]): coordinates -> proximity
//!    features (nearest amenity distance, radius-band counts, composite
//!    accessibility score per category), computed once per unique location
//!    and broadcast to every record sharing it.
//!
//! Storage, orchestration, dashboards and model training live elsewhere in
//! the pipeline; this crate only consumes input tables and produces
//! enriched ones.

pub mod config;
pub mod error;
pub mod geocode;
pub mod spatial;

pub use config::Config;
pub use error::{Error, Result};
pub use geocode::{
    AddressResolver, Coordinate, GeocodeError, GeocodeSource, InputRecord, ResolvedLocation,
    ResponseCache, RetryPolicy, TokenManager,
};
pub use spatial::{
    AmenityCatalog, AmenityRecord, CategoryFeatures, LocationFeatures, SpatialIndex,
    UniqueLocations, enrich_records,
};
