//! Spatial subsystem - proximity features over resolved coordinates.
//!
//! Pipeline: deduplicate identical coordinates ([`dedup`]), build one
//! immutable nearest-neighbour index per amenity category ([`kdtree`]),
//! then compute and broadcast per-location feature vectors ([`features`]).
//! Everything here is built once and read-only afterwards, so the feature
//! pass parallelizes freely.

pub mod dedup;
pub mod features;
pub mod geo;
pub mod kdtree;

pub use dedup::{DEDUP_DECIMALS, UniqueLocations};
pub use features::{
    AmenityCatalog, AmenityRecord, CategoryFeatures, LocationFeatures, enrich_records,
};
pub use geo::{EARTH_RADIUS_M, haversine_m};
pub use kdtree::SpatialIndex;
