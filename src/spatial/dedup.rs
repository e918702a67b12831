//! Unique-location deduplication.
//!
//! Transaction datasets repeat the same building thousands of times, so
//! spatial features are computed once per distinct coordinate and broadcast
//! back. Grouping by raw float equality would silently split semantically
//! identical points that differ in trailing precision, so coordinates are
//! canonicalized to a fixed decimal precision first. Six decimals is about
//! 0.11 m at the equator - far below address-level accuracy, far above
//! float noise.

use std::collections::HashMap;

use smallvec::SmallVec;

use crate::geocode::Coordinate;

/// Decimal places kept when canonicalizing coordinates for grouping.
pub const DEDUP_DECIMALS: u32 = 6;

const SCALE: f64 = 1_000_000.0; // 10^DEDUP_DECIMALS

fn quantize(degrees: f64) -> i64 {
    (degrees * SCALE).round() as i64
}

/// Arena of canonicalized unique coordinates plus, for each, the list of
/// original record positions that share it.
///
/// Invariants: group sizes sum to the number of resolved inputs, and every
/// resolved input index appears in exactly one group. Built once, then
/// read-only.
pub struct UniqueLocations {
    coords: Vec<Coordinate>,
    groups: Vec<SmallVec<[u32; 4]>>,
}

impl UniqueLocations {
    /// Group resolved coordinates in one pass.
    ///
    /// `None` entries (unresolved records) are skipped entirely; their
    /// positions belong to no group.
    pub fn build(resolved: &[Option<Coordinate>]) -> Self {
        let mut by_key: HashMap<(i64, i64), u32> = HashMap::new();
        let mut coords = Vec::new();
        let mut groups: Vec<SmallVec<[u32; 4]>> = Vec::new();

        for (position, coordinate) in resolved.iter().enumerate() {
            let Some(coordinate) = coordinate else {
                continue;
            };
            let key = (
                quantize(coordinate.latitude),
                quantize(coordinate.longitude),
            );
            let slot = *by_key.entry(key).or_insert_with(|| {
                coords.push(Coordinate::new(key.0 as f64 / SCALE, key.1 as f64 / SCALE));
                groups.push(SmallVec::new());
                (coords.len() - 1) as u32
            });
            groups[slot as usize].push(position as u32);
        }

        Self { coords, groups }
    }

    /// Canonicalized unique coordinates, one per group.
    pub fn coords(&self) -> &[Coordinate] {
        &self.coords
    }

    /// Original record positions per unique coordinate, parallel to
    /// [`Self::coords`].
    pub fn groups(&self) -> &[SmallVec<[u32; 4]>] {
        &self.groups
    }

    /// Number of unique locations.
    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Sum of all group sizes (== number of resolved inputs).
    pub fn total_grouped(&self) -> usize {
        self.groups.iter().map(|g| g.len()).sum()
    }
}
