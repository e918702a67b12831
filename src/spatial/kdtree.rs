//! Nearest-neighbour index over one amenity category.
//!
//! Design: a static 3-D k-d tree over unit-sphere (ECEF) projections of the
//! category's coordinates. Straight-line (chord) distance between two unit
//! vectors is strictly monotonic in their great-circle arc, so Euclidean
//! pruning answers geodesic queries exactly - no flat-Earth distortion at
//! high latitudes or large radii. Query radii are converted arc -> chord up
//! front and reported distances chord -> arc on the way out.
//!
//! The tree is an implicit median layout: each subslice's midpoint is its
//! splitting node, so there are no node allocations and the tree is always
//! balanced. Built once per category; read-only afterwards, safe to query
//! from many threads without locking.

use crate::geocode::Coordinate;

use super::geo::{arc_for_chord, chord_for_arc, unit_vector};

/// Immutable nearest-neighbour / radius-count index.
pub struct SpatialIndex {
    /// Unit vectors in implicit kd order
    points: Vec<[f64; 3]>,
    /// Original catalog positions, parallel to `points`
    ids: Vec<u32>,
}

impl SpatialIndex {
    /// Build the index from a category's coordinates.
    pub fn build(coords: impl IntoIterator<Item = Coordinate>) -> Self {
        let mut items: Vec<([f64; 3], u32)> = coords
            .into_iter()
            .enumerate()
            .map(|(i, c)| (unit_vector(c), i as u32))
            .collect();
        build_recursive(&mut items, 0);

        let mut points = Vec::with_capacity(items.len());
        let mut ids = Vec::with_capacity(items.len());
        for (point, id) in items {
            points.push(point);
            ids.push(id);
        }
        Self { points, ids }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Closest amenity to `query`: its catalog position and great-circle
    /// distance in meters. `None` for an empty category.
    pub fn nearest(&self, query: Coordinate) -> Option<(u32, f64)> {
        if self.is_empty() {
            return None;
        }
        let q = unit_vector(query);
        let mut best = Best {
            position: 0,
            dist2: f64::INFINITY,
        };
        self.nearest_in(0, self.points.len(), 0, &q, &mut best);
        Some((self.ids[best.position], arc_for_chord(best.dist2.sqrt())))
    }

    /// Number of amenities within `radius_m` meters of `query`.
    pub fn count_within(&self, query: Coordinate, radius_m: f64) -> usize {
        let q = unit_vector(query);
        let chord = chord_for_arc(radius_m);
        self.count_in(0, self.points.len(), 0, &q, chord * chord)
    }

    /// Catalog positions and distances (meters) of all amenities within
    /// `radius_m` of `query`. Unordered.
    pub fn collect_within(&self, query: Coordinate, radius_m: f64) -> Vec<(u32, f64)> {
        let q = unit_vector(query);
        let chord = chord_for_arc(radius_m);
        let mut hits = Vec::new();
        self.collect_in(0, self.points.len(), 0, &q, chord * chord, &mut hits);
        hits
    }

    fn nearest_in(&self, lo: usize, hi: usize, depth: usize, q: &[f64; 3], best: &mut Best) {
        if lo >= hi {
            return;
        }
        let mid = lo + (hi - lo) / 2;
        let d2 = dist2(&self.points[mid], q);
        if d2 < best.dist2 {
            *best = Best {
                position: mid,
                dist2: d2,
            };
        }

        let axis = depth % 3;
        let delta = q[axis] - self.points[mid][axis];
        let (near, far) = if delta < 0.0 {
            ((lo, mid), (mid + 1, hi))
        } else {
            ((mid + 1, hi), (lo, mid))
        };
        self.nearest_in(near.0, near.1, depth + 1, q, best);
        // Only cross the splitting plane if the best ball still straddles it.
        if delta * delta < best.dist2 {
            self.nearest_in(far.0, far.1, depth + 1, q, best);
        }
    }

    fn count_in(&self, lo: usize, hi: usize, depth: usize, q: &[f64; 3], r2: f64) -> usize {
        if lo >= hi {
            return 0;
        }
        let mid = lo + (hi - lo) / 2;
        let mut count = usize::from(dist2(&self.points[mid], q) <= r2);

        let axis = depth % 3;
        let delta = q[axis] - self.points[mid][axis];
        let (near, far) = if delta < 0.0 {
            ((lo, mid), (mid + 1, hi))
        } else {
            ((mid + 1, hi), (lo, mid))
        };
        count += self.count_in(near.0, near.1, depth + 1, q, r2);
        if delta * delta <= r2 {
            count += self.count_in(far.0, far.1, depth + 1, q, r2);
        }
        count
    }

    fn collect_in(
        &self,
        lo: usize,
        hi: usize,
        depth: usize,
        q: &[f64; 3],
        r2: f64,
        hits: &mut Vec<(u32, f64)>,
    ) {
        if lo >= hi {
            return;
        }
        let mid = lo + (hi - lo) / 2;
        let d2 = dist2(&self.points[mid], q);
        if d2 <= r2 {
            hits.push((self.ids[mid], arc_for_chord(d2.sqrt())));
        }

        let axis = depth % 3;
        let delta = q[axis] - self.points[mid][axis];
        let (near, far) = if delta < 0.0 {
            ((lo, mid), (mid + 1, hi))
        } else {
            ((mid + 1, hi), (lo, mid))
        };
        self.collect_in(near.0, near.1, depth + 1, q, r2, hits);
        if delta * delta <= r2 {
            self.collect_in(far.0, far.1, depth + 1, q, r2, hits);
        }
    }
}

struct Best {
    position: usize,
    dist2: f64,
}

/// Arrange `items` so every subslice's midpoint splits it on the axis for
/// its depth. `select_nth_unstable` keeps the build O(n log n) and the tree
/// perfectly balanced regardless of input order.
fn build_recursive(items: &mut [([f64; 3], u32)], depth: usize) {
    if items.len() <= 1 {
        return;
    }
    let axis = depth % 3;
    let mid = items.len() / 2;
    items.select_nth_unstable_by(mid, |a, b| a.0[axis].total_cmp(&b.0[axis]));
    let (left, rest) = items.split_at_mut(mid);
    build_recursive(left, depth + 1);
    build_recursive(&mut rest[1..], depth + 1);
}

fn dist2(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::geo::haversine_m;
    use proptest::prelude::*;

    fn brute_nearest(coords: &[Coordinate], query: Coordinate) -> Option<f64> {
        coords
            .iter()
            .map(|&c| haversine_m(query, c))
            .min_by(|a, b| a.total_cmp(b))
    }

    fn brute_count(coords: &[Coordinate], query: Coordinate, radius_m: f64) -> usize {
        coords
            .iter()
            .filter(|&&c| haversine_m(query, c) <= radius_m)
            .count()
    }

    #[test]
    fn test_empty_index() {
        let index = SpatialIndex::build(std::iter::empty());
        assert!(index.is_empty());
        assert!(index.nearest(Coordinate::new(37.5, 127.0)).is_none());
        assert_eq!(index.count_within(Coordinate::new(37.5, 127.0), 1000.0), 0);
    }

    #[test]
    fn test_coincident_point_has_zero_distance() {
        let station = Coordinate::new(37.554648, 126.972559); // Seoul Station
        let index = SpatialIndex::build(vec![station]);

        let (id, distance) = index.nearest(station).unwrap();
        assert_eq!(id, 0);
        assert!(distance < 1e-3, "expected ~0, got {distance}");
    }

    #[test]
    fn test_nearest_picks_the_closer_point() {
        let index = SpatialIndex::build(vec![
            Coordinate::new(37.554648, 126.972559), // Seoul Station, ~1.2 km
            Coordinate::new(37.497175, 127.027926), // Gangnam Station, ~8.5 km
        ]);
        let city_hall = Coordinate::new(37.5663, 126.9779);

        let (id, distance) = index.nearest(city_hall).unwrap();
        assert_eq!(id, 0);
        assert!((1_000.0..1_600.0).contains(&distance), "got {distance}");
    }

    #[test]
    fn test_count_within_bands() {
        let center = Coordinate::new(37.5663, 126.9779);
        // Three points at ~1.2 km, ~8.5 km, ~322 km.
        let index = SpatialIndex::build(vec![
            Coordinate::new(37.554648, 126.972559),
            Coordinate::new(37.497175, 127.027926),
            Coordinate::new(35.1798, 129.0750),
        ]);

        assert_eq!(index.count_within(center, 500.0), 0);
        assert_eq!(index.count_within(center, 2_000.0), 1);
        assert_eq!(index.count_within(center, 10_000.0), 2);
        assert_eq!(index.count_within(center, 400_000.0), 3);
    }

    #[test]
    fn test_collect_within_reports_distances() {
        let center = Coordinate::new(37.5663, 126.9779);
        let index = SpatialIndex::build(vec![
            Coordinate::new(37.554648, 126.972559),
            Coordinate::new(37.497175, 127.027926),
        ]);

        let mut hits = index.collect_within(center, 10_000.0);
        hits.sort_by(|a, b| a.1.total_cmp(&b.1));

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0, 0);
        assert!((hits[0].1 - 1_320.0).abs() < 200.0, "got {}", hits[0].1);
    }

    proptest! {
        /// The tree's nearest distance always matches brute-force haversine.
        #[test]
        fn prop_nearest_matches_brute_force(
            coords in proptest::collection::vec((-85.0f64..85.0, -179.0f64..179.0), 1..80),
            query in (-85.0f64..85.0, -179.0f64..179.0),
        ) {
            let coords: Vec<Coordinate> =
                coords.into_iter().map(|(lat, lon)| Coordinate::new(lat, lon)).collect();
            let query = Coordinate::new(query.0, query.1);

            let index = SpatialIndex::build(coords.clone());
            let (_, tree_distance) = index.nearest(query).unwrap();
            let brute_distance = brute_nearest(&coords, query).unwrap();

            prop_assert!(
                (tree_distance - brute_distance).abs() <= 1e-6 * brute_distance.max(1.0),
                "tree {} vs brute {}", tree_distance, brute_distance
            );
        }

        /// Radius counts match brute force and grow monotonically.
        #[test]
        fn prop_counts_match_and_are_monotonic(
            coords in proptest::collection::vec((-85.0f64..85.0, -179.0f64..179.0), 0..60),
            query in (-85.0f64..85.0, -179.0f64..179.0),
            r1 in 1_000.0f64..500_000.0,
            r2 in 1_000.0f64..500_000.0,
        ) {
            let coords: Vec<Coordinate> =
                coords.into_iter().map(|(lat, lon)| Coordinate::new(lat, lon)).collect();
            let query = Coordinate::new(query.0, query.1);
            let index = SpatialIndex::build(coords.clone());

            let (small, large) = if r1 <= r2 { (r1, r2) } else { (r2, r1) };
            let count_small = index.count_within(query, small);
            let count_large = index.count_within(query, large);

            prop_assert!(count_small <= count_large);
            prop_assert_eq!(count_large, brute_count(&coords, query, large));
            prop_assert_eq!(
                index.collect_within(query, large).len(),
                count_large
            );
        }
    }
}
