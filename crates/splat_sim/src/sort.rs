//! # Distance Sort
//!
//! Orders records front to back from the eye for rendering.
//!
//! ## Strategies
//!
//! - `Bucketed`: quantizes `ln(1 + d)` and radix-friendly sorts a packed
//!   `u64` key. Near records get fine buckets, far ones coarse buckets.
//! - `Exact`: comparison sort on the distance itself.
//!
//! Free records carry an infinite distance and always land last.

use serde::{Deserialize, Serialize};
use splat_core::constants::FREE_POSITION;
use splat_core::{Record, Vec3};

/// Sort algorithm.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortStrategy {
    /// Logarithmic distance buckets. Stable, approximately ordered.
    #[default]
    Bucketed,
    /// Full-precision comparison sort. Stable.
    Exact,
}

/// Sort tunables.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SortConfig {
    /// Algorithm.
    pub strategy: SortStrategy,
    /// Number of buckets for `Bucketed`.
    pub buckets: u32,
    /// Largest distance the buckets resolve. Anything farther shares the
    /// second to last bucket.
    pub max_range: f32,
}

impl Default for SortConfig {
    fn default() -> Self {
        Self {
            strategy: SortStrategy::Bucketed,
            buckets: 1 << 16,
            max_range: FREE_POSITION,
        }
    }
}

/// Reorders record arrays by distance to the eye.
#[derive(Clone, Debug)]
pub struct DistanceSorter {
    config: SortConfig,
    scale: f32,
    keys: Vec<u64>,
}

impl DistanceSorter {
    /// Creates a sorter.
    #[must_use]
    pub fn new(config: SortConfig) -> Self {
        let buckets = config.buckets.max(2);
        // Bucket `buckets - 1` is reserved for Free records.
        let scale = (buckets - 2) as f32 / config.max_range.max(1.0).ln_1p();
        Self {
            config: SortConfig { buckets, ..config },
            scale,
            keys: Vec::new(),
        }
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &SortConfig {
        &self.config
    }

    /// Bucket of a distance.
    #[inline]
    #[must_use]
    pub fn bucket_of(&self, distance: f32) -> u32 {
        if distance.is_nan() || distance == f32::INFINITY {
            return self.config.buckets - 1;
        }
        let key = (distance.max(0.0).ln_1p() * self.scale) as u32;
        key.min(self.config.buckets - 2)
    }

    /// Recomputes distances and returns a freshly ordered copy.
    pub fn sort(&mut self, records: &mut [Record], eye: Vec3) -> Vec<Record> {
        update_distances(records, eye);
        let sorted = self.sort_by_distance(records);
        tracing::debug!(records = sorted.len(), strategy = ?self.config.strategy, "sort pass");
        sorted
    }

    /// Returns a freshly ordered copy using the distances already stored.
    pub fn sort_by_distance(&mut self, records: &[Record]) -> Vec<Record> {
        match self.config.strategy {
            SortStrategy::Bucketed => {
                self.keys.clear();
                self.keys.reserve(records.len());
                for (index, record) in records.iter().enumerate() {
                    let bucket = if record.is_free() {
                        self.config.buckets - 1
                    } else {
                        self.bucket_of(record.distance)
                    };
                    self.keys.push((u64::from(bucket) << 32) | index as u64);
                }
                self.keys.sort_unstable();
                self.keys
                    .iter()
                    .map(|key| records[(key & u64::from(u32::MAX)) as usize])
                    .collect()
            }
            SortStrategy::Exact => {
                let mut sorted = records.to_vec();
                sorted.sort_by(|a, b| {
                    a.is_free()
                        .cmp(&b.is_free())
                        .then_with(|| a.distance.total_cmp(&b.distance))
                });
                sorted
            }
        }
    }
}

impl Default for DistanceSorter {
    fn default() -> Self {
        Self::new(SortConfig::default())
    }
}

/// Recomputes every record's distance to `eye`. Free records get the
/// sentinel distance.
pub fn update_distances(records: &mut [Record], eye: Vec3) {
    for record in records.iter_mut() {
        record.distance = record.distance_from(eye);
    }
}

/// First index whose distance is at least `cutoff`.
///
/// On a sorted array everything before it is a simulation candidate.
#[must_use]
pub fn max_distance_index(records: &[Record], cutoff: f32) -> usize {
    records
        .iter()
        .position(|r| r.distance >= cutoff)
        .unwrap_or(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use splat_core::{IdAllocator, Material, RecordBlueprint};

    fn scattered(count: usize, free_every: usize) -> Vec<Record> {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let mut ids = IdAllocator::default();
        (0..count)
            .map(|i| {
                let position = Vec3::new(
                    rng.gen_range(-100.0..100.0),
                    rng.gen_range(-100.0..100.0),
                    rng.gen_range(-100.0..100.0),
                );
                let mut record = ids.create(&RecordBlueprint::new(position, Vec3::splat(0.5), Material::Movable)).unwrap();
                if i % free_every == 0 {
                    record.release();
                }
                record
            })
            .collect()
    }

    fn check_order(sorter: &DistanceSorter, sorted: &[Record]) {
        let live = sorted.iter().take_while(|r| !r.is_free()).count();
        assert!(sorted[live..].iter().all(Record::is_free), "Free records must be last");
        for pair in sorted[..live].windows(2) {
            match sorter.config().strategy {
                SortStrategy::Exact => assert!(pair[0].distance <= pair[1].distance),
                SortStrategy::Bucketed => {
                    assert!(sorter.bucket_of(pair[0].distance) <= sorter.bucket_of(pair[1].distance));
                }
            }
        }
    }

    #[test]
    fn test_bucketed_sort_orders_and_keeps_everything() {
        let mut records = scattered(2_000, 7);
        let mut sorter = DistanceSorter::default();
        let sorted = sorter.sort(&mut records, Vec3::new(3.0, 0.0, -2.0));

        assert_eq!(sorted.len(), records.len());
        check_order(&sorter, &sorted);

        let mut before: Vec<u32> = records.iter().map(|r| r.id().0).collect();
        let mut after: Vec<u32> = sorted.iter().map(|r| r.id().0).collect();
        before.sort_unstable();
        after.sort_unstable();
        assert_eq!(before, after);
    }

    #[test]
    fn test_exact_sort_is_monotonic() {
        let mut records = scattered(2_000, 5);
        let mut sorter = DistanceSorter::new(SortConfig {
            strategy: SortStrategy::Exact,
            ..SortConfig::default()
        });
        let sorted = sorter.sort(&mut records, Vec3::ZERO);
        check_order(&sorter, &sorted);
    }

    #[test]
    fn test_bucketed_is_stable_for_ties() {
        let mut ids = IdAllocator::default();
        let mut records: Vec<Record> = (0..5)
            .map(|_| ids.create(&RecordBlueprint::new(Vec3::new(0.0, 0.0, 4.0), Vec3::splat(0.5), Material::Movable)).unwrap())
            .collect();
        let sorted = DistanceSorter::default().sort(&mut records, Vec3::ZERO);
        let order: Vec<u32> = sorted.iter().map(|r| r.id().0).collect();
        assert_eq!(order, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_near_buckets_are_fine() {
        let sorter = DistanceSorter::default();
        assert!(sorter.bucket_of(1.0) < sorter.bucket_of(1.1));
        assert!(sorter.bucket_of(26.9) < sorter.bucket_of(27.1));
        assert_eq!(sorter.bucket_of(f32::INFINITY), sorter.config().buckets - 1);
        assert!(sorter.bucket_of(1e12) < sorter.config().buckets - 1);
    }

    #[test]
    fn test_max_distance_index() {
        let mut ids = IdAllocator::default();
        let mut records: Vec<Record> = [1.0, 10.0, 26.0, 27.0, 40.0]
            .iter()
            .map(|&z| ids.create(&RecordBlueprint::new(Vec3::new(0.0, 0.0, z), Vec3::splat(0.5), Material::Movable)).unwrap())
            .collect();
        update_distances(&mut records, Vec3::ZERO);
        assert_eq!(max_distance_index(&records, 27.0), 3);
        assert_eq!(max_distance_index(&records, 100.0), 5);
        assert_eq!(max_distance_index(&[], 27.0), 0);
    }
}
