//! # ID-Keyed Merge
//!
//! Array positions change on every sort pass, so updates produced in one
//! context are applied to another context's array by record ID.

use std::collections::HashMap;

use crate::math::Vec3;
use crate::record::{Record, RecordId};

/// What an update does to its target record.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UpdateKind {
    /// New position and velocity. Ignored if the target is Free.
    Motion {
        /// Position after the step.
        position: Vec3,
        /// Velocity after the step.
        velocity: Vec3,
    },
    /// Collect: the target becomes Free.
    Release,
    /// Build: overwrite the Free target slot with this record.
    Claim(Record),
}

/// One update addressed by record ID.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecordUpdate {
    /// Target record. For a claim this is the Free slot's ID.
    pub id: RecordId,
    /// What to do.
    pub kind: UpdateKind,
}

impl RecordUpdate {
    /// Motion update carrying the record's current position and velocity.
    #[must_use]
    pub fn motion_of(record: &Record) -> Self {
        Self {
            id: record.id(),
            kind: UpdateKind::Motion {
                position: record.position,
                velocity: record.velocity,
            },
        }
    }

    /// Release update for `id`.
    #[must_use]
    pub const fn release(id: RecordId) -> Self {
        Self {
            id,
            kind: UpdateKind::Release,
        }
    }

    /// Claim of the Free slot `slot` by `record`.
    #[must_use]
    pub const fn claim(slot: RecordId, record: Record) -> Self {
        Self {
            id: slot,
            kind: UpdateKind::Claim(record),
        }
    }

    /// Applies the update to a matching record.
    ///
    /// Returns `false` if the update was rejected.
    pub fn apply(&self, record: &mut Record) -> bool {
        match self.kind {
            UpdateKind::Motion { position, velocity } => {
                if record.is_free() {
                    return false;
                }
                record.position = position;
                record.velocity = velocity;
            }
            UpdateKind::Release => record.release(),
            UpdateKind::Claim(claimed) => {
                if !record.is_free() {
                    return false;
                }
                *record = claimed;
            }
        }
        true
    }
}

/// Counts from one merge pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Updates that changed a record.
    pub applied: usize,
    /// Updates whose ID matched nothing.
    pub orphaned: usize,
    /// Updates that matched but were refused (claim on a live slot, motion
    /// on a Free record).
    pub rejected: usize,
}

impl std::ops::AddAssign for MergeStats {
    fn add_assign(&mut self, rhs: Self) {
        self.applied += rhs.applied;
        self.orphaned += rhs.orphaned;
        self.rejected += rhs.rejected;
    }
}

/// Applies `updates` to `records` by ID in one pass.
///
/// When a batch holds several updates for the same ID, the last one wins.
/// Touched records get their distance recomputed against `eye`.
pub fn merge_updates(records: &mut [Record], updates: &[RecordUpdate], eye: Vec3) -> MergeStats {
    let mut by_id: HashMap<RecordId, RecordUpdate> = HashMap::with_capacity(updates.len());
    for update in updates {
        by_id.insert(update.id, *update);
    }

    let mut stats = MergeStats::default();
    let mut matched = 0;
    for record in records.iter_mut() {
        if matched == by_id.len() {
            break;
        }
        let Some(update) = by_id.get(&record.id()) else {
            continue;
        };
        matched += 1;
        if update.apply(record) {
            record.distance = record.distance_from(eye);
            stats.applied += 1;
        } else {
            stats.rejected += 1;
        }
    }
    stats.orphaned = by_id.len() - matched;

    if stats.orphaned > 0 || stats.rejected > 0 {
        tracing::debug!(
            orphaned = stats.orphaned,
            rejected = stats.rejected,
            "merge skipped updates"
        );
    }
    stats
}

/// One past the highest-indexed non-Free record.
#[must_use]
pub fn free_boundary(records: &[Record]) -> usize {
    records
        .iter()
        .rposition(|r| !r.is_free())
        .map_or(0, |index| index + 1)
}
