//! Messages exchanged between the main context and the two workers.
//!
//! Every payload is an owned buffer. Sending moves it; the sender keeps no
//! access to what it sent.

use splat_core::{MergeStats, Record, RecordUpdate, Vec3};

/// Request to the sort context.
#[derive(Clone, Debug)]
pub enum SortRequest {
    /// Adopt the full record array.
    Snapshot(Vec<Record>),
    /// Re-sort the held array for a new eye.
    Sort {
        /// Eye position.
        eye: Vec3,
    },
    /// Apply an ID-keyed batch, re-sort and send back the result.
    Merge(Vec<RecordUpdate>),
}

/// Merge result sent back by the sort context.
#[derive(Clone, Debug)]
pub struct MergedSnapshot {
    /// Full sorted array with the batch applied.
    pub records: Vec<Record>,
    /// Eye the array was sorted for.
    pub eye: Vec3,
    /// First index past the simulation candidates.
    pub max_distance_index: usize,
    /// One past the last non-Free record.
    pub free_index: usize,
    /// What the batch did.
    pub stats: MergeStats,
}

/// Response from the sort context.
#[derive(Clone, Debug)]
pub enum SortResponse {
    /// Snapshot adopted.
    SnapshotLoaded {
        /// Records held.
        len: usize,
    },
    /// Sort pass finished.
    Sorted {
        /// Eye the pass sorted for.
        eye: Vec3,
    },
    /// Merge finished.
    Merged(MergedSnapshot),
}

/// Request to the sim context.
#[derive(Clone, Debug)]
pub enum SimRequest {
    /// Replace the simulated subset.
    Merge {
        /// Near subset of the latest merged array.
        records: Vec<Record>,
        /// Eye the subset was sorted for.
        eye: Vec3,
    },
    /// Run one collision and integration step.
    Simulate {
        /// Step length in seconds.
        dt: f32,
    },
}

/// Response from the sim context.
#[derive(Clone, Debug)]
pub enum SimResponse {
    /// Subset adopted.
    Merged {
        /// Records held.
        len: usize,
    },
    /// Step finished.
    Simulated {
        /// Every live Movable record after the step.
        records: Vec<Record>,
        /// Overlapping pairs found.
        collisions: u32,
    },
}
