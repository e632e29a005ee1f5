//! The sort context: owns a full copy of the world, keeps it ordered for
//! the current eye and folds merge batches into it.

use splat_core::{free_boundary, merge_updates, Record, RecordUpdate, Vec3};
use splat_sim::{max_distance_index, DistanceSorter, SortConfig};

use crate::protocol::{MergedSnapshot, SortRequest, SortResponse};

/// State held by the sort worker.
#[derive(Debug)]
pub struct SortContext {
    records: Vec<Record>,
    eye: Vec3,
    sorter: DistanceSorter,
    candidate_distance: f32,
}

impl SortContext {
    /// Creates an empty context.
    ///
    /// # Arguments
    ///
    /// * `config` - Sort strategy
    /// * `candidate_distance` - Cutoff for the near subset handed to the sim
    #[must_use]
    pub fn new(config: SortConfig, candidate_distance: f32) -> Self {
        Self {
            records: Vec::new(),
            eye: Vec3::ZERO,
            sorter: DistanceSorter::new(config),
            candidate_distance,
        }
    }

    /// Records currently held.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Handles one request.
    pub fn handle(&mut self, request: SortRequest) -> SortResponse {
        match request {
            SortRequest::Snapshot(records) => {
                self.records = records;
                SortResponse::SnapshotLoaded {
                    len: self.records.len(),
                }
            }
            SortRequest::Sort { eye } => {
                self.eye = eye;
                self.records = self.sorter.sort(&mut self.records, eye);
                SortResponse::Sorted { eye }
            }
            SortRequest::Merge(updates) => SortResponse::Merged(self.merge(&updates)),
        }
    }

    fn merge(&mut self, updates: &[RecordUpdate]) -> MergedSnapshot {
        let stats = merge_updates(&mut self.records, updates, self.eye);
        self.records = self.sorter.sort(&mut self.records, self.eye);

        let max_distance_index = max_distance_index(&self.records, self.candidate_distance);
        let free_index = free_boundary(&self.records);
        tracing::debug!(
            applied = stats.applied,
            orphaned = stats.orphaned,
            rejected = stats.rejected,
            max_distance_index,
            free_index,
            "merge complete"
        );

        MergedSnapshot {
            records: self.records.clone(),
            eye: self.eye,
            max_distance_index,
            free_index,
            stats,
        }
    }
}
