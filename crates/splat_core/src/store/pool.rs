//! # Record Store
//!
//! Fixed-capacity record array with a free boundary.
//!
//! Every slot at or past `free_index` is a pre-allocated Free record. Building
//! an object claims the slot at the boundary and moves the boundary forward.
//! Collecting an object flags it Free in place; nothing is ever removed.

use std::collections::HashSet;

use crate::error::{StoreError, StoreResult};
use crate::record::{Record, RecordBlueprint, RecordId};
use crate::store::ids::IdAllocator;
use crate::store::merge::free_boundary;

/// Result of claiming a Free slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Activation {
    /// Index of the claimed slot.
    pub index: usize,
    /// ID the Free record in that slot carried before it was overwritten.
    pub slot: RecordId,
    /// ID of the new record.
    pub id: RecordId,
}

/// The authoritative record array plus its pool bookkeeping.
#[derive(Clone, Debug, Default)]
pub struct RecordStore {
    records: Vec<Record>,
    free_index: usize,
    ids: IdAllocator,
}

impl RecordStore {
    /// Takes ownership of an ingested record array.
    ///
    /// # Arguments
    ///
    /// * `records` - Initial population including pre-allocated Free slots
    /// * `next_id` - Lowest ID the store may hand out for new records
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateId`] if two records share an ID.
    pub fn ingest(records: Vec<Record>, next_id: u32) -> StoreResult<Self> {
        let mut seen = HashSet::with_capacity(records.len());
        let mut ids = IdAllocator::starting_at(next_id);
        for record in &records {
            if !seen.insert(record.id()) {
                return Err(StoreError::DuplicateId(record.id()));
            }
            ids.observe(record.id());
        }

        let free_index = free_boundary(&records);
        tracing::debug!(
            records = records.len(),
            free_index,
            next_id = ids.peek().0,
            "record store ingested"
        );

        Ok(Self {
            records,
            free_index,
            ids,
        })
    }

    /// Number of slots, live or Free.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the store has no slots at all.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fixed capacity. Same as [`Self::len`].
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.records.len()
    }

    /// Index of the first slot available to [`Self::activate`].
    #[inline]
    #[must_use]
    pub const fn free_index(&self) -> usize {
        self.free_index
    }

    /// ID the next created record will get.
    #[inline]
    #[must_use]
    pub const fn next_id(&self) -> RecordId {
        self.ids.peek()
    }

    /// All records in array order.
    #[inline]
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Mutable access to the records.
    ///
    /// Callers may move records and change velocities, but must not change
    /// the length or the free boundary.
    #[inline]
    pub fn records_mut(&mut self) -> &mut [Record] {
        &mut self.records
    }

    /// Record at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Linear search for the record carrying `id`.
    #[must_use]
    pub fn find_by_id(&self, id: RecordId) -> Option<usize> {
        self.records.iter().position(|r| r.id() == id)
    }

    /// Creates a record in the Free slot at the boundary.
    ///
    /// # Errors
    ///
    /// - [`StoreError::PoolExhausted`] if the boundary is past the end
    /// - [`StoreError::SlotOccupied`] if the slot at the boundary is live
    /// - [`StoreError::IdsExhausted`] if no record ID is left
    ///
    /// Nothing is mutated on error.
    pub fn activate(&mut self, blueprint: &RecordBlueprint) -> StoreResult<Activation> {
        let index = self.free_index;
        let Some(slot) = self.records.get(index) else {
            return Err(StoreError::PoolExhausted {
                capacity: self.records.len(),
            });
        };
        if !slot.is_free() {
            return Err(StoreError::SlotOccupied { index });
        }

        let previous = slot.id();
        let record = self.ids.create(blueprint)?;
        let id = record.id();
        self.records[index] = record;
        self.free_index += 1;

        Ok(Activation {
            index,
            slot: previous,
            id,
        })
    }

    /// Moves the record at `index` back to its place in distance order.
    ///
    /// The record lands in front of the first earlier record that is
    /// farther away; everything between shifts one slot toward the end.
    /// Used after [`Self::activate`], which fills the boundary slot behind
    /// records of any distance.
    ///
    /// # Returns
    ///
    /// The record's new index. An out-of-range index is returned unchanged.
    pub fn settle(&mut self, index: usize) -> usize {
        let Some(distance) = self.records.get(index).map(|r| r.distance) else {
            return index;
        };
        let place = self.records[..index]
            .iter()
            .position(|r| r.distance > distance)
            .unwrap_or(index);
        self.records[place..=index].rotate_right(1);
        place
    }

    /// Flags the record at `index` Free and parks it at the sentinel.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IndexOutOfRange`] for an index past the end.
    pub fn deactivate(&mut self, index: usize) -> StoreResult<RecordId> {
        let len = self.records.len();
        let record = self
            .records
            .get_mut(index)
            .ok_or(StoreError::IndexOutOfRange { index, len })?;
        record.release();
        Ok(record.id())
    }

    /// Swaps in a freshly merged array.
    ///
    /// The ID counter is kept, and also moved past any ID in the new array.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CapacityMismatch`] if the length differs.
    pub fn replace_records(&mut self, records: Vec<Record>, free_index: usize) -> StoreResult<()> {
        if records.len() != self.records.len() {
            return Err(StoreError::CapacityMismatch {
                expected: self.records.len(),
                actual: records.len(),
            });
        }
        for record in &records {
            self.ids.observe(record.id());
        }
        self.records = records;
        self.free_index = free_index.min(self.records.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FREE_POSITION;
    use crate::math::Vec3;
    use crate::record::{Material, State};

    fn store_with(active: usize, free: usize) -> RecordStore {
        let mut ids = IdAllocator::default();
        let mut records = Vec::new();
        for i in 0..active {
            let position = Vec3::new(i as f32, 0.0, 0.0);
            records.push(ids.create(&RecordBlueprint::new(position, Vec3::splat(0.5), Material::Immovable)).unwrap());
        }
        for _ in 0..free {
            records.push(ids.create(&RecordBlueprint::free_slot()).unwrap());
        }
        RecordStore::ingest(records, 0).unwrap()
    }

    #[test]
    fn test_ingest_derives_free_index() {
        let store = store_with(8, 2);
        assert_eq!(store.capacity(), 10);
        assert_eq!(store.free_index(), 8);
        assert_eq!(store.next_id(), RecordId(10));
    }

    #[test]
    fn test_ingest_rejects_duplicate_ids() {
        let record = RecordBlueprint::new(Vec3::ZERO, Vec3::splat(0.5), Material::Immovable)
            .build(RecordId(3));
        let err = RecordStore::ingest(vec![record, record], 0).unwrap_err();
        assert_eq!(err, StoreError::DuplicateId(RecordId(3)));
    }

    #[test]
    fn test_ingest_respects_next_id_floor() {
        let record = RecordBlueprint::new(Vec3::ZERO, Vec3::splat(0.5), Material::Immovable)
            .build(RecordId(3));
        let store = RecordStore::ingest(vec![record], 100).unwrap();
        assert_eq!(store.next_id(), RecordId(100));
    }

    #[test]
    fn test_build_claims_boundary_slot() {
        let mut store = store_with(8, 2);
        let blueprint = RecordBlueprint::new(Vec3::new(0.0, 5.0, 0.0), Vec3::splat(0.5), Material::Immovable);

        let activation = store.activate(&blueprint).unwrap();

        assert_eq!(activation.index, 8);
        assert_eq!(activation.slot, RecordId(8));
        assert_eq!(store.free_index(), 9);

        let record = store.get(8).unwrap();
        assert_eq!(record.state(), State::Active);
        assert_eq!(record.id(), activation.id);
        assert!(store.records().iter().filter(|r| r.id() == activation.id).count() == 1);
    }

    #[test]
    fn test_exhausted_pool_is_reported() {
        let mut store = store_with(2, 1);
        let blueprint = RecordBlueprint::new(Vec3::ZERO, Vec3::splat(0.5), Material::Immovable);
        store.activate(&blueprint).unwrap();

        let before = store.records().to_vec();
        let err = store.activate(&blueprint).unwrap_err();
        assert_eq!(err, StoreError::PoolExhausted { capacity: 3 });
        assert_eq!(store.records(), &before[..]);
        assert_eq!(store.free_index(), 3);
    }

    #[test]
    fn test_occupied_boundary_is_rejected() {
        let mut store = store_with(3, 0);
        store.replace_records(store.records().to_vec(), 1).unwrap();
        let blueprint = RecordBlueprint::new(Vec3::ZERO, Vec3::splat(0.5), Material::Immovable);
        assert_eq!(
            store.activate(&blueprint).unwrap_err(),
            StoreError::SlotOccupied { index: 1 }
        );
    }

    #[test]
    fn test_exhausted_ids_leave_store_untouched() {
        let last = RecordBlueprint::new(Vec3::ZERO, Vec3::splat(0.5), Material::Immovable)
            .build(RecordId(u32::MAX));
        let slot = RecordBlueprint::free_slot().build(RecordId(0));
        let mut store = RecordStore::ingest(vec![last, slot], 0).unwrap();

        let before = store.records().to_vec();
        let err = store.activate(&RecordBlueprint::free_slot()).unwrap_err();
        assert_eq!(err, StoreError::IdsExhausted);
        assert_eq!(store.records(), &before[..]);
        assert_eq!(store.free_index(), 1);
    }

    #[test]
    fn test_settle_restores_distance_order() {
        let mut store = store_with(4, 2);
        for (record, distance) in store.records_mut().iter_mut().zip([0.0, 5.0, 30.0, 100.0]) {
            record.distance = distance;
        }
        let blueprint = RecordBlueprint::new(Vec3::ZERO, Vec3::splat(0.5), Material::Immovable);
        let activation = store.activate(&blueprint).unwrap();
        store.records_mut()[activation.index].distance = 4.0;

        let index = store.settle(activation.index);

        assert_eq!(index, 1);
        assert_eq!(store.get(1).unwrap().id(), activation.id);
        let distances: Vec<f32> = store.records()[..5].iter().map(|r| r.distance).collect();
        assert_eq!(distances, vec![0.0, 4.0, 5.0, 30.0, 100.0]);
        assert_eq!(store.free_index(), 5);
        assert!(store.get(5).unwrap().is_free());
    }

    #[test]
    fn test_settle_keeps_farthest_in_place() {
        let mut store = store_with(3, 1);
        for (record, distance) in store.records_mut().iter_mut().zip([1.0, 2.0, 3.0, 9.0]) {
            record.distance = distance;
        }
        let before = store.records().to_vec();
        assert_eq!(store.settle(3), 3);
        assert_eq!(store.settle(99), 99);
        assert_eq!(store.records(), &before[..]);
    }

    #[test]
    fn test_deactivate_parks_record() {
        let mut store = store_with(4, 0);
        let id = store.deactivate(2).unwrap();
        let record = store.get(2).unwrap();
        assert_eq!(record.id(), id);
        assert!(record.is_free());
        assert_eq!(record.position, Vec3::splat(FREE_POSITION));
        assert!(store.deactivate(9).is_err());
    }

    #[test]
    fn test_replace_checks_capacity() {
        let mut store = store_with(4, 0);
        let err = store.replace_records(Vec::new(), 0).unwrap_err();
        assert_eq!(err, StoreError::CapacityMismatch { expected: 4, actual: 0 });
    }
}
