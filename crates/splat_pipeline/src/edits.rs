//! # Player Edits
//!
//! Collect and build are applied to the main context's snapshot at once so
//! the player sees them immediately, and queued as ID-keyed updates so the
//! next merge carries them into the sort context's copy.

use splat_core::{
    Activation, Material, Record, RecordBlueprint, RecordStore, RecordUpdate, StoreResult, Vec3,
};
use splat_sim::SelectionBuffer;

/// Scale of a built block.
const BUILD_SCALE: f32 = 0.5;

/// Edits waiting for the next merge batch.
#[derive(Clone, Debug, Default)]
pub struct EditQueue {
    pending: Vec<RecordUpdate>,
    player: Option<RecordUpdate>,
}

impl EditQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues edits.
    pub fn extend(&mut self, updates: impl IntoIterator<Item = RecordUpdate>) {
        self.pending.extend(updates);
    }

    /// Records the player's latest motion. Replaces any earlier one.
    pub fn set_player_motion(&mut self, player: &Record) {
        self.player = Some(RecordUpdate::motion_of(player));
    }

    /// Edits queued since the last batch.
    #[must_use]
    pub fn pending(&self) -> &[RecordUpdate] {
        &self.pending
    }

    /// Number of edits queued since the last batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Whether no edits are queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drains the queue into one merge batch.
    ///
    /// Later updates win within a batch, so simulated motion comes first,
    /// then edits, then the player's own motion.
    pub fn take_batch(&mut self, simulated: &[Record]) -> Vec<RecordUpdate> {
        let mut batch = Vec::with_capacity(simulated.len() + self.pending.len() + 1);
        batch.extend(simulated.iter().map(RecordUpdate::motion_of));
        batch.append(&mut self.pending);
        batch.extend(self.player.take());
        batch
    }
}

/// Frees every selected record in the snapshot.
///
/// The player is never collected.
///
/// # Returns
///
/// One release update per freed record.
///
/// # Errors
///
/// Fails if a selection index is out of range for the store.
pub fn collect(store: &mut RecordStore, selection: &SelectionBuffer) -> StoreResult<Vec<RecordUpdate>> {
    let mut updates = Vec::with_capacity(selection.len());
    for (copy, &index) in selection.records().iter().zip(selection.sources()) {
        if copy.material() == Material::Player {
            continue;
        }
        let id = store.deactivate(index)?;
        updates.push(RecordUpdate::release(id));
    }
    Ok(updates)
}

/// Builds a block one step toward the eye from `target`.
///
/// The block is measured from `eye` and settled into distance order, so
/// the snapshot stays sorted and the block can be targeted on the next
/// frame without waiting for a merge.
///
/// # Returns
///
/// The activation, with the block's settled index, and the claim update
/// for the merge batch.
///
/// # Errors
///
/// Fails without touching the store when no Free slot is available.
pub fn build(
    store: &mut RecordStore,
    target: &Record,
    look: Vec3,
    eye: Vec3,
) -> StoreResult<(Activation, RecordUpdate)> {
    let blueprint = RecordBlueprint::new(
        target.position - look,
        Vec3::splat(BUILD_SCALE),
        Material::Immovable,
    );
    let activation = store.activate(&blueprint)?;
    let record = &mut store.records_mut()[activation.index];
    record.distance = record.distance_from(eye);
    let record = *record;
    let index = store.settle(activation.index);
    Ok((Activation { index, ..activation }, RecordUpdate::claim(activation.slot, record)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use splat_core::constants::FREE_POSITION;
    use splat_core::{IdAllocator, StoreError, UpdateKind};
    use splat_sim::{find_target, generate_selection, DistanceSorter, SimulationParams};

    /// Player at the origin, a row of blocks along -Z, two Free slots.
    fn world() -> RecordStore {
        let mut ids = IdAllocator::default();
        let mut records = vec![ids.create(&RecordBlueprint::new(Vec3::ZERO, Vec3::new(0.25, 1.0, 0.25), Material::Player)).unwrap()];
        for z in [3.0, 5.0, 7.0, 9.0] {
            records.push(ids.create(&RecordBlueprint::new(Vec3::new(0.0, 0.0, -z), Vec3::splat(0.5), Material::Immovable)).unwrap());
        }
        records.push(ids.create(&RecordBlueprint::free_slot()).unwrap());
        records.push(ids.create(&RecordBlueprint::free_slot()).unwrap());
        let sorted = DistanceSorter::default().sort(&mut records, Vec3::ZERO);
        RecordStore::ingest(sorted, 0).unwrap()
    }

    #[test]
    fn test_collect_radius_zero_frees_only_target() {
        let params = SimulationParams::default();
        let mut store = world();
        let before = store.records().to_vec();
        let look = Vec3::new(0.0, 0.0, -1.0);

        let target = find_target(Vec3::ZERO, look, store.records(), &params).unwrap();
        assert_eq!(store.records()[target].position.z, -3.0);

        let mut selection = SelectionBuffer::with_capacity(8);
        generate_selection(Some(target), store.records(), 0.0, &mut selection, &params);
        let updates = collect(&mut store, &selection).unwrap();

        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].kind, UpdateKind::Release);
        let freed = store.records()[target];
        assert!(freed.is_free());
        assert_eq!(freed.position, Vec3::splat(FREE_POSITION));
        for (index, (now, was)) in store.records().iter().zip(&before).enumerate() {
            if index != target {
                assert_eq!(now, was);
            }
        }
    }

    #[test]
    fn test_collect_skips_player() {
        let params = SimulationParams::default();
        let mut store = world();
        let mut selection = SelectionBuffer::with_capacity(8);
        generate_selection(Some(0), store.records(), 100.0, &mut selection, &params);
        assert_eq!(selection.len(), 5);

        let updates = collect(&mut store, &selection).unwrap();
        assert_eq!(updates.len(), 4);
        assert!(!store.records()[0].is_free());
        assert_eq!(store.records()[0].material(), Material::Player);
    }

    #[test]
    fn test_build_claims_free_slot_in_front_of_target() {
        let mut store = world();
        let target = store.records()[1];
        let look = Vec3::new(0.0, 0.0, -1.0);

        let (activation, update) = build(&mut store, &target, look, Vec3::ZERO).unwrap();

        // Nearer than every block, so it settles right behind the player.
        assert_eq!(activation.index, 1);
        assert_eq!(store.free_index(), 6);
        let built = store.records()[1];
        assert_eq!(built.id(), activation.id);
        assert_eq!(built.position, Vec3::new(0.0, 0.0, -2.0));
        assert_eq!(built.distance, 2.0);
        assert_eq!(store.records()[2].id(), target.id());
        assert_eq!(built.material(), Material::Immovable);
        assert_eq!(update.id, activation.slot);
        assert_eq!(update.kind, UpdateKind::Claim(built));
    }

    #[test]
    fn test_build_on_full_pool_is_rejected() {
        let mut store = world();
        let target = store.records()[1];
        let look = Vec3::new(0.0, 0.0, -1.0);
        build(&mut store, &target, look, Vec3::ZERO).unwrap();
        build(&mut store, &target, look, Vec3::ZERO).unwrap();

        let before = store.records().to_vec();
        let err = build(&mut store, &target, look, Vec3::ZERO).unwrap_err();
        assert_eq!(err, StoreError::PoolExhausted { capacity: 7 });
        assert_eq!(store.records(), &before[..]);
    }

    #[test]
    fn test_built_block_is_next_target() {
        let params = SimulationParams::default();
        let mut ids = IdAllocator::default();
        let mut records = vec![
            ids.create(&RecordBlueprint::new(Vec3::ZERO, Vec3::new(0.25, 1.0, 0.25), Material::Player))
                .unwrap(),
            ids.create(&RecordBlueprint::new(Vec3::new(0.0, 0.0, -5.0), Vec3::splat(0.5), Material::Immovable))
                .unwrap(),
            ids.create(&RecordBlueprint::new(Vec3::new(0.0, 0.0, 100.0), Vec3::splat(2.0), Material::Star))
                .unwrap(),
            ids.create(&RecordBlueprint::free_slot()).unwrap(),
        ];
        let sorted = DistanceSorter::default().sort(&mut records, Vec3::ZERO);
        let mut store = RecordStore::ingest(sorted, 0).unwrap();
        let look = Vec3::new(0.0, 0.0, -1.0);

        let target = find_target(Vec3::ZERO, look, store.records(), &params).unwrap();
        let block = store.records()[target];
        let (activation, _) = build(&mut store, &block, look, Vec3::ZERO).unwrap();

        let distances: Vec<f32> = store.records().iter().map(|r| r.distance).collect();
        assert_eq!(distances, vec![0.0, 4.0, 5.0, 100.0]);
        let next = find_target(Vec3::ZERO, look, store.records(), &params).unwrap();
        assert_eq!(next, activation.index);
        assert_eq!(store.records()[next].id(), activation.id);
    }

    #[test]
    fn test_batch_order_and_drain() {
        let mut store = world();
        let mut queue = EditQueue::new();
        let ball = store.records()[2];
        let player = store.records()[0];

        queue.extend([RecordUpdate::release(ball.id())]);
        queue.set_player_motion(&player);
        let batch = queue.take_batch(&[ball]);

        assert_eq!(batch.len(), 3);
        assert!(matches!(batch[0].kind, UpdateKind::Motion { .. }));
        assert_eq!(batch[1].kind, UpdateKind::Release);
        assert_eq!(batch[2].id, player.id());
        assert!(queue.is_empty());
        assert!(queue.take_batch(&[]).is_empty());

        // Release wins over the earlier simulated motion.
        let stats = splat_core::merge_updates(store.records_mut(), &batch, Vec3::ZERO);
        assert_eq!(stats.applied, 2);
        assert!(store.records()[2].is_free());
    }
}
