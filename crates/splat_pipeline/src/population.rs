//! # Test Worlds
//!
//! Deterministic record populations for tests, benches and the headless
//! runner. Same seed, same world.

use std::f32::consts::TAU;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use splat_core::{IdAllocator, Material, Quaternion, RecordBlueprint, StoreResult, Vec3};

use crate::coordinator::Ingest;

/// Where the player starts.
pub const PLAYER_START: Vec3 = Vec3::new(0.0, 4.0, 0.0);

/// Shape of a generated world.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldShape {
    /// RNG seed.
    pub seed: u64,
    /// The ground is a square of `(2 * ground_extent + 1)^2` blocks.
    pub ground_extent: i32,
    /// Movable items dropped above the ground.
    pub movables: usize,
    /// Permeable tufts on the ground.
    pub grass: usize,
    /// Stars on a far shell.
    pub stars: usize,
    /// Free slots left for building.
    pub free_slots: usize,
}

impl Default for WorldShape {
    fn default() -> Self {
        Self {
            seed: 7,
            ground_extent: 8,
            movables: 64,
            grass: 64,
            stars: 32,
            free_slots: 256,
        }
    }
}

impl WorldShape {
    /// Total number of records the world will hold.
    #[must_use]
    pub fn record_count(&self) -> usize {
        let side = (2 * self.ground_extent.max(0) + 1) as usize;
        1 + side * side + self.movables + self.grass + self.stars + self.free_slots
    }
}

/// Generates a world: the player first, then ground, grass, items, stars
/// and Free slots.
///
/// # Errors
///
/// Returns [`splat_core::StoreError::IdsExhausted`] if the shape needs more records than
/// there are IDs.
pub fn generate(shape: &WorldShape) -> StoreResult<Ingest> {
    let mut rng = ChaCha8Rng::seed_from_u64(shape.seed);
    let mut ids = IdAllocator::default();
    let mut records = Vec::with_capacity(shape.record_count());
    let extent = shape.ground_extent.max(0);
    let span = extent as f32;

    records.push(ids.create(
        &RecordBlueprint::new(PLAYER_START, Vec3::new(0.25, 0.5, 0.25), Material::Player)
            .with_color([0.9, 0.7, 0.5, 1.0]),
    )?);

    for x in -extent..=extent {
        for z in -extent..=extent {
            let shade = rng.gen_range(0.35..0.5);
            records.push(ids.create(
                &RecordBlueprint::new(Vec3::new(x as f32, 0.0, z as f32), Vec3::splat(0.5), Material::Immovable)
                    .with_color([0.4 * shade, shade, 0.3 * shade, 1.0]),
            )?);
        }
    }

    for _ in 0..shape.grass {
        let position = Vec3::new(rng.gen_range(-span..=span), 0.6, rng.gen_range(-span..=span));
        let yaw = Quaternion::from_axis_angle(Vec3::Y, rng.gen_range(0.0..TAU));
        records.push(ids.create(
            &RecordBlueprint::new(position, Vec3::new(0.05, 0.2, 0.05), Material::Permeable)
                .with_color([0.2, 0.8, 0.2, 1.0])
                .with_rotation(yaw),
        )?);
    }

    for _ in 0..shape.movables {
        let position = Vec3::new(
            rng.gen_range(-span..=span),
            rng.gen_range(3.0..10.0),
            rng.gen_range(-span..=span),
        );
        let size = rng.gen_range(0.15..0.3);
        records.push(ids.create(
            &RecordBlueprint::new(position, Vec3::splat(size), Material::Movable).with_color([
                rng.gen_range(0.2..1.0),
                rng.gen_range(0.2..1.0),
                rng.gen_range(0.2..1.0),
                1.0,
            ]),
        )?);
    }

    for _ in 0..shape.stars {
        let direction = Vec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(0.1..1.0),
            rng.gen_range(-1.0..1.0),
        )
        .normalize();
        records.push(ids.create(
            &RecordBlueprint::new(direction * 500.0, Vec3::splat(2.0), Material::Star).with_color([1.0, 1.0, 0.9, 1.0]),
        )?);
    }

    for _ in 0..shape.free_slots {
        records.push(ids.create(&RecordBlueprint::free_slot())?);
    }

    Ok(Ingest {
        records,
        next_id: ids.peek().0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_same_seed_same_world() {
        let shape = WorldShape::default();
        let a = generate(&shape).unwrap();
        let b = generate(&shape).unwrap();
        assert_eq!(a.records, b.records);

        let c = generate(&WorldShape { seed: 8, ..shape }).unwrap();
        assert_ne!(a.records, c.records);
    }

    #[test]
    fn test_world_shape() {
        let shape = WorldShape {
            ground_extent: 2,
            movables: 3,
            grass: 4,
            stars: 5,
            free_slots: 6,
            ..WorldShape::default()
        };
        let world = generate(&shape).unwrap();

        assert_eq!(world.records.len(), shape.record_count());
        assert_eq!(world.records.len(), 1 + 25 + 3 + 4 + 5 + 6);
        assert_eq!(world.records[0].material(), Material::Player);
        let players = world.records.iter().filter(|r| r.material() == Material::Player).count();
        assert_eq!(players, 1);
        assert_eq!(world.records.iter().filter(|r| r.is_free()).count(), 6);

        let ids: HashSet<_> = world.records.iter().map(|r| r.id()).collect();
        assert_eq!(ids.len(), world.records.len());
        assert_eq!(world.next_id as usize, world.records.len());
    }
}
