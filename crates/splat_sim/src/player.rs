//! # Player Controller
//!
//! The player is simulated on the main context every frame, against the
//! latest render snapshot, so input never waits on a worker round trip.

use serde::{Deserialize, Serialize};
use splat_core::{Record, Vec3};

use crate::params::SimulationParams;
use crate::physics::collide_subset;

/// Movement mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayMode {
    /// Walking under gravity.
    #[default]
    Normal,
    /// No gravity; vertical input steers.
    Fly,
}

/// Tunables for the player controller.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerParams {
    /// Height of the eye above the player's center.
    pub eye_offset: f32,
    /// Weight of the desired velocity when blending with the current one.
    pub blend: f32,
    /// Downward acceleration on the player in Normal mode.
    pub gravity: f32,
}

impl Default for PlayerParams {
    fn default() -> Self {
        Self {
            // Eye height 4 on a body of height 2, halved.
            eye_offset: 1.0,
            blend: 0.8,
            gravity: splat_core::constants::GRAVITY,
        }
    }
}

/// Advances the player record by one frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlayerController {
    params: PlayerParams,
}

impl PlayerController {
    /// Creates a controller.
    #[must_use]
    pub const fn new(params: PlayerParams) -> Self {
        Self { params }
    }

    /// Controller parameters.
    #[must_use]
    pub const fn params(&self) -> &PlayerParams {
        &self.params
    }

    /// Eye position for a player record.
    #[inline]
    #[must_use]
    pub fn eye(&self, player: &Record) -> Vec3 {
        player.position + Vec3::new(0.0, self.params.eye_offset, 0.0)
    }

    /// Steers, collides and moves the player.
    ///
    /// # Arguments
    ///
    /// * `player` - The player record, updated in place
    /// * `world` - Latest render snapshot; the player's own copy is skipped
    /// * `desired` - Velocity the input asks for
    /// * `mode` - Movement mode
    /// * `dt` - Frame time in seconds
    /// * `sim` - Collision tunables
    ///
    /// # Returns
    ///
    /// The number of collisions the player had.
    pub fn step(
        &self,
        player: &mut Record,
        world: &[Record],
        desired: Vec3,
        mode: PlayMode,
        dt: f32,
        sim: &SimulationParams,
    ) -> u32 {
        let blend = self.params.blend;
        let keep = 1.0 - blend;
        let v = &mut player.velocity;
        v.x = blend * desired.x + keep * v.x;
        if mode == PlayMode::Fly || desired.y != 0.0 {
            v.y = blend * desired.y + keep * v.y;
        }
        v.z = blend * desired.z + keep * v.z;

        // The player sits at the eye, well inside the simulation distance.
        player.distance = self.params.eye_offset.abs();
        let collisions = collide_subset(std::slice::from_mut(player), world, false, sim);

        player.position += player.velocity * dt;
        if mode == PlayMode::Normal {
            player.velocity.y -= self.params.gravity * dt;
        }
        collisions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splat_core::{IdAllocator, Material, RecordBlueprint};

    fn player(ids: &mut IdAllocator, position: Vec3) -> Record {
        ids.create(&RecordBlueprint::new(position, Vec3::new(0.25, 1.0, 0.25), Material::Player)).unwrap()
    }

    #[test]
    fn test_eye_is_above_center() {
        let controller = PlayerController::default();
        let mut ids = IdAllocator::default();
        let record = player(&mut ids, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(controller.eye(&record), Vec3::new(1.0, 3.0, 3.0));
    }

    #[test]
    fn test_blends_toward_desired_and_falls() {
        let controller = PlayerController::new(PlayerParams::default());
        let mut ids = IdAllocator::default();
        let mut record = player(&mut ids, Vec3::new(0.0, 50.0, 0.0));
        record.velocity = Vec3::new(5.0, 0.0, 0.0);

        controller.step(
            &mut record,
            &[],
            Vec3::new(10.0, 0.0, 0.0),
            PlayMode::Normal,
            0.1,
            &SimulationParams::default(),
        );

        assert!((record.velocity.x - 9.0).abs() < 1e-5);
        assert!((record.position.x - 0.9).abs() < 1e-5);
        assert!((record.velocity.y + 2.5).abs() < 1e-5);
    }

    #[test]
    fn test_fly_mode_has_no_gravity() {
        let controller = PlayerController::default();
        let mut ids = IdAllocator::default();
        let mut record = player(&mut ids, Vec3::ZERO);

        controller.step(&mut record, &[], Vec3::ZERO, PlayMode::Fly, 0.1, &SimulationParams::default());

        assert_eq!(record.velocity, Vec3::ZERO);
        assert_eq!(record.position, Vec3::ZERO);
    }

    #[test]
    fn test_lands_on_ground() {
        let controller = PlayerController::new(PlayerParams::default());
        let mut ids = IdAllocator::default();
        let mut record = player(&mut ids, Vec3::new(0.0, 1.0, 0.0));
        record.velocity = Vec3::new(0.0, -10.0, 0.0);
        let mut ground = ids.create(&RecordBlueprint::new(Vec3::ZERO, Vec3::splat(0.5), Material::Immovable)).unwrap();
        ground.distance = 2.0;
        let world = [record, ground];

        let collisions = controller.step(
            &mut record,
            &world,
            Vec3::ZERO,
            PlayMode::Normal,
            0.016,
            &SimulationParams::default(),
        );

        assert_eq!(collisions, 1);
        assert!(record.velocity.y > -10.0 * 0.5);
    }
}
