//! # Simulation Parameters
//!
//! Tunables for collision and integration. Defaults match
//! [`splat_core::constants`]; a config file may override any of them.

use serde::{Deserialize, Serialize};
use splat_core::constants::{
    COLLIDE_SIZE, DEFAULT_DAMPEN, DEFAULT_MASS, GRAVITY, IMMOVABLE_MASS, MAX_OBJECT_SIZE,
    MAX_SIMULATION_DISTANCE, MAX_SPEED, PLAYER_DAMPEN, PLAYER_MASS,
};
use splat_core::{Material, Record};

/// Physics tunables.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// Objects farther than this from the eye are not simulated.
    pub max_simulation_distance: f32,
    /// Upper bound on object extent.
    pub max_object_size: f32,
    /// Collision radius multiplier on the largest scale axis.
    pub collide_size: f32,
    /// Speed limit for Movable records.
    pub max_speed: f32,
    /// Downward acceleration.
    pub gravity: f32,
    /// Mass of Immovable records.
    pub immovable_mass: f32,
    /// Mass of the player.
    pub player_mass: f32,
    /// Mass of everything else.
    pub default_mass: f32,
    /// Post-collision velocity factor for the player.
    pub player_dampen: f32,
    /// Post-collision velocity factor for other movers.
    pub default_dampen: f32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            max_simulation_distance: MAX_SIMULATION_DISTANCE,
            max_object_size: MAX_OBJECT_SIZE,
            collide_size: COLLIDE_SIZE,
            max_speed: MAX_SPEED,
            gravity: GRAVITY,
            immovable_mass: IMMOVABLE_MASS,
            player_mass: PLAYER_MASS,
            default_mass: DEFAULT_MASS,
            player_dampen: PLAYER_DAMPEN,
            default_dampen: DEFAULT_DAMPEN,
        }
    }
}

impl SimulationParams {
    /// Cutoff for collision candidates and the simulated subset.
    #[inline]
    #[must_use]
    pub fn candidate_distance(&self) -> f32 {
        self.max_simulation_distance + 2.0 * self.max_object_size
    }

    /// Effective mass of a material in a collision.
    #[inline]
    #[must_use]
    pub fn mass_of(&self, material: Material) -> f32 {
        match material {
            Material::Immovable => self.immovable_mass,
            Material::Player => self.player_mass,
            _ => self.default_mass,
        }
    }

    /// Velocity factor applied to a mover after it collides.
    #[inline]
    #[must_use]
    pub fn dampen_of(&self, material: Material) -> f32 {
        if material == Material::Player {
            self.player_dampen
        } else {
            self.default_dampen
        }
    }

    /// Collision radius of a record.
    #[inline]
    #[must_use]
    pub fn radius_of(&self, record: &Record) -> f32 {
        self.collide_size * record.size()
    }

    /// Checks that every value is usable.
    ///
    /// # Errors
    ///
    /// Returns a description of the first offending field.
    pub fn validate(&self) -> Result<(), String> {
        let positive = [
            ("max_simulation_distance", self.max_simulation_distance),
            ("collide_size", self.collide_size),
            ("max_speed", self.max_speed),
            ("immovable_mass", self.immovable_mass),
            ("player_mass", self.player_mass),
            ("default_mass", self.default_mass),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("{name} must be positive and finite, got {value}"));
            }
        }
        if !(self.max_object_size.is_finite() && self.max_object_size >= 0.0) {
            return Err(format!("max_object_size must be non-negative, got {}", self.max_object_size));
        }
        if !self.gravity.is_finite() {
            return Err(format!("gravity must be finite, got {}", self.gravity));
        }
        for (name, value) in [("player_dampen", self.player_dampen), ("default_dampen", self.default_dampen)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{name} must be within [0, 1], got {value}"));
            }
        }
        Ok(())
    }
}
