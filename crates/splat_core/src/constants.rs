//! # Pipeline Constants
//!
//! Tuned values shared by every context. The simulation parameters in
//! `splat_sim` default to these, and a config file may override them.

// =============================================================================
// RECORD LAYOUT
// =============================================================================

/// Number of 4-byte scalars per record.
pub const RECORD_STRIDE: usize = 24;

// =============================================================================
// DISTANCE CUTOFFS
// =============================================================================

/// Objects farther than this from the eye are not simulated.
pub const MAX_SIMULATION_DISTANCE: f32 = 25.0;

/// Upper bound on an object's extent, used to widen candidate cutoffs.
pub const MAX_OBJECT_SIZE: f32 = 1.0;

/// Cutoff for collision candidates and for the simulated subset.
pub const CANDIDATE_DISTANCE: f32 = MAX_SIMULATION_DISTANCE + 2.0 * MAX_OBJECT_SIZE;

// =============================================================================
// FREE SLOTS
// =============================================================================

/// Coordinate a Free record is parked at, far outside every cutoff.
pub const FREE_POSITION: f32 = 1e10;

/// Distance assigned to Free records so they always sort last.
pub const FREE_DISTANCE: f32 = f32::INFINITY;

// =============================================================================
// PHYSICS
// =============================================================================

/// Collision radius multiplier applied to the largest scale axis.
pub const COLLIDE_SIZE: f32 = 3.0;

/// Speed limit for Movable records (units per second).
pub const MAX_SPEED: f32 = 25.0;

/// Gravity acceleration (units per second squared).
pub const GRAVITY: f32 = 25.0;

/// Effective mass of Immovable records.
pub const IMMOVABLE_MASS: f32 = 1e9;

/// Effective mass of the player.
pub const PLAYER_MASS: f32 = 100.0;

/// Effective mass of everything else.
pub const DEFAULT_MASS: f32 = 0.01;

/// Velocity factor applied to the player after a collision.
pub const PLAYER_DAMPEN: f32 = 0.5;

/// Velocity factor applied to other movers after a collision.
pub const DEFAULT_DAMPEN: f32 = 0.75;

// =============================================================================
// FRAME BUDGETS
// =============================================================================

/// Largest time step a frame may advance the simulation by (seconds).
pub const MAX_DELTA_TIME: f32 = 0.1;

/// Records handed to the renderer for upload per frame.
pub const RECORDS_PER_UPLOAD: usize = 50_000;

/// Capacity of the selection buffer.
pub const MAX_SELECTED: usize = 1000;
