//! # Collision & Integration
//!
//! Brute-force pairwise collision over every candidate, then explicit Euler
//! integration with gravity.
//!
//! The impulse is one-sided: only the mover's velocity changes. The other
//! object of a pair gets its own response when it is processed as a mover.

use splat_core::{Material, Record};

use crate::params::SimulationParams;

/// Whether `record` is processed as a mover.
#[inline]
fn is_eligible_mover(record: &Record, params: &SimulationParams) -> bool {
    record.material().is_mover()
        && !record.is_free()
        && record.distance <= params.max_simulation_distance
}

/// Resolves `mover` against `others`, returning the number of overlaps.
///
/// `skip` is the mover's own index when it also lives in `others`.
fn collide_mover(
    mover: &mut Record,
    skip: Option<usize>,
    others: &[Record],
    limited: bool,
    params: &SimulationParams,
) -> u32 {
    let cutoff = params.candidate_distance();
    let radius = params.radius_of(mover);
    let material = mover.material();
    let mass = params.mass_of(material);
    let dampen = params.dampen_of(material);
    let id = mover.id();

    // Impulses accumulate on the undamped velocity; the record gets the
    // damped value after each response.
    let mut velocity = mover.velocity;
    let mut collisions = 0;

    for (index, other) in others.iter().enumerate() {
        if skip == Some(index) || other.id() == id {
            continue;
        }
        if other.material() == Material::Permeable || other.is_free() {
            continue;
        }
        if limited && other.distance > cutoff {
            continue;
        }

        let delta = other.position - mover.position;
        let mut separation = delta.length();
        if separation > radius + params.radius_of(other) {
            continue;
        }
        collisions += 1;

        if separation == 0.0 {
            separation = 1.0;
        }
        let normal = delta * (1.0 / separation);
        let speed = (velocity - other.velocity).dot(normal);
        if speed < 0.0 {
            continue;
        }

        let other_mass = params.mass_of(other.material());
        let impulse = 2.0 * speed / (mass + other_mass);
        velocity -= normal * (impulse * other_mass);
        mover.velocity = velocity * dampen;
    }

    collisions
}

/// Collides every eligible mover in `movers` against `others`.
///
/// The two slices are disjoint; a copy of a mover inside `others` is skipped
/// by ID. With `limited`, candidates past the candidate distance are
/// ignored.
///
/// # Returns
///
/// The number of overlapping pairs found.
pub fn collide_subset(
    movers: &mut [Record],
    others: &[Record],
    limited: bool,
    params: &SimulationParams,
) -> u32 {
    let mut collisions = 0;
    for mover in movers.iter_mut() {
        if !is_eligible_mover(mover, params) {
            continue;
        }
        collisions += collide_mover(mover, None, others, limited, params);
    }
    collisions
}

/// Collides every eligible mover of `records` against the same array.
///
/// Movers are processed in array order and see the velocities written by
/// earlier movers.
pub fn collide_in_place(records: &mut [Record], limited: bool, params: &SimulationParams) -> u32 {
    let mut collisions = 0;
    for index in 0..records.len() {
        if !is_eligible_mover(&records[index], params) {
            continue;
        }
        let mut mover = records[index];
        collisions += collide_mover(&mut mover, Some(index), records, limited, params);
        records[index].velocity = mover.velocity;
    }
    collisions
}

/// Advances Movable records by `dt` seconds.
///
/// Speed is clamped first, then position moves, then gravity applies.
///
/// # Returns
///
/// The number of records advanced.
pub fn integrate(records: &mut [Record], dt: f32, params: &SimulationParams) -> usize {
    let mut advanced = 0;
    for record in records.iter_mut() {
        if record.material() != Material::Movable || record.is_free() {
            continue;
        }
        if record.distance > params.max_simulation_distance {
            continue;
        }

        let speed = record.velocity.length();
        if speed > params.max_speed {
            record.velocity = record.velocity * (params.max_speed / speed);
        }
        record.position += record.velocity * dt;
        record.velocity.y -= params.gravity * dt;
        advanced += 1;
    }
    advanced
}
