//! # Targeting & Selection
//!
//! Both scans assume the records are sorted by distance to the eye and stop
//! at the simulation distance.

use splat_core::{Material, Record, State, Vec3};

use crate::params::SimulationParams;

/// Finds the record the eye is looking at.
///
/// A record is hit when its center lies in front of the eye and within
/// twice its size of the view ray. Among hits the one closest to the eye
/// wins; on a tie the first one encountered is kept. The player surrounds
/// the eye and is never a target.
///
/// # Arguments
///
/// * `eye` - Ray origin
/// * `look` - Unit view direction
/// * `records` - Distance-sorted records
///
/// # Returns
///
/// Index of the target, if any.
#[must_use]
pub fn find_target(eye: Vec3, look: Vec3, records: &[Record], params: &SimulationParams) -> Option<usize> {
    let mut target = None;
    let mut target_distance = f32::INFINITY;

    for (index, record) in records.iter().enumerate() {
        if record.distance > params.max_simulation_distance {
            break;
        }
        if record.is_free() || record.material() == Material::Player {
            continue;
        }

        let offset = record.position - eye;
        if offset.dot(look) < 0.0 {
            continue;
        }
        let off_ray = offset.cross(look).length();
        let eye_distance = offset.length();
        if off_ray < 2.0 * record.size() && eye_distance < target_distance {
            target_distance = eye_distance;
            target = Some(index);
        }
    }

    target
}

/// Fixed-capacity buffer of selected record copies.
#[derive(Clone, Debug)]
pub struct SelectionBuffer {
    records: Vec<Record>,
    sources: Vec<usize>,
    capacity: usize,
}

impl SelectionBuffer {
    /// Creates a buffer holding at most `capacity` copies.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            sources: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Maximum number of copies.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of copies currently held.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing is selected.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Selected copies, tagged Selected.
    #[inline]
    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Index of each copy's source record.
    #[inline]
    #[must_use]
    pub fn sources(&self) -> &[usize] {
        &self.sources
    }

    /// Empties the buffer.
    pub fn clear(&mut self) {
        self.records.clear();
        self.sources.clear();
    }

    fn push(&mut self, index: usize, record: &Record) -> bool {
        let mut copy = *record;
        copy.set_state(State::Selected);
        self.records.push(copy);
        self.sources.push(index);
        self.records.len() < self.capacity
    }
}

/// Copies every live record within `radius` of the anchor into `selection`.
///
/// The buffer is cleared first. Without an anchor nothing is selected.
/// Source records are never mutated.
///
/// # Returns
///
/// The number of records selected.
pub fn generate_selection(
    anchor: Option<usize>,
    records: &[Record],
    radius: f32,
    selection: &mut SelectionBuffer,
    params: &SimulationParams,
) -> usize {
    selection.clear();
    let Some(anchor) = anchor.and_then(|index| records.get(index)) else {
        return 0;
    };
    if selection.capacity() == 0 {
        return 0;
    }
    let center = anchor.position;

    for (index, record) in records.iter().enumerate() {
        if record.distance > params.max_simulation_distance {
            break;
        }
        if record.is_free() {
            continue;
        }
        if record.position.distance(center) <= radius && !selection.push(index, record) {
            break;
        }
    }

    selection.len()
}
