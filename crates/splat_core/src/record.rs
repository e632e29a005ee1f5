//! # Splat Records
//!
//! A record is one simulated point-mass object. Records are stored in a flat
//! array with a fixed stride of 24 four-byte scalars so that the array can be
//! handed to a GPU uploader without conversion:
//!
//! ```text
//!  0  1  2  3 | 4  5  6  7        | 8  9 10 11     | 12 13 14 15
//!  r  g  b  a | px py pz distance | sx sy sz state | c00 c01 c02 id
//!
//! 16  17  18  19      | 20 21 22 23
//! c11 c12 c22 padding | vx vy vz material
//! ```

use bytemuck::{Pod, Zeroable};

use crate::constants::{FREE_DISTANCE, FREE_POSITION, RECORD_STRIDE};
use crate::math::{Quaternion, Vec3};

/// Process-unique identifier of a record.
///
/// IDs are assigned once at creation and never reused while the object is
/// alive. They are the only key used to reconcile records across contexts,
/// because array positions change on every sort pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct RecordId(pub u32);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle state of a record's slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum State {
    /// Live object.
    Active = 0,
    /// Live object copied into the selection buffer.
    Selected = 1,
    /// Unused slot in the pool.
    Free = 2,
}

impl State {
    /// Decodes a raw tag.
    #[must_use]
    pub const fn from_raw(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Active),
            1 => Some(Self::Selected),
            2 => Some(Self::Free),
            _ => None,
        }
    }
}

/// Physical behaviour of a record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Material {
    /// Terrain and built blocks. Never moves.
    Immovable = 0,
    /// Falls and gets pushed around.
    Movable = 1,
    /// Rendered only; nothing collides with it.
    Permeable = 2,
    /// Sky objects.
    Star = 3,
    /// The one player-controlled record.
    Player = 4,
}

impl Material {
    /// Decodes a raw tag.
    #[must_use]
    pub const fn from_raw(value: u32) -> Option<Self> {
        match value {
            0 => Some(Self::Immovable),
            1 => Some(Self::Movable),
            2 => Some(Self::Permeable),
            3 => Some(Self::Star),
            4 => Some(Self::Player),
            _ => None,
        }
    }

    /// Whether this material takes part in collision as a mover.
    #[inline]
    #[must_use]
    pub const fn is_mover(self) -> bool {
        matches!(self, Self::Movable | Self::Player)
    }
}

/// One splat record.
///
/// The tags (`state`, `id`, `material`) are private so they can only be
/// written through typed setters.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Record {
    /// Color (r, g, b, a).
    pub color: [f32; 4],
    /// Center position.
    pub position: Vec3,
    /// Distance to the eye at the last sort or simulation pass.
    pub distance: f32,
    /// Half extents. Also the input to the collision radius.
    pub scale: Vec3,
    state: u32,
    /// Covariance entries 00, 01, 02.
    pub covariance_a: [f32; 3],
    id: u32,
    /// Covariance entries 11, 12, 22.
    pub covariance_b: [f32; 3],
    padding: u32,
    /// Velocity.
    pub velocity: Vec3,
    material: u32,
}

const _: () = assert!(std::mem::size_of::<Record>() == RECORD_STRIDE * 4);

impl Record {
    /// Returns the record's ID.
    #[inline]
    #[must_use]
    pub const fn id(&self) -> RecordId {
        RecordId(self.id)
    }

    /// Returns the lifecycle state. Unknown tags read as Free.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> State {
        match State::from_raw(self.state) {
            Some(state) => state,
            None => State::Free,
        }
    }

    /// Sets the lifecycle state.
    #[inline]
    pub fn set_state(&mut self, state: State) {
        self.state = state as u32;
    }

    /// Returns the material. Unknown tags read as Permeable.
    #[inline]
    #[must_use]
    pub const fn material(&self) -> Material {
        match Material::from_raw(self.material) {
            Some(material) => material,
            None => Material::Permeable,
        }
    }

    /// Whether the slot is unused.
    #[inline]
    #[must_use]
    pub const fn is_free(&self) -> bool {
        matches!(self.state(), State::Free)
    }

    /// Largest scale axis.
    #[inline]
    #[must_use]
    pub fn size(&self) -> f32 {
        self.scale.max_element()
    }

    /// Turns the record into a Free slot parked at the sentinel position.
    ///
    /// The ID is kept so pending updates can still find the slot.
    pub fn release(&mut self) {
        self.set_state(State::Free);
        self.position = Vec3::splat(FREE_POSITION);
        self.velocity = Vec3::ZERO;
        self.distance = FREE_DISTANCE;
    }

    /// Distance from `eye`, or the Free sentinel for Free records.
    #[inline]
    #[must_use]
    pub fn distance_from(&self, eye: Vec3) -> f32 {
        if self.is_free() {
            FREE_DISTANCE
        } else {
            self.position.distance(eye)
        }
    }

    /// Views a record slice as raw scalars, `RECORD_STRIDE` per record.
    #[must_use]
    pub fn as_words(records: &[Self]) -> &[u32] {
        bytemuck::cast_slice(records)
    }
}

/// Inputs for creating a record.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecordBlueprint {
    /// Center position.
    pub position: Vec3,
    /// Color (r, g, b, a).
    pub color: [f32; 4],
    /// Half extents.
    pub scale: Vec3,
    /// Orientation, only used for the covariance.
    pub rotation: Quaternion,
    /// Physical behaviour.
    pub material: Material,
    /// Initial state.
    pub state: State,
}

impl RecordBlueprint {
    /// Active blueprint with identity rotation and white color.
    #[must_use]
    pub const fn new(position: Vec3, scale: Vec3, material: Material) -> Self {
        Self {
            position,
            color: [1.0, 1.0, 1.0, 1.0],
            scale,
            rotation: Quaternion::IDENTITY,
            material,
            state: State::Active,
        }
    }

    /// Blueprint for a pre-allocated Free slot.
    #[must_use]
    pub const fn free_slot() -> Self {
        Self {
            position: Vec3::splat(FREE_POSITION),
            color: [0.0, 0.0, 0.0, 1.0],
            scale: Vec3::splat(0.5),
            rotation: Quaternion::IDENTITY,
            material: Material::Immovable,
            state: State::Free,
        }
    }

    /// Sets the color.
    #[must_use]
    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    /// Sets the orientation.
    #[must_use]
    pub fn with_rotation(mut self, rotation: Quaternion) -> Self {
        self.rotation = rotation;
        self
    }

    /// Materializes the record under `id`.
    #[must_use]
    pub fn build(&self, id: RecordId) -> Record {
        let (covariance_a, covariance_b) = covariance(self.scale, self.rotation);
        let mut record = Record {
            color: self.color,
            position: self.position,
            distance: 0.0,
            scale: self.scale,
            state: self.state as u32,
            covariance_a,
            id: id.0,
            covariance_b,
            padding: 0,
            velocity: Vec3::ZERO,
            material: self.material as u32,
        };
        if self.state == State::Free {
            record.distance = FREE_DISTANCE;
        }
        record
    }
}

/// Upper triangle of `Mᵀ M` where `M = diag(scale) · R`.
fn covariance(scale: Vec3, rotation: Quaternion) -> ([f32; 3], [f32; 3]) {
    let r = rotation.to_mat3();
    let m = [
        scale.x * r[0],
        scale.x * r[1],
        scale.x * r[2],
        scale.y * r[3],
        scale.y * r[4],
        scale.y * r[5],
        scale.z * r[6],
        scale.z * r[7],
        scale.z * r[8],
    ];

    let a = [
        m[0] * m[0] + m[3] * m[3] + m[6] * m[6],
        m[0] * m[1] + m[3] * m[4] + m[6] * m[7],
        m[0] * m[2] + m[3] * m[5] + m[6] * m[8],
    ];
    let b = [
        m[1] * m[1] + m[4] * m[4] + m[7] * m[7],
        m[1] * m[2] + m[4] * m[5] + m[7] * m[8],
        m[2] * m[2] + m[5] * m[5] + m[8] * m[8],
    ];
    (a, b)
}
