//! Per-frame input and output of the coordinator.

use std::ops::Range;

use splat_core::{Record, RecordId, RenderFrame, StoreError, Vec3};
use splat_sim::PlayMode;

/// Player intent for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInput {
    /// Velocity the player asks for.
    pub desired_velocity: Vec3,
    /// Unit view direction.
    pub look: Vec3,
    /// Wall time since the previous frame, in seconds.
    pub delta_time: f32,
    /// Movement mode.
    pub play_mode: PlayMode,
    /// Collect everything selected this frame.
    pub collect: bool,
    /// Build a block in front of the target this frame.
    pub build: bool,
    /// Selection radius around the target.
    pub selection_radius: f32,
}

impl Default for FrameInput {
    fn default() -> Self {
        Self {
            desired_velocity: Vec3::ZERO,
            look: Vec3::new(0.0, 0.0, -1.0),
            delta_time: 1.0 / 60.0,
            play_mode: PlayMode::Normal,
            collect: false,
            build: false,
            selection_radius: 0.0,
        }
    }
}

/// Everything the renderer needs after a frame.
#[derive(Debug)]
pub struct FrameOutput<'a> {
    /// Frame number, starting at 1.
    pub frame: u64,
    /// Eye position.
    pub eye: Vec3,
    /// Full distance-sorted snapshot.
    pub records: &'a [Record],
    /// Slice of `records` to upload this frame.
    pub upload: Range<usize>,
    /// Slice of `records` refreshed by the latest merge.
    pub near: Range<usize>,
    /// Selected copies.
    pub selected: &'a [Record],
    /// Index of the targeted record.
    pub target: Option<usize>,
    /// ID of the targeted record.
    pub target_id: Option<RecordId>,
    /// Why this frame's build was refused.
    pub rejected: Option<StoreError>,
    /// Collisions the player had this frame.
    pub collisions: u32,
}

impl FrameOutput<'_> {
    /// Number of selected records.
    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Copies the output into an owned frame for a render thread.
    #[must_use]
    pub fn to_render_frame(&self) -> RenderFrame {
        RenderFrame {
            frame: self.frame,
            eye: self.eye,
            records: self.records.to_vec(),
            upload: self.upload.clone(),
            selected: self.selected.to_vec(),
        }
    }
}
