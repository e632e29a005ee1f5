//! # Splat Core
//!
//! Record layout and storage for the splat simulation pipeline.
//!
//! A world is a fixed-capacity array of 24-scalar records: terrain, trees,
//! stars, items and the player. This crate owns:
//! - The record layout, GPU-ready as raw bytes
//! - The object pool: Free slots claimed by builds, released by collects
//! - ID-keyed merging of updates produced by other contexts
//!
//! ## Example
//!
//! ```rust,ignore
//! use splat_core::{RecordStore, RecordBlueprint, Material, Vec3};
//!
//! let mut store = RecordStore::ingest(records, next_id)?;
//! let built = store.activate(&RecordBlueprint::new(pos, Vec3::splat(0.5), Material::Immovable))?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod constants;
pub mod error;
pub mod math;
pub mod record;
pub mod store;
pub mod sync;

pub use error::{StoreError, StoreResult};
pub use math::{Quaternion, Vec3};
pub use record::{Material, Record, RecordBlueprint, RecordId, State};
pub use store::{
    free_boundary, merge_updates, Activation, IdAllocator, MergeStats, RecordStore, RecordUpdate,
    UpdateKind,
};
pub use sync::{RenderExchange, RenderFrame};
