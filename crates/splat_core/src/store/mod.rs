//! # Record Store & Object Pool
//!
//! Fixed-capacity storage for splat records.
//!
//! ## Design
//!
//! - Capacity is decided at ingest; the array never grows or shrinks
//! - New objects claim pre-allocated Free slots
//! - Records are reconciled across contexts by ID, never by index

mod ids;
pub mod merge;
mod pool;

pub use ids::IdAllocator;
pub use merge::{free_boundary, merge_updates, MergeStats, RecordUpdate, UpdateKind};
pub use pool::{Activation, RecordStore};
