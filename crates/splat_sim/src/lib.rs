//! # Splat Sim
//!
//! Pure functions over record slices:
//! - [`physics`]: pairwise collision response and integration
//! - [`player`]: per-frame player steering on the main context
//! - [`targeting`]: view-ray target and radius selection
//! - [`sort`]: front-to-back ordering for the renderer
//!
//! Nothing here spawns threads or owns channels. The pipeline crate decides
//! which context runs what.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod params;
pub mod physics;
pub mod player;
pub mod sort;
pub mod targeting;

pub use params::SimulationParams;
pub use physics::{collide_in_place, collide_subset, integrate};
pub use player::{PlayMode, PlayerController, PlayerParams};
pub use sort::{max_distance_index, update_distances, DistanceSorter, SortConfig, SortStrategy};
pub use targeting::{find_target, generate_selection, SelectionBuffer};
