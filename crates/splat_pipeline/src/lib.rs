//! # Splat Pipeline
//!
//! Runs the sort, simulate and merge cycle across three contexts:
//! - **Main**: calls [`Coordinator::frame`] once per frame and never blocks
//! - **Sort**: keeps a full copy of the world ordered for the eye
//! - **Sim**: runs collision and integration over the near subset
//!
//! ## Architecture Rules
//!
//! 1. **Owned buffers only** - Contexts share nothing; payloads are moved
//! 2. **One of each in flight** - The [`Choreography`] allows a single sort,
//!    simulate and merge at a time
//! 3. **Edits are never lost** - They ride the next merge batch by ID
//!
//! ## Example
//!
//! ```rust,ignore
//! use splat_pipeline::{population, Coordinator, FrameInput, PipelineConfig};
//!
//! let world = population::generate(&Default::default())?;
//! let mut coordinator = Coordinator::start(world, PipelineConfig::default())?;
//! let output = coordinator.frame(&FrameInput::default())?;
//! renderer.upload(&output.records[output.upload.clone()]);
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod coordinator;
pub mod edits;
pub mod error;
pub mod frame;
pub mod phase;
pub mod population;
pub mod protocol;
pub mod stats;
pub mod workers;

pub use config::PipelineConfig;
pub use coordinator::{Coordinator, Ingest};
pub use edits::EditQueue;
pub use error::{PipelineError, PipelineResult};
pub use frame::{FrameInput, FrameOutput};
pub use phase::{Choreography, Directive, Phase, PhaseError, Signal, TickDirectives};
pub use population::WorldShape;
pub use protocol::{MergedSnapshot, SimRequest, SimResponse, SortRequest, SortResponse};
pub use stats::PipelineStats;
pub use workers::{RequestHandler, SimContext, SortContext, WorkerLink};
