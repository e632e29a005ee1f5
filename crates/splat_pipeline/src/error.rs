//! # Pipeline Error Types
//!
//! All errors that can occur while setting up or running the pipeline.

use splat_core::StoreError;
use thiserror::Error;

use crate::phase::PhaseError;

/// Errors that can occur in the pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Config file could not be read.
    #[error("could not read configuration: {0}")]
    Io(#[from] std::io::Error),

    /// The ingested world has no Player record.
    #[error("ingested records contain no player")]
    MissingPlayer,

    /// The ingested world has more than one Player record.
    #[error("ingested records contain {count} players, expected exactly one")]
    MultiplePlayers {
        /// Number of Player records found.
        count: usize,
    },

    /// The ingested world has no records at all.
    #[error("ingested record array is empty")]
    EmptyIngest,

    /// The record store refused an operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A worker thread could not be started.
    #[error("failed to spawn {name} worker: {source}")]
    Spawn {
        /// Worker name.
        name: &'static str,
        /// Underlying error.
        source: std::io::Error,
    },

    /// A worker went away; its completion can never arrive.
    #[error("{0} worker disconnected")]
    WorkerDisconnected(&'static str),

    /// A message arrived that the current phase does not allow.
    #[error(transparent)]
    Protocol(#[from] PhaseError),
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
