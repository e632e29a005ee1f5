//! # Store Error Types
//!
//! All errors that can occur while touching the record store.

use thiserror::Error;

use crate::record::RecordId;

/// Errors that can occur in the record store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No Free record is left past the free boundary.
    #[error("record pool exhausted: all {capacity} slots are in use")]
    PoolExhausted {
        /// Total capacity of the store.
        capacity: usize,
    },

    /// The slot at the free boundary is not Free.
    #[error("slot {index} is not free")]
    SlotOccupied {
        /// Index of the slot.
        index: usize,
    },

    /// Two records share an ID.
    #[error("duplicate record id {0}")]
    DuplicateId(RecordId),

    /// A replacement array does not match the fixed capacity.
    #[error("capacity mismatch: store holds {expected} records, got {actual}")]
    CapacityMismatch {
        /// Fixed capacity of the store.
        expected: usize,
        /// Length of the offered array.
        actual: usize,
    },

    /// Index past the end of the store.
    #[error("index {index} out of range for {len} records")]
    IndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of records.
        len: usize,
    },

    /// Every record ID has been handed out.
    #[error("record ids exhausted")]
    IdsExhausted,
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
