//! Monotonic record ID allocation.

use crate::error::{StoreError, StoreResult};
use crate::record::{Record, RecordBlueprint, RecordId};

/// Hands out process-unique record IDs.
///
/// The counter only moves forward, so an ID is never handed out twice even
/// after the record it named has been collected. Once `u32::MAX` is taken
/// the allocator is exhausted for good.
#[derive(Clone, Debug, Default)]
pub struct IdAllocator {
    next: u32,
    exhausted: bool,
}

impl IdAllocator {
    /// Creates an allocator whose first ID is `next`.
    #[must_use]
    pub const fn starting_at(next: u32) -> Self {
        Self {
            next,
            exhausted: false,
        }
    }

    /// The ID the next successful [`Self::allocate`] returns.
    #[inline]
    #[must_use]
    pub const fn peek(&self) -> RecordId {
        RecordId(self.next)
    }

    /// Whether every ID has been handed out.
    #[inline]
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Reserves the next ID.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IdsExhausted`] once `u32::MAX` has been taken.
    pub fn allocate(&mut self) -> StoreResult<RecordId> {
        if self.exhausted {
            return Err(StoreError::IdsExhausted);
        }
        let id = RecordId(self.next);
        self.advance_past(id);
        Ok(id)
    }

    /// Moves the counter past `id` if it is not already.
    pub fn observe(&mut self, id: RecordId) {
        if !self.exhausted && id.0 >= self.next {
            self.advance_past(id);
        }
    }

    /// Creates a fully populated record under a fresh ID.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IdsExhausted`] when no ID is left.
    pub fn create(&mut self, blueprint: &RecordBlueprint) -> StoreResult<Record> {
        Ok(blueprint.build(self.allocate()?))
    }

    fn advance_past(&mut self, id: RecordId) {
        match id.0.checked_add(1) {
            Some(next) => self.next = next,
            None => self.exhausted = true,
        }
    }
}
