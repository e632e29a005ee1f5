//! Latest-frame hand-off between the main loop and a render thread.
//!
//! The main loop publishes one [`RenderFrame`] per frame without blocking.
//! The renderer takes the newest published frame; frames it never saw are
//! dropped rather than queued.

use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::math::Vec3;
use crate::record::Record;

/// Everything a renderer needs for one frame.
#[derive(Clone, Debug, Default)]
pub struct RenderFrame {
    /// Frame number this snapshot was taken.
    pub frame: u64,
    /// Eye position.
    pub eye: Vec3,
    /// Distance-sorted records.
    pub records: Vec<Record>,
    /// Slice of `records` to upload this frame.
    pub upload: Range<usize>,
    /// Selected copies drawn on top.
    pub selected: Vec<Record>,
}

/// Single-slot mailbox holding the newest published frame.
#[derive(Default)]
pub struct RenderExchange {
    slot: Mutex<Option<RenderFrame>>,
    generation: AtomicU64,
}

impl RenderExchange {
    /// Creates an empty exchange.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an exchange shared between threads.
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Publishes a frame, replacing any the renderer has not taken yet.
    ///
    /// Returns the replaced frame so its buffers can be reused.
    pub fn publish(&self, frame: RenderFrame) -> Option<RenderFrame> {
        let replaced = self.slot.lock().replace(frame);
        self.generation.fetch_add(1, Ordering::Release);
        replaced
    }

    /// Takes the newest frame, if one was published since the last take.
    pub fn take(&self) -> Option<RenderFrame> {
        self.slot.lock().take()
    }

    /// Number of frames published so far.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_returns_newest() {
        let exchange = RenderExchange::new();
        assert!(exchange.take().is_none());

        exchange.publish(RenderFrame { frame: 1, ..RenderFrame::default() });
        let replaced = exchange.publish(RenderFrame { frame: 2, ..RenderFrame::default() });
        assert_eq!(replaced.map(|f| f.frame), Some(1));

        assert_eq!(exchange.take().map(|f| f.frame), Some(2));
        assert!(exchange.take().is_none());
        assert_eq!(exchange.generation(), 2);
    }

    #[test]
    fn test_cross_thread_handoff() {
        let exchange = RenderExchange::shared();
        let writer = Arc::clone(&exchange);
        let handle = std::thread::spawn(move || {
            for frame in 0..100 {
                writer.publish(RenderFrame { frame, ..RenderFrame::default() });
            }
        });
        handle.join().unwrap();
        assert_eq!(exchange.take().map(|f| f.frame), Some(99));
    }
}
