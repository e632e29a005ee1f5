//! # Synchronization
//!
//! Hand-off of finished frames from the main loop to a renderer.

mod exchange;

pub use exchange::{RenderExchange, RenderFrame};
