//! Scroll-driven frame sequence player for the hero section.
//!
//! The core modules are plain Rust and run on any target; the browser
//! bindings in `wasm` are only compiled for wasm32.

pub mod compositor;
pub mod config;
pub mod error;
pub mod frames;
pub mod geometry;
pub mod tracker;

pub use compositor::{Compositor, FrameImage, PaintOutcome, RepaintFlag, Surface};
pub use config::SequenceConfig;
pub use error::{SequenceError, SequenceResult};
pub use frames::{FrameEvent, FrameNotifier, FrameSet, FrameSetUpdate, LoadState};
pub use geometry::{compute_progress, cover_fit, frame_index, DrawRect, TrackGeometry};
pub use tracker::{ScrollTracker, TrackSource};

// Only compile wasm-specific code when targeting wasm32.
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::HeroPlayer;
