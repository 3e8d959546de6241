//! Frame-synchronized event firing for sampled animation playback.
//!
//! A host animation player is sampled once per tick through [`ClipQuery`]; the
//! [`PlaybackTracker`] turns the reported normalized time into discrete frame indices and fires
//! every authored [`Keyframe`] exactly once per playthrough, no matter how erratically the clock
//! is sampled. Side effects are delegated to an [`EventHandler`] supplied by the host.

#![forbid(unsafe_code)]

mod error;
mod ids;
mod model;
mod runtime;
mod version;

#[cfg(feature = "json")]
pub mod json;

pub use error::*;
pub use model::*;
pub use runtime::*;
pub use version::*;
