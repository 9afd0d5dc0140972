//! Audio clip catalog and exclusive playback
//!
//! Clips are decoded WAV files addressed by symbolic name. The player
//! guarantees at most one clip is audible at any instant.

mod catalog;
mod player;
mod sink;

pub use catalog::{AudioClip, ClipCatalog};
pub use player::{AudioPlayer, PlaybackHandle};
pub use sink::{ClipSink, CpalSink, NullSink};
