//! Exclusive clip playback

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::audio::{ClipCatalog, ClipSink};
use crate::{Error, Result};

/// Identifies the clip currently occupying the sink
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackHandle {
    clip: String,
}

impl PlaybackHandle {
    /// Name of the playing clip
    #[must_use]
    pub fn clip(&self) -> &str {
        &self.clip
    }
}

/// Plays catalog clips one at a time
///
/// Starting a clip silences whichever clip was playing and rewinds its
/// position to zero, so a later replay of the superseded clip starts from
/// the beginning.
pub struct AudioPlayer {
    catalog: Arc<ClipCatalog>,
    sink: Box<dyn ClipSink>,
    positions: HashMap<String, Arc<AtomicUsize>>,
    active: Option<PlaybackHandle>,
}

impl AudioPlayer {
    /// Create a player over `catalog` routing output to `sink`
    #[must_use]
    pub fn new(catalog: Arc<ClipCatalog>, sink: Box<dyn ClipSink>) -> Self {
        Self {
            catalog,
            sink,
            positions: HashMap::new(),
            active: None,
        }
    }

    /// Play `name` from the start, stopping any active clip first
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownClip`] if `name` is not in the catalog, or
    /// an audio error if the sink cannot start.
    pub fn play(&mut self, name: &str) -> Result<()> {
        self.stop();

        let clip = self
            .catalog
            .get(name)
            .ok_or_else(|| Error::UnknownClip(name.to_string()))?
            .clone();

        let progress = Arc::clone(self.positions.entry(name.to_string()).or_default());
        progress.store(0, Ordering::Relaxed);

        tracing::debug!(clip = name, samples = clip.len(), "clip playback starting");
        self.sink.start(&clip, progress)?;
        self.active = Some(PlaybackHandle {
            clip: name.to_string(),
        });
        Ok(())
    }

    /// Silence the active clip and rewind its position; no-op when idle
    pub fn stop(&mut self) {
        if let Some(handle) = self.active.take() {
            self.sink.stop();
            if let Some(progress) = self.positions.get(handle.clip()) {
                progress.store(0, Ordering::Relaxed);
            }
            tracing::debug!(clip = handle.clip(), "clip playback stopped");
        }
    }

    /// Name of the clip currently playing, if any
    #[must_use]
    pub fn active_clip(&self) -> Option<&str> {
        self.active.as_ref().map(PlaybackHandle::clip)
    }

    /// Current playback position of `name` in samples
    #[must_use]
    pub fn position(&self, name: &str) -> usize {
        self.positions
            .get(name)
            .map_or(0, |p| p.load(Ordering::Relaxed))
    }

    /// Whether a clip is currently playing
    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.active.is_some()
    }
}
