//! Pre-recorded clip catalog

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{Error, Result};

/// A decoded audio clip: mono f32 samples at a fixed rate
#[derive(Debug, Clone)]
pub struct AudioClip {
    samples: Arc<Vec<f32>>,
    sample_rate: u32,
}

impl AudioClip {
    /// Wrap already-decoded mono samples
    #[must_use]
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples: Arc::new(samples),
            sample_rate,
        }
    }

    /// Decode a WAV file, downmixing to mono
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be opened or decoded
    pub fn from_wav(path: &Path) -> Result<Self> {
        let mut reader = hound::WavReader::open(path)
            .map_err(|e| Error::Audio(format!("{}: {e}", path.display())))?;
        let spec = reader.spec();
        let channels = usize::from(spec.channels);

        #[allow(clippy::cast_precision_loss)]
        let raw: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<std::result::Result<_, _>>()
                .map_err(|e| Error::Audio(format!("{}: {e}", path.display())))?,
            hound::SampleFormat::Int => {
                let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<std::result::Result<_, _>>()
                    .map_err(|e| Error::Audio(format!("{}: {e}", path.display())))?
            }
        };

        #[allow(clippy::cast_precision_loss)]
        let samples = if channels <= 1 {
            raw
        } else {
            raw.chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32)
                .collect()
        };

        Ok(Self::from_samples(samples, spec.sample_rate))
    }

    /// The decoded samples
    #[must_use]
    pub fn samples(&self) -> &Arc<Vec<f32>> {
        &self.samples
    }

    /// Sample rate in Hz
    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the clip holds no samples
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Immutable mapping from symbolic clip name to a playable clip
///
/// Constructed once at startup and shared read-only thereafter.
#[derive(Debug, Default, Clone)]
pub struct ClipCatalog {
    clips: HashMap<String, AudioClip>,
}

impl ClipCatalog {
    /// Load every named WAV file into the catalog
    ///
    /// # Errors
    ///
    /// Returns error if any entry fails to decode
    pub fn load(entries: &[(String, PathBuf)]) -> Result<Self> {
        let mut clips = HashMap::with_capacity(entries.len());
        for (name, path) in entries {
            let clip = AudioClip::from_wav(path)?;
            tracing::debug!(
                clip = %name,
                path = %path.display(),
                samples = clip.len(),
                sample_rate = clip.sample_rate(),
                "clip loaded"
            );
            clips.insert(name.clone(), clip);
        }
        tracing::info!(count = clips.len(), "clip catalog loaded");
        Ok(Self { clips })
    }

    /// Build a catalog from already-decoded clips
    #[must_use]
    pub fn from_clips(clips: HashMap<String, AudioClip>) -> Self {
        Self { clips }
    }

    /// Look up a clip by symbolic name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AudioClip> {
        self.clips.get(name)
    }

    /// Whether `name` is present
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }

    /// Iterate over the catalog's clip names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.clips.keys().map(String::as_str)
    }

    /// Number of clips
    #[must_use]
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    /// Whether the catalog is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_name() {
        let mut clips = HashMap::new();
        clips.insert("amy_1".to_string(), AudioClip::from_samples(vec![0.0; 8], 16_000));
        let catalog = ClipCatalog::from_clips(clips);

        assert!(catalog.contains("amy_1"));
        assert!(catalog.get("amy_1").is_some());
        assert!(catalog.get("amy_9").is_none());
        assert_eq!(catalog.len(), 1);
    }

    #[test]
    fn missing_wav_fails() {
        let entries = vec![("x".to_string(), PathBuf::from("/nonexistent/x.wav"))];
        assert!(matches!(ClipCatalog::load(&entries), Err(Error::Audio(_))));
    }
}
