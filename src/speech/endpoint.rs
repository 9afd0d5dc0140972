//! Energy-based utterance endpointing

/// RMS energy above which a chunk counts as speech
const ENERGY_THRESHOLD: f32 = 0.03;

/// Minimum speech length for a usable utterance (0.3 s at 16 kHz)
const MIN_SPEECH_SAMPLES: usize = 4800;

/// Trailing silence that ends an utterance (0.5 s at 16 kHz)
const SILENCE_SAMPLES: usize = 8000;

/// Outcome of feeding one chunk of captured audio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Still collecting; keep feeding
    Pending,
    /// Utterance captured; take it and transcribe
    Complete,
    /// Speech ended but was too short to transcribe
    NoSpeech,
}

/// Detects the end of a single spoken utterance in a mono sample stream
///
/// Buffers samples from the first energetic chunk onward and reports
/// [`Endpoint::Complete`] once enough trailing silence follows enough
/// speech.
#[derive(Debug, Default)]
pub struct UtteranceDetector {
    utterance: Vec<f32>,
    speech_samples: usize,
    silence_run: usize,
    in_speech: bool,
}

impl UtteranceDetector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of captured samples
    pub fn feed(&mut self, chunk: &[f32]) -> Endpoint {
        if chunk.is_empty() {
            return Endpoint::Pending;
        }

        let energetic = rms(chunk) >= ENERGY_THRESHOLD;
        if !self.in_speech {
            if !energetic {
                return Endpoint::Pending;
            }
            self.in_speech = true;
        }

        self.utterance.extend_from_slice(chunk);
        if energetic {
            self.speech_samples += chunk.len();
            self.silence_run = 0;
            return Endpoint::Pending;
        }

        self.silence_run += chunk.len();
        if self.silence_run < SILENCE_SAMPLES {
            return Endpoint::Pending;
        }
        if self.speech_samples >= MIN_SPEECH_SAMPLES {
            Endpoint::Complete
        } else {
            Endpoint::NoSpeech
        }
    }

    /// Take the buffered utterance, leaving the detector reset
    pub fn take_utterance(&mut self) -> Vec<f32> {
        let utterance = std::mem::take(&mut self.utterance);
        self.reset();
        utterance
    }

    /// Discard all buffered state
    pub fn reset(&mut self) {
        self.utterance.clear();
        self.speech_samples = 0;
        self.silence_run = 0;
        self.in_speech = false;
    }
}

#[allow(clippy::cast_precision_loss)]
fn rms(chunk: &[f32]) -> f32 {
    let sum: f32 = chunk.iter().map(|s| s * s).sum();
    (sum / chunk.len() as f32).sqrt()
}
