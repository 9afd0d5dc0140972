//! Speech capabilities: recognition and synthesis
//!
//! Both sides are optional. Recognition captures one utterance from the
//! microphone, endpoints it locally, and transcribes it over HTTP;
//! synthesis fetches spoken audio for caption text and plays it through a
//! [`ClipSink`](crate::audio::ClipSink). Controllers hold each side as an
//! `Option` and degrade gracefully when the capability is absent.

mod endpoint;
mod mic;
mod recognizer;
mod stt;
mod synth;

pub use endpoint::{Endpoint, UtteranceDetector};
pub use mic::{MicRecognizer, Microphone, SAMPLE_RATE, SESSION_TIMEOUT};
pub use recognizer::Recognizer;
pub use stt::{WhisperStt, samples_to_wav};
pub use synth::{HttpSynthesizer, Synthesizer};
