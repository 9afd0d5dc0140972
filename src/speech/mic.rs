//! Microphone capture and the one-shot mic recognizer

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, Stream, StreamConfig};
use tokio::sync::mpsc;

use crate::controller::FaceEvent;
use crate::speech::{Endpoint, Recognizer, UtteranceDetector, WhisperStt};
use crate::{Error, Result};

/// Capture sample rate; Whisper expects 16 kHz mono
pub const SAMPLE_RATE: u32 = 16_000;

/// A session with no completed utterance after this long is abandoned,
/// whether or not speech is still arriving
pub const SESSION_TIMEOUT: Duration = Duration::from_secs(15);

/// Captures mono audio from the default input device
///
/// Samples accumulate in a shared buffer drained with
/// [`take`](Microphone::take). The cpal stream is not `Send`, so the
/// microphone must live on the thread that created it.
pub struct Microphone {
    buffer: Arc<Mutex<Vec<f32>>>,
    stream: Option<Stream>,
}

impl Default for Microphone {
    fn default() -> Self {
        Self::new()
    }
}

impl Microphone {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: Arc::new(Mutex::new(Vec::new())),
            stream: None,
        }
    }

    /// Open the default input device and start capturing
    ///
    /// # Errors
    ///
    /// Returns [`Error::CapabilityUnavailable`] when no input device is
    /// present, or an audio error if the stream cannot be built.
    pub fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let host = cpal::default_host();
        let device = host.default_input_device().ok_or_else(|| {
            Error::CapabilityUnavailable("no input device available".to_string())
        })?;

        let rate = SampleRate(SAMPLE_RATE);
        let supported = device
            .supported_input_configs()
            .map_err(|e| Error::Audio(e.to_string()))?
            .find(|c| c.min_sample_rate() <= rate && c.max_sample_rate() >= rate)
            .ok_or_else(|| {
                Error::CapabilityUnavailable(format!(
                    "input device does not support {SAMPLE_RATE} Hz capture"
                ))
            })?;
        let config: StreamConfig = supported.with_sample_rate(rate).config();
        let channels = usize::from(config.channels);

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = SAMPLE_RATE,
            channels,
            "capture stream starting"
        );

        let buffer = Arc::clone(&self.buffer);
        let stream = device
            .build_input_stream(
                &config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    if let Ok(mut buf) = buffer.lock() {
                        if channels == 1 {
                            buf.extend_from_slice(data);
                        } else {
                            #[allow(clippy::cast_precision_loss)]
                            buf.extend(
                                data.chunks_exact(channels)
                                    .map(|frame| frame.iter().sum::<f32>() / channels as f32),
                            );
                        }
                    }
                },
                |err| {
                    tracing::error!(error = %err, "audio capture error");
                },
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?;

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;
        self.stream = Some(stream);
        Ok(())
    }

    /// Stop capturing and discard buffered samples; no-op when idle
    pub fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            drop(stream);
            tracing::debug!("capture stream stopped");
        }
        if let Ok(mut buf) = self.buffer.lock() {
            buf.clear();
        }
    }

    /// Drain and return all samples captured since the last call
    #[must_use]
    pub fn take(&self) -> Vec<f32> {
        self.buffer
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default()
    }

    /// Copy of the buffered samples without draining them
    #[must_use]
    pub fn peek(&self) -> Vec<f32> {
        self.buffer.lock().map(|buf| buf.clone()).unwrap_or_default()
    }

    /// Whether the capture stream is open
    #[must_use]
    pub const fn is_capturing(&self) -> bool {
        self.stream.is_some()
    }
}

/// One-shot recognizer over the microphone and Whisper
///
/// Each session reports `ListeningStarted`, then exactly one of
/// `Recognized` (transcript uppercased) or `RecognitionFailed`, then
/// always `ListeningEnded`.
pub struct MicRecognizer {
    mic: Microphone,
    stt: WhisperStt,
    detector: UtteranceDetector,
    events: mpsc::UnboundedSender<FaceEvent>,
    deadline: Option<Instant>,
}

impl MicRecognizer {
    #[must_use]
    pub fn new(stt: WhisperStt, events: mpsc::UnboundedSender<FaceEvent>) -> Self {
        Self {
            mic: Microphone::new(),
            stt,
            detector: UtteranceDetector::new(),
            events,
            deadline: None,
        }
    }

    fn send(&self, event: FaceEvent) {
        let _ = self.events.send(event);
    }

    fn fail(&mut self, reason: &str) {
        self.send(FaceEvent::RecognitionFailed(reason.to_string()));
        self.finish();
    }

    fn finish(&mut self) {
        self.mic.stop();
        self.detector.reset();
        self.deadline = None;
        self.send(FaceEvent::ListeningEnded);
    }
}

#[async_trait(?Send)]
impl Recognizer for MicRecognizer {
    fn start(&mut self) -> Result<()> {
        if self.mic.is_capturing() {
            return Err(Error::AlreadyListening);
        }

        self.detector.reset();
        self.mic.start()?;
        self.deadline = Some(Instant::now() + SESSION_TIMEOUT);
        self.send(FaceEvent::ListeningStarted);
        Ok(())
    }

    fn is_listening(&self) -> bool {
        self.mic.is_capturing()
    }

    async fn poll(&mut self) {
        if !self.mic.is_capturing() {
            return;
        }

        let chunk = self.mic.take();
        match self.detector.feed(&chunk) {
            Endpoint::Pending => {
                if self.deadline.is_some_and(|d| Instant::now() >= d) {
                    tracing::debug!("listening session timed out");
                    self.fail("no speech detected");
                }
            }
            Endpoint::NoSpeech => {
                tracing::debug!("utterance too short to transcribe");
                self.fail("no speech detected");
            }
            Endpoint::Complete => {
                let utterance = self.detector.take_utterance();
                self.mic.stop();
                tracing::debug!(samples = utterance.len(), "utterance captured");
                match self.stt.transcribe(&utterance, SAMPLE_RATE).await {
                    Ok(text) if !text.is_empty() => {
                        self.send(FaceEvent::Recognized(text.to_uppercase()));
                    }
                    Ok(_) => {
                        self.send(FaceEvent::RecognitionFailed(
                            "empty transcription".to_string(),
                        ));
                    }
                    Err(e) => {
                        self.send(FaceEvent::RecognitionFailed(e.to_string()));
                    }
                }
                self.finish();
            }
        }
    }
}
