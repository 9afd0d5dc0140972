//! Speech synthesis over HTTP

use std::sync::Arc;
use std::sync::atomic::AtomicUsize;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::audio::{AudioClip, ClipSink};
use crate::{Error, Result};

const SPEECH_URL: &str = "https://api.openai.com/v1/audio/speech";

/// Speaks caption text aloud
#[async_trait(?Send)]
pub trait Synthesizer {
    /// Synthesize `text` and start playing it, cancelling any active speech
    ///
    /// Resolves once playback has started; the audio finishes in the
    /// background unless [`cancel`](Synthesizer::cancel) silences it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Synthesis`] if the request or decode fails
    async fn speak(&mut self, text: &str) -> Result<()>;

    /// Silence any active speech; no-op when idle
    fn cancel(&mut self);
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    speed: f32,
}

/// Synthesizes speech with the OpenAI TTS API
pub struct HttpSynthesizer {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    voice: String,
    speed: f32,
    sink: Box<dyn ClipSink>,
}

impl HttpSynthesizer {
    #[must_use]
    pub fn new(
        api_key: SecretString,
        model: impl Into<String>,
        voice: impl Into<String>,
        speed: f32,
        sink: Box<dyn ClipSink>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: model.into(),
            voice: voice.into(),
            speed,
            sink,
        }
    }
}

#[async_trait(?Send)]
impl Synthesizer for HttpSynthesizer {
    async fn speak(&mut self, text: &str) -> Result<()> {
        self.cancel();

        tracing::debug!(
            model = %self.model,
            voice = %self.voice,
            chars = text.len(),
            "synthesis request"
        );

        let response = self
            .client
            .post(SPEECH_URL)
            .bearer_auth(self.api_key.expose_secret())
            .json(&SpeechRequest {
                model: &self.model,
                input: text,
                voice: &self.voice,
                speed: self.speed,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Synthesis(format!(
                "synthesis failed ({status}): {body}"
            )));
        }

        let audio = response.bytes().await?;
        let clip = decode_mp3(&audio)?;
        tracing::debug!(samples = clip.len(), "synthesized speech decoded");

        self.sink.start(&clip, Arc::new(AtomicUsize::new(0)))?;
        Ok(())
    }

    fn cancel(&mut self) {
        self.sink.stop();
    }
}

/// Decode an MP3 payload into a mono clip, averaging stereo channels
fn decode_mp3(data: &[u8]) -> Result<AudioClip> {
    let mut decoder = minimp3::Decoder::new(data);
    let mut samples = Vec::new();
    let mut sample_rate = 0_u32;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                if sample_rate == 0 {
                    #[allow(clippy::cast_sign_loss)]
                    {
                        sample_rate = frame.sample_rate as u32;
                    }
                }
                let channels = frame.channels.max(1);
                #[allow(clippy::cast_precision_loss)]
                let scale = channels as f32 * f32::from(i16::MAX);
                samples.extend(frame.data.chunks_exact(channels).map(|chunk| {
                    let sum: f32 = chunk.iter().map(|&s| f32::from(s)).sum();
                    sum / scale
                }));
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => return Err(Error::Synthesis(format!("mp3 decode failed: {e}"))),
        }
    }

    if sample_rate == 0 || samples.is_empty() {
        return Err(Error::Synthesis("empty audio payload".to_string()));
    }
    Ok(AudioClip::from_samples(samples, sample_rate))
}
