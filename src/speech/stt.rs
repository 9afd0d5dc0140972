//! Whisper speech-to-text over HTTP

use std::io::Cursor;

use secrecy::{ExposeSecret, SecretString};

use crate::{Error, Result};

const TRANSCRIPTION_URL: &str = "https://api.openai.com/v1/audio/transcriptions";

/// Transcribes captured utterances with the OpenAI Whisper API
pub struct WhisperStt {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    language: String,
}

impl WhisperStt {
    /// Create a transcriber for `locale` (a BCP-47 tag such as `es-MX`)
    ///
    /// Whisper takes ISO 639-1 language codes, so the locale's region
    /// subtag is dropped.
    #[must_use]
    pub fn new(api_key: SecretString, model: impl Into<String>, locale: &str) -> Self {
        let language = locale
            .split('-')
            .next()
            .unwrap_or(locale)
            .to_ascii_lowercase();
        Self {
            client: reqwest::Client::new(),
            api_key,
            model: model.into(),
            language,
        }
    }

    /// ISO 639-1 language code sent with each request
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Transcribe mono `samples` captured at `sample_rate`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Recognition`] if the request fails or the service
    /// rejects the audio.
    pub async fn transcribe(&self, samples: &[f32], sample_rate: u32) -> Result<String> {
        let wav = samples_to_wav(samples, sample_rate)?;
        tracing::debug!(
            bytes = wav.len(),
            language = %self.language,
            model = %self.model,
            "transcription request"
        );

        let part = reqwest::multipart::Part::bytes(wav)
            .file_name("utterance.wav")
            .mime_str("audio/wav")
            .map_err(|e| Error::Recognition(e.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("model", self.model.clone())
            .text("language", self.language.clone())
            .text("response_format", "text");

        let response = self
            .client
            .post(TRANSCRIPTION_URL)
            .bearer_auth(self.api_key.expose_secret())
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Recognition(format!(
                "transcription failed ({status}): {body}"
            )));
        }

        Ok(response.text().await?.trim().to_string())
    }
}

/// Encode mono f32 samples as a 16-bit PCM WAV file in memory
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)
            .map_err(|e| Error::Audio(e.to_string()))?;
        for &sample in samples {
            #[allow(clippy::cast_possible_truncation)]
            let value = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16;
            writer
                .write_sample(value)
                .map_err(|e| Error::Audio(e.to_string()))?;
        }
        writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
    }
    Ok(cursor.into_inner())
}
