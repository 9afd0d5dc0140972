//! Widget configuration
//!
//! Layered as environment variables over an optional TOML file over
//! built-in defaults. The default file lives at the platform config dir
//! (`~/.config/nova/nova.toml` on Linux) and is optional; an explicitly
//! passed path must exist.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use secrecy::SecretString;
use serde::Deserialize;

use crate::{Error, Result};

const DEFAULT_FRAME_INTERVAL_MS: u64 = 150;
const DEFAULT_LOCALE: &str = "es-MX";
const DEFAULT_FALLBACK: &str = "No entendí ese comando. Por favor intenta con 'Salúdanos', 'Platícanos' o 'Continúa'.";

/// Resolved widget configuration
#[derive(Debug)]
pub struct Config {
    /// Face frames, cycled in order
    pub frames: Vec<PathBuf>,
    /// Milliseconds between frame advances
    pub frame_interval_ms: u64,
    /// Named clips to load into the catalog
    pub clips: Vec<(String, PathBuf)>,
    /// Recognition locale as a BCP-47 tag
    pub locale: String,
    /// Spoken when no command matches a transcript
    pub fallback_text: String,
    /// Transcription model name
    pub stt_model: String,
    /// Synthesis model name
    pub tts_model: String,
    /// Synthesis voice name
    pub tts_voice: String,
    /// Synthesis speed multiplier
    pub tts_speed: f32,
    /// API key for the speech services, absent when speech is disabled
    pub api_key: Option<SecretString>,
    /// Whether speech capabilities should be wired up at all
    pub voice_enabled: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    #[serde(default)]
    face: FaceSection,
    #[serde(default)]
    audio: AudioSection,
    #[serde(default)]
    speech: SpeechSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FaceSection {
    frames: Option<Vec<PathBuf>>,
    frame_interval_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct AudioSection {
    clips: Option<BTreeMap<String, PathBuf>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SpeechSection {
    locale: Option<String>,
    fallback_text: Option<String>,
    stt_model: Option<String>,
    tts_model: Option<String>,
    tts_voice: Option<String>,
    tts_speed: Option<f32>,
}

impl Config {
    /// Load configuration from `path`, the default location, and the
    /// environment
    ///
    /// # Errors
    ///
    /// Returns error if an explicitly passed `path` does not exist or
    /// either file fails to parse.
    pub fn load(path: Option<&Path>, disable_voice: bool) -> Result<Self> {
        let file = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                Some(read_file(path)?)
            }
            None => match default_config_path() {
                Some(path) if path.exists() => Some(read_file(&path)?),
                _ => None,
            },
        };
        let file = file.unwrap_or_default();

        let api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .map(SecretString::from);

        let config = Self {
            frames: file.face.frames.unwrap_or_else(default_frames),
            frame_interval_ms: file
                .face
                .frame_interval_ms
                .unwrap_or(DEFAULT_FRAME_INTERVAL_MS),
            clips: file
                .audio
                .clips
                .map_or_else(default_clips, |clips| clips.into_iter().collect()),
            locale: env_or("NOVA_LOCALE", file.speech.locale, DEFAULT_LOCALE),
            fallback_text: file
                .speech
                .fallback_text
                .unwrap_or_else(|| DEFAULT_FALLBACK.to_string()),
            stt_model: env_or("NOVA_STT_MODEL", file.speech.stt_model, "whisper-1"),
            tts_model: env_or("NOVA_TTS_MODEL", file.speech.tts_model, "tts-1"),
            tts_voice: env_or("NOVA_TTS_VOICE", file.speech.tts_voice, "alloy"),
            tts_speed: file.speech.tts_speed.unwrap_or(1.0),
            voice_enabled: !disable_voice && api_key.is_some(),
            api_key,
        };

        if config.frames.is_empty() {
            return Err(Error::Config("frame list is empty".to_string()));
        }
        if config.frame_interval_ms == 0 {
            return Err(Error::Config("frame interval must be nonzero".to_string()));
        }
        Ok(config)
    }
}

fn read_file(path: &Path) -> Result<FileConfig> {
    tracing::debug!(path = %path.display(), "loading config file");
    let text = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&text)?)
}

fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "nova").map(|dirs| dirs.config_dir().join("nova.toml"))
}

fn env_or(var: &str, file: Option<String>, default: &str) -> String {
    std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .or(file)
        .unwrap_or_else(|| default.to_string())
}

fn default_frames() -> Vec<PathBuf> {
    (1..=6)
        .map(|n| PathBuf::from(format!("animacion_cara/iot_{n}.png")))
        .collect()
}

fn default_clips() -> Vec<(String, PathBuf)> {
    (1..=3)
        .map(|n| (format!("amy_{n}"), PathBuf::from(format!("audio/amy_{n}.wav"))))
        .collect()
}
