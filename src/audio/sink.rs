//! Audio output sinks

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, Stream, StreamConfig};
use tokio::sync::mpsc;

use crate::audio::AudioClip;
use crate::controller::FaceEvent;
use crate::{Error, Result};

/// Starts and stops output of one clip at a time
///
/// `progress` is advanced (in samples) as audio is written out. Natural
/// completion is reported as [`FaceEvent::PlaybackFinished`] on the widget
/// event channel; stopping early reports nothing.
pub trait ClipSink {
    /// Begin playing `clip` from the start, replacing any active output
    ///
    /// # Errors
    ///
    /// Returns error if the output device cannot be opened
    fn start(&mut self, clip: &AudioClip, progress: Arc<AtomicUsize>) -> Result<()>;

    /// Silence any active output; no-op when idle
    fn stop(&mut self);
}

/// Plays clips on the default cpal output device
pub struct CpalSink {
    events: mpsc::UnboundedSender<FaceEvent>,
    stream: Option<Stream>,
}

impl CpalSink {
    /// Create a sink reporting completion on `events`
    #[must_use]
    pub const fn new(events: mpsc::UnboundedSender<FaceEvent>) -> Self {
        Self {
            events,
            stream: None,
        }
    }
}

impl ClipSink for CpalSink {
    fn start(&mut self, clip: &AudioClip, progress: Arc<AtomicUsize>) -> Result<()> {
        self.stop();

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Audio("no output device available".to_string()))?;

        let rate = SampleRate(clip.sample_rate());
        let supported = device
            .supported_output_configs()
            .map_err(|e| Error::Audio(e.to_string()))?
            .find(|c| c.channels() <= 2 && c.min_sample_rate() <= rate && c.max_sample_rate() >= rate)
            .ok_or_else(|| Error::Audio("no suitable output config found".to_string()))?;
        let config: StreamConfig = supported.with_sample_rate(rate).config();
        let channels = usize::from(config.channels);

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = clip.sample_rate(),
            channels,
            samples = clip.len(),
            "output stream starting"
        );

        let samples = Arc::clone(clip.samples());
        let events = self.events.clone();
        let mut done = false;

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut pos = progress.load(Ordering::Relaxed);
                    for frame in data.chunks_mut(channels) {
                        let sample = samples.get(pos).copied().unwrap_or(0.0);
                        for out in frame.iter_mut() {
                            *out = sample;
                        }
                        if pos < samples.len() {
                            pos += 1;
                        }
                    }
                    progress.store(pos, Ordering::Relaxed);
                    if pos >= samples.len() && !done {
                        done = true;
                        let _ = events.send(FaceEvent::PlaybackFinished);
                    }
                },
                |err| {
                    tracing::error!(error = %err, "audio output error");
                },
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?;

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;
        self.stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            drop(stream);
            tracing::debug!("output stream stopped");
        }
    }
}

/// Discards audio, for headless operation
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ClipSink for NullSink {
    fn start(&mut self, _clip: &AudioClip, _progress: Arc<AtomicUsize>) -> Result<()> {
        Ok(())
    }

    fn stop(&mut self) {}
}
