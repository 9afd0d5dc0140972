//! Shared fakes for integration tests

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::mpsc;

use nova_face::audio::{AudioClip, ClipSink};
use nova_face::controller::FaceEvent;
use nova_face::speech::{Recognizer, Synthesizer};
use nova_face::surface::{CaptionSurface, FrameSurface};
use nova_face::{Error, Result};

/// Records every frame the animator publishes
#[derive(Default, Clone)]
pub struct RecordingSurface {
    frames: Arc<Mutex<Vec<PathBuf>>>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn frames(&self) -> Vec<PathBuf> {
        self.frames.lock().unwrap().clone()
    }
}

impl FrameSurface for RecordingSurface {
    fn show(&mut self, frame: &Path) {
        self.frames.lock().unwrap().push(frame.to_path_buf());
    }
}

/// Records caption updates
#[derive(Default, Clone)]
pub struct RecordingCaption {
    captions: Arc<Mutex<Vec<String>>>,
}

impl RecordingCaption {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(dead_code)]
    pub fn captions(&self) -> Vec<String> {
        self.captions.lock().unwrap().clone()
    }
}

impl CaptionSurface for RecordingCaption {
    fn set_text(&mut self, text: &str) {
        self.captions.lock().unwrap().push(text.to_string());
    }
}

/// In-memory sink exposing the clip progress it was handed
///
/// Cloning shares state, so tests keep a handle while the player owns a
/// boxed copy. `advance` simulates the output callback consuming samples.
#[derive(Default, Clone)]
pub struct FakeSink {
    started: Arc<Mutex<Vec<usize>>>,
    progress: Arc<Mutex<Option<Arc<AtomicUsize>>>>,
    stops: Arc<AtomicUsize>,
}

impl FakeSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lengths of every clip started, in order
    #[allow(dead_code)]
    pub fn started(&self) -> Vec<usize> {
        self.started.lock().unwrap().clone()
    }

    /// How many times `stop` has been called
    #[allow(dead_code)]
    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::Relaxed)
    }

    /// Simulate the output callback consuming `samples` of the active clip
    #[allow(dead_code)]
    pub fn advance(&self, samples: usize) {
        if let Some(progress) = self.progress.lock().unwrap().as_ref() {
            progress.fetch_add(samples, Ordering::Relaxed);
        }
    }
}

impl ClipSink for FakeSink {
    fn start(&mut self, clip: &AudioClip, progress: Arc<AtomicUsize>) -> Result<()> {
        self.started.lock().unwrap().push(clip.len());
        *self.progress.lock().unwrap() = Some(progress);
        Ok(())
    }

    fn stop(&mut self) {
        self.stops.fetch_add(1, Ordering::Relaxed);
        *self.progress.lock().unwrap() = None;
    }
}

/// What a scripted listening session should produce
#[allow(dead_code)]
pub enum Outcome {
    Recognized(&'static str),
    Failed(&'static str),
}

/// Recognizer that replays scripted outcomes without any audio hardware
///
/// Each `start` opens a session; the next `poll` emits the full event
/// sequence for the session's scripted outcome.
pub struct ScriptedRecognizer {
    outcomes: VecDeque<Outcome>,
    events: mpsc::UnboundedSender<FaceEvent>,
    listening: bool,
    starts: Arc<AtomicUsize>,
}

impl ScriptedRecognizer {
    pub fn new(
        outcomes: Vec<Outcome>,
        events: mpsc::UnboundedSender<FaceEvent>,
    ) -> (Self, Arc<AtomicUsize>) {
        let starts = Arc::new(AtomicUsize::new(0));
        (
            Self {
                outcomes: outcomes.into(),
                events,
                listening: false,
                starts: Arc::clone(&starts),
            },
            starts,
        )
    }
}

#[async_trait(?Send)]
impl Recognizer for ScriptedRecognizer {
    fn start(&mut self) -> Result<()> {
        if self.listening {
            return Err(Error::AlreadyListening);
        }
        self.listening = true;
        self.starts.fetch_add(1, Ordering::Relaxed);
        let _ = self.events.send(FaceEvent::ListeningStarted);
        Ok(())
    }

    fn is_listening(&self) -> bool {
        self.listening
    }

    async fn poll(&mut self) {
        if !self.listening {
            return;
        }
        let Some(outcome) = self.outcomes.pop_front() else {
            return;
        };
        match outcome {
            Outcome::Recognized(text) => {
                let _ = self
                    .events
                    .send(FaceEvent::Recognized(text.to_uppercase()));
            }
            Outcome::Failed(reason) => {
                let _ = self
                    .events
                    .send(FaceEvent::RecognitionFailed(reason.to_string()));
            }
        }
        self.listening = false;
        let _ = self.events.send(FaceEvent::ListeningEnded);
    }
}

/// Synthesizer that records its call sequence
#[derive(Default, Clone)]
pub struct RecordingSynth {
    ops: Arc<Mutex<Vec<String>>>,
}

impl RecordingSynth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call log: `speak:<text>` and `cancel` entries in order
    #[allow(dead_code)]
    pub fn ops(&self) -> Vec<String> {
        self.ops.lock().unwrap().clone()
    }
}

#[async_trait(?Send)]
impl Synthesizer for RecordingSynth {
    async fn speak(&mut self, text: &str) -> Result<()> {
        self.ops.lock().unwrap().push(format!("speak:{text}"));
        Ok(())
    }

    fn cancel(&mut self) {
        self.ops.lock().unwrap().push("cancel".to_string());
    }
}
