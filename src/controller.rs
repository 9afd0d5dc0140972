//! The interaction controller
//!
//! Owns the face animator, the clip player, and the optional speech
//! capabilities, and serializes every state change through a single
//! run-to-completion event handler. At most one voice is audible at a
//! time, and the face never animates while the widget is listening.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::animation::FrameAnimator;
use crate::audio::AudioPlayer;
use crate::command::{Action, CommandInterpreter};
use crate::speech::{Recognizer, Synthesizer};
use crate::surface::CaptionSurface;
use crate::{Error, Result};

/// How often an active listening session is polled
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Everything that can happen to the widget
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaceEvent {
    /// The user tapped the face
    Tapped,
    /// The frame timer fired
    Frame,
    /// A listening session opened
    ListeningStarted,
    /// A session produced an uppercased transcript
    Recognized(String),
    /// A session failed; the reason is logged, never surfaced
    RecognitionFailed(String),
    /// A session closed, successfully or not
    ListeningEnded,
    /// The active clip or synthesized speech played to the end
    PlaybackFinished,
}

/// What the widget is doing right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    /// Cycling face frames, ready for a tap
    Animating,
    /// A recognition session is open; the face is frozen
    Listening,
    /// Playing a clip or speaking a response
    Outputting,
}

/// Drives the widget from a stream of [`FaceEvent`]s
pub struct Controller {
    animator: FrameAnimator,
    player: AudioPlayer,
    recognizer: Option<Box<dyn Recognizer>>,
    synthesizer: Option<Box<dyn Synthesizer>>,
    caption: Box<dyn CaptionSurface>,
    interpreter: CommandInterpreter,
    state: InteractionState,
    frame_interval: Duration,
}

impl Controller {
    #[must_use]
    pub fn new(
        animator: FrameAnimator,
        player: AudioPlayer,
        recognizer: Option<Box<dyn Recognizer>>,
        synthesizer: Option<Box<dyn Synthesizer>>,
        caption: Box<dyn CaptionSurface>,
        interpreter: CommandInterpreter,
        frame_interval: Duration,
    ) -> Self {
        Self {
            animator,
            player,
            recognizer,
            synthesizer,
            caption,
            interpreter,
            state: InteractionState::Animating,
            frame_interval,
        }
    }

    /// Begin animating the face
    pub fn start(&mut self) {
        self.animator.start();
        self.state = InteractionState::Animating;
    }

    /// Current interaction state
    #[must_use]
    pub const fn state(&self) -> InteractionState {
        self.state
    }

    /// The face animator, for inspection
    #[must_use]
    pub const fn animator(&self) -> &FrameAnimator {
        &self.animator
    }

    /// The clip player, for inspection
    #[must_use]
    pub const fn player(&self) -> &AudioPlayer {
        &self.player
    }

    /// Advance an active listening session; no-op without a recognizer
    pub async fn poll_recognizer(&mut self) {
        if let Some(recognizer) = self.recognizer.as_mut() {
            recognizer.poll().await;
        }
    }

    /// Apply one event to completion
    pub async fn handle(&mut self, event: FaceEvent) {
        match event {
            FaceEvent::Tapped => self.on_tapped(),
            FaceEvent::Frame => self.animator.tick(),
            FaceEvent::ListeningStarted => {
                self.animator.stop();
                self.state = InteractionState::Listening;
            }
            FaceEvent::Recognized(transcript) => self.on_recognized(&transcript).await,
            FaceEvent::RecognitionFailed(reason) => {
                tracing::warn!(reason = %reason, "recognition failed");
            }
            FaceEvent::ListeningEnded => {
                self.animator.start();
                if self.state == InteractionState::Listening {
                    self.state = InteractionState::Animating;
                }
            }
            FaceEvent::PlaybackFinished => {
                self.player.stop();
                // The finished audio may be synthesized speech on its own
                // sink; release that stream too
                if let Some(synth) = self.synthesizer.as_mut() {
                    synth.cancel();
                }
                if self.state == InteractionState::Outputting {
                    self.state = InteractionState::Animating;
                }
            }
        }
    }

    fn on_tapped(&mut self) {
        self.player.stop();
        if let Some(synth) = self.synthesizer.as_mut() {
            synth.cancel();
        }

        let Some(recognizer) = self.recognizer.as_mut() else {
            tracing::warn!("tap ignored, speech recognition is unavailable");
            return;
        };
        match recognizer.start() {
            Ok(()) => {}
            Err(Error::AlreadyListening) => {
                tracing::debug!("tap ignored, already listening");
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not start listening");
            }
        }
    }

    async fn on_recognized(&mut self, transcript: &str) {
        tracing::info!(transcript, "command received");
        match self.interpreter.interpret(transcript) {
            Action::PlayClip(clip) => {
                if let Err(e) = self.player.play(&clip) {
                    tracing::warn!(clip = %clip, error = %e, "could not play clip");
                    return;
                }
                self.state = InteractionState::Outputting;
            }
            Action::Respond(text) => {
                self.caption.set_text(&text);
                let Some(synth) = self.synthesizer.as_mut() else {
                    tracing::warn!("speech synthesis is unavailable");
                    return;
                };
                if let Err(e) = synth.speak(&text).await {
                    tracing::warn!(error = %e, "could not speak response");
                    return;
                }
                self.state = InteractionState::Outputting;
            }
        }
    }

    /// Drive the widget until the event channel closes
    ///
    /// Multiplexes incoming events with the frame timer and the
    /// recognition poll timer. Everything runs on the calling task, so
    /// handlers never race.
    pub async fn run(&mut self, mut events: mpsc::UnboundedReceiver<FaceEvent>) -> Result<()> {
        self.start();

        let mut frames = tokio::time::interval(self.frame_interval);
        frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut poll = tokio::time::interval(POLL_INTERVAL);
        poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                event = events.recv() => {
                    let Some(event) = event else { break };
                    self.handle(event).await;
                }
                _ = frames.tick() => {
                    self.handle(FaceEvent::Frame).await;
                }
                _ = poll.tick() => {
                    self.poll_recognizer().await;
                }
            }
        }

        tracing::debug!("event channel closed, widget shutting down");
        Ok(())
    }
}
