use async_trait::async_trait;

use crate::Result;

/// One-shot speech recognition session
///
/// A session begins with [`start`](Recognizer::start) and is driven by
/// periodic [`poll`](Recognizer::poll) calls. Implementations report
/// progress as [`FaceEvent`](crate::controller::FaceEvent)s on the widget
/// event channel: `ListeningStarted`, then exactly one of `Recognized` or
/// `RecognitionFailed`, then always `ListeningEnded`.
#[async_trait(?Send)]
pub trait Recognizer {
    /// Begin a listening session
    ///
    /// # Errors
    ///
    /// Returns [`Error::AlreadyListening`](crate::Error::AlreadyListening)
    /// if a session is in progress, or
    /// [`Error::CapabilityUnavailable`](crate::Error::CapabilityUnavailable)
    /// if no capture device can be opened.
    fn start(&mut self) -> Result<()>;

    /// Whether a session is in progress
    fn is_listening(&self) -> bool;

    /// Advance the active session; no-op when idle
    async fn poll(&mut self);
}
