//! Frame animation for the character face
//!
//! A looping image-frame animation driven by ticks from the controller's
//! event loop. The controller is the sole caller of `start`/`stop`.

use std::path::{Path, PathBuf};

use crate::surface::FrameSurface;
use crate::{Error, Result};

/// Immutable, cyclically indexed sequence of animation frames
#[derive(Debug, Clone)]
pub struct FrameSequence {
    frames: Vec<PathBuf>,
}

impl FrameSequence {
    /// Create a sequence from an ordered list of frame image paths
    ///
    /// # Errors
    ///
    /// Returns error if `frames` is empty
    pub fn new(frames: Vec<PathBuf>) -> Result<Self> {
        if frames.is_empty() {
            return Err(Error::Config(
                "frame sequence requires at least one frame".to_string(),
            ));
        }
        Ok(Self { frames })
    }

    /// Number of frames in the sequence
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Whether the sequence is empty (never true for a constructed sequence)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frame at `index`, wrapping modulo the sequence length
    #[must_use]
    pub fn frame(&self, index: usize) -> &Path {
        &self.frames[index % self.frames.len()]
    }
}

/// Advances a looping frame index and publishes frames to a surface
///
/// Owns its animation state exclusively; the index is mutated only by
/// [`tick`](Self::tick) and reset by [`stop`](Self::stop).
pub struct FrameAnimator {
    frames: FrameSequence,
    index: usize,
    running: bool,
    surface: Box<dyn FrameSurface>,
}

impl FrameAnimator {
    /// Create an animator at the rest pose (frame 0, not running)
    #[must_use]
    pub fn new(frames: FrameSequence, surface: Box<dyn FrameSurface>) -> Self {
        Self {
            frames,
            index: 0,
            running: false,
            surface,
        }
    }

    /// Begin advancing frames on subsequent ticks; no-op while running
    pub fn start(&mut self) {
        if self.running {
            return;
        }
        self.running = true;
        tracing::debug!("animation started");
    }

    /// Stop advancing, reset to frame 0 and republish the rest pose
    pub fn stop(&mut self) {
        self.running = false;
        self.index = 0;
        self.surface.show(self.frames.frame(0));
        tracing::debug!("animation stopped");
    }

    /// Advance one frame and publish it; no-op unless running
    pub fn tick(&mut self) {
        if !self.running {
            return;
        }
        self.index = (self.index + 1) % self.frames.len();
        self.surface.show(self.frames.frame(self.index));
    }

    /// Whether the animation is currently advancing
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Current frame index
    #[must_use]
    pub const fn frame_index(&self) -> usize {
        self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Discard;

    impl FrameSurface for Discard {
        fn show(&mut self, _frame: &Path) {}
    }

    fn six_frames() -> FrameSequence {
        FrameSequence::new((1..=6).map(|i| PathBuf::from(format!("f{i}.png"))).collect())
            .unwrap()
    }

    #[test]
    fn empty_sequence_rejected() {
        assert!(FrameSequence::new(Vec::new()).is_err());
    }

    #[test]
    fn cyclic_indexing_wraps() {
        let seq = six_frames();
        assert_eq!(seq.frame(0), Path::new("f1.png"));
        assert_eq!(seq.frame(6), Path::new("f1.png"));
        assert_eq!(seq.frame(7), Path::new("f2.png"));
    }

    #[test]
    fn six_ticks_wrap_to_zero() {
        let mut animator = FrameAnimator::new(six_frames(), Box::new(Discard));
        animator.start();

        let mut seen = Vec::new();
        for _ in 0..6 {
            animator.tick();
            seen.push(animator.frame_index());
        }
        assert_eq!(seen, vec![1, 2, 3, 4, 5, 0]);
    }

    #[test]
    fn stop_resets_index() {
        let mut animator = FrameAnimator::new(six_frames(), Box::new(Discard));
        animator.start();
        animator.tick();
        animator.tick();
        assert_eq!(animator.frame_index(), 2);

        animator.stop();
        assert_eq!(animator.frame_index(), 0);
        assert!(!animator.is_running());

        // Idempotent
        animator.stop();
        assert_eq!(animator.frame_index(), 0);
    }

    #[test]
    fn start_is_idempotent() {
        let mut animator = FrameAnimator::new(six_frames(), Box::new(Discard));
        animator.start();
        animator.start();
        animator.tick();
        assert_eq!(animator.frame_index(), 1);
    }

    #[test]
    fn tick_while_stopped_is_noop() {
        let mut animator = FrameAnimator::new(six_frames(), Box::new(Discard));
        animator.tick();
        assert_eq!(animator.frame_index(), 0);
    }
}
