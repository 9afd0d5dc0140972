//! Output surface boundaries
//!
//! The animator and controller write to these traits rather than to a
//! concrete display, so the widget can be embedded, run in a terminal,
//! or exercised headless in tests.

use std::io::Write as _;
use std::path::Path;

/// The single mutable "current frame" surface the animator writes to
pub trait FrameSurface {
    /// Display `frame` as the current face image
    fn show(&mut self, frame: &Path);
}

/// Text surface updated only on the fallback path
pub trait CaptionSurface {
    /// Replace the caption with `text`
    fn set_text(&mut self, text: &str);
}

/// Writes frames and captions to the terminal
#[derive(Debug, Default, Clone, Copy)]
pub struct TermSurface;

impl FrameSurface for TermSurface {
    fn show(&mut self, frame: &Path) {
        print!("\r[face] {}        ", frame.display());
        let _ = std::io::stdout().flush();
    }
}

impl CaptionSurface for TermSurface {
    fn set_text(&mut self, text: &str) {
        println!("\n[amy] {text}");
    }
}

/// Discards all output, for headless operation
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSurface;

impl FrameSurface for NullSurface {
    fn show(&mut self, _frame: &Path) {}
}

impl CaptionSurface for NullSurface {
    fn set_text(&mut self, _text: &str) {}
}
