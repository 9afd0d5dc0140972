//! An interactive talking-face widget
//!
//! The widget cycles face frames until tapped, then listens for one
//! spoken command, matches it against a small command table, and answers
//! with a recorded clip or a synthesized response. At most one voice is
//! ever audible, and the face never animates while listening.
//!
//! Structure:
//!
//! - [`animation`] cycles face frames onto a [`surface`]
//! - [`audio`] loads WAV clips and plays them exclusively
//! - [`speech`] captures, endpoints, and transcribes one utterance,
//!   and synthesizes spoken responses
//! - [`command`] maps transcripts to actions
//! - [`controller`] serializes everything through one event loop

pub mod animation;
pub mod audio;
pub mod command;
pub mod config;
pub mod controller;
pub mod error;
pub mod speech;
pub mod surface;

pub use command::{Action, CommandInterpreter};
pub use config::Config;
pub use controller::{Controller, FaceEvent, InteractionState};
pub use error::{Error, Result};
