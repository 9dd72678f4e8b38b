//! Terminal client for the chatai relay.
//!
//! Drives a [`chatai_conversation::SessionController`] from stdin: typed
//! lines are submitted, `/speak` toggles dictation and replies are printed
//! in place of speech output.

pub mod config;
pub mod terminal;

pub use config::ClientConfig;
pub use terminal::{Command, LineRecognizer, PrintSynthesizer, render_event};
