//! Hooks for platform speech services.
//!
//! Recognition and synthesis are opaque: the session controller only tells
//! them to start, stop, speak or cancel. Their callbacks (transcript
//! results, recognition end, utterance end) are delivered back to the
//! controller by whoever drives it.

use crate::error::SpeechError;
use chatai_core::{Message, MessageRole};

/// Settings for a dictation session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionConfig {
    /// Deliver partial transcripts while the user is still speaking.
    pub interim_results: bool,
    /// Keep listening across pauses instead of ending after one phrase.
    pub continuous: bool,
    /// BCP 47 language tag.
    pub locale: String,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            interim_results: true,
            continuous: true,
            locale: "en-US".to_string(),
        }
    }
}

/// One unit of speech output.
///
/// Utterances are consumed once by the synthesizer and never stored in the
/// conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Utterance {
    text: String,
    role: MessageRole,
    playback_id: u64,
}

impl Utterance {
    #[must_use]
    pub fn new(role: MessageRole, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            role,
            playback_id: 0,
        }
    }

    /// Creates the utterance that reads `message` aloud.
    #[must_use]
    pub fn for_message(message: &Message) -> Self {
        Self::new(message.role(), message.content())
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn role(&self) -> MessageRole {
        self.role
    }

    /// Identifies the current playback; a session assigns a fresh id each
    /// time it hands the utterance to the synthesizer. Zero means not playing.
    #[must_use]
    pub fn playback_id(&self) -> u64 {
        self.playback_id
    }

    pub(crate) fn set_playback_id(&mut self, playback_id: u64) {
        self.playback_id = playback_id;
    }
}

/// Speech-to-text service.
pub trait SpeechRecognizer: Send {
    /// Begins a dictation session.
    ///
    /// # Errors
    ///
    /// Returns an error if recognition is unavailable.
    fn start(&mut self, config: &RecognitionConfig) -> Result<(), SpeechError>;

    /// Asks the running session to stop. The service reports the end
    /// asynchronously.
    fn stop(&mut self);
}

/// Text-to-speech service.
pub trait SpeechSynthesizer: Send {
    /// Starts speaking an utterance.
    ///
    /// # Errors
    ///
    /// Returns an error if playback cannot start.
    fn speak(&mut self, utterance: &Utterance) -> Result<(), SpeechError>;

    /// Cancels any utterance currently playing.
    fn cancel(&mut self);
}

/// Recognizer for platforms without speech input; every start fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRecognizer;

impl SpeechRecognizer for NoRecognizer {
    fn start(&mut self, _config: &RecognitionConfig) -> Result<(), SpeechError> {
        Err(SpeechError::RecognitionUnavailable {
            reason: "no speech recognizer configured".to_string(),
        })
    }

    fn stop(&mut self) {}
}

/// Synthesizer that discards output.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentSynthesizer;

impl SpeechSynthesizer for SilentSynthesizer {
    fn speak(&mut self, _utterance: &Utterance) -> Result<(), SpeechError> {
        Ok(())
    }

    fn cancel(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognition_defaults() {
        let config = RecognitionConfig::default();
        assert!(config.interim_results);
        assert!(config.continuous);
        assert_eq!(config.locale, "en-US");
    }

    #[test]
    fn utterance_for_message() {
        let utterance = Utterance::for_message(&Message::assistant("Hello there"));
        assert_eq!(utterance.text(), "Hello there");
        assert_eq!(utterance.role(), MessageRole::Assistant);
    }

    #[test]
    fn no_recognizer_refuses_to_start() {
        let mut recognizer = NoRecognizer;
        assert!(matches!(
            recognizer.start(&RecognitionConfig::default()),
            Err(SpeechError::RecognitionUnavailable { .. })
        ));
    }
}
