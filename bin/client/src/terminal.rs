//! Terminal stand-ins for the chat page.
//!
//! Lines typed while dictation is active are treated as recognized speech;
//! replies are "spoken" by printing them, so a paused session prints nothing
//! until it is resumed.

use chatai_conversation::{
    CaptureEnd, RecognitionConfig, SessionEvent, SpeechError, SpeechRecognizer, SpeechSynthesizer,
    Utterance,
};
use std::io::Write;

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text: submitted, or a dictated segment while capturing.
    Text(String),
    /// Start or stop dictation.
    Dictate,
    /// Dictation ended without a stop request (end of speech).
    EndOfSpeech,
    /// Pause or resume speech output.
    Pause,
    /// Print the conversation so far.
    History,
    Help,
    Quit,
}

impl Command {
    /// Parses a line typed at the prompt.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "/speak" | "/mic" => Self::Dictate,
            "/end" => Self::EndOfSpeech,
            "/pause" => Self::Pause,
            "/history" => Self::History,
            "/help" => Self::Help,
            "/quit" | "/exit" => Self::Quit,
            _ => Self::Text(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }
}

pub const HELP: &str = "\
Type a message and press enter to send it.
  /speak    start or stop dictation (lines typed meanwhile are the transcript)
  /end      end dictation as if the speaker fell silent
  /pause    pause or resume spoken replies
  /history  show the conversation
  /quit     exit";

/// Recognizer that reads dictation from the terminal.
#[derive(Debug, Default)]
pub struct LineRecognizer;

impl SpeechRecognizer for LineRecognizer {
    fn start(&mut self, config: &RecognitionConfig) -> Result<(), SpeechError> {
        tracing::debug!(locale = %config.locale, "Dictation started");
        Ok(())
    }

    fn stop(&mut self) {
        tracing::debug!("Dictation stop requested");
    }
}

/// Synthesizer that prints utterances.
pub struct PrintSynthesizer<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> PrintSynthesizer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write + Send> SpeechSynthesizer for PrintSynthesizer<W> {
    fn speak(&mut self, utterance: &Utterance) -> Result<(), SpeechError> {
        writeln!(self.out, "assistant> {}", utterance.text())
            .and_then(|()| self.out.flush())
            .map_err(|e| SpeechError::SynthesisFailed {
                reason: e.to_string(),
            })
    }

    fn cancel(&mut self) {
        let _ = writeln!(self.out, "[speech cancelled]");
    }
}

/// Formats a session event for display, if it is worth showing.
#[must_use]
pub fn render_event(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::CaptureStarted => Some("(listening...)".to_string()),
        SessionEvent::CaptureEnded { cause, transcript } => {
            let how = match cause {
                CaptureEnd::StoppedByUser => "stopped",
                CaptureEnd::EndOfSpeech => "ended",
            };
            Some(format!("(dictation {how}: {transcript:?})"))
        }
        SessionEvent::PauseToggled { paused: true } => {
            Some("(speech paused, replies wait for /pause)".to_string())
        }
        SessionEvent::PauseToggled { paused: false } => Some("(speech resumed)".to_string()),
        SessionEvent::ReplyFailed { reason } => Some(format!("error: {reason}")),
        SessionEvent::MessageAppended(_) | SessionEvent::StateChanged { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatai_core::Message;

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse("/speak"), Command::Dictate);
        assert_eq!(Command::parse("  /pause \n"), Command::Pause);
        assert_eq!(Command::parse("/quit"), Command::Quit);
        assert_eq!(Command::parse("/end"), Command::EndOfSpeech);
    }

    #[test]
    fn other_lines_are_text() {
        assert_eq!(
            Command::parse("what is /speak?\n"),
            Command::Text("what is /speak?".to_string())
        );
        assert_eq!(Command::parse(""), Command::Text(String::new()));
    }

    #[test]
    fn synthesizer_prints_utterance() {
        let mut out = Vec::new();
        PrintSynthesizer::new(&mut out)
            .speak(&Utterance::for_message(&Message::assistant("Hello")))
            .expect("speak");
        assert_eq!(String::from_utf8(out).expect("utf8"), "assistant> Hello\n");
    }

    #[test]
    fn renders_only_user_facing_events() {
        assert_eq!(
            render_event(&SessionEvent::MessageAppended(Message::assistant("hi"))),
            None
        );
        assert_eq!(
            render_event(&SessionEvent::MessageAppended(Message::user("hi"))),
            None
        );
        assert!(
            render_event(&SessionEvent::ReplyFailed {
                reason: "relay returned HTTP 502".to_string()
            })
            .is_some_and(|line| line.contains("502"))
        );
    }
}
