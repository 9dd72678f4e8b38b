//! Chat session controller.
//!
//! A `SessionController` owns one client's conversation and walks it through
//!
//! ```text
//! Idle -> Composing -> Sending -> AwaitingReply -> Speaking -> Idle
//! ```
//!
//! while speech capture runs as a parallel sub-state
//! (`Inactive -> Listening -> Stopping -> Inactive`). All mutation goes
//! through the transition methods below; observers follow along through
//! [`SessionController::subscribe`].

use crate::conversation::Conversation;
use crate::error::{SessionError, SpeechError, TransportError};
use crate::speech::{
    NoRecognizer, RecognitionConfig, SilentSynthesizer, SpeechRecognizer, SpeechSynthesizer,
    Utterance,
};
use crate::transport::RelayTransport;
use chatai_core::{ConversationSessionId, Message};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

const EVENT_CAPACITY: usize = 64;

/// Where the session is in the compose/send/reply cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Nothing pending.
    Idle,
    /// The user has typed or dictated input that is not yet sent.
    Composing,
    /// A user message was appended and the request is being issued.
    Sending,
    /// The relay request is in flight.
    AwaitingReply,
    /// The reply is being read aloud.
    Speaking,
}

impl SessionState {
    /// Returns whether a transition from `self` to `target` is valid.
    #[must_use]
    pub fn can_transition_to(&self, target: SessionState) -> bool {
        use SessionState::{AwaitingReply, Composing, Idle, Sending, Speaking};
        matches!(
            (self, target),
            (Idle, Composing)
                | (Composing, Idle)
                | (Idle | Composing | Speaking, Sending)
                | (Sending, AwaitingReply)
                | (AwaitingReply, Speaking)
                // Resuming a queued utterance
                | (Idle | Composing, Speaking)
                // Reply held back by pause, or request failed
                | (Sending | AwaitingReply, Idle | Composing)
                | (Speaking, Idle | Composing)
        )
    }

    /// Returns true while a relay request is outstanding.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Sending | Self::AwaitingReply)
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Composing => "composing",
            Self::Sending => "sending",
            Self::AwaitingReply => "awaiting_reply",
            Self::Speaking => "speaking",
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Speech capture sub-state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureState {
    Inactive,
    Listening,
    /// Stop was requested; waiting for the recognizer to report the end.
    Stopping,
}

/// Why a dictation session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureEnd {
    /// The user toggled capture off.
    StoppedByUser,
    /// The recognizer ended on its own (silence, platform limit).
    EndOfSpeech,
}

/// Which capture endings auto-submit the dictated text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResubmitPolicy {
    /// Submit on any ending with pending text.
    #[default]
    Always,
    /// Submit only when the user stopped capture.
    ManualStopOnly,
    /// Never submit automatically.
    Never,
}

impl ResubmitPolicy {
    #[must_use]
    pub fn allows(&self, cause: CaptureEnd) -> bool {
        match self {
            Self::Always => true,
            Self::ManualStopOnly => cause == CaptureEnd::StoppedByUser,
            Self::Never => false,
        }
    }
}

/// Notifications published by a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    StateChanged {
        from: SessionState,
        to: SessionState,
    },
    MessageAppended(Message),
    CaptureStarted,
    CaptureEnded {
        cause: CaptureEnd,
        transcript: String,
    },
    PauseToggled {
        paused: bool,
    },
    ReplyFailed {
        reason: String,
    },
}

/// The conversation snapshot to deliver for one submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    chats: Vec<Message>,
}

impl PendingRequest {
    /// Full conversation, ending with the just-submitted user message.
    #[must_use]
    pub fn chats(&self) -> &[Message] {
        &self.chats
    }
}

/// Builder for [`SessionController`].
pub struct SessionControllerBuilder {
    transport: Arc<dyn RelayTransport>,
    recognizer: Box<dyn SpeechRecognizer>,
    synthesizer: Box<dyn SpeechSynthesizer>,
    recognition: RecognitionConfig,
    resubmit_policy: ResubmitPolicy,
    paused: bool,
}

impl SessionControllerBuilder {
    #[must_use]
    pub fn recognizer(mut self, recognizer: impl SpeechRecognizer + 'static) -> Self {
        self.recognizer = Box::new(recognizer);
        self
    }

    #[must_use]
    pub fn synthesizer(mut self, synthesizer: impl SpeechSynthesizer + 'static) -> Self {
        self.synthesizer = Box::new(synthesizer);
        self
    }

    #[must_use]
    pub fn recognition_config(mut self, config: RecognitionConfig) -> Self {
        self.recognition = config;
        self
    }

    /// Sets which dictation endings auto-submit. Fixed for the session's
    /// lifetime.
    #[must_use]
    pub fn resubmit_policy(mut self, policy: ResubmitPolicy) -> Self {
        self.resubmit_policy = policy;
        self
    }

    /// Starts the session with speech output paused.
    #[must_use]
    pub fn paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }

    #[must_use]
    pub fn build(self) -> SessionController {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        SessionController {
            id: ConversationSessionId::new(),
            state: SessionState::Idle,
            capture: CaptureState::Inactive,
            conversation: Conversation::new(),
            input: String::new(),
            paused: self.paused,
            queued_utterance: None,
            last_error: None,
            resubmit_policy: self.resubmit_policy,
            recognition: self.recognition,
            transport: self.transport,
            recognizer: self.recognizer,
            synthesizer: self.synthesizer,
            events,
            playback_seq: 0,
        }
    }
}

/// One client's chat session.
pub struct SessionController {
    id: ConversationSessionId,
    state: SessionState,
    capture: CaptureState,
    conversation: Conversation,
    input: String,
    paused: bool,
    queued_utterance: Option<Utterance>,
    last_error: Option<String>,
    resubmit_policy: ResubmitPolicy,
    recognition: RecognitionConfig,
    transport: Arc<dyn RelayTransport>,
    recognizer: Box<dyn SpeechRecognizer>,
    synthesizer: Box<dyn SpeechSynthesizer>,
    events: broadcast::Sender<SessionEvent>,
    playback_seq: u64,
}

impl SessionController {
    /// Starts building a session that delivers through `transport`.
    ///
    /// Without further configuration the session has no speech input and
    /// discards speech output.
    #[must_use]
    pub fn builder(transport: Arc<dyn RelayTransport>) -> SessionControllerBuilder {
        SessionControllerBuilder {
            transport,
            recognizer: Box::new(NoRecognizer),
            synthesizer: Box::new(SilentSynthesizer),
            recognition: RecognitionConfig::default(),
            resubmit_policy: ResubmitPolicy::default(),
            paused: false,
        }
    }

    #[must_use]
    pub fn id(&self) -> ConversationSessionId {
        self.id
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn capture_state(&self) -> CaptureState {
        self.capture
    }

    #[must_use]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Text currently in the input box.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// True while the assistant is "typing": a request is outstanding or
    /// the reply is being spoken.
    #[must_use]
    pub fn is_typing(&self) -> bool {
        self.state.is_busy() || self.state == SessionState::Speaking
    }

    /// Reason the most recent relay request failed, cleared by the next submit.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Reply utterance not yet fully spoken.
    #[must_use]
    pub fn queued_utterance(&self) -> Option<&Utterance> {
        self.queued_utterance.as_ref()
    }

    /// Subscribes to session events from this point on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Replaces the input text.
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
        match self.state {
            SessionState::Idle if !self.input.is_empty() => {
                self.set_state(SessionState::Composing);
            }
            SessionState::Composing if self.input.is_empty() => {
                self.set_state(SessionState::Idle);
            }
            _ => {}
        }
    }

    /// Appends `text` as a user message and returns the conversation to send.
    ///
    /// Empty or whitespace-only text is ignored: `Ok(None)`, nothing changes.
    /// A reply still being spoken is cancelled and dropped from the queue.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidStateTransition` while another request
    /// is outstanding.
    pub fn begin_submit(&mut self, text: &str) -> Result<Option<PendingRequest>, SessionError> {
        if text.trim().is_empty() {
            return Ok(None);
        }
        if !self.state.can_transition_to(SessionState::Sending) {
            return Err(SessionError::InvalidStateTransition {
                from: self.state,
                to: SessionState::Sending,
            });
        }

        if self.state == SessionState::Speaking {
            self.synthesizer.cancel();
            self.queued_utterance = None;
        }
        self.last_error = None;
        self.append(Message::user(text));
        self.input.clear();
        self.set_state(SessionState::Sending);

        Ok(Some(PendingRequest {
            chats: self.conversation.messages().to_vec(),
        }))
    }

    /// Records that the pending request has been handed to the transport.
    ///
    /// # Errors
    ///
    /// Returns an error unless the session is `Sending`.
    pub fn mark_dispatched(&mut self) -> Result<(), SessionError> {
        self.transition(SessionState::AwaitingReply)
    }

    /// Applies the outcome of the outstanding request.
    ///
    /// A reply is appended and spoken unless output is paused. A failure is
    /// logged and kept in [`last_error`](Self::last_error); the user message
    /// stays in the conversation without a reply.
    ///
    /// # Errors
    ///
    /// Returns an error if no request is outstanding.
    pub fn complete_submit(
        &mut self,
        result: Result<Message, TransportError>,
    ) -> Result<(), SessionError> {
        if self.state == SessionState::Sending {
            self.mark_dispatched()?;
        }
        if self.state != SessionState::AwaitingReply {
            return Err(SessionError::InvalidStateTransition {
                from: self.state,
                to: SessionState::Idle,
            });
        }

        match result {
            Ok(reply) => {
                self.append(reply.clone());
                self.queued_utterance = Some(Utterance::for_message(&reply));
                if self.paused {
                    debug!(session_id = %self.id, "Reply held back, speech paused");
                    self.transition(self.rest_state())
                } else {
                    self.speak_queued()
                }
            }
            Err(err) => {
                warn!(session_id = %self.id, error = %err, "Relay request failed");
                let reason = err.to_string();
                self.last_error = Some(reason.clone());
                self.emit(SessionEvent::ReplyFailed { reason });
                self.transition(self.rest_state())
            }
        }
    }

    /// Submits `text` and waits for the relay's reply.
    ///
    /// Transport failures are not returned; see [`complete_submit`](Self::complete_submit).
    ///
    /// # Errors
    ///
    /// Returns an error while another request is outstanding.
    pub async fn submit(&mut self, text: &str) -> Result<(), SessionError> {
        let Some(pending) = self.begin_submit(text)? else {
            return Ok(());
        };
        self.mark_dispatched()?;
        let transport = Arc::clone(&self.transport);
        let result = transport.send(pending.chats()).await;
        self.complete_submit(result)
    }

    /// Submits whatever is in the input box.
    ///
    /// # Errors
    ///
    /// Returns an error while another request is outstanding.
    pub async fn submit_input(&mut self) -> Result<(), SessionError> {
        let text = self.input.clone();
        self.submit(&text).await
    }

    /// Pauses or resumes speech output. Returns the new paused flag.
    ///
    /// Pausing cancels playback; resuming speaks the queued reply, if any.
    /// Neither touches the conversation or an outstanding request.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.emit(SessionEvent::PauseToggled {
            paused: self.paused,
        });

        if self.paused {
            self.synthesizer.cancel();
            // The cancelled playback's end callback must not clear the queue.
            if let Some(utterance) = self.queued_utterance.as_mut() {
                utterance.set_playback_id(0);
            }
            if self.state == SessionState::Speaking {
                self.set_state(self.rest_state());
            }
        } else if self.queued_utterance.is_some()
            && matches!(self.state, SessionState::Idle | SessionState::Composing)
        {
            // Idle/Composing -> Speaking is always valid.
            let _ = self.speak_queued();
        }
        self.paused
    }

    /// Starts or stops dictation.
    ///
    /// # Errors
    ///
    /// Returns an error if the recognizer cannot start.
    pub fn toggle_capture(&mut self) -> Result<(), SpeechError> {
        match self.capture {
            CaptureState::Inactive => {
                self.recognizer.start(&self.recognition)?;
                self.capture = CaptureState::Listening;
                self.emit(SessionEvent::CaptureStarted);
            }
            CaptureState::Listening => {
                self.recognizer.stop();
                self.capture = CaptureState::Stopping;
            }
            CaptureState::Stopping => {}
        }
        Ok(())
    }

    /// Applies a recognition result: the joined segments become the input.
    pub fn on_recognition_result<S: AsRef<str>>(&mut self, segments: &[S]) {
        if self.capture == CaptureState::Inactive {
            debug!(session_id = %self.id, "Ignoring transcript outside a capture session");
            return;
        }
        let transcript: String = segments.iter().map(AsRef::as_ref).collect();
        self.set_input(transcript);
    }

    /// Handles the recognizer reporting that dictation ended.
    ///
    /// Publishes [`SessionEvent::CaptureEnded`] and returns the text the
    /// resubmit policy wants submitted, if any.
    pub fn on_recognition_end(&mut self) -> Option<String> {
        let cause = match self.capture {
            CaptureState::Inactive => return None,
            CaptureState::Listening => CaptureEnd::EndOfSpeech,
            CaptureState::Stopping => CaptureEnd::StoppedByUser,
        };
        self.capture = CaptureState::Inactive;

        let transcript = self.input.clone();
        self.emit(SessionEvent::CaptureEnded {
            cause,
            transcript: transcript.clone(),
        });

        if transcript.trim().is_empty() || !self.resubmit_policy.allows(cause) {
            return None;
        }
        Some(transcript)
    }

    /// [`on_recognition_end`](Self::on_recognition_end), then submits the
    /// dictated text as if typed.
    ///
    /// # Errors
    ///
    /// Returns an error while another request is outstanding.
    pub async fn handle_recognition_end(&mut self) -> Result<(), SessionError> {
        match self.on_recognition_end() {
            Some(text) => self.submit(&text).await,
            None => Ok(()),
        }
    }

    /// Handles the synthesizer finishing (or abandoning) `ended`.
    ///
    /// Ends of superseded or cancelled playbacks are ignored.
    pub fn on_utterance_end(&mut self, ended: &Utterance) {
        let current = self.queued_utterance.as_ref().is_some_and(|queued| {
            queued.playback_id() != 0 && queued.playback_id() == ended.playback_id()
        });
        if !current {
            debug!(session_id = %self.id, playback_id = ended.playback_id(), "Ignoring stale utterance end");
            return;
        }
        self.queued_utterance = None;
        if self.state == SessionState::Speaking {
            self.set_state(self.rest_state());
        }
    }

    fn speak_queued(&mut self) -> Result<(), SessionError> {
        let Some(utterance) = self.queued_utterance.as_mut() else {
            return self.transition(self.rest_state());
        };
        self.playback_seq += 1;
        utterance.set_playback_id(self.playback_seq);
        match self.synthesizer.speak(utterance) {
            Ok(()) => self.transition(SessionState::Speaking),
            Err(err) => {
                warn!(session_id = %self.id, error = %err, "Could not speak reply");
                self.queued_utterance = None;
                self.transition(self.rest_state())
            }
        }
    }

    fn rest_state(&self) -> SessionState {
        if self.input.is_empty() {
            SessionState::Idle
        } else {
            SessionState::Composing
        }
    }

    fn append(&mut self, message: Message) {
        self.conversation.push(message.clone());
        self.emit(SessionEvent::MessageAppended(message));
    }

    fn transition(&mut self, to: SessionState) -> Result<(), SessionError> {
        if self.state == to {
            return Ok(());
        }
        if !self.state.can_transition_to(to) {
            return Err(SessionError::InvalidStateTransition {
                from: self.state,
                to,
            });
        }
        self.set_state(to);
        Ok(())
    }

    fn set_state(&mut self, to: SessionState) {
        let from = self.state;
        debug!(session_id = %self.id, %from, %to, "Session state");
        self.state = to;
        self.emit(SessionEvent::StateChanged { from, to });
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
