//! Client side of chatai.
//!
//! This crate provides:
//!
//! - **Conversation**: the ordered, append-only chat history a client holds
//! - **Session Controller**: the state machine behind a chat page (compose,
//!   send, await reply, speak) with speech capture as a parallel sub-state
//! - **Speech**: recognizer and synthesizer hooks for platform speech services
//! - **Transport**: delivery of the conversation to the relay

pub mod conversation;
pub mod error;
pub mod session;
pub mod speech;
pub mod transport;

pub use conversation::Conversation;
pub use error::{SessionError, SpeechError, TransportError};
pub use session::{
    CaptureEnd, CaptureState, PendingRequest, ResubmitPolicy, SessionController,
    SessionControllerBuilder, SessionEvent, SessionState,
};
pub use speech::{
    NoRecognizer, RecognitionConfig, SilentSynthesizer, SpeechRecognizer, SpeechSynthesizer,
    Utterance,
};
pub use transport::{HttpRelayTransport, RelayTransport};
