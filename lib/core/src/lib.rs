//! Core types shared by the chatai relay and client.
//!
//! This crate provides the chat wire format (`Message`, relay request and
//! response bodies), strongly-typed identifiers, and the rootcause-based
//! `Result` alias used throughout the workspace.

pub mod error;
pub mod id;
pub mod message;
pub mod wire;

pub use error::Result;
pub use id::{ConversationSessionId, RelayRequestId};
pub use message::{Message, MessageRole};
pub use wire::{ErrorBody, RelayRequest, RelayResponse};
