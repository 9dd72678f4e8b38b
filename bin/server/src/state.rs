//! Application state shared across route handlers.

use chatai_llm::Relay;

/// Shared application state.
///
/// The relay is stateless; cloning only bumps the backend's reference count.
#[derive(Clone)]
pub struct AppState {
    pub relay: Relay,
}

impl AppState {
    #[must_use]
    pub fn new(relay: Relay) -> Self {
        Self { relay }
    }
}
