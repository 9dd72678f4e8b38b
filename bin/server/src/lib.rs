//! chatai relay server.
//!
//! A single stateless endpoint: `POST /` takes the client's conversation,
//! prefixes the system instruction and returns the model's reply.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::{RelayConfig, ServerConfig};
pub use error::RelayError;
pub use routes::create_router;
pub use state::AppState;
