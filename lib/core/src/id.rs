//! Strongly-typed identifiers for client sessions and relayed requests.
//!
//! IDs wrap a ULID and display with a short type prefix (`sess_...`,
//! `rly_...`) so they read unambiguously in log output.

use std::fmt;
use ulid::Ulid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(Ulid);

        impl $name {
            #[must_use]
            pub fn new() -> Self {
                Self(Ulid::new())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "_{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Unique identifier for a client conversation session.
    ConversationSessionId,
    "sess"
);

define_id!(
    /// Identifier attached to one relayed completion request, used to
    /// correlate log lines for a single round trip.
    RelayRequestId,
    "rly"
);
