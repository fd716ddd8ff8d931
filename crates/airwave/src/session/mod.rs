//! Playback session
//!
//! The session store, the playback driver it delegates to, and the change
//! bus that notifies the presentation layer.

pub mod bus;
pub mod driver;
pub mod state;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;

pub use bus::ChangeBus;
pub use driver::{EventOutcome, PlaybackDriver};
pub use state::{PlaybackStatus, SessionError, SessionErrorKind, SessionState};
pub use store::SessionStore;
