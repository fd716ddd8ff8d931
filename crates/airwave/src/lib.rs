//! Airwave: internet radio session engine
//!
//! Station model, favorites and history persistence, and the playback
//! session that coordinates a single media handle.
//!
//! ## Quick start
//!
//! ```no_run
//! use airwave::library::{MemoryStore, Station};
//! use airwave::media::MpvHandle;
//! use airwave::session::SessionStore;
//!
//! let (events_tx, events_rx) = crossbeam_channel::unbounded();
//! let mut session = SessionStore::new(MpvHandle::new(events_tx), MemoryStore::new());
//! session.select_station(Station::new("id", "Radio", "http://example.com/stream"));
//! for event in events_rx.iter() {
//!     session.handle_media_event(event);
//! }
//! ```

pub mod config;
pub mod error;
pub mod library;
pub mod media;
pub mod session;
