//! Session state types
//!
//! `SessionState` is the snapshot handed to subscribers after every change.

use std::fmt;

use crate::config::session::DEFAULT_VOLUME;
use crate::library::{Favorites, RecentList, Station};

/// Where playback currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Idle,
    Loading,
    Playing,
    Paused,
    Errored,
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackStatus::Idle => write!(f, "Idle"),
            PlaybackStatus::Loading => write!(f, "Loading"),
            PlaybackStatus::Playing => write!(f, "Playing"),
            PlaybackStatus::Paused => write!(f, "Paused"),
            PlaybackStatus::Errored => write!(f, "Error"),
        }
    }
}

/// Recoverable failures surfaced to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionErrorKind {
    /// The stream failed to load or play
    StreamUnavailable,
    /// Resuming a paused or failed stream did not work
    ResumeFailed,
    /// Favorites or history could not be written
    StorageUnavailable,
}

/// The last error the session ran into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionError {
    pub kind: SessionErrorKind,
    pub message: String,
}

impl SessionError {
    pub fn new(kind: SessionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn stream_unavailable(message: impl Into<String>) -> Self {
        Self::new(SessionErrorKind::StreamUnavailable, message)
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Playback and library state
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    /// Selected station; `None` exactly when `status` is `Idle`
    pub current_station: Option<Station>,
    pub status: PlaybackStatus,
    /// Output volume in [0, 1]
    pub volume: f32,
    pub last_error: Option<SessionError>,
    pub favorites: Favorites,
    pub recent: RecentList,
    /// True while `Loading` because a stream that was playing stalled
    pub buffering: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            current_station: None,
            status: PlaybackStatus::Idle,
            volume: DEFAULT_VOLUME,
            last_error: None,
            favorites: Favorites::new(),
            recent: RecentList::new(),
            buffering: false,
        }
    }
}

impl SessionState {
    pub fn is_playing(&self) -> bool {
        self.status == PlaybackStatus::Playing
    }

    pub fn is_loading(&self) -> bool {
        self.status == PlaybackStatus::Loading
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.favorites.contains(id)
    }

    /// Id of the selected station, if any
    pub fn current_id(&self) -> Option<&str> {
        self.current_station.as_ref().map(|s| s.id.as_str())
    }
}

/// Clamp a requested volume into [0, 1]; NaN becomes silence
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}
