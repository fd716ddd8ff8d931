//! Commands accepted by the app controller
//!
//! `AppCommand` is the unified command type sent by any frontend. State flows
//! back as `SessionState` snapshots on subscriber channels.

use airwave::library::Station;

/// Commands sent by a frontend
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    // Playback
    Select(Station),
    TogglePlayback,
    SetVolume(f32),
    Stop,

    // Library
    ToggleFavorite(Station),
    ClearRecent,

    // Stop playback and exit the controller loop
    Shutdown,
}
