//! Configuration constants for the airwave engine

/// Session-related configuration
pub mod session {
    /// Maximum number of entries kept in the recently-played list
    pub const RECENT_LIMIT: usize = 20;

    /// Volume applied when nothing else has been configured
    pub const DEFAULT_VOLUME: f32 = 0.7;
}

/// Durable storage record names
pub mod storage {
    /// Record holding the serialized favorites list
    pub const FAVORITES_KEY: &str = "favorites";

    /// Record holding the serialized recently-played list
    pub const RECENT_KEY: &str = "recently-played";
}

/// Media player configuration
pub mod media {
    /// Default external player binary
    pub const DEFAULT_PLAYER: &str = "mpv";

    /// How long to wait for the player's IPC socket to appear (milliseconds)
    pub const IPC_CONNECT_TIMEOUT_MS: u64 = 5_000;

    /// Poll interval while waiting for the IPC socket (milliseconds)
    pub const IPC_POLL_INTERVAL_MS: u64 = 50;
}
