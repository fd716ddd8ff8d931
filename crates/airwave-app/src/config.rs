//! Configuration constants for airwave app services

/// Application metadata
pub mod app {
    /// Application name (used for config directory, etc.)
    pub const NAME: &str = "airwave";

    /// Settings data file name
    pub const SETTINGS_FILE: &str = "settings.json";

    /// Log file written by the interactive player
    pub const LOG_FILE: &str = "airwave.log";
}

/// Network-related configuration
pub mod network {
    /// User agent for HTTP requests
    pub const USER_AGENT: &str = concat!("Airwave/", env!("CARGO_PKG_VERSION"));

    /// Connection timeout in seconds
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;

    /// Read timeout in seconds
    pub const READ_TIMEOUT_SECS: u64 = 15;
}

/// Station directory configuration
pub mod directory {
    /// Radio Browser servers, tried in order
    pub const RADIO_BROWSER_SERVERS: &[&str] = &[
        "https://nl1.api.radio-browser.info",
        "https://at1.api.radio-browser.info",
        "https://de1.api.radio-browser.info",
    ];

    /// Default number of results per listing
    pub const DEFAULT_LIMIT: usize = 50;

    /// Upper bound for station listings
    pub const MAX_STATION_LIMIT: usize = 100;

    /// Upper bound for tag/country/language listings
    pub const MAX_CATEGORY_LIMIT: usize = 200;
}
