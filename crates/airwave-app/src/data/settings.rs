//! Application settings management
//!
//! User preferences persisted as `settings.json` in the config directory.

use std::path::Path;

use airwave::config::media::DEFAULT_PLAYER;
use airwave::config::session::DEFAULT_VOLUME;
use airwave::session::state::clamp_volume;
use serde::{Deserialize, Serialize};

use crate::config::app::SETTINGS_FILE;
use crate::config::directory::DEFAULT_LIMIT;
use crate::data::storage;
use crate::error::Result;

/// Settings file format version for migrations
const SETTINGS_VERSION: u32 = 1;

/// Application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// File format version
    #[serde(default = "default_version")]
    pub version: u32,

    /// Volume restored at startup (0.0 - 1.0)
    #[serde(default = "default_volume")]
    pub volume: f32,

    /// Directory server to try before the built-in list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory_server: Option<String>,

    /// Media player executable
    #[serde(default = "default_player")]
    pub player_command: String,

    /// Results per listing
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

fn default_volume() -> f32 {
    DEFAULT_VOLUME
}

fn default_player() -> String {
    DEFAULT_PLAYER.to_string()
}

fn default_list_limit() -> usize {
    DEFAULT_LIMIT
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            volume: default_volume(),
            directory_server: None,
            player_command: default_player(),
            list_limit: default_list_limit(),
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load settings from the config directory; a missing file gives defaults
    pub fn load() -> Result<Self> {
        Ok(storage::load::<Settings>(SETTINGS_FILE)?.unwrap_or_default())
    }

    /// Load settings from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        Ok(storage::load_from::<Settings>(path)?.unwrap_or_default())
    }

    /// Save settings to the config directory
    pub fn save(&self) -> Result<()> {
        storage::save(SETTINGS_FILE, self)
    }

    /// Save settings to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        storage::save_to(path, self)
    }

    /// Set volume (clamped to 0.0 - 1.0)
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = clamp_volume(volume);
    }

    /// Directory servers in the order they should be tried
    pub fn directory_servers(&self, defaults: &[&str]) -> Vec<String> {
        let mut servers: Vec<String> = self
            .directory_server
            .iter()
            .filter(|s| !s.trim().is_empty())
            .cloned()
            .collect();
        for server in defaults {
            if !servers.iter().any(|s| s == server) {
                servers.push(server.to_string());
            }
        }
        servers
    }
}
