//! Storage layer for JSON persistence
//!
//! File helpers for the config directory, plus `FileStore`, the file-backed
//! key-value store the session persists favorites and recents through.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use airwave::error::AirwaveError;
use airwave::library::KeyValueStore;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::config::app::NAME;
use crate::error::{AppError, Result};

/// Get the application config directory path
pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .map(|p| p.join(NAME))
        .ok_or_else(|| {
            AppError::Config(
                "Could not determine config directory. HOME environment variable may not be set."
                    .to_string(),
            )
        })
}

/// Ensure the config directory exists, creating it if necessary
pub fn ensure_config_dir() -> Result<PathBuf> {
    let dir = config_dir()?;
    create_dir_if_needed(&dir).map_err(AppError::Config)?;
    Ok(dir)
}

/// Get path to a specific data file in the default config directory
pub fn data_path(filename: &str) -> Result<PathBuf> {
    Ok(config_dir()?.join(filename))
}

// =============================================================================
// Low-level file access (messages carry the path)
// =============================================================================

fn create_dir_if_needed(path: &Path) -> std::result::Result<(), String> {
    fs::create_dir_all(path).map_err(|e| match e.kind() {
        ErrorKind::PermissionDenied => {
            format!("Permission denied: cannot create directory {:?}", path)
        }
        _ => format!("Failed to create directory {:?}: {}", path, e),
    })
}

/// Read a file; `Ok(None)` when it does not exist
fn read_file(path: &Path) -> std::result::Result<Option<String>, String> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) => match e.kind() {
            ErrorKind::NotFound => Ok(None),
            ErrorKind::PermissionDenied => {
                Err(format!("Permission denied: cannot read {:?}", path))
            }
            _ => Err(format!("Failed to read {:?}: {}", path, e)),
        },
    }
}

/// Write a file, creating parent directories first
fn write_file(path: &Path, content: &str) -> std::result::Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_if_needed(parent)?;
        }
    }
    fs::write(path, content).map_err(|e| write_error_message(path, &e))
}

fn write_error_message(path: &Path, e: &std::io::Error) -> String {
    match e.kind() {
        ErrorKind::PermissionDenied => format!("Permission denied: cannot write to {:?}", path),
        ErrorKind::ReadOnlyFilesystem => {
            format!("Cannot write to {:?}: filesystem is read-only", path)
        }
        _ => format!("Failed to write to {:?}: {}", path, e),
    }
}

// =============================================================================
// Typed JSON files
// =============================================================================

/// Load data from a JSON file at a specific path
///
/// Returns `None` if the file doesn't exist or is empty.
/// Returns an error if the file exists but can't be read or parsed.
pub fn load_from<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let content = match read_file(path).map_err(AppError::Config)? {
        Some(c) => c,
        None => return Ok(None),
    };

    if content.trim().is_empty() {
        return Ok(None);
    }

    let data = serde_json::from_str(&content)
        .map_err(|e| AppError::Config(format!("Failed to parse {:?}: {}", path, e)))?;
    Ok(Some(data))
}

/// Save data to a JSON file at a specific path
pub fn save_to<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(data)
        .map_err(|e| AppError::Config(format!("Failed to serialize data: {}", e)))?;
    write_file(path, &content).map_err(AppError::Config)
}

/// Load data from a JSON file in the config directory
pub fn load<T: DeserializeOwned>(filename: &str) -> Result<Option<T>> {
    load_from(&data_path(filename)?)
}

/// Save data to a JSON file in the config directory
pub fn save<T: Serialize>(filename: &str, data: &T) -> Result<()> {
    save_to(&data_path(filename)?, data)
}

// =============================================================================
// FileStore
// =============================================================================

/// Key-value store with one `<key>.json` file per key
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Store rooted at `dir`; the directory is created on first write
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the application config directory
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(config_dir()?))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> airwave::error::Result<Option<String>> {
        let path = self.path_for(key);
        let content = read_file(&path).map_err(AirwaveError::Storage)?;
        if content.is_none() {
            debug!(path = ?path, "no stored record");
        }
        Ok(content)
    }

    fn set(&mut self, key: &str, value: &str) -> airwave::error::Result<()> {
        write_file(&self.path_for(key), value).map_err(AirwaveError::Storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airwave::library::{Persistence, Station};
    use serde::{Deserialize, Serialize};
    use std::env::temp_dir;
    use std::sync::atomic::{AtomicU32, Ordering};

    static TEST_COUNTER: AtomicU32 = AtomicU32::new(0);

    fn temp_path(name: &str) -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
        temp_dir().join(format!("airwave_test_{}_{}", id, name))
    }

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct TestData {
        name: String,
        value: i32,
    }

    #[test]
    fn test_save_and_load() {
        let path = temp_path("save_load.json");
        let data = TestData {
            name: "test".to_string(),
            value: 42,
        };

        save_to(&path, &data).unwrap();
        assert!(path.exists());

        let loaded: Option<TestData> = load_from(&path).unwrap();
        assert_eq!(loaded, Some(data));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_nonexistent() {
        let path = temp_path("nonexistent.json");
        let loaded: Option<TestData> = load_from(&path).unwrap();
        assert_eq!(loaded, None);
    }

    #[test]
    fn test_load_empty_file() {
        let path = temp_path("empty.json");
        fs::write(&path, "  \n").unwrap();

        let loaded: Option<TestData> = load_from(&path).unwrap();
        assert_eq!(loaded, None);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_invalid_json_mentions_path() {
        let path = temp_path("invalid.json");
        fs::write(&path, "not valid json").unwrap();

        let err = load_from::<TestData>(&path).unwrap_err().to_string();
        assert!(err.contains("invalid.json"));

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_creates_parent_dirs() {
        let root = temp_path("nested");
        let path = root.join("subdir").join("data.json");

        save_to(&path, &TestData { name: "nested".to_string(), value: 100 }).unwrap();
        assert!(path.exists());

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_file_store_get_missing_key() {
        let store = FileStore::new(temp_path("store_missing"));
        assert_eq!(store.get("favorites").unwrap(), None);
    }

    #[test]
    fn test_file_store_set_then_get() {
        let root = temp_path("store_roundtrip");
        let mut store = FileStore::new(&root);

        store.set("favorites", "[]").unwrap();
        assert!(root.join("favorites.json").exists());
        assert_eq!(store.get("favorites").unwrap().as_deref(), Some("[]"));

        store.set("favorites", "[1]").unwrap();
        assert_eq!(store.get("favorites").unwrap().as_deref(), Some("[1]"));

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_file_store_write_failure_is_storage_error() {
        // A regular file where the directory should be
        let blocker = temp_path("store_blocker");
        fs::write(&blocker, "x").unwrap();

        let mut store = FileStore::new(blocker.join("inner"));
        let err = store.set("favorites", "[]").unwrap_err();
        assert!(matches!(err, AirwaveError::Storage(_)));
        assert!(err.to_string().contains("store_blocker"));

        let _ = fs::remove_file(&blocker);
    }

    #[test]
    fn test_write_error_on_read_only_filesystem() {
        let path = Path::new("/mnt/ro/favorites.json");
        let e = std::io::Error::from(ErrorKind::ReadOnlyFilesystem);
        assert_eq!(
            write_error_message(path, &e),
            "Cannot write to \"/mnt/ro/favorites.json\": filesystem is read-only"
        );
    }

    #[test]
    fn test_file_store_persists_across_sessions() {
        let root = temp_path("store_restart");
        let x = Station::new("x", "Station X", "http://x/stream");
        let y = Station::new("y", "Station Y", "http://y/stream");

        {
            let mut persistence = Persistence::new(FileStore::new(&root));
            let mut favorites = persistence.load_favorites();
            favorites.toggle(&x);
            favorites.toggle(&y);
            persistence.save_favorites(&favorites).unwrap();
        }

        let persistence = Persistence::new(FileStore::new(&root));
        let ids: Vec<_> = persistence.load_favorites().iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids, vec!["x", "y"]);

        let _ = fs::remove_dir_all(&root);
    }

    #[test]
    fn test_file_store_malformed_record_loads_empty() {
        let root = temp_path("store_malformed");
        let mut store = FileStore::new(&root);
        store.set("recently-played", "{oops").unwrap();

        let persistence = Persistence::new(store);
        assert!(persistence.load_recent().is_empty());

        let _ = fs::remove_dir_all(&root);
    }
}
