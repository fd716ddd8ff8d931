//! Data persistence
//!
//! Settings and the file-backed station store.

pub mod settings;
pub mod storage;

pub use settings::Settings;
pub use storage::{config_dir, data_path, ensure_config_dir, load, save, FileStore};
