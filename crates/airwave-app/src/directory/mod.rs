//! Station directory
//!
//! Read-only access to a station directory service (Radio Browser).

pub mod radio_browser;
pub mod traits;
pub mod types;

pub use radio_browser::RadioBrowserDirectory;
pub use traits::StationDirectory;
pub use types::{Category, CategoryKind};
