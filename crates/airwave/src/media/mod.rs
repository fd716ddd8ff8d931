//! Media output
//!
//! The `MediaHandle` trait plus the external-player implementation.

#[cfg(unix)]
pub mod mpv;
pub mod types;

#[cfg(unix)]
pub use mpv::MpvHandle;
pub use types::{MediaEvent, MediaEventKind, MediaHandle, RequestToken};
