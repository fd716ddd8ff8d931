//! Airwave App Services
//!
//! Station directory, file persistence, settings, and the controller that
//! owns the listening session. Depends on the `airwave` engine crate.

pub mod app;
pub mod config;
pub mod data;
pub mod directory;
pub mod error;
pub mod network;
