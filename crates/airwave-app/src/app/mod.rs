//! Application services shared by frontends
//!
//! The controller owns the session; frontends talk to it with `AppCommand`s.

pub mod controller;
pub mod state;

pub use controller::AppController;
pub use state::AppCommand;
