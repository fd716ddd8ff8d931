//! Station library: the station record, favorites, history, persistence

pub mod lists;
pub mod persistence;
pub mod station;

pub use lists::{Favorites, RecentList};
pub use persistence::{KeyValueStore, MemoryStore, Persistence};
pub use station::Station;
