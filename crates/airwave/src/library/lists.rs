//! Favorites and recently-played lists
//!
//! Both lists are small, so they are plain vectors scanned by id.

use serde::{Deserialize, Serialize};

use crate::config::session::RECENT_LIMIT;

use super::station::Station;

/// Favorite stations, unique by id, in the order they were added
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Favorites {
    stations: Vec<Station>,
}

impl Favorites {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a stored list, dropping repeated ids (first one wins)
    pub fn from_stations(stations: Vec<Station>) -> Self {
        let mut favorites = Self::new();
        for station in stations {
            if !favorites.contains(&station.id) {
                favorites.stations.push(station);
            }
        }
        favorites
    }

    /// Remove the station if present, append it otherwise.
    /// Returns true if the station is a favorite afterwards.
    pub fn toggle(&mut self, station: &Station) -> bool {
        if let Some(pos) = self.position(&station.id) {
            self.stations.remove(pos);
            false
        } else {
            self.stations.push(station.clone());
            true
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.stations.iter().position(|s| s.id == id)
    }

    pub fn as_slice(&self) -> &[Station] {
        &self.stations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Station> {
        self.stations.iter()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}

/// Recently played stations, most recent first, unique by id, bounded
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecentList {
    stations: Vec<Station>,
}

impl RecentList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a stored list, keeping the first occurrence of each id
    /// and at most `RECENT_LIMIT` entries.
    pub fn from_stations(stations: Vec<Station>) -> Self {
        let mut recent = Self::new();
        for station in stations {
            if recent.stations.len() == RECENT_LIMIT {
                break;
            }
            if !recent.stations.iter().any(|s| s.id == station.id) {
                recent.stations.push(station);
            }
        }
        recent
    }

    /// Move (or insert) the station to the front and truncate
    pub fn push_front(&mut self, station: &Station) {
        self.stations.retain(|s| s.id != station.id);
        self.stations.insert(0, station.clone());
        self.stations.truncate(RECENT_LIMIT);
    }

    pub fn clear(&mut self) {
        self.stations.clear();
    }

    pub fn first(&self) -> Option<&Station> {
        self.stations.first()
    }

    pub fn as_slice(&self) -> &[Station] {
        &self.stations
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Station> {
        self.stations.iter()
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }
}
