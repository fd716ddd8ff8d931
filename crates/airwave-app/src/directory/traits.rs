//! Station directory trait
//!
//! Defines the read-only queries the presentation layer runs against a
//! station directory service.

use airwave::library::Station;

use crate::error::Result;

use super::types::Category;

/// A source of radio station listings
///
/// Every listing takes a result-count limit. Implementations do not cache
/// or retry; an empty result is a valid answer.
pub trait StationDirectory: Send + Sync {
    /// Display name for the directory (e.g., "Radio Browser")
    fn name(&self) -> &'static str;

    /// Search stations by name
    fn search(&self, name: &str, limit: usize) -> Result<Vec<Station>>;

    /// Stations carrying a tag (genre)
    fn by_tag(&self, tag: &str, limit: usize) -> Result<Vec<Station>>;

    /// Stations from a country
    fn by_country(&self, country: &str, limit: usize) -> Result<Vec<Station>>;

    /// Stations broadcasting in a language
    fn by_language(&self, language: &str, limit: usize) -> Result<Vec<Station>>;

    /// Most voted stations
    fn top_voted(&self, limit: usize) -> Result<Vec<Station>>;

    /// Most clicked (trending) stations
    fn top_clicked(&self, limit: usize) -> Result<Vec<Station>>;

    /// Tags ordered by station count
    fn tags(&self, limit: usize) -> Result<Vec<Category>>;

    /// Countries ordered by station count
    fn countries(&self, limit: usize) -> Result<Vec<Category>>;

    /// Languages ordered by station count
    fn languages(&self, limit: usize) -> Result<Vec<Category>>;

    /// Look up a single station by id
    fn get_station(&self, id: &str) -> Result<Option<Station>>;

    /// Report that a station was played (for popularity tracking)
    fn report_click(&self, _id: &str) -> Result<()> {
        Ok(())
    }
}
