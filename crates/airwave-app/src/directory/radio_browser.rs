//! Radio Browser API directory
//!
//! Implementation of `StationDirectory` for the Radio Browser directory
//! (<https://www.radio-browser.info/>). Servers are tried in order and the
//! first one that answers wins.

use airwave::library::Station;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::directory::{MAX_CATEGORY_LIMIT, MAX_STATION_LIMIT, RADIO_BROWSER_SERVERS};
use crate::error::{AppError, Result};
use crate::network::HttpClient;

use super::traits::StationDirectory;
use super::types::{Category, CategoryKind};

// =============================================================================
// Internal API response types (serde)
// =============================================================================

/// Tag, country, and language listings share one shape
#[derive(Debug, Deserialize)]
struct RbCategory {
    #[serde(default)]
    name: String,
    #[serde(default)]
    stationcount: usize,
    #[serde(default, alias = "iso_3166_1", alias = "iso_639")]
    code: Option<String>,
}

impl RbCategory {
    fn into_category(self, kind: CategoryKind) -> Option<Category> {
        let name = self.name.trim();
        if name.is_empty() {
            return None;
        }
        let category = Category::new(name, kind, self.stationcount);
        Some(match self.code.filter(|c| !c.trim().is_empty()) {
            Some(code) => category.with_code(code),
            None => category,
        })
    }
}

// =============================================================================
// Request helpers
// =============================================================================

/// Build `<server>/json/<segments...>`, percent-encoding each segment
fn endpoint(server: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(server)
        .map_err(|e| AppError::Config(format!("Invalid directory server '{server}': {e}")))?;
    url.path_segments_mut()
        .map_err(|_| AppError::Config(format!("Directory server '{server}' is not a base URL")))?
        .pop_if_empty()
        .push("json")
        .extend(segments);
    Ok(url)
}

/// Query for station listings: capped limit, best voted first, no broken streams
fn station_query(limit: usize) -> Vec<(&'static str, String)> {
    vec![
        ("limit", limit.min(MAX_STATION_LIMIT).to_string()),
        ("order", "votes".to_string()),
        ("reverse", "true".to_string()),
        ("hidebroken", "true".to_string()),
    ]
}

/// Query for the top-N endpoints, which are already ordered
fn top_query(limit: usize) -> Vec<(&'static str, String)> {
    vec![
        ("limit", limit.min(MAX_STATION_LIMIT).to_string()),
        ("hidebroken", "true".to_string()),
    ]
}

/// Query for category listings: largest first
fn category_query(limit: usize) -> Vec<(&'static str, String)> {
    vec![
        ("limit", limit.min(MAX_CATEGORY_LIMIT).to_string()),
        ("order", "stationcount".to_string()),
        ("reverse", "true".to_string()),
    ]
}

// =============================================================================
// RadioBrowserDirectory
// =============================================================================

/// Radio Browser API client
///
/// Searches the [Radio Browser](https://www.radio-browser.info/) directory,
/// which is a free, open-source community database of internet radio stations.
pub struct RadioBrowserDirectory {
    client: HttpClient,
    servers: Vec<String>,
}

impl RadioBrowserDirectory {
    /// Create a client using the public server list
    pub fn new() -> Result<Self> {
        Self::with_servers(RADIO_BROWSER_SERVERS.iter().map(|s| s.to_string()).collect())
    }

    /// Create a client with a single custom base URL (for mirrors or testing)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Self::with_servers(vec![base_url.into()])
    }

    /// Create a client with an explicit fallback list
    pub fn with_servers(servers: Vec<String>) -> Result<Self> {
        if servers.is_empty() {
            return Err(AppError::Config("No directory servers configured".to_string()));
        }
        Ok(Self {
            client: HttpClient::new()?,
            servers,
        })
    }

    pub fn servers(&self) -> &[String] {
        &self.servers
    }

    /// GET an endpoint from the first server that answers
    fn fetch<T: DeserializeOwned>(&self, segments: &[&str], query: &[(&str, String)]) -> Result<T> {
        let mut last_err = None;
        for server in &self.servers {
            let url = endpoint(server, segments)?;
            debug!(%url, "directory request");
            match self.client.get_json(url, query) {
                Ok(data) => return Ok(data),
                Err(e) => {
                    warn!(server = %server, error = %e, "directory server failed, trying next");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err
            .unwrap_or_else(|| AppError::Config("No directory servers configured".to_string())))
    }

    fn stations(&self, segments: &[&str], query: &[(&str, String)]) -> Result<Vec<Station>> {
        self.fetch(segments, query)
    }

    fn categories(&self, segment: &str, kind: CategoryKind, limit: usize) -> Result<Vec<Category>> {
        let raw: Vec<RbCategory> = self.fetch(&[segment], &category_query(limit))?;
        Ok(raw.into_iter().filter_map(|c| c.into_category(kind)).collect())
    }
}

impl StationDirectory for RadioBrowserDirectory {
    fn name(&self) -> &'static str {
        "Radio Browser"
    }

    fn search(&self, name: &str, limit: usize) -> Result<Vec<Station>> {
        let mut query = station_query(limit);
        query.push(("name", name.to_string()));
        self.stations(&["stations", "search"], &query)
    }

    fn by_tag(&self, tag: &str, limit: usize) -> Result<Vec<Station>> {
        self.stations(&["stations", "bytag", tag], &station_query(limit))
    }

    fn by_country(&self, country: &str, limit: usize) -> Result<Vec<Station>> {
        self.stations(&["stations", "bycountry", country], &station_query(limit))
    }

    fn by_language(&self, language: &str, limit: usize) -> Result<Vec<Station>> {
        self.stations(&["stations", "bylanguage", language], &station_query(limit))
    }

    fn top_voted(&self, limit: usize) -> Result<Vec<Station>> {
        self.stations(&["stations", "topvote"], &top_query(limit))
    }

    fn top_clicked(&self, limit: usize) -> Result<Vec<Station>> {
        self.stations(&["stations", "topclick"], &top_query(limit))
    }

    fn tags(&self, limit: usize) -> Result<Vec<Category>> {
        self.categories("tags", CategoryKind::Genre, limit)
    }

    fn countries(&self, limit: usize) -> Result<Vec<Category>> {
        self.categories("countries", CategoryKind::Country, limit)
    }

    fn languages(&self, limit: usize) -> Result<Vec<Category>> {
        self.categories("languages", CategoryKind::Language, limit)
    }

    fn get_station(&self, id: &str) -> Result<Option<Station>> {
        let stations = self.stations(&["stations", "byuuid", id], &[])?;
        Ok(stations.into_iter().next())
    }

    fn report_click(&self, id: &str) -> Result<()> {
        // Response body is not used
        let _: serde_json::Value = self.fetch(&["url", id], &[])?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
