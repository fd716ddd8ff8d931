//! Station record
//!
//! A station as handed out by the directory. Field names follow the Radio
//! Browser JSON schema so persisted lists stay interchangeable with it.

use std::hash::{Hash, Hasher};

use serde::{Deserialize, Deserializer, Serialize};

/// Convert an empty string to None
fn non_empty(s: &str) -> Option<&str> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

/// Deserialize `null` as the type's default value
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Tags travel as a comma-separated string in Radio Browser records but may
/// also be stored as a plain list.
mod tag_list {
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTags {
        Joined(String),
        List(Vec<String>),
    }

    pub fn serialize<S: Serializer>(tags: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&tags.join(","))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<String>, D::Error> {
        let raw = Option::<RawTags>::deserialize(deserializer)?;
        let items: Vec<String> = match raw {
            None => Vec::new(),
            Some(RawTags::Joined(s)) => s.split(',').map(str::to_string).collect(),
            Some(RawTags::List(v)) => v,
        };

        let mut tags: Vec<String> = Vec::with_capacity(items.len());
        for tag in items {
            let tag = tag.trim();
            if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
                tags.push(tag.to_string());
            }
        }
        Ok(tags)
    }
}

/// An internet radio station
///
/// Identity is the directory-assigned `id` alone: two records with the same
/// id compare equal even if their metadata differs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Station {
    /// Opaque unique identifier (Radio Browser `stationuuid`)
    #[serde(rename = "stationuuid")]
    pub id: String,
    /// Display name
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Primary stream URL as submitted to the directory
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    /// Stream URL after the directory followed playlists and redirects
    #[serde(default, deserialize_with = "null_as_default")]
    pub url_resolved: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub favicon: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub country: String,
    /// ISO 3166-1 alpha-2 country code
    #[serde(rename = "countrycode", default, deserialize_with = "null_as_default")]
    pub country_code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub language: String,
    #[serde(default, with = "tag_list")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub codec: String,
    /// Bitrate in kbps, 0 when unknown
    #[serde(default, deserialize_with = "null_as_default")]
    pub bitrate: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub votes: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub homepage: String,
}

impl Station {
    /// Create a station with minimal info
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            url_resolved: String::new(),
            favicon: String::new(),
            country: String::new(),
            country_code: String::new(),
            state: String::new(),
            language: String::new(),
            tags: Vec::new(),
            codec: String::new(),
            bitrate: 0,
            votes: 0,
            homepage: String::new(),
        }
    }

    /// The URL to hand to the player: resolved URL first, primary URL otherwise
    pub fn stream_url(&self) -> &str {
        non_empty(&self.url_resolved).unwrap_or(&self.url)
    }

    /// Icon URL, if the directory has one
    pub fn icon_url(&self) -> Option<&str> {
        non_empty(&self.favicon)
    }

    /// Bitrate in kbps, if known
    pub fn bitrate_kbps(&self) -> Option<u32> {
        (self.bitrate > 0).then_some(self.bitrate)
    }

    /// Country and state joined for display (e.g. "United States, California")
    pub fn location(&self) -> Option<String> {
        match (non_empty(&self.country), non_empty(&self.state)) {
            (Some(c), Some(s)) => Some(format!("{c}, {s}")),
            (Some(c), None) => Some(c.to_string()),
            (None, Some(s)) => Some(s.to_string()),
            (None, None) => None,
        }
    }

    pub fn with_resolved_url(mut self, url: impl Into<String>) -> Self {
        self.url_resolved = url.into();
        self
    }

    pub fn with_country(mut self, country: impl Into<String>, code: impl Into<String>) -> Self {
        self.country = country.into();
        self.country_code = code.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_audio_info(mut self, codec: impl Into<String>, bitrate: u32) -> Self {
        self.codec = codec.into();
        self.bitrate = bitrate;
        self
    }

    pub fn with_favicon(mut self, favicon: impl Into<String>) -> Self {
        self.favicon = favicon.into();
        self
    }
}

impl PartialEq for Station {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Station {}

impl Hash for Station {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
