//! Shared directory types

use std::fmt;

/// A browsable category (genre, country, language)
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    /// Display name, also the value used to filter stations
    pub name: String,
    /// What kind of category this is
    pub kind: CategoryKind,
    /// Number of stations in this category
    pub station_count: usize,
    /// ISO code for countries (3166-1) and languages (639), when known
    pub code: Option<String>,
}

impl Category {
    /// Create a new category
    pub fn new(name: impl Into<String>, kind: CategoryKind, station_count: usize) -> Self {
        Self {
            name: name.into(),
            kind,
            station_count,
            code: None,
        }
    }

    /// Set the ISO code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

/// The type of a browsable category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    Genre,
    Country,
    Language,
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryKind::Genre => write!(f, "genre"),
            CategoryKind::Country => write!(f, "country"),
            CategoryKind::Language => write!(f, "language"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_creation() {
        let cat = Category::new("rock", CategoryKind::Genre, 120);
        assert_eq!(cat.name, "rock");
        assert_eq!(cat.kind, CategoryKind::Genre);
        assert_eq!(cat.station_count, 120);
        assert_eq!(cat.code, None);
    }

    #[test]
    fn test_category_with_code() {
        let cat = Category::new("Germany", CategoryKind::Country, 5000).with_code("DE");
        assert_eq!(cat.code.as_deref(), Some("DE"));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(CategoryKind::Language.to_string(), "language");
    }
}
