//! Core domain types for Bookstand.

use serde::{Deserialize, Serialize};

/// One book in the catalog. Immutable once loaded; the UI never writes back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: String,
    pub title: String,
    pub author: String,
    pub image: String,
    pub description: String,
    pub published: String,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl BookRecord {
    /// Leading year of the `published` date string (`YYYY-MM-DD` or bare `YYYY`).
    pub fn published_year(&self) -> Option<&str> {
        let year = self
            .published
            .split('-')
            .next()
            .map(str::trim)
            .unwrap_or("");
        if !year.is_empty() && year.chars().all(|ch| ch.is_ascii_digit()) {
            Some(year)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Day,
    Night,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Day => "day",
            Theme::Night => "night",
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Theme {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" | "light" => Ok(Theme::Day),
            "night" | "dark" => Ok(Theme::Night),
            _ => Err("unknown theme"),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Night,
        }
    }
}

impl Settings {
    pub fn cycle_theme(&mut self) {
        self.theme = match self.theme {
            Theme::Day => Theme::Night,
            Theme::Night => Theme::Day,
        };
    }
}

/// Dropdown-style choice over an id table: everything, or one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Any,
    Selected(String),
}

impl Default for Selector {
    fn default() -> Self {
        Self::Any
    }
}

impl Selector {
    pub fn matches(&self, id: &str) -> bool {
        match self {
            Selector::Any => true,
            Selector::Selected(wanted) => wanted == id,
        }
    }
}

/// Search form contents at the moment of submission. Not persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub genre: Selector,
    pub author: Selector,
    pub title: String,
}

impl FilterCriteria {
    /// True when the criteria cannot exclude anything.
    pub fn is_identity(&self) -> bool {
        self.genre == Selector::Any && self.author == Selector::Any && self.title.trim().is_empty()
    }
}
