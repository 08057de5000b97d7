//! Things happening and worth seeing around a coordinate

use serde::{Deserialize, Serialize};

/// Category rendered for venues the upstream left uncategorized
pub const UNCATEGORIZED: &str = "uncategorized";

/// A single news headline
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct NewsItem {
    pub title: String,
}

/// A nearby place returned by the places search
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Venue {
    pub name: String,
    /// First category reported by the upstream, if any
    pub category: Option<String>,
}

impl Venue {
    /// Category name, defaulting to "uncategorized"
    #[must_use]
    pub fn category_or_default(&self) -> &str {
        self.category
            .as_deref()
            .filter(|category| !category.is_empty())
            .unwrap_or(UNCATEGORIZED)
    }
}

/// Venues found for one randomly chosen search category
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct VenueSelection {
    pub venues: Vec<Venue>,
    /// The category the venues were searched for, empty on failure
    pub category: String,
}

impl VenueSelection {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Title of an encyclopedia article near the coordinate
pub type LandmarkTitle = String;
