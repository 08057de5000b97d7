//! Nearby venues from a Foursquare-compatible places search

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::{VenueSource, get_json};
use crate::config::PlacesConfig;
use crate::error::PodcastError;
use crate::models::{Coordinate, Venue, VenueSelection};

const PROVIDER: &str = "places";

/// Search categories one of which is picked at random per request
pub const VENUE_CATEGORIES: [&str; 12] = [
    "museum",
    "landmark",
    "art gallery",
    "theater",
    "historical site",
    "park",
    "scenic viewpoint",
    "monument",
    "street art",
    "live music",
    "brewery",
    "unique cafe",
];

pub struct FoursquareVenues {
    client: Client,
    api_key: String,
    base_url: String,
    result_limit: u32,
}

#[derive(Debug, Deserialize)]
struct PlacesResponse {
    results: Vec<Place>,
}

#[derive(Debug, Deserialize)]
struct Place {
    name: String,
    #[serde(default)]
    categories: Vec<PlaceCategory>,
}

#[derive(Debug, Deserialize)]
struct PlaceCategory {
    name: String,
}

impl From<Place> for Venue {
    fn from(place: Place) -> Self {
        Venue {
            name: place.name,
            category: place.categories.into_iter().next().map(|c| c.name),
        }
    }
}

impl FoursquareVenues {
    pub fn new(client: Client, config: &PlacesConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone().unwrap_or_default(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            result_limit: config.result_limit,
        }
    }

    async fn fetch(
        &self,
        coordinate: &Coordinate,
        category: &str,
    ) -> Result<Vec<Venue>, PodcastError> {
        let url = format!("{}/v3/places/search", self.base_url);
        let request = self
            .client
            .get(url)
            .header("accept", "application/json")
            .header("Authorization", self.api_key.as_str())
            .query(&[
                ("ll", coordinate.comma_separated()),
                ("query", category.to_string()),
                ("limit", self.result_limit.to_string()),
            ]);

        let response: PlacesResponse = get_json(request, PROVIDER).await?;
        Ok(response.results.into_iter().map(Venue::from).collect())
    }
}

#[async_trait]
impl VenueSource for FoursquareVenues {
    #[instrument(skip(self), fields(coordinate = %coordinate.format_coordinates()))]
    async fn venues(&self, coordinate: &Coordinate, category: &str) -> VenueSelection {
        match self.fetch(coordinate, category).await {
            Ok(venues) => {
                debug!("Found {} venues for '{}'", venues.len(), category);
                VenueSelection {
                    venues,
                    category: category.to_string(),
                }
            }
            Err(e) => {
                warn!("Venue search failed, continuing without venues: {}", e);
                VenueSelection::empty()
            }
        }
    }
}
