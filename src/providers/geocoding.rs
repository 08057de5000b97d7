//! Reverse geocoding through an OpenCage-compatible API

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::{CitySource, get_json};
use crate::config::GeocodingConfig;
use crate::error::PodcastError;
use crate::models::Coordinate;

const PROVIDER: &str = "geocoding";

pub struct OpenCageGeocoder {
    client: Client,
    api_key: String,
    base_url: String,
    fallback_city: String,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    components: AddressComponents,
}

#[derive(Debug, Deserialize)]
struct AddressComponents {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
}

impl AddressComponents {
    /// Prefer city > town > village > municipality
    fn place_name(self) -> Option<String> {
        self.city
            .or(self.town)
            .or(self.village)
            .or(self.municipality)
            .filter(|name| !name.trim().is_empty())
    }
}

impl OpenCageGeocoder {
    pub fn new(client: Client, config: &GeocodingConfig, fallback_city: &str) -> Self {
        Self {
            client,
            api_key: config.api_key.clone().unwrap_or_default(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            fallback_city: fallback_city.to_string(),
        }
    }

    async fn fetch(&self, coordinate: &Coordinate) -> Result<String, PodcastError> {
        let url = format!("{}/geocode/v1/json", self.base_url);
        let request = self.client.get(url).query(&[
            (
                "q",
                format!("{} {}", coordinate.latitude, coordinate.longitude),
            ),
            ("key", self.api_key.clone()),
        ]);

        let response: GeocodeResponse = get_json(request, PROVIDER).await?;
        response
            .results
            .into_iter()
            .next()
            .and_then(|result| result.components.place_name())
            .ok_or_else(|| PodcastError::upstream(PROVIDER, "no city for coordinate"))
    }
}

#[async_trait]
impl CitySource for OpenCageGeocoder {
    #[instrument(skip(self), fields(coordinate = %coordinate.format_coordinates()))]
    async fn city_name(&self, coordinate: &Coordinate) -> String {
        match self.fetch(coordinate).await {
            Ok(city) => {
                debug!("Reverse geocoded to {}", city);
                city
            }
            Err(e) => {
                warn!(
                    "Reverse geocoding failed, using '{}': {}",
                    self.fallback_city, e
                );
                self.fallback_city.clone()
            }
        }
    }
}
