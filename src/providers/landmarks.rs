//! Nearby article titles from the MediaWiki geosearch API

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::{LandmarkSource, get_json};
use crate::config::LandmarksConfig;
use crate::error::PodcastError;
use crate::models::{Coordinate, LandmarkTitle};

const PROVIDER: &str = "landmarks";

pub struct WikipediaLandmarks {
    client: Client,
    base_url: String,
    radius_meters: u32,
    result_limit: u32,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    query: GeoQuery,
}

#[derive(Debug, Deserialize)]
struct GeoQuery {
    geosearch: Vec<GeoResult>,
}

#[derive(Debug, Deserialize)]
struct GeoResult {
    title: String,
}

impl WikipediaLandmarks {
    pub fn new(client: Client, config: &LandmarksConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            radius_meters: config.radius_meters,
            result_limit: config.result_limit,
        }
    }

    async fn fetch(&self, coordinate: &Coordinate) -> Result<Vec<LandmarkTitle>, PodcastError> {
        let url = format!("{}/w/api.php", self.base_url);
        let request = self.client.get(url).query(&[
            ("action", "query".to_string()),
            ("format", "json".to_string()),
            ("list", "geosearch".to_string()),
            ("gscoord", coordinate.pipe_separated()),
            ("gsradius", self.radius_meters.to_string()),
            ("gslimit", self.result_limit.to_string()),
        ]);

        let response: QueryResponse = get_json(request, PROVIDER).await?;
        Ok(response
            .query
            .geosearch
            .into_iter()
            .map(|result| result.title)
            .collect())
    }
}

#[async_trait]
impl LandmarkSource for WikipediaLandmarks {
    #[instrument(skip(self), fields(coordinate = %coordinate.format_coordinates()))]
    async fn landmarks(&self, coordinate: &Coordinate) -> Vec<LandmarkTitle> {
        match self.fetch(coordinate).await {
            Ok(titles) => {
                debug!("Found {} landmarks", titles.len());
                titles
            }
            Err(e) => {
                warn!("Landmark search failed, continuing without landmarks: {}", e);
                Vec::new()
            }
        }
    }
}
