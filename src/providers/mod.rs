//! Provider adapters
//!
//! One adapter per upstream data source. Every adapter fails closed: when
//! its upstream call fails the trait method still returns a value of its
//! declared type (a sentinel or an empty collection), so the prompt
//! assembler never has to handle a missing field.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rand::rngs::StdRng;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::config::PodcastConfig;
use crate::error::PodcastError;
use crate::models::{Coordinate, LandmarkTitle, NewsItem, VenueSelection, WeatherSnapshot};

pub mod geocoding;
pub mod landmarks;
pub mod news;
pub mod venues;
pub mod weather;

pub use geocoding::OpenCageGeocoder;
pub use landmarks::WikipediaLandmarks;
pub use news::NewsApiClient;
pub use venues::FoursquareVenues;
pub use weather::OpenWeatherMapClient;

const USER_AGENT: &str = concat!("LocalCast/", env!("CARGO_PKG_VERSION"));

/// Current weather at a coordinate
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current_weather(&self, coordinate: &Coordinate) -> WeatherSnapshot;
}

/// Reverse geocoding of a coordinate to a city name
#[async_trait]
pub trait CitySource: Send + Sync {
    async fn city_name(&self, coordinate: &Coordinate) -> String;
}

/// Recent headlines mentioning a city
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn headlines(&self, city: &str) -> Vec<NewsItem>;
}

/// Places of one category around a coordinate
#[async_trait]
pub trait VenueSource: Send + Sync {
    async fn venues(&self, coordinate: &Coordinate, category: &str) -> VenueSelection;
}

/// Encyclopedia articles about places near a coordinate
#[async_trait]
pub trait LandmarkSource: Send + Sync {
    async fn landmarks(&self, coordinate: &Coordinate) -> Vec<LandmarkTitle>;
}

/// The five adapters the prompt assembler draws from
#[derive(Clone)]
pub struct Providers {
    pub weather: Arc<dyn WeatherSource>,
    pub city: Arc<dyn CitySource>,
    pub news: Arc<dyn NewsSource>,
    pub venues: Arc<dyn VenueSource>,
    pub landmarks: Arc<dyn LandmarkSource>,
}

impl Providers {
    /// Build the HTTP-backed adapters from configuration
    pub fn from_config(config: &PodcastConfig) -> Result<Self> {
        let client = http_client(config.provider_timeout())?;
        let providers = &config.providers;

        Ok(Self {
            weather: Arc::new(OpenWeatherMapClient::new(client.clone(), &providers.weather)),
            city: Arc::new(OpenCageGeocoder::new(
                client.clone(),
                &providers.geocoding,
                &providers.fallback_city,
            )),
            news: Arc::new(NewsApiClient::new(client.clone(), &providers.news)),
            venues: Arc::new(FoursquareVenues::new(client.clone(), &providers.places)),
            landmarks: Arc::new(WikipediaLandmarks::new(client, &providers.landmarks)),
        })
    }
}

/// Build the shared outbound client with a hard per-request timeout
pub fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .with_context(|| "Failed to create HTTP client")
}

/// Send a request and decode a successful JSON response
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: RequestBuilder,
    provider: &str,
) -> Result<T, PodcastError> {
    let response = request
        .send()
        .await
        .map_err(|e| PodcastError::upstream(provider, format!("request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(PodcastError::upstream(
            provider,
            format!("unexpected status {status}"),
        ));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| PodcastError::upstream(provider, format!("malformed payload: {e}")))
}

/// Choose `min(k, items.len())` distinct items uniformly at random
pub fn sample<T: Clone>(items: &[T], k: usize, rng: &mut StdRng) -> Vec<T> {
    let amount = k.min(items.len());
    rand::seq::index::sample(rng, items.len(), amount)
        .into_iter()
        .map(|index| items[index].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rstest::rstest;
    use std::collections::HashSet;

    #[rstest]
    #[case(0, 3, 0)]
    #[case(2, 3, 2)]
    #[case(3, 3, 3)]
    #[case(6, 3, 3)]
    #[case(6, 0, 0)]
    fn test_sample_size(#[case] len: usize, #[case] k: usize, #[case] expected: usize) {
        let items: Vec<usize> = (0..len).collect();
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(sample(&items, k, &mut rng).len(), expected);
    }

    #[test]
    fn test_sample_is_distinct_and_drawn_from_items() {
        let items: Vec<String> = (0..20).map(|i| format!("item-{i}")).collect();
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = sample(&items, 3, &mut rng);
            let unique: HashSet<&String> = picked.iter().collect();
            assert_eq!(unique.len(), 3);
            assert!(picked.iter().all(|p| items.contains(p)));
        }
    }

    #[test]
    fn test_sample_is_deterministic_for_seed() {
        let items: Vec<u32> = (0..10).collect();
        let first = sample(&items, 3, &mut StdRng::seed_from_u64(42));
        let second = sample(&items, 3, &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }
}
