//! Current weather from an OpenWeatherMap-compatible API

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::{WeatherSource, get_json};
use crate::config::WeatherConfig;
use crate::error::PodcastError;
use crate::models::{Coordinate, WeatherSnapshot};

const PROVIDER: &str = "weather";

pub struct OpenWeatherMapClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    weather: Vec<Condition>,
    main: MainReadings,
}

#[derive(Debug, Deserialize)]
struct Condition {
    description: String,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
}

impl OpenWeatherMapClient {
    pub fn new(client: Client, config: &WeatherConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone().unwrap_or_default(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch(&self, coordinate: &Coordinate) -> Result<WeatherSnapshot, PodcastError> {
        let url = format!("{}/data/2.5/weather", self.base_url);
        let request = self.client.get(url).query(&[
            ("lat", coordinate.latitude.to_string()),
            ("lon", coordinate.longitude.to_string()),
            ("appid", self.api_key.clone()),
            ("units", "metric".to_string()),
        ]);

        let response: CurrentWeatherResponse = get_json(request, PROVIDER).await?;
        let condition = response
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| PodcastError::upstream(PROVIDER, "no weather conditions in response"))?;

        Ok(WeatherSnapshot::new(condition.description, response.main.temp))
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherMapClient {
    #[instrument(skip(self), fields(coordinate = %coordinate.format_coordinates()))]
    async fn current_weather(&self, coordinate: &Coordinate) -> WeatherSnapshot {
        match self.fetch(coordinate).await {
            Ok(snapshot) => {
                debug!(
                    "Weather is {} at {}",
                    snapshot.description,
                    snapshot.format_temperature()
                );
                snapshot
            }
            Err(e) => {
                warn!("Weather lookup failed, using fallback: {}", e);
                WeatherSnapshot::fallback()
            }
        }
    }
}
