//! Fake adapters and clients shared by the integration tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use localcast::config::PodcastConfig;
use localcast::models::{
    Coordinate, LandmarkTitle, NewsItem, Venue, VenueSelection, WeatherSnapshot,
};
use localcast::narration::{CompletionProvider, CompletionRequest, NarrationGenerator};
use localcast::providers::{
    CitySource, LandmarkSource, NewsSource, Providers, VenueSource, WeatherSource,
};
use localcast::speech::{AudioEncoder, SpeechSynthesizer};
use localcast::{PodcastError, PodcastService, PromptAssembler};

pub struct FixedWeather(pub WeatherSnapshot);

#[async_trait]
impl WeatherSource for FixedWeather {
    async fn current_weather(&self, _coordinate: &Coordinate) -> WeatherSnapshot {
        self.0.clone()
    }
}

pub struct FixedCity(pub String);

#[async_trait]
impl CitySource for FixedCity {
    async fn city_name(&self, _coordinate: &Coordinate) -> String {
        self.0.clone()
    }
}

pub struct FixedNews(pub Vec<NewsItem>);

#[async_trait]
impl NewsSource for FixedNews {
    async fn headlines(&self, _city: &str) -> Vec<NewsItem> {
        self.0.clone()
    }
}

pub struct FixedVenues(pub Vec<Venue>);

#[async_trait]
impl VenueSource for FixedVenues {
    async fn venues(&self, _coordinate: &Coordinate, category: &str) -> VenueSelection {
        VenueSelection {
            venues: self.0.clone(),
            category: category.to_string(),
        }
    }
}

pub struct FixedLandmarks(pub Vec<LandmarkTitle>);

#[async_trait]
impl LandmarkSource for FixedLandmarks {
    async fn landmarks(&self, _coordinate: &Coordinate) -> Vec<LandmarkTitle> {
        self.0.clone()
    }
}

pub enum FakeCompletion {
    Reply(String),
    Fail,
    Stall(Duration),
}

#[async_trait]
impl CompletionProvider for FakeCompletion {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, PodcastError> {
        match self {
            FakeCompletion::Reply(text) => Ok(format!(
                "{text} ({} chars of research)",
                request.user_prompt.len()
            )),
            FakeCompletion::Fail => Err(PodcastError::completion("quota exceeded")),
            FakeCompletion::Stall(delay) => {
                tokio::time::sleep(*delay).await;
                Ok("too late".to_string())
            }
        }
    }
}

pub struct FakeSpeech;

#[async_trait]
impl SpeechSynthesizer for FakeSpeech {
    async fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, PodcastError> {
        Ok(format!("[{language}] {text}").into_bytes())
    }
}

pub fn london() -> Coordinate {
    Coordinate::new(51.5074, -0.1278).unwrap()
}

/// Adapters returning the London scenario data
pub fn london_providers() -> Providers {
    Providers {
        weather: Arc::new(FixedWeather(WeatherSnapshot::new("light rain", 12.3))),
        city: Arc::new(FixedCity("London".to_string())),
        news: Arc::new(FixedNews(vec![
            NewsItem {
                title: "Tube strike called off".to_string(),
            },
            NewsItem {
                title: "New bridge opens".to_string(),
            },
        ])),
        venues: Arc::new(FixedVenues(vec![Venue {
            name: "Leake Street Arches".to_string(),
            category: None,
        }])),
        landmarks: Arc::new(FixedLandmarks(vec![
            "Trafalgar Square".to_string(),
            "Nelson's Column".to_string(),
            "National Gallery".to_string(),
        ])),
    }
}

pub fn service_with(providers: Providers, completion: FakeCompletion) -> PodcastService {
    let config = PodcastConfig::default();
    PodcastService::new(
        PromptAssembler::new(providers).with_seed(11),
        NarrationGenerator::new(Arc::new(completion), &config.narration),
        AudioEncoder::new(Arc::new(FakeSpeech), &config.speech),
        chrono_tz::Europe::London,
    )
}
