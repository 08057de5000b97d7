//! Local headlines from a NewsAPI-compatible search endpoint

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::{NewsSource, get_json};
use crate::config::NewsConfig;
use crate::error::PodcastError;
use crate::models::NewsItem;

const PROVIDER: &str = "news";

/// Placeholder title NewsAPI uses for withdrawn articles
const REMOVED_TITLE: &str = "[Removed]";

pub struct NewsApiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct EverythingResponse {
    status: String,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    title: Option<String>,
}

impl NewsApiClient {
    pub fn new(client: Client, config: &NewsConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone().unwrap_or_default(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch(&self, city: &str) -> Result<Vec<NewsItem>, PodcastError> {
        let url = format!("{}/v2/everything", self.base_url);
        let request = self
            .client
            .get(url)
            .query(&[("q", city), ("apiKey", self.api_key.as_str())]);

        let response: EverythingResponse = get_json(request, PROVIDER).await?;
        if response.status != "ok" {
            return Err(PodcastError::upstream(
                PROVIDER,
                format!(
                    "status '{}': {}",
                    response.status,
                    response.message.unwrap_or_default()
                ),
            ));
        }

        Ok(response
            .articles
            .into_iter()
            .filter_map(|article| article.title)
            .filter(|title| !title.trim().is_empty() && title != REMOVED_TITLE)
            .map(|title| NewsItem { title })
            .collect())
    }
}

#[async_trait]
impl NewsSource for NewsApiClient {
    #[instrument(skip(self))]
    async fn headlines(&self, city: &str) -> Vec<NewsItem> {
        match self.fetch(city).await {
            Ok(items) => {
                debug!("Found {} headlines for {}", items.len(), city);
                items
            }
            Err(e) => {
                warn!("News lookup failed, continuing without headlines: {}", e);
                Vec::new()
            }
        }
    }
}
