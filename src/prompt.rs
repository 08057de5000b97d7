//! Prompt assembly
//!
//! Collects the adapter results for one coordinate, keeps every section
//! short by sampling at most [`SECTION_SAMPLE_SIZE`] items, and renders them
//! into the document handed to the completion provider.

use std::fmt;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use tracing::{info, instrument};

use crate::models::{Coordinate, LandmarkTitle, NewsItem, VenueSelection, WeatherSnapshot};
use crate::providers::venues::VENUE_CATEGORIES;
use crate::providers::{Providers, sample};

/// Maximum number of items rendered per section
pub const SECTION_SAMPLE_SIZE: usize = 3;

pub const INTRO_LINE: &str = "Here is some info on the local area.";
pub const NEWS_HEADER: &str = "Here are some local news headlines:";
pub const LANDMARKS_HEADER: &str = "Some interesting things nearby are:";
pub const CLOSING_INSTRUCTION: &str = "Now please generate the script";

const LOCAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The natural-language research document sent as the user message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptDocument(String);

impl PromptDocument {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PromptDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything the document is rendered from, already sampled
#[derive(Debug, Clone)]
pub struct PromptInputs {
    /// Local time formatted as `YYYY-MM-DD HH:MM:SS`
    pub local_time: String,
    pub city: String,
    pub weather: WeatherSnapshot,
    pub news: Vec<NewsItem>,
    pub landmarks: Vec<LandmarkTitle>,
    pub venues: VenueSelection,
}

/// Header line introducing the venue section
#[must_use]
pub fn venues_header(category: &str) -> String {
    format!("Nearby cool {category}s include:")
}

/// Render the fixed-structure document
#[must_use]
pub fn render(inputs: &PromptInputs) -> PromptDocument {
    let mut prompt = format!(
        "{INTRO_LINE}\nAt {} in {}, the weather is {} with a temperature of {}.\n",
        inputs.local_time,
        inputs.city,
        inputs.weather.description,
        inputs.weather.format_temperature()
    );

    prompt.push_str(NEWS_HEADER);
    prompt.push('\n');
    for item in &inputs.news {
        prompt.push_str(&format!("- {}\n", item.title));
    }

    prompt.push_str(LANDMARKS_HEADER);
    prompt.push('\n');
    for title in &inputs.landmarks {
        prompt.push_str(&format!("- {title}\n"));
    }

    prompt.push_str(&venues_header(&inputs.venues.category));
    prompt.push('\n');
    for venue in &inputs.venues.venues {
        prompt.push_str(&format!(
            "- {} ({})\n",
            venue.name,
            venue.category_or_default()
        ));
    }

    prompt.push_str(CLOSING_INSTRUCTION);
    PromptDocument(prompt)
}

/// Format an instant as local wall-clock time in `timezone`
#[must_use]
pub fn format_local_time(now: DateTime<Utc>, timezone: Tz) -> String {
    now.with_timezone(&timezone)
        .format(LOCAL_TIME_FORMAT)
        .to_string()
}

/// Orchestrates the adapters into a [`PromptDocument`]
pub struct PromptAssembler {
    providers: Providers,
    seed: Option<u64>,
}

impl PromptAssembler {
    #[must_use]
    pub fn new(providers: Providers) -> Self {
        Self {
            providers,
            seed: None,
        }
    }

    /// Make category choice and sampling reproducible
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed.unwrap_or_else(rand::random))
    }

    /// Query every adapter in turn and render the document.
    ///
    /// Adapters fail closed, so this never fails: missing data shows up as
    /// fallback values or empty sections.
    #[instrument(
        skip(self),
        fields(coordinate = %coordinate.format_coordinates(), timezone = %timezone)
    )]
    pub async fn build_prompt(&self, coordinate: &Coordinate, timezone: Tz) -> PromptDocument {
        let mut rng = self.rng();

        let weather = self.providers.weather.current_weather(coordinate).await;
        let city = self.providers.city.city_name(coordinate).await;
        let news = self.providers.news.headlines(&city).await;

        let category = VENUE_CATEGORIES[rng.random_range(0..VENUE_CATEGORIES.len())];
        let selection = self.providers.venues.venues(coordinate, category).await;
        let landmarks = self.providers.landmarks.landmarks(coordinate).await;

        let inputs = PromptInputs {
            local_time: format_local_time(Utc::now(), timezone),
            city,
            weather,
            news: sample(&news, SECTION_SAMPLE_SIZE, &mut rng),
            landmarks: sample(&landmarks, SECTION_SAMPLE_SIZE, &mut rng),
            venues: VenueSelection {
                venues: sample(&selection.venues, SECTION_SAMPLE_SIZE, &mut rng),
                category: selection.category,
            },
        };

        info!(
            "Assembled prompt for {} with {} headlines, {} landmarks, {} {} venues",
            inputs.city,
            inputs.news.len(),
            inputs.landmarks.len(),
            inputs.venues.venues.len(),
            inputs.venues.category
        );

        render(&inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Venue;
    use chrono::TimeZone;

    fn inputs() -> PromptInputs {
        PromptInputs {
            local_time: "2024-06-01 14:30:00".to_string(),
            city: "London".to_string(),
            weather: WeatherSnapshot::new("light rain", 12.3),
            news: vec![
                NewsItem {
                    title: "Tube strike called off".to_string(),
                },
                NewsItem {
                    title: "New bridge opens".to_string(),
                },
            ],
            landmarks: vec![
                "Trafalgar Square".to_string(),
                "Nelson's Column".to_string(),
                "National Gallery".to_string(),
            ],
            venues: VenueSelection {
                venues: vec![Venue {
                    name: "Leake Street Arches".to_string(),
                    category: None,
                }],
                category: "street art".to_string(),
            },
        }
    }

    #[test]
    fn test_render_full_document() {
        let document = render(&inputs());
        let expected = "Here is some info on the local area.\n\
At 2024-06-01 14:30:00 in London, the weather is light rain with a temperature of 12.3°C.\n\
Here are some local news headlines:\n\
- Tube strike called off\n\
- New bridge opens\n\
Some interesting things nearby are:\n\
- Trafalgar Square\n\
- Nelson's Column\n\
- National Gallery\n\
Nearby cool street arts include:\n\
- Leake Street Arches (uncategorized)\n\
Now please generate the script";
        assert_eq!(document.as_str(), expected);
    }

    #[test]
    fn test_render_keeps_sections_when_empty() {
        let document = render(&PromptInputs {
            local_time: "2024-06-01 14:30:00".to_string(),
            city: "the local area".to_string(),
            weather: WeatherSnapshot::fallback(),
            news: Vec::new(),
            landmarks: Vec::new(),
            venues: VenueSelection::empty(),
        });
        let text = document.as_str();

        let markers = [INTRO_LINE, NEWS_HEADER, LANDMARKS_HEADER, "Nearby cool s include:"];
        let positions: Vec<usize> = markers
            .iter()
            .map(|marker| text.find(marker).unwrap())
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(text.contains("the weather is Ordinary with a temperature of Unknown°C."));
        assert!(text.ends_with(CLOSING_INSTRUCTION));
        assert!(!text.contains("\n- "));
    }

    #[test]
    fn test_format_local_time_uses_timezone() {
        let summer = Utc.with_ymd_and_hms(2024, 6, 1, 13, 30, 0).unwrap();
        assert_eq!(
            format_local_time(summer, chrono_tz::Europe::London),
            "2024-06-01 14:30:00"
        );

        let winter = Utc.with_ymd_and_hms(2024, 1, 1, 0, 5, 9).unwrap();
        assert_eq!(
            format_local_time(winter, chrono_tz::Europe::London),
            "2024-01-01 00:05:09"
        );
    }
}
