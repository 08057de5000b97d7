//! `LocalCast` - a spoken podcast about the area around a coordinate
//!
//! This library gathers weather, city, news, venue and landmark data for a
//! coordinate, has a language model turn it into a short script and
//! converts the script to base64-encoded MP3 audio.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod narration;
pub mod podcast;
pub mod prompt;
pub mod providers;
pub mod speech;
pub mod telemetry;
pub mod web;

// Re-export core types for public API
pub use config::PodcastConfig;
pub use error::PodcastError;
pub use models::{Coordinate, NewsItem, Venue, VenueSelection, WeatherSnapshot};
pub use narration::{CompletionProvider, NarrationGenerator};
pub use podcast::{PodcastEpisode, PodcastService};
pub use prompt::{PromptAssembler, PromptDocument};
pub use providers::Providers;
pub use speech::{AudioEncoder, SpeechSynthesizer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
