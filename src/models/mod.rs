//! Data models for the LocalCast service
//!
//! This module contains the plain data types passed between the adapters,
//! the prompt assembler and the HTTP layer:
//! - Location: the caller-supplied coordinate
//! - Weather: the current conditions snapshot
//! - Places: news headlines, venues and landmark titles

pub mod location;
pub mod places;
pub mod weather;

// Re-export all public types for convenient access
pub use location::Coordinate;
pub use places::{LandmarkTitle, NewsItem, UNCATEGORIZED, Venue, VenueSelection};
pub use weather::{Temperature, WeatherSnapshot};
