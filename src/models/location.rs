//! Location model for geographic coordinates

use serde::{Deserialize, Serialize};

use crate::error::PodcastError;

/// Coordinate supplied by the caller
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting NaN and infinite components
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, PodcastError> {
        let coordinate = Self {
            latitude,
            longitude,
        };
        coordinate.validate()?;
        Ok(coordinate)
    }

    /// Check that both components are finite numbers
    pub fn validate(&self) -> Result<(), PodcastError> {
        if !self.latitude.is_finite() {
            return Err(PodcastError::validation(format!(
                "latitude must be a finite number, got: {}",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() {
            return Err(PodcastError::validation(format!(
                "longitude must be a finite number, got: {}",
                self.longitude
            )));
        }
        Ok(())
    }

    /// Format as `lat,lon` for query parameters
    #[must_use]
    pub fn comma_separated(&self) -> String {
        format!("{},{}", self.latitude, self.longitude)
    }

    /// Format as `lat|lon` for MediaWiki geosearch
    #[must_use]
    pub fn pipe_separated(&self) -> String {
        format!("{}|{}", self.latitude, self.longitude)
    }

    /// Format coordinates for log output
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_accepts_finite_values() {
        let coordinate = Coordinate::new(51.5074, -0.1278).unwrap();
        assert_eq!(coordinate.latitude, 51.5074);
        assert_eq!(coordinate.longitude, -0.1278);
    }

    #[test]
    fn test_coordinate_rejects_non_finite_values() {
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_coordinate_formats() {
        let coordinate = Coordinate::new(51.5074, -0.1278).unwrap();
        assert_eq!(coordinate.comma_separated(), "51.5074,-0.1278");
        assert_eq!(coordinate.pipe_separated(), "51.5074|-0.1278");
        assert_eq!(coordinate.format_coordinates(), "51.5074, -0.1278");
    }
}
