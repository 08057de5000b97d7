//! Weather model for the current conditions at a coordinate

use std::fmt;

use serde::{Deserialize, Serialize};

/// Description used when the weather lookup fails
pub const FALLBACK_DESCRIPTION: &str = "Ordinary";

/// Temperature in Celsius, or a sentinel when the upstream had none
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub enum Temperature {
    Celsius(f64),
    Unknown,
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Temperature::Celsius(value) => write!(f, "{value}"),
            Temperature::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Current conditions reported by the weather adapter
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherSnapshot {
    /// Human-readable description, e.g. "light rain"
    pub description: String,
    pub temperature: Temperature,
}

impl WeatherSnapshot {
    #[must_use]
    pub fn new<S: Into<String>>(description: S, celsius: f64) -> Self {
        Self {
            description: description.into(),
            temperature: Temperature::Celsius(celsius),
        }
    }

    /// The snapshot used whenever the upstream call fails
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            description: FALLBACK_DESCRIPTION.to_string(),
            temperature: Temperature::Unknown,
        }
    }

    /// Format temperature with unit
    #[must_use]
    pub fn format_temperature(&self) -> String {
        format!("{}°C", self.temperature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_temperature() {
        let snapshot = WeatherSnapshot::new("light rain", 12.3);
        assert_eq!(snapshot.format_temperature(), "12.3°C");
    }

    #[test]
    fn test_fallback_snapshot() {
        let snapshot = WeatherSnapshot::fallback();
        assert_eq!(snapshot.description, "Ordinary");
        assert_eq!(snapshot.temperature, Temperature::Unknown);
        assert_eq!(snapshot.format_temperature(), "Unknown°C");
    }
}
