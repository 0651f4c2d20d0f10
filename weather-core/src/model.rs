use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{FetchError, QueryError};

/// Measurement system requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    /// Value of the provider's `units` query parameter.
    pub fn as_param(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    pub fn wind_speed_label(&self) -> &'static str {
        match self {
            Units::Metric => "m/s",
            Units::Imperial => "mph",
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_param())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" | "celsius" | "c" => Ok(Units::Metric),
            "imperial" | "fahrenheit" | "f" => Ok(Units::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown units '{value}'. Supported units: metric, imperial."
            )),
        }
    }
}

/// A single submitted location search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationQuery {
    city: String,
    country: Option<String>,
    units: Units,
}

impl LocationQuery {
    /// Builds a query from raw form input. Both fields are trimmed; an empty
    /// city is rejected and an empty country is treated as absent.
    pub fn new(city: &str, country: Option<&str>, units: Units) -> Result<Self, QueryError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(QueryError::MissingCity);
        }

        let country = country
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_owned);

        Ok(Self {
            city: city.to_owned(),
            country,
            units,
        })
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn country(&self) -> Option<&str> {
        self.country.as_deref()
    }

    pub fn units(&self) -> Units {
        self.units
    }

    /// `"{city},{country}"` when a country was given, otherwise the bare city.
    pub fn composite_location(&self) -> String {
        match &self.country {
            Some(country) => format!("{},{}", self.city, country),
            None => self.city.clone(),
        }
    }
}

/// Decorative particle system chosen from the weather description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnimationMode {
    #[default]
    Sun,
    Rain,
    Snow,
}

impl AnimationMode {
    /// Case-insensitive substring match. Rain patterns win over snow.
    pub fn from_description(description: &str) -> Self {
        let lc = description.to_lowercase();
        if ["rain", "drizzle", "thunder"].iter().any(|p| lc.contains(p)) {
            AnimationMode::Rain
        } else if lc.contains("snow") {
            AnimationMode::Snow
        } else {
            AnimationMode::Sun
        }
    }
}

/// Downloaded provider icon. Absent when the secondary fetch failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Icon {
    pub id: String,
    pub png: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentWeather {
    /// Composite location string the request was made with.
    pub location: String,
    pub units: Units,
    pub temperature: f64,
    pub feels_like: f64,
    pub description: String,
    pub humidity: u8,
    pub wind_speed: f64,
    pub country_code: String,
    pub sunrise: NaiveTime,
    pub sunset: NaiveTime,
    pub icon_id: String,
    pub icon: Option<Icon>,
    pub animation_mode: AnimationMode,
}

impl CurrentWeather {
    /// City part of the location label, as recorded in the search history.
    pub fn city_label(&self) -> &str {
        self.location
            .split(',')
            .next()
            .map(str::trim)
            .unwrap_or(&self.location)
    }
}

/// One raw point of the provider's multi-sample forecast series.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSample {
    /// Unix timestamp, seconds.
    pub timestamp: i64,
    pub temperature: f64,
    pub description: String,
    pub icon_id: String,
}

/// Representative (midday-closest) reading for one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub temperature: f64,
    pub description: String,
    pub icon_id: String,
    pub icon: Option<Icon>,
}

pub type CurrentWeatherResult = Result<CurrentWeather, FetchError>;
pub type ForecastResult = Result<Vec<ForecastDay>, FetchError>;

/// City/country pair resolved from the caller's IP address.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GeoLocation {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
}

/// Uppercases the first character and lowercases the rest.
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.as_str().to_lowercase().chars()).collect(),
        None => String::new(),
    }
}
