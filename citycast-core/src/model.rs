use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Forecast entries are 3 hours apart, so every 8th one is a day later.
pub const SNAPSHOT_STRIDE: usize = 8;
pub const SNAPSHOT_DAYS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Please enter a city name")]
pub struct ValidationError;

/// A city name as typed by the user, trimmed and known to be non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CityQuery(String);

impl CityQuery {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-insensitive comparison, as used for history entries.
    pub fn matches(&self, other: &str) -> bool {
        crate::history::same_city(&self.0, other)
    }
}

impl fmt::Display for CityQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for CityQuery {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    pub location_name: String,
    pub country_code: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: u32,
    pub wind_speed_ms: f64,
    pub condition_code: u32,
    pub condition_main: String,
    pub condition_description: String,
}

impl CurrentConditions {
    /// "Paris, FR", or just the name when the provider omits the country.
    pub fn display_location(&self) -> String {
        if self.country_code.is_empty() {
            self.location_name.clone()
        } else {
            format!("{}, {}", self.location_name, self.country_code)
        }
    }

    pub fn condition_group(&self) -> ConditionGroup {
        ConditionGroup::from_code(self.condition_code)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub timestamp: i64,
    pub temperature_c: f64,
    pub condition_main: String,
}

impl ForecastEntry {
    pub fn time(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub entries: Vec<ForecastEntry>,
}

impl Forecast {
    pub fn new(entries: Vec<ForecastEntry>) -> Self {
        Self { entries }
    }

    pub fn daily_snapshots(&self) -> Vec<ForecastEntry> {
        daily_snapshots(&self.entries)
    }
}

/// One entry per day: every 8th entry from the first, at most five of them.
pub fn daily_snapshots(entries: &[ForecastEntry]) -> Vec<ForecastEntry> {
    entries
        .iter()
        .step_by(SNAPSHOT_STRIDE)
        .take(SNAPSHOT_DAYS)
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupResult {
    pub conditions: CurrentConditions,
    pub forecast: Forecast,
}

/// Coarse grouping of OpenWeather condition codes, used to pick an icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionGroup {
    Thunderstorm,
    Rain,
    Snow,
    Fog,
    Clear,
    Clouds,
}

impl ConditionGroup {
    pub fn from_code(code: u32) -> Self {
        match code {
            200..=299 => ConditionGroup::Thunderstorm,
            300..=599 => ConditionGroup::Rain,
            600..=699 => ConditionGroup::Snow,
            700..=799 => ConditionGroup::Fog,
            800 => ConditionGroup::Clear,
            _ => ConditionGroup::Clouds,
        }
    }
}
