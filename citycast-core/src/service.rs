use async_trait::async_trait;
use std::fmt::{self, Debug};
use thiserror::Error;

use crate::{
    Config,
    model::{CityQuery, LookupResult},
    service::openweather::OpenWeatherClient,
};

pub mod openweather;

/// Which of the two provider resources a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Conditions,
    Forecast,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Conditions => "current conditions",
            Resource::Forecast => "forecast",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a lookup produced no result. The `Display` text is what the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("City not found")]
    NotFound { resource: Resource, status: u16 },

    #[error("Failed to fetch weather data")]
    Transport { resource: Resource, message: String },

    #[error("Unexpected response from the weather provider")]
    Malformed { resource: Resource, reason: String },
}

impl QueryError {
    pub fn resource(&self) -> Resource {
        match self {
            QueryError::NotFound { resource, .. }
            | QueryError::Transport { resource, .. }
            | QueryError::Malformed { resource, .. } => *resource,
        }
    }

    /// Joins the outcomes of the two retrievals. The conditions error wins
    /// when both failed.
    pub fn combine<C, F>(
        conditions: Result<C, QueryError>,
        forecast: Result<F, QueryError>,
    ) -> Result<(C, F), QueryError> {
        match (conditions, forecast) {
            (Ok(c), Ok(f)) => Ok((c, f)),
            (Err(err), _) | (Ok(_), Err(err)) => Err(err),
        }
    }
}

/// Retrieves current conditions and forecast for a city as one unit.
#[async_trait]
pub trait WeatherService: Send + Sync + Debug {
    async fn fetch(&self, city: &CityQuery) -> Result<LookupResult, QueryError>;
}

/// Construct the OpenWeather service from config.
///
/// `env_api_key` (normally `OPENWEATHER_API_KEY`) takes precedence over the
/// key stored in the config file.
pub fn service_from_config(
    config: &Config,
    env_api_key: Option<String>,
) -> anyhow::Result<Box<dyn WeatherService>> {
    let api_key = config.resolve_api_key(env_api_key).ok_or_else(|| {
        anyhow::anyhow!(
            "No OpenWeather API key configured.\n\
             Hint: run `citycast configure` or set OPENWEATHER_API_KEY."
        )
    })?;

    let mut client = OpenWeatherClient::new(api_key);
    if let Some(base_url) = &config.base_url {
        client = client.with_base_url(base_url);
    }

    Ok(Box::new(client))
}
