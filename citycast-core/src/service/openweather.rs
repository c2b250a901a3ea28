use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, info};

use crate::model::{CityQuery, CurrentConditions, Forecast, ForecastEntry, LookupResult};

use super::{QueryError, Resource, WeatherService};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const UNITS: &str = "metric";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            http: Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn fetch_current(&self, city: &CityQuery) -> Result<CurrentConditions, QueryError> {
        let parsed: OwCurrentResponse = self.get_json(Resource::Conditions, "weather", city).await?;
        parsed.try_into().map_err(|reason| QueryError::Malformed {
            resource: Resource::Conditions,
            reason,
        })
    }

    async fn fetch_forecast(&self, city: &CityQuery) -> Result<Forecast, QueryError> {
        let parsed: OwForecastResponse = self.get_json(Resource::Forecast, "forecast", city).await?;
        parsed.try_into().map_err(|reason| QueryError::Malformed {
            resource: Resource::Forecast,
            reason,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        resource: Resource,
        endpoint: &str,
        city: &CityQuery,
    ) -> Result<T, QueryError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(%resource, city = %city, "requesting OpenWeather");

        let transport = |err: reqwest::Error| QueryError::Transport {
            resource,
            message: err.without_url().to_string(),
        };

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", UNITS),
            ])
            .send()
            .await
            .map_err(transport)?;

        let status = res.status();
        let body = res.text().await.map_err(transport)?;

        if !status.is_success() {
            debug!(%resource, %status, body = %truncate_body(&body), "OpenWeather request failed");
            return Err(QueryError::NotFound {
                resource,
                status: status.as_u16(),
            });
        }

        serde_json::from_str(&body).map_err(|err| QueryError::Malformed {
            resource,
            reason: err.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    humidity: u8,
    pressure: u32,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    id: u32,
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwSys {
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
    sys: OwSys,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastWeather {
    main: String,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwForecastMain,
    weather: Vec<OwForecastWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    list: Vec<OwForecastEntry>,
}

impl TryFrom<OwCurrentResponse> for CurrentConditions {
    type Error = String;

    fn try_from(res: OwCurrentResponse) -> Result<Self, Self::Error> {
        let weather = res
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| "current conditions contained no weather entry".to_string())?;

        Ok(CurrentConditions {
            location_name: res.name,
            country_code: res.sys.country,
            temperature_c: res.main.temp,
            feels_like_c: res.main.feels_like,
            humidity_pct: res.main.humidity,
            pressure_hpa: res.main.pressure,
            wind_speed_ms: res.wind.speed,
            condition_code: weather.id,
            condition_main: weather.main,
            condition_description: weather.description,
        })
    }
}

impl TryFrom<OwForecastResponse> for Forecast {
    type Error = String;

    fn try_from(res: OwForecastResponse) -> Result<Self, Self::Error> {
        let entries = res
            .list
            .into_iter()
            .map(|entry| -> Result<ForecastEntry, String> {
                let weather = entry
                    .weather
                    .into_iter()
                    .next()
                    .ok_or_else(|| {
                        format!("forecast entry at {} contained no weather entry", entry.dt)
                    })?;
                Ok(ForecastEntry {
                    timestamp: entry.dt,
                    temperature_c: entry.main.temp,
                    condition_main: weather.main,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Forecast::new(entries))
    }
}

#[async_trait]
impl WeatherService for OpenWeatherClient {
    async fn fetch(&self, city: &CityQuery) -> Result<LookupResult, QueryError> {
        let (conditions, forecast) =
            tokio::join!(self.fetch_current(city), self.fetch_forecast(city));
        let (conditions, forecast) = QueryError::combine(conditions, forecast)?;

        info!(
            location = %conditions.display_location(),
            forecast_entries = forecast.entries.len(),
            "fetched weather"
        );
        Ok(LookupResult {
            conditions,
            forecast,
        })
    }
}

fn truncate_body(body: &str) -> &str {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
