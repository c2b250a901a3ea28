//! Core library for the `citycast` weather lookup client.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather query service and its typed results
//! - Search history kept in a local key-value store
//! - The lookup workflow that ties them together
//!
//! It is used by `citycast-cli`, but can also back other front ends.

pub mod config;
pub mod controller;
pub mod history;
pub mod model;
pub mod recency;
pub mod service;
pub mod store;

pub use config::Config;
pub use controller::{LookupController, LookupError, Notification};
pub use history::SearchHistory;
pub use model::{
    CityQuery, ConditionGroup, CurrentConditions, Forecast, ForecastEntry, LookupResult,
};
pub use recency::RecencyStore;
pub use service::{QueryError, WeatherService, service_from_config};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError};
