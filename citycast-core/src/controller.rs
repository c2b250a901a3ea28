//! The lookup workflow: validate, query, remember.
//!
//! [`LookupController`] owns the state a front end renders (input text, the
//! latest result, recent searches, a busy flag) and turns every user action
//! into at most one [`Notification`].

use thiserror::Error;
use tracing::{debug, error, warn};

use crate::{
    history::SearchHistory,
    model::{CityQuery, LookupResult, ValidationError},
    recency::RecencyStore,
    service::{QueryError, WeatherService},
    store::{KeyValueStore, StoreError},
};

/// A user-facing message, shown as a toast or a status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Success(String),
    Error(String),
}

impl Notification {
    pub fn message(&self) -> &str {
        match self {
            Notification::Success(msg) | Notification::Error(msg) => msg,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notification::Error(_))
    }
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("Failed to save search history")]
    Store(#[from] StoreError),
}

impl From<&LookupError> for Notification {
    fn from(err: &LookupError) -> Self {
        Notification::Error(err.to_string())
    }
}

/// Holds `busy` for the duration of a fetch, including an abandoned one.
struct BusyGuard<'a>(&'a mut bool);

impl<'a> BusyGuard<'a> {
    fn set(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

pub struct LookupController<S> {
    service: Box<dyn WeatherService>,
    recency: RecencyStore<S>,
    input_city: String,
    current: Option<LookupResult>,
    history: SearchHistory,
    busy: bool,
}

impl<S: KeyValueStore> LookupController<S> {
    pub fn new(service: Box<dyn WeatherService>, store: S) -> Self {
        Self {
            service,
            recency: RecencyStore::new(store),
            input_city: String::new(),
            current: None,
            history: SearchHistory::new(),
            busy: false,
        }
    }

    /// Load stored history and re-run the last successful search, if any.
    pub async fn initialize(&mut self) -> Option<Notification> {
        let (history, last) = self.recency.load();
        self.history = history;

        let last = last?;
        debug!(city = %last, "resuming last search");
        self.input_city = last.as_str().to_string();
        self.submit(last.as_str()).await
    }

    /// Look up `city_raw`. Returns `None` only when a lookup is already in flight.
    pub async fn submit(&mut self, city_raw: &str) -> Option<Notification> {
        if self.busy {
            debug!(city = city_raw, "lookup already in progress, ignoring submit");
            return None;
        }

        let city = match CityQuery::parse(city_raw) {
            Ok(city) => city,
            Err(err) => return Some(Notification::from(&LookupError::from(err))),
        };

        let fetched = {
            let _busy = BusyGuard::set(&mut self.busy);
            self.service.fetch(&city).await
        };
        let outcome = match fetched {
            Ok(result) => self.apply(&city, result),
            Err(err) => Err(err.into()),
        };

        Some(match outcome {
            Ok(location) => {
                Notification::Success(format!("Weather data fetched for {location}"))
            }
            Err(err) => {
                match &err {
                    LookupError::Query(query_err) => {
                        warn!(city = %city, error = ?query_err, "lookup failed");
                        self.input_city.clear();
                    }
                    LookupError::Store(store_err) => {
                        error!(
                            city = %city,
                            error = %store_err,
                            "could not persist search history"
                        );
                    }
                    LookupError::Validation(_) => {}
                }
                Notification::from(&err)
            }
        })
    }

    /// Submit whatever is currently in the input field.
    pub async fn submit_input(&mut self) -> Option<Notification> {
        let input = self.input_city.clone();
        self.submit(&input).await
    }

    pub async fn select_history_entry(&mut self, city: &str) -> Option<Notification> {
        self.submit(city).await
    }

    pub fn remove_history_entry(&mut self, city: &str) -> Result<&SearchHistory, LookupError> {
        self.history = self.recency.remove(city)?;
        Ok(&self.history)
    }

    pub fn clear_history(&mut self) -> Result<(), LookupError> {
        self.recency.clear()?;
        self.history = SearchHistory::new();
        Ok(())
    }

    fn apply(&mut self, city: &CityQuery, result: LookupResult) -> Result<String, LookupError> {
        let location = result.conditions.location_name.clone();
        self.current = Some(result);

        match self.recency.record_success(city) {
            Ok(history) => self.history = history,
            Err(err) => {
                // A partial write may have landed; mirror whatever the store holds now.
                self.history = self.recency.load().0;
                return Err(err.into());
            }
        }

        Ok(location)
    }

    pub fn set_input(&mut self, text: &str) {
        self.input_city = text.to_string();
    }

    pub fn input_city(&self) -> &str {
        &self.input_city
    }

    pub fn current(&self) -> Option<&LookupResult> {
        self.current.as_ref()
    }

    pub fn history(&self) -> &SearchHistory {
        &self.history
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn recency(&self) -> &RecencyStore<S> {
        &self.recency
    }
}
