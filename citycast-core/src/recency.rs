//! Search history and last-searched city on top of a [`KeyValueStore`].

use tracing::{debug, warn};

use crate::{
    history::{SearchHistory, same_city},
    model::CityQuery,
    store::{KeyValueStore, StoreError},
};

pub const HISTORY_KEY: &str = "searchHistory";
pub const LAST_SEARCHED_KEY: &str = "lastSearched";

#[derive(Debug, Clone)]
pub struct RecencyStore<S> {
    store: S,
}

impl<S: KeyValueStore> RecencyStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Read history and last-searched. Absent or unreadable values fall back to
    /// empty history and no last-searched city.
    pub fn load(&self) -> (SearchHistory, Option<CityQuery>) {
        (self.load_history(), self.load_last_searched())
    }

    fn load_history(&self) -> SearchHistory {
        let Some(raw) = self.store.get(HISTORY_KEY) else {
            return SearchHistory::new();
        };

        match serde_json::from_str::<SearchHistory>(&raw) {
            Ok(history) => history,
            Err(err) => {
                warn!(error = %err, "stored search history is malformed, starting empty");
                SearchHistory::new()
            }
        }
    }

    fn load_last_searched(&self) -> Option<CityQuery> {
        let raw = self.store.get(LAST_SEARCHED_KEY)?;
        match CityQuery::parse(&raw) {
            Ok(city) => Some(city),
            Err(_) => {
                warn!("stored last-searched city is blank, ignoring it");
                None
            }
        }
    }

    /// Promote `city` in the history and remember it as the last search.
    pub fn record_success(&mut self, city: &CityQuery) -> Result<SearchHistory, StoreError> {
        let mut history = self.load_history();
        history.promote(city);

        self.write_history(&history)?;
        self.store.set(LAST_SEARCHED_KEY, city.as_str())?;
        debug!(city = %city, entries = history.len(), "recorded successful search");

        Ok(history)
    }

    /// Drop `city` from the history, clearing last-searched when it matches.
    pub fn remove(&mut self, city: &str) -> Result<SearchHistory, StoreError> {
        let mut history = self.load_history();
        let removed = history.remove(city);
        self.write_history(&history)?;

        let last = self.store.get(LAST_SEARCHED_KEY);
        if last.is_some_and(|last| same_city(&last, city)) {
            self.store.remove(LAST_SEARCHED_KEY)?;
        }
        debug!(city, removed, "removed city from history");

        Ok(history)
    }

    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.store.remove(HISTORY_KEY)?;
        self.store.remove(LAST_SEARCHED_KEY)
    }

    fn write_history(&mut self, history: &SearchHistory) -> Result<(), StoreError> {
        let json = serde_json::to_string(history)?;
        self.store.set(HISTORY_KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn q(s: &str) -> CityQuery {
        CityQuery::parse(s).expect("valid city")
    }

    #[test]
    fn load_on_first_run_is_empty() {
        let recency = RecencyStore::new(MemoryStore::new());
        let (history, last) = recency.load();

        assert!(history.is_empty());
        assert_eq!(last, None);
    }

    #[test]
    fn load_treats_malformed_history_as_empty() {
        let store = MemoryStore::new()
            .with_entry(HISTORY_KEY, "{not an array")
            .with_entry(LAST_SEARCHED_KEY, "Oslo");
        let (history, last) = RecencyStore::new(store).load();

        assert!(history.is_empty());
        assert_eq!(last, Some(q("Oslo")));
    }

    #[test]
    fn load_rejects_wrong_json_shape() {
        let store = MemoryStore::new().with_entry(HISTORY_KEY, r#"{"a": 1}"#);
        let (history, _) = RecencyStore::new(store).load();

        assert!(history.is_empty());
    }

    #[test]
    fn load_cleans_up_stored_duplicates() {
        let store = MemoryStore::new().with_entry(
            HISTORY_KEY,
            r#"["Oslo","OSLO","Bern","","Rome","Kyiv","Lima","Baku"]"#,
        );
        let (history, _) = RecencyStore::new(store).load();

        assert_eq!(history.as_slice(), ["Oslo", "Bern", "Rome", "Kyiv", "Lima"]);
    }

    #[test]
    fn record_success_persists_history_and_last_searched() {
        let mut recency = RecencyStore::new(MemoryStore::new());
        recency.record_success(&q("Paris")).unwrap();
        let history = recency.record_success(&q("london")).unwrap();

        assert_eq!(history.as_slice(), ["london", "Paris"]);
        assert_eq!(
            recency.inner().get(HISTORY_KEY).as_deref(),
            Some(r#"["london","Paris"]"#)
        );

        let (reloaded, last) = recency.load();
        assert_eq!(reloaded, history);
        assert_eq!(last, Some(q("london")));
    }

    #[test]
    fn remove_clears_matching_last_searched() {
        let mut recency = RecencyStore::new(MemoryStore::new());
        recency.record_success(&q("Tokyo")).unwrap();
        recency.record_success(&q("Seoul")).unwrap();

        let history = recency.remove("SEOUL").unwrap();
        assert_eq!(history.as_slice(), ["Tokyo"]);

        let (reloaded, last) = recency.load();
        assert_eq!(reloaded.as_slice(), ["Tokyo"]);
        assert_eq!(last, None);
    }

    #[test]
    fn remove_keeps_unrelated_last_searched() {
        let mut recency = RecencyStore::new(MemoryStore::new());
        recency.record_success(&q("Tokyo")).unwrap();
        recency.record_success(&q("Seoul")).unwrap();

        recency.remove("tokyo").unwrap();

        let (reloaded, last) = recency.load();
        assert_eq!(reloaded.as_slice(), ["Seoul"]);
        assert_eq!(last, Some(q("Seoul")));
    }

    #[test]
    fn clear_forgets_everything() {
        let mut recency = RecencyStore::new(MemoryStore::new());
        recency.record_success(&q("Cairo")).unwrap();
        recency.clear().unwrap();

        let (history, last) = recency.load();
        assert!(history.is_empty());
        assert_eq!(last, None);
    }
}
