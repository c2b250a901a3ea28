use serde::{Deserialize, Serialize};

use crate::model::CityQuery;

pub const HISTORY_LIMIT: usize = 5;

/// Case-insensitive city name comparison.
pub fn same_city(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Recently searched city names, most recent first.
///
/// Entries are unique under case-insensitive comparison and there are never
/// more than [`HISTORY_LIMIT`] of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct SearchHistory(Vec<String>);

impl From<Vec<String>> for SearchHistory {
    fn from(entries: Vec<String>) -> Self {
        Self::from_entries(entries)
    }
}

impl From<SearchHistory> for Vec<String> {
    fn from(history: SearchHistory) -> Self {
        history.0
    }
}

impl SearchHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a history from arbitrary stored entries, restoring the invariants.
    pub fn from_entries<I, T>(entries: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut out: Vec<String> = Vec::new();
        for city in entries {
            let city = city.into();
            let city = city.trim();
            if city.is_empty() || out.iter().any(|c| same_city(c, city)) {
                continue;
            }
            out.push(city.to_string());
            if out.len() == HISTORY_LIMIT {
                break;
            }
        }
        Self(out)
    }

    /// Move `city` to the front, dropping older spellings and the oldest overflow.
    pub fn promote(&mut self, city: &CityQuery) {
        self.0.retain(|c| !city.matches(c));
        self.0.insert(0, city.as_str().to_string());
        self.0.truncate(HISTORY_LIMIT);
    }

    /// Remove every entry matching `city`; returns how many were dropped.
    pub fn remove(&mut self, city: &str) -> usize {
        let before = self.0.len();
        self.0.retain(|c| !same_city(c, city));
        before - self.0.len()
    }

    pub fn contains(&self, city: &str) -> bool {
        self.0.iter().any(|c| same_city(c, city))
    }

    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(s: &str) -> CityQuery {
        CityQuery::parse(s).expect("valid city")
    }

    #[test]
    fn promote_puts_city_first() {
        let mut h = SearchHistory::new();
        h.promote(&q("Paris"));
        h.promote(&q("london"));

        assert_eq!(h.as_slice(), ["london", "Paris"]);
    }

    #[test]
    fn promote_replaces_case_insensitive_duplicate() {
        let mut h = SearchHistory::from_entries(["london", "Paris"]);
        h.promote(&q("PARIS"));

        assert_eq!(h.as_slice(), ["PARIS", "london"]);
    }

    #[test]
    fn promote_evicts_oldest_past_limit() {
        let mut h = SearchHistory::new();
        for city in ["A", "B", "C", "D", "E", "F"] {
            h.promote(&q(city));
        }

        assert_eq!(h.len(), HISTORY_LIMIT);
        assert_eq!(h.as_slice(), ["F", "E", "D", "C", "B"]);
        assert!(!h.contains("a"));
    }

    #[test]
    fn promote_existing_city_keeps_length() {
        let mut h = SearchHistory::from_entries(["A", "B", "C", "D", "E"]);
        h.promote(&q("d"));

        assert_eq!(h.as_slice(), ["d", "A", "B", "C", "E"]);
    }

    #[test]
    fn remove_drops_all_case_insensitive_matches() {
        let mut h = SearchHistory::from_entries(["Oslo", "Bern"]);

        assert_eq!(h.remove("OSLO"), 1);
        assert_eq!(h.as_slice(), ["Bern"]);
        assert_eq!(h.remove("Rome"), 0);
    }

    #[test]
    fn from_entries_restores_invariants() {
        let h = SearchHistory::from_entries([
            "Rome", "rome", " ", "Kyiv", "Lima", "Baku", "Doha", "Riga",
        ]);

        assert_eq!(h.as_slice(), ["Rome", "Kyiv", "Lima", "Baku", "Doha"]);
    }

    #[test]
    fn deserialize_restores_invariants() {
        let raw = r#"["Rome", "ROME", "", "Kyiv", "Lima", "Baku", "Doha", "Riga"]"#;
        let h: SearchHistory = serde_json::from_str(raw).unwrap();

        assert_eq!(h.as_slice(), ["Rome", "Kyiv", "Lima", "Baku", "Doha"]);
        assert_eq!(serde_json::to_string(&h).unwrap(), r#"["Rome","Kyiv","Lima","Baku","Doha"]"#);
    }
}
