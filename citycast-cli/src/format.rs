use std::fmt::Write;

use chrono::Local;
use citycast_core::{CityQuery, ConditionGroup, ForecastEntry, LookupResult, SearchHistory};

fn icon(group: ConditionGroup) -> &'static str {
    match group {
        ConditionGroup::Thunderstorm => "⛈",
        ConditionGroup::Rain => "🌧",
        ConditionGroup::Snow => "❄",
        ConditionGroup::Fog => "🌫",
        ConditionGroup::Clear => "☀",
        ConditionGroup::Clouds => "☁",
    }
}

fn round(temp: f64) -> i64 {
    temp.round() as i64
}

fn capitalize_words(s: &str) -> String {
    s.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn weekday(entry: &ForecastEntry) -> String {
    entry
        .time()
        .map(|t| t.with_timezone(&Local).format("%a").to_string())
        .unwrap_or_else(|| "???".to_string())
}

pub fn render_lookup(result: &LookupResult) -> String {
    let c = &result.conditions;
    let mut out = String::new();

    let _ = writeln!(out, "{}  {}", icon(c.condition_group()), c.display_location());
    let _ = writeln!(
        out,
        "   {}°C  {}",
        round(c.temperature_c),
        capitalize_words(&c.condition_description)
    );
    let _ = writeln!(
        out,
        "   Feels like {}°C · Humidity {}% · Wind {} m/s · Pressure {} hPa",
        round(c.feels_like_c),
        c.humidity_pct,
        c.wind_speed_ms,
        c.pressure_hpa,
    );

    let days = result.forecast.daily_snapshots();
    if !days.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "5-Day Forecast");
        for day in &days {
            let _ = writeln!(
                out,
                "  {:<4} {:>4}°C  {}",
                weekday(day),
                round(day.temperature_c),
                day.condition_main
            );
        }
    }

    out
}

pub fn render_history(history: &SearchHistory, last: Option<&CityQuery>) -> String {
    if history.is_empty() {
        return "No recent searches.\n".to_string();
    }

    let mut out = String::from("Recent searches:\n");
    for city in history.iter() {
        let marker = if last.is_some_and(|l| l.matches(city)) { "*" } else { " " };
        let _ = writeln!(out, " {marker} {city}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use citycast_core::{CurrentConditions, Forecast};

    fn sample(entries: usize) -> LookupResult {
        LookupResult {
            conditions: CurrentConditions {
                location_name: "Reykjavik".into(),
                country_code: "IS".into(),
                temperature_c: -2.6,
                feels_like_c: -8.4,
                humidity_pct: 86,
                pressure_hpa: 998,
                wind_speed_ms: 9.3,
                condition_code: 601,
                condition_main: "Snow".into(),
                condition_description: "light snow".into(),
            },
            forecast: Forecast::new(
                (0..entries)
                    .map(|i| ForecastEntry {
                        timestamp: 1_700_000_000 + i as i64 * 10_800,
                        temperature_c: i as f64,
                        condition_main: "Snow".into(),
                    })
                    .collect(),
            ),
        }
    }

    #[test]
    fn renders_current_conditions() {
        let text = render_lookup(&sample(0));

        assert!(text.starts_with("❄  Reykjavik, IS\n"));
        assert!(text.contains("-3°C  Light Snow"));
        assert!(
            text.contains("Feels like -8°C · Humidity 86% · Wind 9.3 m/s · Pressure 998 hPa")
        );
        assert!(!text.contains("5-Day Forecast"));
    }

    #[test]
    fn renders_one_row_per_day() {
        let text = render_lookup(&sample(40));
        let rows: Vec<_> = text.lines().skip_while(|l| *l != "5-Day Forecast").skip(1).collect();

        assert_eq!(rows.len(), 5);
        assert!(rows[1].contains("8°C"));
    }

    #[test]
    fn capitalizes_each_word() {
        assert_eq!(capitalize_words("scattered clouds"), "Scattered Clouds");
        assert_eq!(capitalize_words(""), "");
    }

    #[test]
    fn history_marks_last_searched() {
        let history = SearchHistory::from_entries(["Lima", "Oslo"]);
        let last = CityQuery::parse("LIMA").unwrap();

        assert_eq!(render_history(&history, Some(&last)), "Recent searches:\n * Lima\n   Oslo\n");
        assert_eq!(render_history(&SearchHistory::new(), None), "No recent searches.\n");
    }
}
