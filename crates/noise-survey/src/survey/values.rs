//! Lenient coercion of user-entered survey values.
//!
//! Survey records arrive from form fields, so numbers are frequently strings and
//! dates may be blank or half-typed. Nothing in here fails: unparseable input
//! maps to `None` (or 0 where a number is required) and the engines carry on.

use chrono::{DateTime, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// Parse a numeric field, rejecting blanks, garbage, and non-finite values.
pub fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    trimmed.parse::<f64>().ok().filter(|value| value.is_finite())
}

pub fn number_or_zero(raw: &str) -> f64 {
    parse_number(raw).unwrap_or(0.0)
}

/// Readings that fail to parse are dropped rather than counted as zero, since a
/// zero would drag an energetic average down.
pub fn parse_readings(readings: &[String]) -> Vec<f64> {
    readings
        .iter()
        .filter_map(|reading| parse_number(reading))
        .collect()
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    None
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNumber {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

/// Accepts a JSON number or a numeric string; anything else becomes 0.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match RawNumber::deserialize(deserializer)? {
        RawNumber::Number(number) if number.is_finite() => number,
        RawNumber::Text(text) => number_or_zero(&text),
        RawNumber::Number(_) | RawNumber::Other(_) => 0.0,
    };
    Ok(value)
}

/// Accepts a JSON number or string and keeps it as the string the form holds.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match RawNumber::deserialize(deserializer)? {
        RawNumber::Number(number) => number.to_string(),
        RawNumber::Text(text) => text,
        RawNumber::Other(serde_json::Value::Null) => String::new(),
        RawNumber::Other(other) => other.to_string(),
    };
    Ok(value)
}

pub(crate) fn lenient_strings<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapped(#[serde(deserialize_with = "lenient_string")] String);

    let values = Option::<Vec<Wrapped>>::deserialize(deserializer)?;
    Ok(values
        .unwrap_or_default()
        .into_iter()
        .map(|Wrapped(value)| value)
        .collect())
}

/// Dates that do not parse are treated as "not recorded".
pub(crate) fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(text)) => parse_date(&text),
        _ => None,
    })
}

fn choice_from_value<T: DeserializeOwned>(value: serde_json::Value) -> Option<T> {
    let value = match value {
        serde_json::Value::String(text) => serde_json::Value::String(text.trim().to_string()),
        other => other,
    };
    serde_json::from_value(value).ok()
}

/// Enum-valued form field. Blank or unrecognised selections become `None`.
pub(crate) fn lenient_choice<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(raw.and_then(choice_from_value))
}

/// Like `lenient_choice`, falling back to the type's default.
pub(crate) fn lenient_choice_or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(lenient_choice(deserializer)?.unwrap_or_default())
}

/// Map of enum selections; entries with no usable selection are left out.
pub(crate) fn lenient_choice_map<'de, D, K, T>(deserializer: D) -> Result<BTreeMap<K, T>, D::Error>
where
    D: Deserializer<'de>,
    K: Deserialize<'de> + Ord,
    T: DeserializeOwned,
{
    let raw = Option::<BTreeMap<K, serde_json::Value>>::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(key, value)| choice_from_value(value).map(|choice| (key, choice)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_number_rejects_garbage_and_blanks() {
        assert_eq!(parse_number(" 91.5 "), Some(91.5));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("loud"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(number_or_zero("n/a"), 0.0);
    }

    #[test]
    fn parse_readings_drops_unparseable_entries() {
        let readings = vec!["90".to_string(), "".to_string(), "x".to_string(), "88.2".to_string()];
        assert_eq!(parse_readings(&readings), vec![90.0, 88.2]);
    }

    #[test]
    fn parse_date_accepts_plain_and_rfc3339() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date");
        assert_eq!(parse_date("2025-03-14"), Some(expected));
        assert_eq!(parse_date("2025-03-14T08:30:00Z"), Some(expected));
        assert_eq!(parse_date("14/03/2025"), None);
        assert_eq!(parse_date("  "), None);
    }

    #[test]
    fn round1_rounds_half_up_for_positive_levels() {
        assert_eq!(round1(90.25), 90.3);
        assert_eq!(round1(84.94), 84.9);
    }

    #[test]
    fn lenient_deserializers_never_fail_on_values() {
        #[derive(Deserialize)]
        struct Loose {
            #[serde(deserialize_with = "lenient_f64")]
            number: f64,
            #[serde(deserialize_with = "lenient_string")]
            text: String,
            #[serde(default, deserialize_with = "lenient_date")]
            date: Option<NaiveDate>,
            #[serde(default, deserialize_with = "lenient_strings")]
            list: Vec<String>,
        }

        let loose: Loose = serde_json::from_str(
            r#"{"number":"oops","text":94.5,"date":"not a date","list":[90,"91",null]}"#,
        )
        .expect("lenient payload parses");
        assert_eq!(loose.number, 0.0);
        assert_eq!(loose.text, "94.5");
        assert!(loose.date.is_none());
        assert_eq!(loose.list, vec!["90", "91", ""]);
    }

    #[test]
    fn unselected_choices_fall_back() {
        #[derive(Deserialize, Debug, Clone, Copy, PartialEq, Default)]
        enum Answer {
            Yes,
            #[default]
            No,
        }

        #[derive(Deserialize)]
        struct Form {
            #[serde(default, deserialize_with = "lenient_choice")]
            picked: Option<Answer>,
            #[serde(default, deserialize_with = "lenient_choice")]
            blank: Option<Answer>,
            #[serde(default, deserialize_with = "lenient_choice_or_default")]
            unknown: Answer,
            #[serde(default, deserialize_with = "lenient_choice_map")]
            by_key: BTreeMap<String, Answer>,
        }

        let form: Form = serde_json::from_str(
            r#"{"picked":" Yes ","blank":"","unknown":42,"by_key":{"a":"Yes","b":"","c":null}}"#,
        )
        .expect("form parses");
        assert_eq!(form.picked, Some(Answer::Yes));
        assert_eq!(form.blank, None);
        assert_eq!(form.unknown, Answer::No);
        assert_eq!(form.by_key.len(), 1);
        assert_eq!(form.by_key.get("a"), Some(&Answer::Yes));
    }
}
