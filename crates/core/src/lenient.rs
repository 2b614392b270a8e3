//! Tolerant serde adapters for payloads produced outside this crate.
//!
//! Both the reasoning collaborator and browser clients send "almost" the
//! canonical shape: numbers as strings, `"unknown"` instead of `null`, a single
//! note instead of a list. These adapters collapse those variants into the
//! canonical types without ever inventing a value.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

const UNKNOWN_MARKERS: [&str; 7] = ["", "unknown", "n/a", "na", "null", "none", "-"];

/// Returns `true` when a free-text value means "not stated".
pub fn is_unknown_marker(raw: &str) -> bool {
    let normalized = raw.trim().to_ascii_lowercase();
    UNKNOWN_MARKERS.contains(&normalized.as_str())
}

/// A numeric field as the sender wrote it.
#[derive(Debug, Clone, PartialEq)]
pub enum NumberReading {
    Value(f64),
    /// Text that was not a plain number, such as `"approx. 20"` or `"2 in"`.
    Unparsed(String),
}

impl NumberReading {
    pub fn value(&self) -> Option<f64> {
        match self {
            NumberReading::Value(value) => Some(*value),
            NumberReading::Unparsed(_) => None,
        }
    }
}

/// Accepts a JSON number or a numeric string (`"20"`, `"1,200"`, `"0.5"`).
/// Other text is kept verbatim as [`NumberReading::Unparsed`]; unknown
/// markers and `null` become `None`.
pub fn number_or_text<'de, D>(deserializer: D) -> Result<Option<NumberReading>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(reading_from_value))
}

/// Accepts a string, number or bool; unknown markers become `None`.
pub fn option_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(string_from_value))
}

/// Free text taken as written. `null` becomes empty and any other non-string
/// value is kept as its JSON text.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(raw)) => raw,
        Some(other) => other.to_string(),
    })
}

/// Accepts a list of strings, a single string, or `null`.
pub fn string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let items = match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(values)) => values.iter().filter_map(string_from_value).collect(),
        Some(other) => string_from_value(&other).into_iter().collect(),
    };
    Ok(items)
}

fn reading_from_value(value: &Value) -> Option<NumberReading> {
    match value {
        Value::Number(number) => number.as_f64().filter(|n| n.is_finite()).map(NumberReading::Value),
        Value::String(raw) => match parse_number(raw) {
            Some(number) => Some(NumberReading::Value(number)),
            None => string_from_value(value).map(NumberReading::Unparsed),
        },
        _ => None,
    }
}

fn string_from_value(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(raw) => raw.trim().to_string(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => return None,
    };
    (!is_unknown_marker(&text)).then_some(text)
}

fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|ch| *ch != ',' && *ch != '_').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::{is_unknown_marker, number_or_text, option_string, string_list, text, NumberReading};

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "number_or_text")]
        quantity: Option<NumberReading>,
        #[serde(default, deserialize_with = "option_string")]
        grade: Option<String>,
        #[serde(default, deserialize_with = "string_list")]
        notes: Vec<String>,
        #[serde(default, deserialize_with = "text")]
        remark: String,
    }

    fn sample(value: serde_json::Value) -> Sample {
        serde_json::from_value(value).expect("sample should decode")
    }

    #[test]
    fn numeric_strings_are_accepted() {
        assert_eq!(sample(json!({"quantity": "1,200"})).quantity, Some(NumberReading::Value(1200.0)));
        assert_eq!(sample(json!({"quantity": 20})).quantity, Some(NumberReading::Value(20.0)));
    }

    #[test]
    fn non_numeric_text_is_kept_verbatim() {
        let reading = sample(json!({"quantity": " approx. 20 "})).quantity;
        assert_eq!(reading, Some(NumberReading::Unparsed("approx. 20".to_string())));
        assert_eq!(reading.and_then(|reading| reading.value()), None);
    }

    #[test]
    fn missing_numbers_stay_unknown() {
        assert_eq!(sample(json!({"quantity": "n/a"})).quantity, None);
        assert_eq!(sample(json!({"quantity": null})).quantity, None);
        assert_eq!(sample(json!({"quantity": true})).quantity, None);
        assert_eq!(sample(json!({})).quantity, None);
    }

    #[test]
    fn unknown_markers_collapse_to_none() {
        assert_eq!(sample(json!({"grade": "Unknown"})).grade, None);
        assert_eq!(sample(json!({"grade": " N/A "})).grade, None);
        assert_eq!(sample(json!({"grade": "SS316"})).grade.as_deref(), Some("SS316"));
        assert!(is_unknown_marker(""));
    }

    #[test]
    fn single_note_becomes_list() {
        assert_eq!(sample(json!({"notes": "EN 10204 3.1 certs"})).notes, vec!["EN 10204 3.1 certs"]);
        assert_eq!(sample(json!({"notes": ["a", null, "b"]})).notes, vec!["a", "b"]);
    }

    #[test]
    fn free_text_keeps_markers_and_stringifies_scalars() {
        assert_eq!(sample(json!({"remark": "None"})).remark, "None");
        assert_eq!(sample(json!({"remark": 5})).remark, "5");
        assert_eq!(sample(json!({"remark": null})).remark, "");
    }
}
