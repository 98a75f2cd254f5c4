//! Tolerant deserializers for payloads written by older clients.
//!
//! The browser client has sent booleans both as JSON booleans and as `0`/`1`
//! integers, so every boolean input field goes through these helpers.

use serde::{Deserialize, Deserializer, de::Error as _};
use serde_json::Value;

fn bool_from_value<E: serde::de::Error>(value: Value) -> Result<bool, E> {
    match value {
        Value::Bool(b) => Ok(b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(E::custom(format!("expected 0 or 1, got {n}"))),
        },
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Ok(true),
            "false" | "0" => Ok(false),
            other => Err(E::custom(format!("expected boolean, got \"{other}\""))),
        },
        other => Err(E::custom(format!("expected boolean, got {other}"))),
    }
}

pub fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    bool_from_value(value)
}

pub fn flexible_bool_opt<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => bool_from_value(value).map(Some),
    }
}

/// Accepts integers or numeric strings; `null` maps to `None`.
pub fn flexible_i32_opt<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| D::Error::custom(format!("expected integer, got {n}"))),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => s
            .trim()
            .parse::<i32>()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("expected integer, got \"{s}\""))),
        Some(other) => Err(D::Error::custom(format!("expected integer, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Deserialize)]
    struct Toggle {
        #[serde(deserialize_with = "flexible_bool")]
        completed: bool,
    }

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "flexible_bool_opt")]
        check: Option<bool>,
        #[serde(default, deserialize_with = "flexible_i32_opt")]
        days: Option<i32>,
    }

    #[test]
    fn accepts_json_booleans_and_integers() {
        let t: Toggle = serde_json::from_str(r#"{"completed": true}"#).unwrap();
        assert!(t.completed);
        let t: Toggle = serde_json::from_str(r#"{"completed": 0}"#).unwrap();
        assert!(!t.completed);
        let t: Toggle = serde_json::from_str(r#"{"completed": 1}"#).unwrap();
        assert!(t.completed);
    }

    #[test]
    fn rejects_other_integers() {
        assert!(serde_json::from_str::<Toggle>(r#"{"completed": 2}"#).is_err());
    }

    #[test]
    fn optional_fields_tolerate_absence_and_null() {
        let p: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(p.check, None);
        assert_eq!(p.days, None);

        let p: Patch = serde_json::from_str(r#"{"check": null, "days": "5"}"#).unwrap();
        assert_eq!(p.check, None);
        assert_eq!(p.days, Some(5));
    }
}
