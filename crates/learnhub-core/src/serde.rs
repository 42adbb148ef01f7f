//! Custom serde deserialization helpers for query parameters.
//!
//! Query strings deliver every value as a string; these helpers turn them
//! into the types handlers actually want while staying lenient about
//! empty or malformed values.

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// Deserializes an optional integer, tolerating string-encoded values.
///
/// Empty strings and values that fail to parse become `None` so callers
/// can apply their defaults, mirroring `parseInt(x) || default` behavior.
pub fn deserialize_lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Str(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Int(n)) => Some(n),
        Some(Raw::Str(s)) => s.trim().parse::<i64>().ok(),
        None => None,
    })
}

/// Deserializes an optional UUID, treating an empty string as absent.
pub fn deserialize_optional_uuid<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => Uuid::parse_str(&s).map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Deserializes a boolean flag from a query parameter.
///
/// Only the literal string `"true"` enables the flag; anything else
/// (missing, empty, `"false"`, garbage) leaves it off.
pub fn deserialize_bool_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(matches!(s.as_deref(), Some("true")))
}
