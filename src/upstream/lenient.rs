//! Forgiving field decoders.
//!
//! Plex and Home Assistant disagree (and change their minds) about whether
//! numbers arrive as JSON numbers or strings. Anything that does not parse
//! becomes zero so a malformed field never breaks the display.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Raw {
    Unsigned(u64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

impl Raw {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Raw::Unsigned(value) => Some(*value as f64),
            Raw::Float(value) => Some(*value),
            Raw::Text(text) => Some(text.trim().parse::<f64>().unwrap_or(0.0)),
            Raw::Other(serde_json::Value::Null) => None,
            Raw::Other(_) => Some(0.0),
        }
    }

    fn as_u64(&self) -> Option<u64> {
        match self {
            Raw::Unsigned(value) => Some(*value),
            Raw::Text(text) => Some(text.trim().parse::<u64>().unwrap_or(0)),
            _ => self.as_f64().map(truncate_unsigned),
        }
    }
}

fn truncate_unsigned(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value as u64
    } else {
        0
    }
}

/// Number or numeric string; missing, null or garbage become 0.
pub fn u64_or_zero<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Raw>::deserialize(deserializer)?;
    Ok(raw.and_then(|raw| raw.as_u64()).unwrap_or(0))
}

pub fn u32_or_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = u64_or_zero(deserializer)?;
    Ok(u32::try_from(value).unwrap_or(0))
}

/// Optional float; `null` stays absent, unparseable text becomes `Some(0.0)`.
pub fn optional_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Raw>::deserialize(deserializer)?;
    Ok(raw.and_then(|raw| raw.as_f64()))
}

pub fn optional_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Raw>::deserialize(deserializer)?;
    Ok(raw
        .and_then(|raw| raw.as_u64())
        .map(|value| u32::try_from(value).unwrap_or(0)))
}

/// String or number rendered as a string; null becomes empty.
pub fn string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Raw>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Raw::Text(text)) => text,
        Some(Raw::Unsigned(value)) => value.to_string(),
        Some(Raw::Float(value)) => value.to_string(),
        Some(Raw::Other(serde_json::Value::Null)) | None => String::new(),
        Some(Raw::Other(other)) => other.to_string(),
    })
}

/// Like [`string`] but keeps absence distinct from an empty value.
pub fn optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Raw>::deserialize(deserializer)?;
    Ok(match raw {
        Some(Raw::Text(text)) => Some(text),
        Some(Raw::Unsigned(value)) => Some(value.to_string()),
        Some(Raw::Float(value)) => Some(value.to_string()),
        Some(Raw::Other(serde_json::Value::Null)) | None => None,
        Some(Raw::Other(other)) => Some(other.to_string()),
    })
}
