//! Lenient numeric readers for loosely typed producer and service JSON

use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn coerce(value: Value) -> Option<f64> {
    match value {
        Value::Null => None,
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                Some(trimmed.parse::<f64>().unwrap_or(f64::NAN))
            }
        }
        Value::Bool(b) => Some(if b { 1.0 } else { 0.0 }),
        _ => Some(f64::NAN),
    }
}

/// Numbers as numbers, numeric strings parsed, other strings as NaN,
/// booleans as 0/1, null and absent as `None`
pub(crate) fn coerced_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(coerce))
}

/// Like [`coerced_number`], but a field that is present reads as a number
/// even when null (null counts as 0); only an absent field is `None`
pub(crate) fn present_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    Ok(Some(coerce(Value::deserialize(deserializer)?).unwrap_or(0.0)))
}

/// Only genuine JSON numbers count
pub(crate) fn number_only<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        _ => None,
    })
}

/// Non-negative count; null and unparsable values read as 0, fractions truncate
pub(crate) fn lenient_count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    let count = match value {
        Some(Value::Number(n)) => n.as_u64().or_else(|| n.as_f64().map(|f| f as u64)),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            trimmed
                .parse::<u64>()
                .ok()
                .or_else(|| trimmed.parse::<f64>().ok().map(|f| f as u64))
        }
        _ => None,
    };
    Ok(count.unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Sample {
        #[serde(default, deserialize_with = "coerced_number")]
        coerced: Option<f64>,
        #[serde(default, deserialize_with = "present_number")]
        present: Option<f64>,
        #[serde(default, deserialize_with = "lenient_count")]
        count: u64,
    }

    fn sample(json: &str) -> Sample {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_coerced_number() {
        assert_eq!(sample(r#"{"coerced": " 2.5 "}"#).coerced, Some(2.5));
        assert_eq!(sample(r#"{"coerced": ""}"#).coerced, Some(0.0));
        assert_eq!(sample(r#"{"coerced": true}"#).coerced, Some(1.0));
        assert_eq!(sample(r#"{"coerced": null}"#).coerced, None);
        assert!(sample(r#"{"coerced": [1]}"#).coerced.unwrap().is_nan());
    }

    #[test]
    fn test_present_null_is_zero() {
        assert_eq!(sample(r#"{"present": null}"#).present, Some(0.0));
        assert_eq!(sample(r#"{"present": "0.4"}"#).present, Some(0.4));
        assert_eq!(sample("{}").present, None);
    }

    #[test]
    fn test_lenient_count() {
        assert_eq!(sample(r#"{"count": null}"#).count, 0);
        assert_eq!(sample(r#"{"count": "12"}"#).count, 12);
        assert_eq!(sample(r#"{"count": 7.9}"#).count, 7);
        assert_eq!(sample(r#"{"count": -3}"#).count, 0);
        assert_eq!(sample(r#"{"count": "many"}"#).count, 0);
        assert_eq!(sample("{}").count, 0);
    }
}
