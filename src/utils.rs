//! Serde helpers for request payloads

use serde::de::{self, Deserialize, Deserializer};
use serde_json::{Number, Value};

/// Distinguish an absent field from an explicit `null`
///
/// Use together with `#[serde(default)]`: absent gives `None`,
/// `null` gives `Some(None)` and a value gives `Some(Some(v))`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Decimal that may arrive as a JSON number or a string, kept as text
pub fn deserialize_decimal<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => decimal_from_value(value).map(Some),
    }
}

/// Like [`deserialize_decimal`] but keeps an explicit `null`
pub fn deserialize_nullable_decimal<'de, D>(
    deserializer: D,
) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Some(None)),
        value => decimal_from_value(value).map(|s| Some(Some(s))),
    }
}

fn decimal_from_value<E: de::Error>(value: Value) -> Result<String, E> {
    match value {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(number_to_decimal(&n)),
        other => Err(E::custom(format!(
            "expected a decimal number or string, found {}",
            other
        ))),
    }
}

/// Plain decimal notation for a JSON number, never exponent form
pub fn number_to_decimal(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        i.to_string()
    } else if let Some(u) = n.as_u64() {
        u.to_string()
    } else {
        n.as_f64().map(|f| f.to_string()).unwrap_or_else(|| n.to_string())
    }
}
