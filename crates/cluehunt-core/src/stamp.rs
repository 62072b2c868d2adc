//! Millisecond timestamps as stored in the hunt file.
//!
//! Set stamps are written as integer epoch milliseconds. On read, `null`,
//! `false`, `0` and an absent field all mean "unset", so hand-edited files
//! that use any of those spellings still load.

use chrono::{DateTime, Utc};
use serde::Serializer;
use serde::de::{self, Deserializer, Unexpected, Visitor};
use std::fmt;

pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(at) => serializer.serialize_i64(at.timestamp_millis()),
        None => serializer.serialize_none(),
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(StampVisitor)
}

struct StampVisitor;

impl<'de> Visitor<'de> for StampVisitor {
    type Value = Option<DateTime<Utc>>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("epoch milliseconds, false, or null")
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
        if value {
            Err(E::invalid_value(Unexpected::Bool(true), &self))
        } else {
            Ok(None)
        }
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Self::Value, E> {
        from_millis(value)
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Self::Value, E> {
        let ms = i64::try_from(value)
            .map_err(|_| E::invalid_value(Unexpected::Unsigned(value), &self))?;
        from_millis(ms)
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Self::Value, E> {
        if !value.is_finite() {
            return Err(E::invalid_value(Unexpected::Float(value), &self));
        }
        from_millis(value.trunc() as i64)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(StampVisitor)
    }
}

fn from_millis<E: de::Error>(ms: i64) -> Result<Option<DateTime<Utc>>, E> {
    if ms == 0 {
        return Ok(None);
    }
    DateTime::from_timestamp_millis(ms)
        .map(Some)
        .ok_or_else(|| E::custom(format!("timestamp out of range: {ms}")))
}
