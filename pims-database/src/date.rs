//! Dates cross the storage boundary as sortable ISO-8601 UTC strings with millisecond precision,
//! e.g. `2024-03-15T00:00:00.000Z`. Bare `YYYY-MM-DD` strings are read as midnight UTC.
//!
//! Use with `#[serde(with = "crate::date")]` or `#[serde(with = "crate::date::option")]`.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use serde::{Deserialize as _, Deserializer, Serializer};

#[must_use]
pub fn to_iso8601(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_iso8601(input: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(input)
        .map(|date| date.with_timezone(&Utc))
        .or_else(|error| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .map(|day| day.and_time(NaiveTime::MIN).and_utc())
                .map_err(|_| error)
        })
}

pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&to_iso8601(date))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let input = String::deserialize(deserializer)?;
    parse_iso8601(&input).map_err(serde::de::Error::custom)
}

pub mod option {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize as _, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        date: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.serialize_some(&super::to_iso8601(date)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|input| super::parse_iso8601(&input).map_err(serde::de::Error::custom))
            .transpose()
    }
}
