//! ISO-8601 local date-times without offset, e.g. `2024-01-01T10:00:00`.
//!
//! Use with `#[serde(with = "crate::datetime")]`, or `crate::datetime::option`
//! for nullable fields.

use serde::{de, ser, Deserialize, Deserializer, Serializer};
use time::{format_description::BorrowedFormatItem, macros::format_description, PrimitiveDateTime};

const SECONDS: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
const FRACTIONAL: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond]");
const MINUTES: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]");

pub fn format(value: &PrimitiveDateTime) -> Result<String, time::error::Format> {
    value.format(SECONDS)
}

pub fn parse(raw: &str) -> Result<PrimitiveDateTime, time::error::Parse> {
    let raw = raw.trim();
    PrimitiveDateTime::parse(raw, SECONDS)
        .or_else(|_| PrimitiveDateTime::parse(raw, FRACTIONAL))
        .or_else(|_| PrimitiveDateTime::parse(raw, MINUTES))
}

pub fn serialize<S: Serializer>(value: &PrimitiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    let text = format(value).map_err(ser::Error::custom)?;
    serializer.serialize_str(&text)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PrimitiveDateTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(|e| de::Error::custom(format!("invalid date-time '{raw}': {e}")))
}

pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<PrimitiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => super::serialize(v, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<PrimitiveDateTime>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|r| parse(&r).map_err(|e| de::Error::custom(format!("invalid date-time '{r}': {e}"))))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn formats_without_fraction_or_offset() {
        let value = datetime!(2023-01-01 12:00:00.250);
        assert_eq!(format(&value).unwrap(), "2023-01-01T12:00:00");
    }

    #[test]
    fn parses_common_client_shapes() {
        assert_eq!(parse("2024-01-01T10:00:00").unwrap(), datetime!(2024-01-01 10:00));
        assert_eq!(parse("2024-01-01T10:00").unwrap(), datetime!(2024-01-01 10:00));
        assert_eq!(
            parse("2024-01-01T10:00:00.5").unwrap(),
            datetime!(2024-01-01 10:00:00.5)
        );
        assert!(parse("01/01/2024 10:00").is_err());
    }
}
