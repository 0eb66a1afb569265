//! Helpers for the JSON representation of request and response bodies.

use serde::{Deserialize, Deserializer};

use crate::Error;

pub mod iso_date {
    //! Serializes a [time::Date] as a `YYYY-MM-DD` string.
    //!
    //! The default serde representation of [time::Date] is a tuple of the year
    //! and ordinal day, which is not what API clients expect.
    use serde::{Deserialize, Deserializer, Serializer};
    use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

    /// Date format used in request bodies, responses and query strings, e.g. "2024-01-31".
    pub const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = date
            .format(DATE_FORMAT)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(serde::de::Error::custom)
    }

    /// Like [deserialize] but for optional fields, mapping `null` to `None`.
    pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|s| parse(&s).map_err(serde::de::Error::custom))
            .transpose()
    }

    /// Parse a `YYYY-MM-DD` string.
    pub fn parse(text: &str) -> Result<Date, time::error::Parse> {
        Date::parse(text, DATE_FORMAT)
    }
}

pub mod rfc3339 {
    //! Serializes a [time::OffsetDateTime] as an RFC 3339 string, e.g. "2024-01-31T09:30:00.123Z".
    use serde::Serializer;
    use time::{OffsetDateTime, format_description::well_known::Rfc3339};

    pub fn serialize<S>(timestamp: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = timestamp
            .format(&Rfc3339)
            .map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }
}

/// Unwrap a field that a full update or create request must include.
///
/// # Errors
///
/// Returns an [Error::InvalidField] for `field` if `value` is `None`.
pub fn required<T>(value: Option<T>, field: &'static str) -> Result<T, Error> {
    value.ok_or_else(|| Error::invalid_field(field, "This field is required."))
}

/// Reject an explicit `null` for a field that may be omitted but not cleared.
///
/// # Errors
///
/// Returns an [Error::InvalidField] for `field` if `value` is `Some(None)`.
pub fn not_null<T>(value: Option<Option<T>>, field: &'static str) -> Result<Option<T>, Error> {
    match value {
        Some(None) => Err(Error::invalid_field(field, "This field may not be null.")),
        Some(Some(value)) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Deserialize a field that is present in the request body.
///
/// Used with `#[serde(default, deserialize_with = "deserialize_some")]` on an
/// `Option<Option<T>>` so that partial updates can tell a missing field
/// (`None`) apart from an explicit `null` (`Some(None)`).
pub fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}
