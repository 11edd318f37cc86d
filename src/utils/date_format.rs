//! Codecs for the two timestamp shapes the Wave API uses.
//!
//! Dates are `YYYY-MM-DD`. Date-times are `YYYY-MM-DDTHH:MM:SS+00:00` where
//! the offset is a fixed literal: input with any other offset is rejected,
//! and output always carries `+00:00` whatever the value's own offset is.
//! Normalize with [`OffsetDateTime::to_offset`] before encoding a non-UTC value.

use serde::{self, Deserialize, Deserializer, Serializer};
use thiserror::Error;
use time::{Date, OffsetDateTime, PrimitiveDateTime, format_description::BorrowedFormatItem, macros::format_description};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");
const DATETIME_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]+00:00");

#[derive(Debug, Error)]
pub enum DateFormatError {
    #[error("cannot parse {input:?}: {source}")]
    Parse {
        input: String,
        #[source]
        source: time::error::Parse,
    },

    #[error("cannot parse {0:?}: year must not carry a sign")]
    SignedYear(String),

    #[error("year {0} is outside of range [0,9999]")]
    YearOutOfRange(i32),

    #[error(transparent)]
    Format(#[from] time::error::Format),
}

fn check_year(year: i32) -> Result<(), DateFormatError> {
    if (0..=9999).contains(&year) {
        Ok(())
    } else {
        Err(DateFormatError::YearOutOfRange(year))
    }
}

// `[year]` accepts a leading `+` or `-`, which the API never sends.
fn check_unsigned(input: &str) -> Result<(), DateFormatError> {
    if input.starts_with(['+', '-']) {
        Err(DateFormatError::SignedYear(input.to_string()))
    } else {
        Ok(())
    }
}

pub fn parse_datetime(input: &str) -> Result<OffsetDateTime, DateFormatError> {
    check_unsigned(input)?;
    PrimitiveDateTime::parse(input, DATETIME_FORMAT)
        .map(PrimitiveDateTime::assume_utc)
        .map_err(|source| DateFormatError::Parse {
            input: input.to_string(),
            source,
        })
}

pub fn format_datetime(datetime: &OffsetDateTime) -> Result<String, DateFormatError> {
    check_year(datetime.year())?;
    Ok(datetime.format(DATETIME_FORMAT)?)
}

pub fn parse_date(input: &str) -> Result<Date, DateFormatError> {
    check_unsigned(input)?;
    Date::parse(input, DATE_FORMAT).map_err(|source| DateFormatError::Parse {
        input: input.to_string(),
        source,
    })
}

pub fn format_date(date: &Date) -> Result<String, DateFormatError> {
    check_year(date.year())?;
    Ok(date.format(DATE_FORMAT)?)
}

pub mod wave_datetime_format {
    use super::{Deserialize, Deserializer, OffsetDateTime, Serializer, serde};

    pub fn serialize<S>(datetime: &OffsetDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = super::format_datetime(datetime).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<OffsetDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_datetime(&s).map_err(serde::de::Error::custom)
    }
}

// `null` and a missing field both decode to `None`.
pub mod wave_datetime_format_option {
    use super::{Deserialize, Deserializer, OffsetDateTime, Serializer, serde};

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(datetime: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match datetime {
            Some(dt) => super::wave_datetime_format::serialize(dt, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|s| super::parse_datetime(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

pub mod wave_date_format {
    use super::{Date, Deserialize, Deserializer, Serializer, serde};

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let formatted = super::format_date(date).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&formatted)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        super::parse_date(&s).map_err(serde::de::Error::custom)
    }
}

pub mod wave_date_format_option {
    use super::{Date, Deserialize, Deserializer, Serializer, serde};

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => super::wave_date_format::serialize(date, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|s| super::parse_date(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
