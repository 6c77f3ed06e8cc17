use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::well_known::{Iso8601, Rfc3339};
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::ValidationError;

/// Years RFC3339 can render with four digits.
const RFC3339_YEARS: RangeInclusive<i32> = 0..=9999;

/// Timestamp normalized to UTC and rendered as RFC3339.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UtcDateTime(OffsetDateTime);

impl UtcDateTime {
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }

    /// Parse an ISO-8601 timestamp.
    ///
    /// Offset-carrying values are converted to UTC. Values without an offset
    /// (`2024-03-01T14:30:00.123456`, `2024-03-01 14:30:00`) are read as UTC.
    /// Values whose UTC year falls outside 0000..=9999 are rejected.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        let utc = match OffsetDateTime::parse(trimmed, &Rfc3339) {
            Ok(parsed) => parsed.checked_to_offset(UtcOffset::UTC),
            Err(_) => {
                let naive = trimmed.replacen(' ', "T", 1);
                PrimitiveDateTime::parse(&naive, &Iso8601::DEFAULT)
                    .ok()
                    .map(PrimitiveDateTime::assume_utc)
            }
        };

        utc.filter(|value| RFC3339_YEARS.contains(&value.year()))
            .map(Self)
            .ok_or_else(|| ValidationError::InvalidTimestamp {
                value: input.to_owned(),
            })
    }

    pub fn into_inner(self) -> OffsetDateTime {
        self.0
    }

    pub fn format_rfc3339(self) -> String {
        self.0
            .format(&Rfc3339)
            .unwrap_or_else(|_| self.0.unix_timestamp().to_string())
    }

    /// `YYYYMMDD_HHMMSS`, used in output file names.
    pub fn file_stamp(self) -> String {
        self.0
            .format(format_description!(
                "[year][month][day]_[hour][minute][second]"
            ))
            .unwrap_or_else(|_| self.0.unix_timestamp().to_string())
    }
}

impl Display for UtcDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_rfc3339())
    }
}

impl Serialize for UtcDateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_rfc3339())
    }
}

impl<'de> Deserialize<'de> for UtcDateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}
