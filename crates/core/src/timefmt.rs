//! Persisted date/time spellings.
//!
//! Timestamps are `%d-%m-%Y %H:%M:%S`, dates `%d-%m-%Y`; an absent optional value
//! is the empty string.

use chrono::{NaiveDate, NaiveDateTime};

pub const DATETIME_FORMAT: &str = "%d-%m-%Y %H:%M:%S";
pub const DATE_FORMAT: &str = "%d-%m-%Y";
/// Human-facing date on rendered documents, e.g. `05 Apr 2025`.
pub const DISPLAY_DATE_FORMAT: &str = "%d %b %Y";

pub fn format_datetime(value: &NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

pub fn format_date(value: &NaiveDate) -> String {
    value.format(DATE_FORMAT).to_string()
}

pub fn format_opt_date(value: Option<&NaiveDate>) -> String {
    value.map(format_date).unwrap_or_default()
}

/// `NaiveDateTime` as `%d-%m-%Y %H:%M:%S`.
pub mod datetime {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_datetime(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(raw.trim(), super::DATETIME_FORMAT).map_err(D::Error::custom)
    }
}

/// `Option<NaiveDateTime>`; `None` is `""`.
pub mod opt_datetime {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &Option<NaiveDateTime>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => s.serialize_str(&super::format_datetime(v)),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw = Option::<String>::deserialize(d)?.unwrap_or_default();
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveDateTime::parse_from_str(raw, super::DATETIME_FORMAT)
            .map(Some)
            .map_err(D::Error::custom)
    }
}

/// `Option<NaiveDate>`; `None` is `""`.
pub mod opt_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::format_opt_date(value.as_ref()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw = Option::<String>::deserialize(d)?.unwrap_or_default();
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(raw, super::DATE_FORMAT)
            .map(Some)
            .map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Stamped {
        #[serde(with = "datetime")]
        at: NaiveDateTime,
        #[serde(default, with = "opt_date")]
        paid_on: Option<NaiveDate>,
    }

    #[test]
    fn uses_day_first_spellings_and_empty_for_none() {
        let at = NaiveDate::from_ymd_opt(2025, 4, 5)
            .unwrap()
            .and_hms_opt(14, 3, 9)
            .unwrap();
        let json = serde_json::to_string(&Stamped { at, paid_on: None }).unwrap();
        assert_eq!(json, r#"{"at":"05-04-2025 14:03:09","paid_on":""}"#);

        let back: Stamped =
            serde_json::from_str(r#"{"at":"05-04-2025 14:03:09","paid_on":"07-04-2025"}"#).unwrap();
        assert_eq!(back.paid_on, NaiveDate::from_ymd_opt(2025, 4, 7));
    }

    #[test]
    fn missing_optional_key_is_none() {
        let back: Stamped = serde_json::from_str(r#"{"at":"05-04-2025 14:03:09"}"#).unwrap();
        assert_eq!(back.paid_on, None);
    }
}
