/// Shared types used across the codebase

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// The two register variants. They share one record shape and differ only in
/// which program table the code points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegisterKind {
    Trade,
    Training,
}

impl RegisterKind {
    pub const ALL: [RegisterKind; 2] = [RegisterKind::Trade, RegisterKind::Training];

    pub fn register_table(&self) -> &'static str {
        match self {
            RegisterKind::Trade => "trade_register",
            RegisterKind::Training => "training_register",
        }
    }

    pub fn program_table(&self) -> &'static str {
        match self {
            RegisterKind::Trade => "trade_master",
            RegisterKind::Training => "training_master",
        }
    }

    /// Column holding the program code, identical in the register and master tables
    pub fn program_column(&self) -> &'static str {
        match self {
            RegisterKind::Trade => "trade_code",
            RegisterKind::Training => "training_code",
        }
    }

    pub fn program_name_column(&self) -> &'static str {
        match self {
            RegisterKind::Trade => "trade_name",
            RegisterKind::Training => "training_name",
        }
    }

    /// Only trade registrations track when the enrollment started
    pub fn has_enrollment_date(&self) -> bool {
        matches!(self, RegisterKind::Trade)
    }

    // Wire field names
    pub fn code_field(&self) -> &'static str {
        match self {
            RegisterKind::Trade => "Trade_Code",
            RegisterKind::Training => "Training_Code",
        }
    }

    pub fn name_field(&self) -> &'static str {
        match self {
            RegisterKind::Trade => "Trade_Name",
            RegisterKind::Training => "Training_Name",
        }
    }

    /// Route segment, e.g. `trade-registers`
    pub fn path_segment(&self) -> &'static str {
        match self {
            RegisterKind::Trade => "trade-registers",
            RegisterKind::Training => "training-registers",
        }
    }

    /// Human label used in response messages
    pub fn label(&self) -> &'static str {
        match self {
            RegisterKind::Trade => "Trade registration",
            RegisterKind::Training => "Training registration",
        }
    }
}

impl std::fmt::Display for RegisterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegisterKind::Trade => f.write_str("trade"),
            RegisterKind::Training => f.write_str("training"),
        }
    }
}

/// Parse a calendar date from `YYYY-MM-DD` or from an ISO timestamp, keeping
/// only the part before `T`.
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    let date_part = raw.split('T').next().unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as a date ({err})"))
}

/// Parse a full record timestamp. RFC 3339 first; a naive
/// `YYYY-MM-DD HH:MM:SS[.f]` value is read as UTC, a bare date as UTC midnight.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|day| day.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        })
        .ok_or_else(|| format!("failed to parse '{raw}' as a timestamp"))
}

pub fn deserialize_calendar_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_calendar_date(&raw).map_err(serde::de::Error::custom)
}

pub fn deserialize_optional_calendar_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_calendar_date(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Codes arrive as JSON numbers or as numeric strings from form posts
pub fn deserialize_code<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Code {
        Number(i32),
        Text(String),
    }

    match Code::deserialize(deserializer)? {
        Code::Number(n) => Ok(n),
        Code::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid code '{s}'"))),
    }
}

pub fn deserialize_optional_code<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "deserialize_code")] i32);

    Option::<Wrapper>::deserialize(deserializer).map(|opt| opt.map(|Wrapper(code)| code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn calendar_date_accepts_plain_and_iso_forms() {
        let expected = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(parse_calendar_date("2025-06-01").unwrap(), expected);
        assert_eq!(parse_calendar_date("2025-06-01T18:30:00.000Z").unwrap(), expected);
        assert!(parse_calendar_date("06/01/2025").is_err());
        assert!(parse_calendar_date("").is_err());
    }

    #[test]
    fn timestamp_parsing_keeps_precision() {
        let ts = parse_timestamp("2025-06-01T08:15:30.123456Z").unwrap();
        assert_eq!(ts.nanosecond(), 123_456_000);

        let offset = parse_timestamp("2025-06-01T10:15:30+02:00").unwrap();
        assert_eq!(offset, Utc.with_ymd_and_hms(2025, 6, 1, 8, 15, 30).unwrap());

        let naive = parse_timestamp("2025-06-01 08:15:30").unwrap();
        assert_eq!(naive, Utc.with_ymd_and_hms(2025, 6, 1, 8, 15, 30).unwrap());

        let midnight = parse_timestamp("2025-06-01").unwrap();
        assert_eq!(midnight, Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap());
        assert!(parse_timestamp("June 1st").is_err());
    }

    #[test]
    fn codes_accept_numbers_and_numeric_strings() {
        #[derive(Deserialize)]
        struct Body {
            #[serde(deserialize_with = "deserialize_code")]
            code: i32,
        }

        let a: Body = serde_json::from_value(serde_json::json!({ "code": 12 })).unwrap();
        let b: Body = serde_json::from_value(serde_json::json!({ "code": " 12 " })).unwrap();
        assert_eq!(a.code, 12);
        assert_eq!(b.code, 12);
        assert!(serde_json::from_value::<Body>(serde_json::json!({ "code": "x" })).is_err());
    }

    #[test]
    fn kinds_map_to_their_tables() {
        assert_eq!(RegisterKind::Trade.register_table(), "trade_register");
        assert_eq!(RegisterKind::Training.program_column(), "training_code");
        assert!(!RegisterKind::Training.has_enrollment_date());
        assert_eq!(RegisterKind::Training.path_segment(), "training-registers");
    }
}
