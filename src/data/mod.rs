//! View models parsed from ESPN JSON
//!
//! This module contains the data types the widgets render: game summaries with
//! box scores, team schedules, league standings and the generic detail catalog
//! attached to schedule and standings rows. Parsing is tolerant: missing or
//! malformed fields become defaults rather than errors.

pub mod details;
pub mod game;
pub mod schedule;
pub mod standings;
pub mod teams;

pub use details::{Detail, DetailCatalog, DetailKind};
pub use game::{parse_game_summary, Broadcast, GameSummary, Injury, Leader, PlayerStats, TeamBoxScore, TeamTotals};
pub use schedule::{group_by_month, parse_team_schedule, spotlight, ScheduledGame, Spotlight};
pub use standings::{by_conference, find_team_standing, parse_standings, SeedTier, Standing};
pub use teams::{find_team, logo_url, short_team_name, Team};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

/// Reads a string at a JSON pointer, accepting numbers as well
pub(crate) fn text_at(value: &Value, pointer: &str) -> Option<String> {
    match value.pointer(pointer)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parses an integer the way a lenient number reader does
///
/// Leading whitespace and an optional sign are accepted, then as many digits as
/// follow; anything after the digits is ignored. Returns `None` when no digit
/// is present (e.g. `"--"` or `""`).
pub(crate) fn parse_int(raw: &str) -> Option<i32> {
    let trimmed = raw.trim_start();
    let (sign, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1, &trimmed[1..]),
        Some(b'+') => (1, &trimmed[1..]),
        _ => (1, trimmed),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse::<i32>().ok().map(|n| sign * n)
}

/// Parses ESPN timestamps
///
/// ESPN mostly sends minute precision without seconds (`2025-01-10T01:00Z`),
/// which RFC 3339 parsers reject, so both shapes are accepted.
pub(crate) fn parse_espn_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%MZ")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_parse_int_variants() {
        assert_eq!(parse_int("34"), Some(34));
        assert_eq!(parse_int("+7"), Some(7));
        assert_eq!(parse_int("-12"), Some(-12));
        assert_eq!(parse_int(" 5"), Some(5));
        assert_eq!(parse_int("12abc"), Some(12));
        assert_eq!(parse_int("--"), None);
        assert_eq!(parse_int(""), None);
        assert_eq!(parse_int("DNP"), None);
    }

    #[test]
    fn test_parse_espn_date_minute_precision() {
        assert_eq!(
            parse_espn_date("2025-01-10T01:00Z"),
            Some(Utc.with_ymd_and_hms(2025, 1, 10, 1, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_parse_espn_date_rfc3339() {
        assert_eq!(
            parse_espn_date("2025-01-10T01:00:00.000Z"),
            Some(Utc.with_ymd_and_hms(2025, 1, 10, 1, 0, 0).unwrap())
        );
        assert_eq!(parse_espn_date("yesterday"), None);
    }

    #[test]
    fn test_text_at_reads_strings_and_numbers() {
        let value = json!({"a": {"s": "x", "n": 18542, "b": true}});
        assert_eq!(text_at(&value, "/a/s").as_deref(), Some("x"));
        assert_eq!(text_at(&value, "/a/n").as_deref(), Some("18542"));
        assert_eq!(text_at(&value, "/a/b"), None);
        assert_eq!(text_at(&value, "/missing"), None);
    }
}
