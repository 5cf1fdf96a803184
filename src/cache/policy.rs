//! Refetch policy for cached API payloads
//!
//! A `CacheEntry` records when a payload was fetched and when it may be
//! fetched again. The refetch window is short while a game is live or close to
//! tip-off and long otherwise.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::StorageTier;

/// Version stamp written into every cache entry
pub const CACHE_VERSION: &str = "1";

/// Refetch window while a game is live or near its start (1 minute)
pub const LIVE_TTL_SECS: i64 = 60;

/// Refetch window otherwise (1 hour)
pub const DEFAULT_TTL_SECS: i64 = 3600;

/// Half-width of the window around the scheduled start that counts as live
pub const LIVE_WINDOW_SECS: i64 = 3600;

/// Status descriptions ESPN reports while a game is being played
const LIVE_STATUSES: [&str; 5] = [
    "in progress",
    "halftime",
    "overtime",
    "beginning of period",
    "end of period",
];

/// A cached payload with its fetch and refetch timestamps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    /// Identifies what was fetched (e.g. the ESPN event id)
    pub cache_key: String,
    /// Format version of the entry
    pub cache_version: String,
    /// When the payload was fetched
    pub fetch_date: DateTime<Utc>,
    /// Earliest instant a new fetch is allowed
    pub refetch_date: DateTime<Utc>,
    /// The payload itself
    pub cache_data: T,
}

impl<T> CacheEntry<T> {
    /// Creates an entry stamped with the current `CACHE_VERSION`
    ///
    /// A negative `ttl` is treated as zero so `refetch_date >= fetch_date` holds.
    pub fn new(cache_key: impl Into<String>, data: T, fetch_date: DateTime<Utc>, ttl: Duration) -> Self {
        let ttl = ttl.max(Duration::zero());
        Self {
            cache_key: cache_key.into(),
            cache_version: CACHE_VERSION.to_string(),
            fetch_date,
            refetch_date: fetch_date + ttl,
            cache_data: data,
        }
    }

    /// Whether this entry may be served for `key` at `now` without refetching
    pub fn is_fresh(&self, key: &str, now: DateTime<Utc>) -> bool {
        self.cache_key == key && self.cache_version == CACHE_VERSION && now < self.refetch_date
    }
}

/// Whether a status description denotes a game in progress
pub fn is_live_status(description: &str) -> bool {
    let lowered = description.trim().to_lowercase();
    LIVE_STATUSES.contains(&lowered.as_str())
}

/// Whether a fetch at `fetch_date` falls in the live-or-near-game window
///
/// True when the game is live, or when `fetch_date` lies within one hour either
/// side of `game_start` (inclusive).
pub fn in_live_window(is_live: bool, game_start: DateTime<Utc>, fetch_date: DateTime<Utc>) -> bool {
    if is_live {
        return true;
    }
    let window = Duration::seconds(LIVE_WINDOW_SECS);
    fetch_date >= game_start - window && fetch_date <= game_start + window
}

/// Picks the refetch window for a game payload
pub fn select_ttl(is_live: bool, game_start: DateTime<Utc>, fetch_date: DateTime<Utc>) -> Duration {
    if in_live_window(is_live, game_start, fetch_date) {
        Duration::seconds(LIVE_TTL_SECS)
    } else {
        Duration::seconds(DEFAULT_TTL_SECS)
    }
}

/// Picks the storage tier for season-scoped data
///
/// Seasons before `current_season` never change and go to the durable tier;
/// the current season (or anything unparseable) stays in the session tier.
pub fn tier_for_season(season: &str, current_season: &str) -> StorageTier {
    match (season.trim().parse::<i32>(), current_season.trim().parse::<i32>()) {
        (Ok(season), Ok(current)) if season < current => StorageTier::Local,
        _ => StorageTier::Session,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, 1, 0, 0).unwrap()
    }

    #[test]
    fn test_entry_fresh_before_refetch_date() {
        let entry = CacheEntry::new("401", (), t0(), Duration::seconds(DEFAULT_TTL_SECS));

        assert!(entry.is_fresh("401", t0() + Duration::seconds(3599)));
        assert!(!entry.is_fresh("401", t0() + Duration::seconds(3601)));
    }

    #[test]
    fn test_entry_stale_exactly_at_refetch_date() {
        let entry = CacheEntry::new("401", (), t0(), Duration::seconds(60));
        assert!(!entry.is_fresh("401", t0() + Duration::seconds(60)));
    }

    #[test]
    fn test_entry_key_or_version_mismatch_is_stale() {
        let mut entry = CacheEntry::new("401", (), t0(), Duration::seconds(DEFAULT_TTL_SECS));
        assert!(!entry.is_fresh("402", t0()));

        entry.cache_version = "0".to_string();
        assert!(!entry.is_fresh("401", t0()));
    }

    #[test]
    fn test_negative_ttl_clamped() {
        let entry = CacheEntry::new("401", (), t0(), Duration::seconds(-30));
        assert_eq!(entry.refetch_date, entry.fetch_date);
    }

    #[test]
    fn test_entry_serializes_with_camel_case_fields() {
        let entry = CacheEntry::new("401", serde_json::json!({"a": 1}), t0(), Duration::seconds(60));
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["cacheKey"], "401");
        assert_eq!(json["cacheVersion"], CACHE_VERSION);
        assert!(json.get("fetchDate").is_some());
        assert!(json.get("refetchDate").is_some());
        assert_eq!(json["cacheData"]["a"], 1);
    }

    #[test]
    fn test_reads_browser_iso_timestamps() {
        let raw = r#"{"cacheKey":"401","cacheVersion":"1","fetchDate":"2025-01-10T01:00:00.000Z","refetchDate":"2025-01-10T02:00:00.000Z","cacheData":null}"#;
        let entry: CacheEntry<serde_json::Value> = serde_json::from_str(raw).unwrap();

        assert_eq!(entry.fetch_date, t0());
        assert_eq!(entry.refetch_date, t0() + Duration::hours(1));
    }

    #[test]
    fn test_started_thirty_minutes_ago_uses_short_ttl() {
        let now = t0();
        let start = now - Duration::minutes(30);
        assert_eq!(select_ttl(false, start, now), Duration::seconds(LIVE_TTL_SECS));
    }

    #[test]
    fn test_two_hours_past_not_live_uses_long_ttl() {
        let now = t0();
        let start = now - Duration::hours(2);
        assert_eq!(select_ttl(false, start, now), Duration::seconds(DEFAULT_TTL_SECS));
    }

    #[test]
    fn test_live_game_always_uses_short_ttl() {
        let now = t0();
        let start = now - Duration::hours(3);
        assert_eq!(select_ttl(true, start, now), Duration::seconds(LIVE_TTL_SECS));
    }

    #[test]
    fn test_live_window_bounds_are_inclusive() {
        let start = t0();
        assert!(in_live_window(false, start, start - Duration::hours(1)));
        assert!(in_live_window(false, start, start + Duration::hours(1)));
        assert!(!in_live_window(false, start, start - Duration::seconds(3601)));
        assert!(!in_live_window(false, start, start + Duration::seconds(3601)));
    }

    #[test]
    fn test_live_status_matching() {
        assert!(is_live_status("In Progress"));
        assert!(is_live_status("Halftime"));
        assert!(is_live_status("End of Period"));
        assert!(!is_live_status("Final"));
        assert!(!is_live_status("Scheduled"));
    }

    #[test]
    fn test_tier_for_season() {
        assert_eq!(tier_for_season("2025", "2026"), StorageTier::Local);
        assert_eq!(tier_for_season("2026", "2026"), StorageTier::Session);
        assert_eq!(tier_for_season("2027", "2026"), StorageTier::Session);
        assert_eq!(tier_for_season("abc", "2026"), StorageTier::Session);
    }
}
