//! Team schedule parsing and grouping

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use super::details::{DetailCatalog, DetailKind};
use super::{parse_espn_date, text_at};

/// One game on a team's schedule, seen from that team's side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledGame {
    pub date: DateTime<Utc>,
    /// Status description (e.g. "Final", "Scheduled")
    pub status: String,
    pub team_name: String,
    pub team_score: String,
    /// Whether ESPN has published a score for this game
    pub has_score: bool,
    /// Whether a winner has been decided
    pub game_over: bool,
    pub won: bool,
    pub is_home: bool,
    pub opponent_code: String,
    pub opponent_name: String,
    pub opponent_score: String,
    pub details: DetailCatalog,
}

impl ScheduledGame {
    /// "W", "L" or empty while the game is undecided
    pub fn result_letter(&self) -> &'static str {
        match (self.game_over, self.won) {
            (true, true) => "W",
            (true, false) => "L",
            _ => "",
        }
    }

    /// "vs" for home games, "@" for road games
    pub fn matchup_prefix(&self) -> &'static str {
        if self.is_home {
            "vs"
        } else {
            "@"
        }
    }
}

/// Parses ESPN's team schedule document
///
/// `team_code` selects which competitor is "our" team; the comparison is
/// case-insensitive. Events without a competition or a parseable date are
/// skipped.
pub fn parse_team_schedule(json: &Value, team_code: &str) -> Vec<ScheduledGame> {
    let Some(events) = json.get("events").and_then(Value::as_array) else {
        error!("TeamSchedule - ESPN JSON data is invalid or missing events");
        return Vec::new();
    };

    let code_upper = team_code.to_uppercase();
    let games: Vec<ScheduledGame> = events
        .iter()
        .filter_map(|event| parse_event(event, team_code, &code_upper))
        .collect();

    debug!("TeamSchedule - ESPN parsing complete. {} games parsed", games.len());
    games
}

fn parse_event(event: &Value, team_code: &str, code_upper: &str) -> Option<ScheduledGame> {
    let competition = event.pointer("/competitions/0")?;
    let Some(date) = text_at(event, "/date").and_then(|d| parse_espn_date(&d)) else {
        debug!("TeamSchedule - skipping event without a date");
        return None;
    };

    let competitors = competition
        .get("competitors")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    let ours_idx = competitors
        .iter()
        .position(|c| text_at(c, "/team/abbreviation").as_deref() == Some(code_upper));
    let ours = ours_idx.map(|i| &competitors[i]);
    let theirs = competitors
        .iter()
        .enumerate()
        .find(|(i, _)| Some(*i) != ours_idx)
        .map(|(_, c)| c);

    let field = |team: Option<&Value>, pointer: &str| team.and_then(|t| text_at(t, pointer));
    let our_score = field(ours, "/score/displayValue");
    let winner = ours.and_then(|t| t.get("winner")).and_then(Value::as_bool);

    let game = ScheduledGame {
        date,
        status: text_at(competition, "/status/type/description")
            .unwrap_or_else(|| "Status Unknown".to_string()),
        team_name: field(ours, "/team/shortDisplayName").unwrap_or_else(|| team_code.to_string()),
        has_score: our_score.is_some(),
        team_score: our_score.unwrap_or_else(|| "0".to_string()),
        game_over: winner.is_some(),
        won: winner.unwrap_or(false),
        is_home: field(ours, "/homeAway").map_or(true, |h| h == "home"),
        opponent_code: field(theirs, "/team/abbreviation").unwrap_or_else(|| "Unknown".to_string()),
        opponent_name: field(theirs, "/team/shortDisplayName")
            .unwrap_or_else(|| "Unknown".to_string()),
        opponent_score: field(theirs, "/score/displayValue").unwrap_or_else(|| "0".to_string()),
        details: game_details(event, competition, ours),
    };

    debug!(
        "TeamSchedule - Adding game vs {} on {}",
        game.opponent_code,
        game.date.format("%Y-%m-%d")
    );
    Some(game)
}

fn game_details(event: &Value, competition: &Value, ours: Option<&Value>) -> DetailCatalog {
    let mut catalog = DetailCatalog::new();

    if let Some(city) = text_at(competition, "/venue/address/city") {
        let location = match text_at(competition, "/venue/address/state") {
            Some(state) => format!("{}, {}", city, state),
            None => city,
        };
        catalog.add_values(
            "Game Info",
            "location",
            DetailKind::Text,
            "location",
            "Location",
            Some(location.clone()),
            location,
        );
    }

    if let Some(attendance) = competition
        .get("attendance")
        .and_then(Value::as_u64)
        .filter(|a| *a > 0)
    {
        catalog.add_values(
            "Game Info",
            "attendance",
            DetailKind::Quantity,
            "attendance",
            "Attendance",
            Some(attendance.to_string()),
            thousands(attendance),
        );
    }

    if let Some(team) = ours {
        let ytd = team
            .get("record")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .find(|r| {
                text_at(r, "/shortDisplayName").is_some_and(|s| s.eq_ignore_ascii_case("ytd"))
            })
            .and_then(|r| text_at(r, "/displayValue"));
        if let Some(record) = ytd {
            catalog.add_values(
                "Team Records",
                "ytd",
                DetailKind::Record,
                "ytd",
                "Season Record",
                Some(record.clone()),
                record,
            );
        }

        for category in team
            .get("leaders")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
        {
            let (Some(name), Some(value)) = (
                text_at(category, "/leaders/0/athlete/shortName"),
                text_at(category, "/leaders/0/displayValue"),
            ) else {
                continue;
            };
            let id = text_at(category, "/name")
                .map(|n| n.to_lowercase())
                .unwrap_or_else(|| "unknown".to_string());
            let label = text_at(category, "/displayName")
                .or_else(|| text_at(category, "/name"))
                .unwrap_or_else(|| "Unknown Stat".to_string());
            let text = format!("{} ({})", name, value);
            catalog.add_values("Team Records", &id, DetailKind::Text, &id, &label, Some(text.clone()), text);
        }
    }

    let links = event
        .get("links")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    let find_link = |label: &str| {
        links.iter().find_map(|link| {
            let text = text_at(link, "/text")?;
            let href = text_at(link, "/href")?;
            (text.eq_ignore_ascii_case(label) && href.starts_with("http")).then_some(href)
        })
    };
    if let Some(href) = find_link("gamecast") {
        catalog.add_values("ESPN Links", "gamecast", DetailKind::Link, "", "Gamecast", Some(href), "View Gamecast");
    }
    if let Some(href) = find_link("box score") {
        catalog.add_values("ESPN Links", "boxscore", DetailKind::Link, "", "Box Score", Some(href), "Full Box Score");
    }

    catalog
}

/// Formats a count with comma thousands separators
pub(crate) fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// The spotlight partition of a schedule around a reference instant
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Spotlight<'a> {
    /// The game on the reference calendar date, if any
    pub today: Option<&'a ScheduledGame>,
    /// Next games after today, soonest first
    pub upcoming: Vec<&'a ScheduledGame>,
    /// Games before today, most recent first
    pub recent: Vec<&'a ScheduledGame>,
}

impl Spotlight<'_> {
    pub fn is_empty(&self) -> bool {
        self.today.is_none() && self.upcoming.is_empty() && self.recent.is_empty()
    }
}

/// Splits a date-sorted schedule into today, upcoming and recent games
///
/// "Today" compares calendar dates in the timezone of `now`, so the same game
/// can be today for one reader and tomorrow for another.
pub fn spotlight<'a, Tz: TimeZone>(
    games: &'a [ScheduledGame],
    now: &DateTime<Tz>,
    upcoming_count: usize,
    recent_count: usize,
) -> Spotlight<'a> {
    let tz = now.timezone();
    let today = now.date_naive();
    let mut result = Spotlight::default();
    let mut past = Vec::new();

    for game in games {
        let local_date = game.date.with_timezone(&tz).date_naive();
        if local_date == today {
            result.today = Some(game);
        } else if local_date < today {
            past.push(game);
        } else if result.upcoming.len() < upcoming_count {
            result.upcoming.push(game);
        }
    }

    let skip = past.len().saturating_sub(recent_count);
    result.recent = past.into_iter().skip(skip).rev().collect();
    result
}

/// Groups games under "Month Year" headers, in schedule order
///
/// Months are computed in the timezone of `tz`.
pub fn group_by_month<'a, Tz: TimeZone>(
    games: &'a [ScheduledGame],
    tz: &Tz,
) -> Vec<(String, Vec<&'a ScheduledGame>)>
where
    Tz::Offset: std::fmt::Display,
{
    let mut groups: Vec<(String, Vec<&ScheduledGame>)> = Vec::new();
    for game in games {
        let header = game.date.with_timezone(tz).format("%B %Y").to_string();
        match groups.last_mut() {
            Some((current, list)) if *current == header => list.push(game),
            _ => groups.push((header, vec![game])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use serde_json::json;

    fn game_on(date: &str) -> ScheduledGame {
        ScheduledGame {
            date: parse_espn_date(date).unwrap(),
            status: "Scheduled".to_string(),
            team_name: "Spurs".to_string(),
            team_score: "0".to_string(),
            has_score: false,
            game_over: false,
            won: false,
            is_home: true,
            opponent_code: "LAL".to_string(),
            opponent_name: "Lakers".to_string(),
            opponent_score: "0".to_string(),
            details: DetailCatalog::new(),
        }
    }

    fn schedule() -> Vec<ScheduledGame> {
        [
            "2025-01-01T01:00Z",
            "2025-01-03T01:00Z",
            "2025-01-05T01:00Z",
            "2025-01-07T01:00Z",
            "2025-01-09T01:00Z",
            "2025-01-11T01:00Z",
            "2025-01-13T01:00Z",
        ]
        .iter()
        .map(|d| game_on(d))
        .collect()
    }

    #[test]
    fn test_spotlight_partition() {
        let games = schedule();
        let now = Utc.with_ymd_and_hms(2025, 1, 7, 12, 0, 0).unwrap();

        let spot = spotlight(&games, &now, 2, 2);

        assert_eq!(spot.today.map(|g| g.date), Some(games[3].date));
        assert_eq!(spot.upcoming.len(), 2);
        assert_eq!(spot.upcoming[0].date, games[4].date);
        assert_eq!(spot.recent.len(), 2);
        assert_eq!(spot.recent[0].date, games[2].date);
        assert_eq!(spot.recent[1].date, games[1].date);
    }

    #[test]
    fn test_spotlight_uses_local_calendar_date() {
        let games = schedule();
        // 01:00Z on Jan 7 is still Jan 6 in UTC-6
        let central = FixedOffset::west_opt(6 * 3600).unwrap();
        let now = central.with_ymd_and_hms(2025, 1, 6, 20, 0, 0).unwrap();

        let spot = spotlight(&games, &now, 1, 1);

        assert_eq!(spot.today.map(|g| g.date), Some(games[3].date));
    }

    #[test]
    fn test_spotlight_empty_schedule() {
        let now = Utc::now();
        assert!(spotlight(&[], &now, 3, 5).is_empty());
    }

    #[test]
    fn test_group_by_month() {
        let games = vec![
            game_on("2024-12-30T01:00Z"),
            game_on("2025-01-02T01:00Z"),
            game_on("2025-01-20T01:00Z"),
        ];

        let groups = group_by_month(&games, &Utc);

        let summary: Vec<_> = groups.iter().map(|(h, g)| (h.as_str(), g.len())).collect();
        assert_eq!(summary, vec![("December 2024", 1), ("January 2025", 2)]);
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(18542), "18,542");
        assert_eq!(thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_parse_event_defaults() {
        let doc = json!({"events": [{
            "date": "2025-01-10T01:00Z",
            "competitions": [{
                "status": {"type": {"description": "Scheduled"}},
                "competitors": [
                    {"team": {"abbreviation": "SA", "shortDisplayName": "Spurs"}},
                    {"team": {"abbreviation": "LAL", "shortDisplayName": "Lakers"}}
                ]
            }]
        }]});

        let games = parse_team_schedule(&doc, "sa");

        assert_eq!(games.len(), 1);
        let game = &games[0];
        assert!(game.is_home);
        assert!(!game.has_score);
        assert!(!game.game_over);
        assert_eq!(game.result_letter(), "");
        assert_eq!(game.team_score, "0");
        assert_eq!(game.opponent_code, "LAL");
        assert!(game.details.is_empty());
    }

    #[test]
    fn test_missing_events_is_empty() {
        assert!(parse_team_schedule(&json!({"team": {}}), "sa").is_empty());
    }
}
