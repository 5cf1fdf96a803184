//! Game summary and box score parsing
//!
//! Converts ESPN's `summary` document into a `GameSummary`: status, venue,
//! period scores, per-player box score lines, team totals, injuries and
//! broadcasts. Player stat lines arrive as a positional array of strings, so
//! each field is read by index and parsed leniently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use super::{parse_espn_date, parse_int, text_at};
use crate::cache::is_live_status;

/// Positions of each stat in ESPN's per-player `stats` array
mod stat_index {
    pub const MINUTES: usize = 0;
    pub const POINTS: usize = 1;
    pub const OFFENSIVE_REBOUNDS: usize = 2;
    pub const DEFENSIVE_REBOUNDS: usize = 3;
    pub const REBOUNDS: usize = 4;
    pub const ASSISTS: usize = 5;
    pub const STEALS: usize = 6;
    pub const BLOCKS: usize = 7;
    pub const TURNOVERS: usize = 8;
    pub const FIELD_GOALS: usize = 9;
    pub const THREE_POINTERS: usize = 11;
    pub const FREE_THROWS: usize = 13;
    pub const FOULS: usize = 15;
    pub const PLUS_MINUS: usize = 16;
}

/// One player's box score line
///
/// Counting stats are `None` when ESPN sent something that is not a number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerStats {
    pub name: String,
    pub position: String,
    pub jersey: String,
    pub starter: bool,
    /// Why the player did not play, if ESPN gave a reason
    pub dnp_reason: Option<String>,
    /// Minutes played; unparseable values count as zero
    pub minutes: u32,
    pub points: Option<i32>,
    pub fgm: Option<i32>,
    pub fga: Option<i32>,
    pub tpm: Option<i32>,
    pub tpa: Option<i32>,
    pub ftm: Option<i32>,
    pub fta: Option<i32>,
    pub rebounds: Option<i32>,
    pub offensive_rebounds: Option<i32>,
    pub defensive_rebounds: Option<i32>,
    pub assists: Option<i32>,
    pub steals: Option<i32>,
    pub blocks: Option<i32>,
    pub turnovers: Option<i32>,
    pub fouls: Option<i32>,
    pub plus_minus: Option<i32>,
}

impl PlayerStats {
    /// Fills the counting stats from ESPN's positional `stats` array
    pub fn apply_stat_line(&mut self, stats: &[String]) {
        use stat_index::*;

        let int_at = |i: usize| stats.get(i).and_then(|s| parse_int(s));
        let pair_at = |i: usize| split_made_attempted(stats.get(i).map(String::as_str));

        self.minutes = int_at(MINUTES).and_then(|m| u32::try_from(m).ok()).unwrap_or(0);
        self.points = int_at(POINTS);
        (self.fgm, self.fga) = pair_at(FIELD_GOALS);
        (self.tpm, self.tpa) = pair_at(THREE_POINTERS);
        (self.ftm, self.fta) = pair_at(FREE_THROWS);
        self.rebounds = int_at(REBOUNDS);
        self.offensive_rebounds = int_at(OFFENSIVE_REBOUNDS);
        self.defensive_rebounds = int_at(DEFENSIVE_REBOUNDS);
        self.assists = int_at(ASSISTS);
        self.steals = int_at(STEALS);
        self.blocks = int_at(BLOCKS);
        self.turnovers = int_at(TURNOVERS);
        self.fouls = int_at(FOULS);
        self.plus_minus = int_at(PLUS_MINUS);
    }

    /// Whether the player logged no minutes
    pub fn did_not_play(&self) -> bool {
        self.minutes == 0
    }
}

/// Splits a "made-attempted" string such as "7-15"
fn split_made_attempted(raw: Option<&str>) -> (Option<i32>, Option<i32>) {
    let Some(raw) = raw else {
        return (None, None);
    };
    let mut parts = raw.splitn(2, '-');
    let made = parts.next().and_then(parse_int);
    let attempted = parts.next().and_then(parse_int);
    (made, attempted)
}

/// Team totals summed from player lines
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamTotals {
    pub fgm: i32,
    pub fga: i32,
    pub tpm: i32,
    pub tpa: i32,
    pub ftm: i32,
    pub fta: i32,
    pub rebounds: i32,
    pub offensive_rebounds: i32,
    pub defensive_rebounds: i32,
    pub assists: i32,
    pub steals: i32,
    pub blocks: i32,
    pub turnovers: i32,
    pub fouls: i32,
}

impl TeamTotals {
    /// Adds a player's line; missing or non-numeric fields add nothing
    pub fn add(&mut self, player: &PlayerStats) {
        add_to(&mut self.fgm, player.fgm);
        add_to(&mut self.fga, player.fga);
        add_to(&mut self.tpm, player.tpm);
        add_to(&mut self.tpa, player.tpa);
        add_to(&mut self.ftm, player.ftm);
        add_to(&mut self.fta, player.fta);
        add_to(&mut self.rebounds, player.rebounds);
        add_to(&mut self.offensive_rebounds, player.offensive_rebounds);
        add_to(&mut self.defensive_rebounds, player.defensive_rebounds);
        add_to(&mut self.assists, player.assists);
        add_to(&mut self.steals, player.steals);
        add_to(&mut self.blocks, player.blocks);
        add_to(&mut self.turnovers, player.turnovers);
        add_to(&mut self.fouls, player.fouls);
    }

    pub fn fg_pct(&self) -> u32 {
        percentage(self.fgm, self.fga)
    }

    pub fn three_pct(&self) -> u32 {
        percentage(self.tpm, self.tpa)
    }

    pub fn ft_pct(&self) -> u32 {
        percentage(self.ftm, self.fta)
    }
}

/// Saturates so absurd upstream numbers cannot overflow a total
fn add_to(total: &mut i32, field: Option<i32>) {
    *total = total.saturating_add(field.unwrap_or(0));
}

/// Whole-number shooting percentage, zero when nothing was attempted
fn percentage(made: i32, attempted: i32) -> u32 {
    if attempted <= 0 {
        return 0;
    }
    (f64::from(made) / f64::from(attempted) * 100.0).round().max(0.0) as u32
}

/// A team's leader in one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leader {
    pub name: String,
    pub value: i32,
}

/// Replaces the leader only on a strictly greater, positive value
fn update_leader(slot: &mut Option<Leader>, name: &str, value: Option<i32>) {
    let Some(value) = value else { return };
    let current = slot.as_ref().map_or(0, |l| l.value);
    if value > current {
        *slot = Some(Leader {
            name: name.to_string(),
            value,
        });
    }
}

/// An injured player listed on the game report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Injury {
    pub name: String,
    /// Injury type as reported (e.g. "Knee")
    pub kind: String,
}

/// A TV, radio or streaming broadcast of the game
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Broadcast {
    /// Network short name (e.g. "ESPN")
    pub media: String,
    /// Medium (e.g. "TV", "Streaming")
    pub kind: String,
    /// Market (e.g. "national", "home")
    pub market: String,
}

/// One side of a game with its box score
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamBoxScore {
    /// Lowercase team code
    pub code: String,
    pub name: String,
    pub is_home: bool,
    pub score: i32,
    /// Display values per period, in order
    pub period_scores: Vec<String>,
    pub starters: Vec<PlayerStats>,
    pub bench: Vec<PlayerStats>,
    pub did_not_play: Vec<PlayerStats>,
    pub totals: TeamTotals,
    pub point_leader: Option<Leader>,
    pub assist_leader: Option<Leader>,
    pub rebound_leader: Option<Leader>,
    pub injuries: Vec<Injury>,
}

impl TeamBoxScore {
    /// Files a player under starters, bench or DNP and updates leaders and totals
    pub fn add_player(&mut self, player: PlayerStats) {
        update_leader(&mut self.point_leader, &player.name, player.points);
        update_leader(&mut self.assist_leader, &player.name, player.assists);
        update_leader(&mut self.rebound_leader, &player.name, player.rebounds);
        self.totals.add(&player);

        if player.starter {
            self.starters.push(player);
        } else if player.did_not_play() {
            self.did_not_play.push(player);
        } else {
            self.bench.push(player);
        }
    }

    /// Orders every group by minutes played, most first
    ///
    /// The sort is stable: players with equal minutes keep their order.
    pub fn sort_by_minutes(&mut self) {
        for group in [&mut self.starters, &mut self.bench, &mut self.did_not_play] {
            group.sort_by(|a, b| b.minutes.cmp(&a.minutes));
        }
    }

    /// Period scores padded with "-" to at least four periods
    pub fn padded_periods(&self) -> Vec<String> {
        let mut periods = self.period_scores.clone();
        while periods.len() < 4 {
            periods.push("-".to_string());
        }
        periods
    }
}

/// Everything shown by the game widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSummary {
    /// Scheduled start
    pub date: DateTime<Utc>,
    /// Short status (e.g. "Final", "In Progress", "Scheduled")
    pub status: String,
    /// Long status (e.g. "Final/OT", "3rd Quarter 4:12")
    pub status_detail: String,
    pub is_live: bool,
    /// Whether ESPN has a box score yet
    pub has_started: bool,
    /// "City State" of the venue
    pub venue_city: String,
    pub venue_name: String,
    pub attendance: Option<u64>,
    pub home: TeamBoxScore,
    pub away: TeamBoxScore,
    pub broadcasts: Vec<Broadcast>,
}

impl GameSummary {
    fn team_mut_for(&mut self, code: &str) -> &mut TeamBoxScore {
        if self.home.code == code {
            &mut self.home
        } else {
            &mut self.away
        }
    }
}

/// Parses ESPN's game summary document
///
/// Returns `None` when the document has no competition header or no parseable
/// start date; every other missing field degrades to a default.
pub fn parse_game_summary(json: &Value) -> Option<GameSummary> {
    let Some(competition) = json.pointer("/header/competitions/0") else {
        error!("Game summary JSON is missing header.competitions");
        return None;
    };
    let Some(date) = text_at(competition, "/date").and_then(|d| parse_espn_date(&d)) else {
        error!("Game summary JSON has no parseable competition date");
        return None;
    };

    let status = text_at(competition, "/status/type/description").unwrap_or_default();
    let status_detail = text_at(competition, "/status/type/detail").unwrap_or_default();
    let is_live = is_live_status(&status);
    let has_started = competition
        .get("boxscoreAvailable")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let city = text_at(json, "/gameInfo/venue/address/city").unwrap_or_default();
    let state = text_at(json, "/gameInfo/venue/address/state").unwrap_or_default();
    let venue_city = format!("{} {}", city, state).trim().to_string();
    let venue_name = text_at(json, "/gameInfo/venue/fullName").unwrap_or_default();
    let attendance = json.pointer("/gameInfo/attendance").and_then(Value::as_u64);

    let mut summary = GameSummary {
        date,
        status,
        status_detail,
        is_live,
        has_started,
        venue_city,
        venue_name,
        attendance,
        home: TeamBoxScore::default(),
        away: TeamBoxScore::default(),
        broadcasts: parse_broadcasts(competition),
    };

    for competitor in array_at(competition, "/competitors") {
        let team = parse_competitor(competitor);
        if team.is_home {
            summary.home = team;
        } else {
            summary.away = team;
        }
    }

    for team_box in array_at(json, "/boxscore/players") {
        let code = text_at(team_box, "/team/abbreviation")
            .unwrap_or_default()
            .to_lowercase();
        let players: Vec<PlayerStats> = array_at(team_box, "/statistics/0/athletes")
            .iter()
            .map(parse_player)
            .collect();
        let target = summary.team_mut_for(&code);
        for player in players {
            target.add_player(player);
        }
    }
    summary.home.sort_by_minutes();
    summary.away.sort_by_minutes();

    for report in array_at(json, "/injuries") {
        let injuries: Vec<Injury> = array_at(report, "/injuries")
            .iter()
            .map(|injury| Injury {
                name: text_at(injury, "/athlete/shortName").unwrap_or_default(),
                kind: text_at(injury, "/details/type").unwrap_or_default(),
            })
            .collect();
        if !injuries.is_empty() {
            let code = text_at(report, "/team/abbreviation")
                .unwrap_or_default()
                .to_lowercase();
            summary.team_mut_for(&code).injuries = injuries;
        }
    }

    debug!(
        "Parsed game {} vs {}: status={}, live={}",
        summary.away.code, summary.home.code, summary.status, summary.is_live
    );
    Some(summary)
}

fn array_at<'a>(value: &'a Value, pointer: &str) -> &'a [Value] {
    value
        .pointer(pointer)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn parse_competitor(competitor: &Value) -> TeamBoxScore {
    TeamBoxScore {
        code: text_at(competitor, "/team/abbreviation")
            .unwrap_or_default()
            .to_lowercase(),
        name: text_at(competitor, "/team/name").unwrap_or_default(),
        is_home: text_at(competitor, "/homeAway").as_deref() == Some("home"),
        score: text_at(competitor, "/score")
            .and_then(|s| parse_int(&s))
            .unwrap_or(0),
        period_scores: array_at(competitor, "/linescores")
            .iter()
            .filter_map(|line| text_at(line, "/displayValue"))
            .collect(),
        ..TeamBoxScore::default()
    }
}

fn parse_player(entry: &Value) -> PlayerStats {
    let mut player = PlayerStats {
        name: text_at(entry, "/athlete/shortName").unwrap_or_default(),
        position: text_at(entry, "/athlete/position/abbreviation").unwrap_or_default(),
        jersey: text_at(entry, "/athlete/jersey").unwrap_or_default(),
        starter: entry.get("starter").and_then(Value::as_bool).unwrap_or(false),
        dnp_reason: text_at(entry, "/reason").filter(|r| !r.is_empty()),
        ..PlayerStats::default()
    };
    let stats: Vec<String> = array_at(entry, "/stats")
        .iter()
        .map(|s| s.as_str().map(str::to_string).unwrap_or_default())
        .collect();
    player.apply_stat_line(&stats);
    player
}

fn parse_broadcasts(competition: &Value) -> Vec<Broadcast> {
    array_at(competition, "/broadcasts")
        .iter()
        .map(|b| Broadcast {
            media: text_at(b, "/media/shortName").unwrap_or_default(),
            kind: text_at(b, "/type/shortName").unwrap_or_default(),
            market: text_at(b, "/market/type").unwrap_or_default(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn line(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn player(name: &str, minutes: u32, starter: bool) -> PlayerStats {
        PlayerStats {
            name: name.to_string(),
            minutes,
            starter,
            ..PlayerStats::default()
        }
    }

    #[test]
    fn test_apply_stat_line_reads_positions() {
        let mut p = PlayerStats::default();
        p.apply_stat_line(&line(&[
            "34", "27", "2", "6", "8", "5", "1", "3", "2", "10-18", "55.6", "3-7", "42.9", "4-4",
            "100", "2", "+11",
        ]));

        assert_eq!(p.minutes, 34);
        assert_eq!(p.points, Some(27));
        assert_eq!((p.fgm, p.fga), (Some(10), Some(18)));
        assert_eq!((p.tpm, p.tpa), (Some(3), Some(7)));
        assert_eq!((p.ftm, p.fta), (Some(4), Some(4)));
        assert_eq!(p.offensive_rebounds, Some(2));
        assert_eq!(p.defensive_rebounds, Some(6));
        assert_eq!(p.rebounds, Some(8));
        assert_eq!(p.assists, Some(5));
        assert_eq!(p.steals, Some(1));
        assert_eq!(p.blocks, Some(3));
        assert_eq!(p.turnovers, Some(2));
        assert_eq!(p.fouls, Some(2));
        assert_eq!(p.plus_minus, Some(11));
    }

    #[test]
    fn test_short_stat_line_leaves_fields_empty() {
        let mut p = PlayerStats::default();
        p.apply_stat_line(&line(&["12", "4"]));

        assert_eq!(p.minutes, 12);
        assert_eq!(p.points, Some(4));
        assert_eq!(p.fgm, None);
        assert_eq!(p.plus_minus, None);
    }

    #[test]
    fn test_non_numeric_field_adds_zero_to_totals() {
        let mut team = TeamBoxScore::default();
        let mut a = player("A", 30, true);
        a.apply_stat_line(&line(&[
            "30", "20", "1", "4", "5", "3", "1", "0", "2", "8-15", "", "2-5", "", "2-2", "", "3", "+4",
        ]));
        let mut b = player("B", 20, false);
        b.apply_stat_line(&line(&[
            "20", "--", "x", "2", "--", "1", "0", "1", "1", "--", "", "1-x", "", "0-0", "", "1", "-4",
        ]));

        team.add_player(a);
        team.add_player(b);

        assert_eq!(team.totals.rebounds, 5);
        assert_eq!(team.totals.offensive_rebounds, 1);
        assert_eq!(team.totals.defensive_rebounds, 6);
        assert_eq!(team.totals.fgm, 8);
        assert_eq!(team.totals.fga, 15);
        assert_eq!(team.totals.tpm, 3);
        assert_eq!(team.totals.tpa, 5);
        assert_eq!(team.totals.ftm, 2);
    }

    #[test]
    fn test_huge_stat_values_saturate_totals() {
        let mut team = TeamBoxScore::default();
        for name in ["A", "B"] {
            let mut p = player(name, 10, false);
            p.rebounds = Some(i32::MAX);
            p.fga = Some(i32::MAX);
            team.add_player(p);
        }

        assert_eq!(team.totals.rebounds, i32::MAX);
        assert_eq!(team.totals.fga, i32::MAX);
        assert_eq!(team.totals.fg_pct(), 0);
    }

    #[test]
    fn test_players_grouped_by_role() {
        let mut team = TeamBoxScore::default();
        team.add_player(player("Starter", 30, true));
        team.add_player(player("Bench", 12, false));
        team.add_player(player("Sat", 0, false));
        team.add_player(player("Starter DNP", 0, true));

        assert_eq!(team.starters.len(), 2);
        assert_eq!(team.bench.len(), 1);
        assert_eq!(team.did_not_play.len(), 1);
        assert_eq!(team.did_not_play[0].name, "Sat");
    }

    #[test]
    fn test_sort_by_minutes_is_stable() {
        let mut team = TeamBoxScore::default();
        team.add_player(player("First", 20, false));
        team.add_player(player("Most", 31, false));
        team.add_player(player("Second", 20, false));
        team.add_player(player("Third", 20, false));

        team.sort_by_minutes();

        let names: Vec<&str> = team.bench.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Most", "First", "Second", "Third"]);
    }

    #[test]
    fn test_leaders_require_strictly_greater() {
        let mut team = TeamBoxScore::default();
        let mut a = player("A", 30, true);
        a.points = Some(20);
        let mut b = player("B", 30, true);
        b.points = Some(20);
        let mut c = player("C", 10, false);
        c.assists = Some(0);

        team.add_player(a);
        team.add_player(b);
        team.add_player(c);

        assert_eq!(team.point_leader.as_ref().map(|l| l.name.as_str()), Some("A"));
        assert!(team.assist_leader.is_none());
    }

    #[test]
    fn test_percentages() {
        let totals = TeamTotals {
            fgm: 41,
            fga: 88,
            tpm: 0,
            tpa: 0,
            ftm: 2,
            fta: 3,
            ..TeamTotals::default()
        };
        assert_eq!(totals.fg_pct(), 47);
        assert_eq!(totals.three_pct(), 0);
        assert_eq!(totals.ft_pct(), 67);
    }

    #[test]
    fn test_padded_periods() {
        let team = TeamBoxScore {
            period_scores: vec!["30".to_string(), "25".to_string()],
            ..TeamBoxScore::default()
        };
        assert_eq!(team.padded_periods(), vec!["30", "25", "-", "-"]);
    }

    #[test]
    fn test_parse_minimal_summary() {
        let doc = json!({
            "header": {"competitions": [{
                "date": "2025-01-10T01:00Z",
                "status": {"type": {"description": "Halftime", "detail": "Halftime"}},
                "boxscoreAvailable": true,
                "competitors": [
                    {"homeAway": "home", "score": "55", "team": {"abbreviation": "SA", "name": "Spurs"}},
                    {"homeAway": "away", "score": "50", "team": {"abbreviation": "LAL", "name": "Lakers"}}
                ]
            }]}
        });

        let summary = parse_game_summary(&doc).unwrap();

        assert!(summary.is_live);
        assert!(summary.has_started);
        assert_eq!(summary.home.code, "sa");
        assert_eq!(summary.home.score, 55);
        assert_eq!(summary.away.name, "Lakers");
        assert!(summary.broadcasts.is_empty());
        assert_eq!(summary.attendance, None);
        assert_eq!(summary.away.score, 50);
    }

    #[test]
    fn test_parse_summary_without_header_is_none() {
        assert!(parse_game_summary(&json!({"boxscore": {}})).is_none());
        assert!(parse_game_summary(&json!(null)).is_none());
    }
}
