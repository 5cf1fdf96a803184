//! League standings parsing
//!
//! ESPN nests standings as `children[]` (one per conference), each with
//! `standings.entries[]` already sorted by playoff seed. Stats are a list of
//! `{name, value, displayValue}` records looked up by name.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error};

use super::details::{DetailCatalog, DetailKind};

/// Order conferences are shown in
const CONFERENCE_ORDER: [&str; 2] = ["Western Conference", "Eastern Conference"];

/// Named standing stats copied into the detail catalog: (stat, group, id, label)
const STANDING_DETAILS: [(&str, &str, &str, &str); 6] = [
    ("home", "Record Details", "homerecord", "Home Record"),
    ("road", "Record Details", "awayrecord", "Away Record"),
    ("vs. conf.", "Record Details", "confrecord", "Vs. Conference"),
    ("vs. div.", "Record Details", "divrecord", "Vs. Division"),
    ("last ten games", "Streak Details", "l10", "Last 10"),
    ("streak", "Streak Details", "streak", "Streak"),
];

/// Where a seed lands in the postseason picture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeedTier {
    /// Seeds 1-6, straight into the playoffs
    Playoff,
    /// Seeds 7-10
    PlayIn,
    Eliminated,
}

impl SeedTier {
    pub fn for_seed(seed: u32) -> Self {
        match seed {
            1..=6 => SeedTier::Playoff,
            7..=10 => SeedTier::PlayIn,
            _ => SeedTier::Eliminated,
        }
    }
}

/// One team's row in the conference standings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub conference: String,
    /// Team abbreviation as ESPN sends it (uppercase)
    pub team_code: String,
    pub team_name: String,
    pub short_name: String,
    pub wins: u32,
    pub losses: u32,
    /// Position within the conference, starting at 1
    pub seed: u32,
    pub details: DetailCatalog,
}

impl Standing {
    pub fn tier(&self) -> SeedTier {
        SeedTier::for_seed(self.seed)
    }

    /// "W-L"
    pub fn record(&self) -> String {
        format!("{}-{}", self.wins, self.losses)
    }
}

#[derive(Debug, Deserialize)]
struct StandingsDoc {
    #[serde(default)]
    children: Vec<Conference>,
}

#[derive(Debug, Deserialize)]
struct Conference {
    #[serde(default)]
    name: String,
    standings: Option<ConferenceStandings>,
}

#[derive(Debug, Deserialize)]
struct ConferenceStandings {
    #[serde(default)]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    team: EntryTeam,
    #[serde(default)]
    stats: Vec<Stat>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntryTeam {
    #[serde(default)]
    abbreviation: String,
    #[serde(default)]
    display_name: String,
    #[serde(default)]
    short_display_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Stat {
    #[serde(default)]
    name: String,
    value: Option<f64>,
    display_value: Option<String>,
}

fn find_stat<'a>(stats: &'a [Stat], name: &str) -> Option<&'a Stat> {
    stats.iter().find(|s| s.name.eq_ignore_ascii_case(name))
}

fn count_stat(stats: &[Stat], name: &str) -> u32 {
    find_stat(stats, name)
        .and_then(|s| s.value)
        .map_or(0, |v| v.max(0.0) as u32)
}

/// Parses ESPN's standings document into rows for every conference
///
/// A document whose first conference carries no standings is treated as
/// invalid and yields no rows.
pub fn parse_standings(json: &Value) -> Vec<Standing> {
    if json.pointer("/children/0/standings").is_none() {
        error!("LeagueStandings - ESPN JSON data is invalid or missing standings info");
        return Vec::new();
    }
    let doc: StandingsDoc = match serde_json::from_value(json.clone()) {
        Ok(doc) => doc,
        Err(e) => {
            error!("LeagueStandings - failed to read standings: {}", e);
            return Vec::new();
        }
    };

    let mut rows = Vec::new();
    for conference in doc.children {
        let entries = conference.standings.map(|s| s.entries).unwrap_or_default();
        if entries.is_empty() {
            debug!("LeagueStandings - No entries found for {}", conference.name);
            continue;
        }

        for (seed, entry) in (1u32..).zip(entries) {
            let mut details = DetailCatalog::new();
            for (stat, group, id, label) in STANDING_DETAILS {
                if let Some(display) = find_stat(&entry.stats, stat).and_then(|s| s.display_value.clone()) {
                    details.add_values(group, id, DetailKind::Record, "", label, None, display);
                }
            }

            let standing = Standing {
                conference: conference.name.clone(),
                team_code: entry.team.abbreviation,
                team_name: entry.team.display_name,
                short_name: entry.team.short_display_name,
                wins: count_stat(&entry.stats, "wins"),
                losses: count_stat(&entry.stats, "losses"),
                seed,
                details,
            };
            debug!(
                "LeagueStandings - Adding standing Conf: {} - {} - {}",
                standing.conference,
                standing.short_name,
                standing.record()
            );
            rows.push(standing);
        }
    }

    debug!("LeagueStandings - ESPN parsing complete. {} standings parsed", rows.len());
    rows
}

/// Groups rows by conference, Western first, then Eastern, then any other
pub fn by_conference(standings: &[Standing]) -> Vec<(String, Vec<&Standing>)> {
    let mut groups: Vec<(String, Vec<&Standing>)> = CONFERENCE_ORDER
        .iter()
        .map(|name| (name.to_string(), Vec::new()))
        .collect();
    for standing in standings {
        match groups.iter_mut().find(|(name, _)| *name == standing.conference) {
            Some((_, rows)) => rows.push(standing),
            None => groups.push((standing.conference.clone(), vec![standing])),
        }
    }
    groups.retain(|(_, rows)| !rows.is_empty());
    groups
}

/// Finds a team's row by code, case-insensitively
pub fn find_team_standing<'a>(standings: &'a [Standing], team_code: &str) -> Option<&'a Standing> {
    standings
        .iter()
        .find(|s| s.team_code.eq_ignore_ascii_case(team_code))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry(code: &str, wins: f64, losses: f64) -> Value {
        json!({
            "team": {"abbreviation": code, "displayName": format!("{} Team", code), "shortDisplayName": code},
            "stats": [
                {"name": "wins", "value": wins, "displayValue": wins.to_string()},
                {"name": "losses", "value": losses, "displayValue": losses.to_string()},
                {"name": "streak", "value": 2.0, "displayValue": "W2"}
            ]
        })
    }

    #[test]
    fn test_seed_tiers() {
        assert_eq!(SeedTier::for_seed(1), SeedTier::Playoff);
        assert_eq!(SeedTier::for_seed(6), SeedTier::Playoff);
        assert_eq!(SeedTier::for_seed(7), SeedTier::PlayIn);
        assert_eq!(SeedTier::for_seed(10), SeedTier::PlayIn);
        assert_eq!(SeedTier::for_seed(11), SeedTier::Eliminated);
    }

    #[test]
    fn test_seeds_follow_entry_order() {
        let doc = json!({"children": [
            {"name": "Eastern Conference", "standings": {"entries": [entry("CLE", 30.0, 5.0), entry("BOS", 26.0, 10.0)]}},
            {"name": "Western Conference", "standings": {"entries": [entry("OKC", 29.0, 5.0)]}}
        ]});

        let rows = parse_standings(&doc);

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].team_code, "BOS");
        assert_eq!(rows[1].seed, 2);
        assert_eq!(rows[2].seed, 1);
        assert_eq!(rows[0].record(), "30-5");
        assert_eq!(
            rows[0].details.get("Streak Details", "streak").map(|d| d.display_value.as_str()),
            Some("W2")
        );
        assert!(rows[0].details.get("Record Details", "homerecord").is_none());
    }

    #[test]
    fn test_missing_wins_default_to_zero() {
        let doc = json!({"children": [
            {"name": "Western Conference", "standings": {"entries": [
                {"team": {"abbreviation": "SA"}, "stats": []}
            ]}}
        ]});

        let rows = parse_standings(&doc);
        assert_eq!((rows[0].wins, rows[0].losses), (0, 0));
    }

    #[test]
    fn test_invalid_document_is_empty() {
        assert!(parse_standings(&json!({})).is_empty());
        assert!(parse_standings(&json!({"children": [{"name": "West"}]})).is_empty());
    }

    #[test]
    fn test_by_conference_puts_west_first() {
        let doc = json!({"children": [
            {"name": "Eastern Conference", "standings": {"entries": [entry("CLE", 30.0, 5.0)]}},
            {"name": "Western Conference", "standings": {"entries": [entry("OKC", 29.0, 5.0)]}}
        ]});
        let rows = parse_standings(&doc);

        let groups = by_conference(&rows);

        let names: Vec<&str> = groups.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Western Conference", "Eastern Conference"]);
    }

    #[test]
    fn test_find_team_standing_ignores_case() {
        let doc = json!({"children": [
            {"name": "Western Conference", "standings": {"entries": [entry("SA", 20.0, 20.0)]}}
        ]});
        let rows = parse_standings(&doc);

        assert_eq!(find_team_standing(&rows, "sa").map(|s| s.seed), Some(1));
        assert!(find_team_standing(&rows, "lal").is_none());
    }
}
