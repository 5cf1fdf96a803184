//! Static NBA team reference data
//!
//! Maps the team codes ESPN uses (including its short alternates such as "sa"
//! and "gs") to the NBA.com team ids used for logo URLs, and to the nickname
//! that appears in scoreboard event names.

/// Logo shown when a team code is unknown
const DEFAULT_LOGO_URL: &str = "https://cdn.nba.com/logos/nba/logo.svg";

/// An NBA franchise
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Team {
    /// Accepted codes, lowercase, ESPN's primary code first
    pub codes: &'static [&'static str],
    /// Full display name
    pub name: &'static str,
    /// Nickname as it appears in event names ("Spurs", "Trail Blazers")
    pub nickname: &'static str,
    /// NBA.com team id
    pub nba_id: u64,
}

/// Static array of all NBA teams
#[rustfmt::skip]
pub static TEAMS: [Team; 30] = [
    // Eastern Conference
    Team { codes: &["atl"], name: "Atlanta Hawks", nickname: "Hawks", nba_id: 1610612737 },
    Team { codes: &["bos"], name: "Boston Celtics", nickname: "Celtics", nba_id: 1610612738 },
    Team { codes: &["bkn"], name: "Brooklyn Nets", nickname: "Nets", nba_id: 1610612751 },
    Team { codes: &["cha"], name: "Charlotte Hornets", nickname: "Hornets", nba_id: 1610612766 },
    Team { codes: &["chi"], name: "Chicago Bulls", nickname: "Bulls", nba_id: 1610612741 },
    Team { codes: &["cle"], name: "Cleveland Cavaliers", nickname: "Cavaliers", nba_id: 1610612739 },
    Team { codes: &["det"], name: "Detroit Pistons", nickname: "Pistons", nba_id: 1610612765 },
    Team { codes: &["ind"], name: "Indiana Pacers", nickname: "Pacers", nba_id: 1610612754 },
    Team { codes: &["mia"], name: "Miami Heat", nickname: "Heat", nba_id: 1610612748 },
    Team { codes: &["mil"], name: "Milwaukee Bucks", nickname: "Bucks", nba_id: 1610612749 },
    Team { codes: &["ny", "nyk"], name: "New York Knicks", nickname: "Knicks", nba_id: 1610612752 },
    Team { codes: &["orl"], name: "Orlando Magic", nickname: "Magic", nba_id: 1610612753 },
    Team { codes: &["phi"], name: "Philadelphia 76ers", nickname: "76ers", nba_id: 1610612755 },
    Team { codes: &["tor"], name: "Toronto Raptors", nickname: "Raptors", nba_id: 1610612761 },
    Team { codes: &["wsh", "was"], name: "Washington Wizards", nickname: "Wizards", nba_id: 1610612764 },
    // Western Conference
    Team { codes: &["dal"], name: "Dallas Mavericks", nickname: "Mavericks", nba_id: 1610612742 },
    Team { codes: &["den"], name: "Denver Nuggets", nickname: "Nuggets", nba_id: 1610612743 },
    Team { codes: &["gs", "gsw"], name: "Golden State Warriors", nickname: "Warriors", nba_id: 1610612744 },
    Team { codes: &["hou"], name: "Houston Rockets", nickname: "Rockets", nba_id: 1610612745 },
    Team { codes: &["lac"], name: "LA Clippers", nickname: "Clippers", nba_id: 1610612746 },
    Team { codes: &["lal"], name: "Los Angeles Lakers", nickname: "Lakers", nba_id: 1610612747 },
    Team { codes: &["mem"], name: "Memphis Grizzlies", nickname: "Grizzlies", nba_id: 1610612763 },
    Team { codes: &["min"], name: "Minnesota Timberwolves", nickname: "Timberwolves", nba_id: 1610612750 },
    Team { codes: &["no", "nop"], name: "New Orleans Pelicans", nickname: "Pelicans", nba_id: 1610612740 },
    Team { codes: &["okc"], name: "Oklahoma City Thunder", nickname: "Thunder", nba_id: 1610612760 },
    Team { codes: &["phx"], name: "Phoenix Suns", nickname: "Suns", nba_id: 1610612756 },
    Team { codes: &["por"], name: "Portland Trail Blazers", nickname: "Trail Blazers", nba_id: 1610612757 },
    Team { codes: &["sac"], name: "Sacramento Kings", nickname: "Kings", nba_id: 1610612758 },
    Team { codes: &["sa", "sas"], name: "San Antonio Spurs", nickname: "Spurs", nba_id: 1610612759 },
    Team { codes: &["utah", "uta"], name: "Utah Jazz", nickname: "Jazz", nba_id: 1610612762 },
];

/// Get a team by any of its codes, case-insensitively
///
/// # Example
///
/// ```
/// use courtside::data::teams::find_team;
///
/// assert_eq!(find_team("SAS").map(|t| t.nickname), Some("Spurs"));
/// ```
pub fn find_team(code: &str) -> Option<&'static Team> {
    let code = code.trim().to_lowercase();
    TEAMS.iter().find(|team| team.codes.contains(&code.as_str()))
}

/// NBA.com logo URL for a team code, or the league logo if unknown
pub fn logo_url(code: &str) -> String {
    match find_team(code) {
        Some(team) => format!("https://cdn.nba.com/logos/nba/{}/primary/L/logo.svg", team.nba_id),
        None => DEFAULT_LOGO_URL.to_string(),
    }
}

/// Shortens long team names for narrow rows
pub fn short_team_name(name: &str) -> &str {
    match name {
        "Timberwolves" => "Wolves",
        "Trail Blazers" | "Trailblazers" => "Blazers",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_team_accepts_alternate_codes() {
        assert_eq!(find_team("sa").unwrap().nba_id, 1610612759);
        assert_eq!(find_team("SAS").unwrap().nba_id, 1610612759);
        assert_eq!(find_team("gsw").unwrap().nickname, "Warriors");
        assert!(find_team("xyz").is_none());
    }

    #[test]
    fn test_codes_are_unique() {
        let mut codes: Vec<&str> = TEAMS.iter().flat_map(|t| t.codes.iter().copied()).collect();
        let total = codes.len();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), total);
    }

    #[test]
    fn test_logo_url() {
        assert_eq!(
            logo_url("LAL"),
            "https://cdn.nba.com/logos/nba/1610612747/primary/L/logo.svg"
        );
        assert_eq!(logo_url("unknown"), DEFAULT_LOGO_URL);
    }

    #[test]
    fn test_short_team_name() {
        assert_eq!(short_team_name("Timberwolves"), "Wolves");
        assert_eq!(short_team_name("Trail Blazers"), "Blazers");
        assert_eq!(short_team_name("Spurs"), "Spurs");
    }
}
