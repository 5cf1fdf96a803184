//! Plain-text views of the parsed models
//!
//! Every function here is pure: it turns view models into rows of cells or
//! lines of text. Nothing touches storage, the network or a terminal, so the
//! CLI and tests share the exact same output.

use std::fmt::{self, Display};

use chrono::{DateTime, TimeZone, Utc};

use crate::data::{
    logo_url, short_team_name, Broadcast, DetailCatalog, DetailKind, GameSummary, PlayerStats,
    ScheduledGame, SeedTier, Standing, TeamBoxScore,
};

/// Shown when a section has nothing to display
pub const NO_DATA: &str = "No data available";

/// Shown for a missing stat
const EMPTY_CELL: &str = "-";

/// A titled grid of text cells
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub title: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(title: impl Into<String>, header: &[&str]) -> Self {
        Self {
            title: title.into(),
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        let columns = self
            .rows
            .iter()
            .map(Vec::len)
            .chain([self.header.len()])
            .max()
            .unwrap_or(0);
        (0..columns)
            .map(|i| {
                self.rows
                    .iter()
                    .chain([&self.header])
                    .filter_map(|row| row.get(i))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect()
    }

    /// Renders the table with the first column left-aligned and the rest
    /// right-aligned
    pub fn render_text(&self) -> String {
        self.to_string()
    }
}

impl Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.title.is_empty() {
            writeln!(f, "{}", self.title)?;
        }
        let widths = self.widths();
        let write_row = |f: &mut fmt::Formatter<'_>, row: &[String]| -> fmt::Result {
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    let width = widths.get(i).copied().unwrap_or(0);
                    if i == 0 {
                        format!("{:<width$}", cell, width = width)
                    } else {
                        format!("{:>width$}", cell, width = width)
                    }
                })
                .collect();
            writeln!(f, "{}", cells.join("  ").trim_end())
        };
        if !self.header.is_empty() {
            write_row(f, &self.header)?;
        }
        if self.rows.is_empty() {
            return writeln!(f, "{}", NO_DATA);
        }
        for row in &self.rows {
            write_row(f, row)?;
        }
        Ok(())
    }
}

/// Placeholder line for an empty section
pub fn no_data() -> String {
    NO_DATA.to_string()
}

fn cell(value: Option<i32>) -> String {
    value.map_or_else(|| EMPTY_CELL.to_string(), |v| v.to_string())
}

fn made_attempted(made: Option<i32>, attempted: Option<i32>) -> String {
    match (made, attempted) {
        (None, None) => EMPTY_CELL.to_string(),
        (m, a) => format!("{}-{}", m.unwrap_or(0), a.unwrap_or(0)),
    }
}

fn signed(value: Option<i32>) -> String {
    match value {
        Some(v) if v > 0 => format!("+{}", v),
        other => cell(other),
    }
}

/// Status line: the detailed status once the game has started
pub fn status_text(game: &GameSummary) -> &str {
    if game.has_started {
        &game.status_detail
    } else {
        &game.status
    }
}

/// Header lines for a game: matchup, status, venue and logos
pub fn game_header<Tz: TimeZone>(game: &GameSummary, tz: &Tz) -> Vec<String>
where
    Tz::Offset: Display,
{
    let mut lines = vec![
        format!(
            "{} {} @ {} {}",
            game.away.name, game.away.score, game.home.name, game.home.score
        ),
        format!(
            "{} | {}",
            status_text(game),
            game.date.with_timezone(tz).format("%a %b %-d, %-I:%M %p")
        ),
    ];
    if !game.venue_name.is_empty() {
        lines.push(format!("{}, {}", game.venue_name, game.venue_city));
    }
    if let Some(attendance) = game.attendance {
        lines.push(format!("Attendance: {}", attendance));
    }
    lines.push(format!("{}: {}", game.away.code.to_uppercase(), logo_url(&game.away.code)));
    lines.push(format!("{}: {}", game.home.code.to_uppercase(), logo_url(&game.home.code)));
    lines
}

/// Scores by period, padded to four periods, with a total column
pub fn period_table(game: &GameSummary) -> Table {
    let away = game.away.padded_periods();
    let home = game.home.padded_periods();
    let periods = away.len().max(home.len());

    let mut header = vec![String::new()];
    header.extend((1..=periods).map(|p| match p {
        1..=4 => p.to_string(),
        5 => "OT".to_string(),
        n => format!("{}OT", n - 4),
    }));
    header.push("T".to_string());

    let row = |team: &TeamBoxScore, scores: &[String]| {
        let mut row = vec![team.code.to_uppercase()];
        row.extend((0..periods).map(|i| {
            scores
                .get(i)
                .cloned()
                .unwrap_or_else(|| EMPTY_CELL.to_string())
        }));
        row.push(team.score.to_string());
        row
    };

    Table {
        title: String::new(),
        header,
        rows: vec![row(&game.away, &away[..]), row(&game.home, &home[..])],
    }
}

/// How many columns a box score shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoxScoreMode {
    /// Name, minutes, points, rebounds, assists, steals, blocks
    #[default]
    Compact,
    /// Every tracked stat
    Full,
}

const COMPACT_HEADER: [&str; 7] = ["Player", "MIN", "PTS", "REB", "AST", "STL", "BLK"];
const FULL_HEADER: [&str; 15] = [
    "Player", "MIN", "FG", "3PT", "FT", "OREB", "DREB", "REB", "AST", "STL", "BLK", "TO", "PF",
    "+/-", "PTS",
];

/// One player's cells; players who did not play show only their name
pub fn player_row(player: &PlayerStats, mode: BoxScoreMode) -> Vec<String> {
    let name = if player.position.is_empty() {
        player.name.clone()
    } else {
        format!("{} {}", player.name, player.position)
    };
    if player.did_not_play() {
        return vec![name];
    }
    let minutes = player.minutes.to_string();
    match mode {
        BoxScoreMode::Compact => vec![
            name,
            minutes,
            cell(player.points),
            cell(player.rebounds),
            cell(player.assists),
            cell(player.steals),
            cell(player.blocks),
        ],
        BoxScoreMode::Full => vec![
            name,
            minutes,
            made_attempted(player.fgm, player.fga),
            made_attempted(player.tpm, player.tpa),
            made_attempted(player.ftm, player.fta),
            cell(player.offensive_rebounds),
            cell(player.defensive_rebounds),
            cell(player.rebounds),
            cell(player.assists),
            cell(player.steals),
            cell(player.blocks),
            cell(player.turnovers),
            cell(player.fouls),
            signed(player.plus_minus),
            cell(player.points),
        ],
    }
}

/// A team's box score: starters, then bench, then players who did not play
pub fn box_score(team: &TeamBoxScore, mode: BoxScoreMode) -> Table {
    let header: &[&str] = match mode {
        BoxScoreMode::Compact => &COMPACT_HEADER,
        BoxScoreMode::Full => &FULL_HEADER,
    };
    let mut table = Table::new(team.name.clone(), header);
    for player in team.starters.iter().chain(&team.bench).chain(&team.did_not_play) {
        table.push(player_row(player, mode));
    }
    table
}

/// Side-by-side team totals, away team first
pub fn team_stat_comparison(game: &GameSummary) -> Table {
    let (away, home) = (&game.away.totals, &game.home.totals);
    let mut table = Table::new(
        "Team Stats",
        &[
            "",
            game.away.code.to_uppercase().as_str(),
            game.home.code.to_uppercase().as_str(),
        ],
    );
    let rows: [(&str, String, String); 12] = [
        ("FG", format!("{}-{}", away.fgm, away.fga), format!("{}-{}", home.fgm, home.fga)),
        ("FG%", away.fg_pct().to_string(), home.fg_pct().to_string()),
        ("3PT", format!("{}-{}", away.tpm, away.tpa), format!("{}-{}", home.tpm, home.tpa)),
        ("3P%", away.three_pct().to_string(), home.three_pct().to_string()),
        ("FT", format!("{}-{}", away.ftm, away.fta), format!("{}-{}", home.ftm, home.fta)),
        ("FT%", away.ft_pct().to_string(), home.ft_pct().to_string()),
        ("REB", away.rebounds.to_string(), home.rebounds.to_string()),
        ("OREB", away.offensive_rebounds.to_string(), home.offensive_rebounds.to_string()),
        ("AST", away.assists.to_string(), home.assists.to_string()),
        ("STL", away.steals.to_string(), home.steals.to_string()),
        ("BLK", away.blocks.to_string(), home.blocks.to_string()),
        ("TO", away.turnovers.to_string(), home.turnovers.to_string()),
    ];
    for (label, a, h) in rows {
        table.push(vec![label.to_string(), a, h]);
    }
    table
}

/// Points, rebounds and assists leaders for one team
pub fn leader_lines(team: &TeamBoxScore) -> Vec<String> {
    [
        ("PTS", &team.point_leader),
        ("REB", &team.rebound_leader),
        ("AST", &team.assist_leader),
    ]
    .into_iter()
    .filter_map(|(label, leader)| {
        leader
            .as_ref()
            .map(|l| format!("{} {}: {} {}", team.code.to_uppercase(), label, l.name, l.value))
    })
    .collect()
}

pub fn injury_table(team: &TeamBoxScore) -> Table {
    let mut table = Table::new(format!("{} Injuries", team.name), &["Player", "Injury"]);
    for injury in &team.injuries {
        table.push(vec![injury.name.clone(), injury.kind.clone()]);
    }
    table
}

pub fn broadcast_table(broadcasts: &[Broadcast]) -> Table {
    let mut table = Table::new("Broadcasts", &["Network", "Type", "Market"]);
    for b in broadcasts {
        table.push(vec![b.media.clone(), b.kind.clone(), b.market.clone()]);
    }
    table
}

/// Date, matchup and result or tip-off time for one schedule entry
pub fn schedule_row<Tz: TimeZone>(game: &ScheduledGame, tz: &Tz) -> Vec<String>
where
    Tz::Offset: Display,
{
    let local = game.date.with_timezone(tz);
    let outcome = if game.game_over {
        format!(
            "{} {}-{}",
            game.result_letter(),
            game.team_score,
            game.opponent_score
        )
    } else if game.has_score {
        format!("{} {}-{}", game.status, game.team_score, game.opponent_score)
    } else if game.status.eq_ignore_ascii_case("scheduled") {
        local.format("%-I:%M %p").to_string()
    } else {
        game.status.clone()
    };
    vec![
        local.format("%a %b %-d").to_string(),
        format!(
            "{} {}",
            game.matchup_prefix(),
            short_team_name(&game.opponent_name)
        ),
        outcome,
    ]
}

pub fn schedule_table<Tz: TimeZone>(title: &str, games: &[&ScheduledGame], tz: &Tz) -> Table
where
    Tz::Offset: Display,
{
    let mut table = Table::new(title, &[]);
    for game in games {
        table.push(schedule_row(game, tz));
    }
    table
}

fn tier_marker(tier: SeedTier) -> &'static str {
    match tier {
        SeedTier::Playoff => "*",
        SeedTier::PlayIn => "+",
        SeedTier::Eliminated => "",
    }
}

/// One conference's standings; the highlighted team is marked with ">"
pub fn standings_table(conference: &str, rows: &[&Standing], highlight: &str) -> Table {
    let mut table = Table::new(conference, &["#", "Team", "W-L", ""]);
    for standing in rows {
        let marker = if standing.team_code.eq_ignore_ascii_case(highlight) {
            ">"
        } else {
            ""
        };
        table.push(vec![
            format!("{}{}", marker, standing.seed),
            short_team_name(&standing.short_name).to_string(),
            standing.record(),
            tier_marker(standing.tier()).to_string(),
        ]);
    }
    table
}

/// One-line summary of a team's standing for the spotlight
pub fn standing_summary(standing: &Standing) -> String {
    let ordinal = match (standing.seed % 10, standing.seed % 100) {
        (1, n) if n != 11 => "st",
        (2, n) if n != 12 => "nd",
        (3, n) if n != 13 => "rd",
        _ => "th",
    };
    format!(
        "{} ({}) - {}{} in the {}",
        standing.team_name,
        standing.record(),
        standing.seed,
        ordinal,
        standing.conference
    )
}

/// Indented "Label: value" lines per detail group
pub fn detail_lines(details: &DetailCatalog) -> Vec<String> {
    let mut lines = Vec::new();
    for (group, items) in details.groups() {
        lines.push(group.to_string());
        for detail in items {
            let value = match (detail.kind, &detail.value) {
                (DetailKind::Link, Some(url)) => format!("{} <{}>", detail.display_value, url),
                _ => detail.display_value.clone(),
            };
            lines.push(format!("  {}: {}", detail.full_name, value));
        }
    }
    lines
}

/// "Updated ..." footer; `cached` marks data served without a new fetch
pub fn last_updated<Tz: TimeZone>(at: DateTime<Utc>, tz: &Tz, cached: bool) -> String
where
    Tz::Offset: Display,
{
    format!(
        "Updated {}{}",
        at.with_timezone(tz).format("%-I:%M:%S %p"),
        if cached { " (cached)" } else { "" }
    )
}
