//! Command-line interface parsing for courtside
//!
//! The flags mirror what a host page would hand the widgets: team, storage
//! namespace, data source, season and debug switch. Subcommands pick which
//! view to print.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, TimeZone};
use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::api::ApiSource;
use crate::cache::StorageError;
use crate::config::{
    WidgetConfig, CURRENT_SEASON, CURRENT_SEASON_TYPE, DEFAULT_NAMESPACE, DEFAULT_TEAM_CODE,
    SEASON_TYPES,
};
use crate::data::find_team;

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// The team code is not an NBA team ESPN knows
    #[error("Invalid team: '{0}'. Use an ESPN team code such as sa, lal or bos")]
    InvalidTeam(String),

    /// The season type is not 1, 2 or 3
    #[error("Invalid season type: '{0}'. Valid season types: 1 (preseason), 2 (regular), 3 (postseason)")]
    InvalidSeasonType(String),

    /// The season is blank
    #[error("Invalid season: season must not be empty")]
    EmptySeason,

    /// The date is not a YYYY-MM-DD calendar date
    #[error("Invalid date: '{0}'. Use YYYY-MM-DD")]
    InvalidDate(String),

    /// Storage could not be opened
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// courtside - NBA schedule, standings and box scores from ESPN
#[derive(Parser, Debug)]
#[command(name = "courtside")]
#[command(about = "NBA schedule, standings and box scores from ESPN")]
#[command(version)]
pub struct Cli {
    /// ESPN team code
    #[arg(long, global = true, default_value = DEFAULT_TEAM_CODE)]
    pub team: String,

    /// Prefix isolating this widget's cached data
    #[arg(long, global = true, default_value = DEFAULT_NAMESPACE)]
    pub namespace: String,

    /// Where data comes from
    #[arg(long, global = true, value_enum, default_value_t = ApiSource::Espn)]
    pub source: ApiSource,

    /// Season, named by the year it ends (e.g. 2025 for 2024-25)
    #[arg(long, global = true, default_value = CURRENT_SEASON)]
    pub season: String,

    /// Season type: 1 preseason, 2 regular season, 3 postseason
    #[arg(long, global = true, default_value = CURRENT_SEASON_TYPE)]
    pub season_type: String,

    /// Log every fetch, cache and parse step to stderr
    #[arg(long, global = true)]
    pub debug: bool,

    /// Show the spotlight as of this date (YYYY-MM-DD) instead of today
    #[arg(long, global = true, value_name = "DATE", value_parser = parse_date_arg)]
    pub date: Option<NaiveDate>,

    /// Directory for the durable cache (defaults to the user cache dir)
    #[arg(long, global = true, value_name = "DIR")]
    pub store_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// What to show
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Today's game, upcoming games and recent results
    Spotlight,
    /// The full season schedule grouped by month
    Schedule {
        /// Show the detail catalog under each game
        #[arg(long)]
        details: bool,
    },
    /// Conference standings
    Standings {
        /// Show the detail catalog under each team
        #[arg(long)]
        details: bool,
    },
    /// One game's box score
    ///
    /// Examples:
    ///   courtside game 401704999     # by ESPN event id
    ///   courtside game 2025-01-09    # the team's game on that date
    Game {
        /// ESPN event id or YYYY-MM-DD date
        param: String,
        /// Show every stat column
        #[arg(long)]
        full: bool,
    },
    /// Drop session data and reload the spotlight
    Refresh,
    /// Remove this namespace's durable data, preferences included
    Clear,
    /// Show or change preferences
    Prefs {
        /// Upcoming games shown in the spotlight
        #[arg(long)]
        upcoming: Option<u32>,
        /// Recent results shown in the spotlight
        #[arg(long)]
        recent: Option<u32>,
        /// Show recent results before upcoming games
        #[arg(long)]
        recent_first: Option<bool>,
        /// Hide the team's standing in the spotlight
        #[arg(long)]
        hide_standing: Option<bool>,
        /// Load data automatically when a view is opened
        #[arg(long)]
        auto_load: Option<bool>,
        /// Tab shown when no subcommand is given
        #[arg(long, value_parser = ["spotlight", "schedule", "standings"])]
        default_tab: Option<String>,
        /// Restore the defaults
        #[arg(long)]
        reset: bool,
    },
}

/// Checks a season type argument
pub fn parse_season_type_arg(s: &str) -> Result<String, CliError> {
    let trimmed = s.trim();
    if SEASON_TYPES.contains(&trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(CliError::InvalidSeasonType(s.to_string()))
    }
}

/// Checks a `--date` argument
pub fn parse_date_arg(s: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| CliError::InvalidDate(s.to_string()))
}

/// Midday on `date` in `tz`, the instant the spotlight is computed for
///
/// Midday stays clear of DST gaps. Returns `None` only if `tz` has no such
/// local time.
pub fn as_of<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<DateTime<Tz>> {
    let midday = date.and_hms_opt(12, 0, 0)?;
    tz.from_local_datetime(&midday).earliest()
}

impl WidgetConfig {
    /// Builds the widget configuration from parsed CLI arguments
    ///
    /// # Returns
    /// * `Ok(WidgetConfig)` with normalized values
    /// * `Err(CliError)` if the team, season or season type is invalid
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let team = find_team(&cli.team).ok_or_else(|| CliError::InvalidTeam(cli.team.clone()))?;
        let season = cli.season.trim();
        if season.is_empty() {
            return Err(CliError::EmptySeason);
        }
        if cli.namespace.trim().is_empty() {
            return Err(CliError::Storage(StorageError::EmptyNamespace));
        }

        Ok(WidgetConfig {
            // ESPN's primary code, so "sas" and "sa" share cache entries
            team_code: team.codes[0].to_string(),
            namespace: cli.namespace.trim().to_string(),
            source: cli.source,
            api_parameter: match &cli.command {
                Some(Command::Game { param, .. }) => Some(param.trim().to_string()),
                _ => None,
            },
            season: season.to_string(),
            season_type: parse_season_type_arg(&cli.season_type)?,
            debug: cli.debug,
            store_dir: cli.store_dir.clone(),
        })
    }
}
