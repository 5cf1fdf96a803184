//! courtside - NBA schedule, standings and box scores from ESPN
//!
//! Loads the league and game widgets and prints their views as plain text.

use std::process::ExitCode;

use chrono::{DateTime, Local, NaiveDate, Utc};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use courtside::api::ApiClient;
use courtside::app::{GameWidget, LeagueWidget};
use courtside::cache::{StorageManager, StorageTier};
use courtside::cli::{as_of, Cli, Command};
use courtside::config::WidgetConfig;
use courtside::data::{by_conference, group_by_month};
use courtside::prefs::Preferences;
use courtside::view::{self, BoxScoreMode};

/// Sets up stderr logging; `--debug` forces DEBUG for this crate, otherwise
/// `RUST_LOG` applies with a default of warnings only
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("courtside=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Renders the spotlight around `now`: the team's standing, the game on that
/// date, upcoming and recent games
fn render_spotlight(widget: &LeagueWidget, prefs: &Preferences, now: &DateTime<Local>) -> String {
    let mut out = String::new();
    if !prefs.hide_spotlight_standing {
        if let Some(standing) = widget.team_standing() {
            out.push_str(&view::standing_summary(standing));
            out.push_str("\n\n");
        }
    }

    let spot = widget.spotlight(
        now,
        prefs.upcoming_games_count as usize,
        prefs.recent_games_count as usize,
    );
    if spot.is_empty() {
        out.push_str(&view::no_data());
        out.push('\n');
        return out;
    }

    if let Some(today) = spot.today {
        out.push_str(&view::schedule_table("Today's Game", &[today], &Local).render_text());
        out.push('\n');
    }
    let upcoming = view::schedule_table("Upcoming Games", &spot.upcoming, &Local);
    let recent = view::schedule_table("Recent Results", &spot.recent, &Local);
    let sections = if prefs.show_recent_first {
        [recent, upcoming]
    } else {
        [upcoming, recent]
    };
    for table in sections.iter().filter(|t| !t.is_empty()) {
        out.push_str(&table.render_text());
        out.push('\n');
    }
    out
}

fn render_schedule(widget: &LeagueWidget, details: bool) -> String {
    let months = group_by_month(&widget.schedule, &Local);
    if months.is_empty() {
        return format!("{}\n", view::no_data());
    }
    let mut out = String::new();
    for (month, games) in months {
        if details {
            out.push_str(&format!("{}\n", month));
            for game in games {
                out.push_str(&format!("  {}\n", view::schedule_row(game, &Local).join("  ")));
                for line in view::detail_lines(&game.details) {
                    out.push_str(&format!("    {}\n", line));
                }
            }
            out.push('\n');
        } else {
            out.push_str(&view::schedule_table(&month, &games, &Local).render_text());
            out.push('\n');
        }
    }
    out
}

fn render_standings(widget: &LeagueWidget, details: bool) -> String {
    let conferences = by_conference(&widget.standings);
    if conferences.is_empty() {
        return format!("{}\n", view::no_data());
    }
    let team = &widget.config().team_code;
    let mut out = String::new();
    for (conference, rows) in conferences {
        out.push_str(&view::standings_table(&conference, &rows, team).render_text());
        if details {
            for standing in rows {
                out.push_str(&format!("{}\n", standing.short_name));
                for line in view::detail_lines(&standing.details) {
                    out.push_str(&format!("  {}\n", line));
                }
            }
        }
        out.push('\n');
    }
    out.push_str("* playoff  + play-in\n");
    out
}

fn render_game(widget: &GameWidget, full: bool) -> String {
    let Some(game) = &widget.game else {
        let reason = widget.error.clone().unwrap_or_else(view::no_data);
        return format!("{}\n", reason);
    };
    let mode = if full {
        BoxScoreMode::Full
    } else {
        BoxScoreMode::Compact
    };

    let mut out = view::game_header(game, &Local).join("\n");
    out.push_str("\n\n");
    out.push_str(&view::period_table(game).render_text());
    out.push('\n');
    if game.has_started {
        for team in [&game.away, &game.home] {
            out.push_str(&view::box_score(team, mode).render_text());
            for line in view::leader_lines(team) {
                out.push_str(&format!("{}\n", line));
            }
            out.push('\n');
        }
        out.push_str(&view::team_stat_comparison(game).render_text());
        out.push('\n');
    }
    for team in [&game.away, &game.home] {
        if !team.injuries.is_empty() {
            out.push_str(&view::injury_table(team).render_text());
            out.push('\n');
        }
    }
    if !game.broadcasts.is_empty() {
        out.push_str(&view::broadcast_table(&game.broadcasts).render_text());
        out.push('\n');
    }
    if let Some(at) = widget.last_fetch {
        out.push_str(&view::last_updated(at, &Local, !widget.fetched));
        out.push('\n');
    }
    out
}

fn render_prefs(prefs: &Preferences) -> String {
    match serde_json::to_string_pretty(prefs) {
        Ok(json) => format!("{}\n", json),
        Err(e) => format!("Could not show preferences: {}\n", e),
    }
}

/// Applies `prefs` subcommand flags; returns whether anything changed
fn update_prefs(prefs: &mut Preferences, command: &Command) -> bool {
    let Command::Prefs {
        upcoming,
        recent,
        recent_first,
        hide_standing,
        auto_load,
        default_tab,
        reset,
    } = command
    else {
        return false;
    };

    let before = prefs.clone();
    if *reset {
        *prefs = Preferences::default();
    }
    if let Some(n) = upcoming {
        prefs.upcoming_games_count = *n;
    }
    if let Some(n) = recent {
        prefs.recent_games_count = *n;
    }
    if let Some(b) = recent_first {
        prefs.show_recent_first = *b;
    }
    if let Some(b) = hide_standing {
        prefs.hide_spotlight_standing = *b;
    }
    if let Some(b) = auto_load {
        prefs.auto_load = *b;
    }
    if let Some(tab) = default_tab {
        prefs.default_tab = tab.clone();
    }
    *prefs != before
}

/// Picks the view for a bare `courtside` invocation
fn default_command(prefs: &Preferences) -> Command {
    match prefs.default_tab.as_str() {
        "schedule" => Command::Schedule { details: false },
        "standings" => Command::Standings { details: false },
        _ => Command::Spotlight,
    }
}

async fn run(
    config: WidgetConfig,
    storage: StorageManager,
    command: Command,
    date: Option<NaiveDate>,
) -> Result<String, Box<dyn std::error::Error>> {
    let mut prefs = Preferences::load(&storage);
    let client = ApiClient::new();
    let now = date
        .and_then(|d| as_of(d, &Local))
        .unwrap_or_else(Local::now);

    let output = match command {
        Command::Spotlight | Command::Schedule { .. } | Command::Standings { .. }
            if !prefs.auto_load =>
        {
            "Auto-load is off. Run `courtside refresh` to load data.\n".to_string()
        }
        Command::Spotlight => {
            let mut widget = LeagueWidget::new(config, client, storage);
            widget.load().await;
            render_spotlight(&widget, &prefs, &now)
        }
        Command::Refresh => {
            let mut widget = LeagueWidget::new(config, client, storage);
            widget.refresh().await;
            render_spotlight(&widget, &prefs, &now)
        }
        Command::Schedule { details } => {
            let mut widget = LeagueWidget::new(config, client, storage);
            widget.load_schedule().await;
            render_schedule(&widget, details)
        }
        Command::Standings { details } => {
            let mut widget = LeagueWidget::new(config, client, storage);
            widget.load_standings().await;
            render_standings(&widget, details)
        }
        Command::Game { full, .. } => {
            let mut widget = GameWidget::new(config, client, storage);
            widget.load().await;
            render_game(&widget, full)
        }
        Command::Clear => {
            let local = storage.clear_namespace(StorageTier::Local);
            let session = storage.clear_namespace(StorageTier::Session);
            debug!("Cleared {} session keys", session);
            format!(
                "Cleared {} stored entries for namespace {}\n",
                local,
                storage.namespace()
            )
        }
        ref prefs_command @ Command::Prefs { .. } => {
            if update_prefs(&mut prefs, prefs_command) {
                prefs.save(&storage);
            }
            render_prefs(&prefs)
        }
    };
    Ok(output)
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let config = match WidgetConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(ExitCode::from(2));
        }
    };
    debug!("Starting with {:?} at {}", config, Utc::now());

    let storage = config.open_storage()?;
    let command = match cli.command {
        Some(command) => command,
        None => default_command(&Preferences::load(&storage)),
    };

    let output = run(config, storage, command, cli.date).await?;
    print!("{}", output);
    Ok(ExitCode::SUCCESS)
}
