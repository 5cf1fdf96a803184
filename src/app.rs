//! Widget state and fetch-or-cache orchestration
//!
//! `LeagueWidget` owns a team's schedule and the league standings;
//! `GameWidget` owns one game's summary. Both follow the same pattern: look in
//! storage first, fetch only when nothing usable is cached, and cache only data
//! that arrived and parsed. Failures never propagate: they are logged and leave
//! the widget with empty data.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiSource, Endpoints, JsonFetcher};
use crate::cache::{select_ttl, tier_for_season, CacheEntry, StorageManager, StorageTier};
use crate::config::{WidgetConfig, CURRENT_SEASON};
use crate::data::{
    find_team, find_team_standing, parse_game_summary, parse_standings, parse_team_schedule,
    spotlight, GameSummary, ScheduledGame, Spotlight, Standing,
};

/// Storage key of the cached game summary
pub const GAME_DATA_KEY: &str = "game-data-espn";

/// Storage key of the date to event id lookup list
pub const GAME_ID_LOOKUP_KEY: &str = "game-date-to-id-espn";

/// How long a date to event id mapping is kept
pub const LOOKUP_RETENTION_DAYS: i64 = 10;

/// Storage key for one team's schedule
pub fn schedule_key(team_code: &str, season: &str, season_type: &str) -> String {
    format!("schedule_{}_{}_{}", team_code, season, season_type)
}

/// Storage key for the league standings
pub fn standings_key(season: &str, season_type: &str) -> String {
    format!("standings_{}_{}", season, season_type)
}

/// Returns the stored document for `key`, fetching it from `url` when absent
///
/// A successful fetch is written back to `tier`; a failed one removes whatever
/// was stored so a broken payload is never served twice.
async fn cached_json<F: JsonFetcher>(
    fetcher: &F,
    storage: &StorageManager,
    tier: StorageTier,
    key: &str,
    url: &str,
) -> Option<Value> {
    if let Some(json) = storage.get_json::<Value>(tier, key) {
        debug!("Cache hit for {} in {} storage", key, tier);
        return Some(json);
    }

    debug!("Cache miss for {}, fetching", key);
    match fetcher.fetch_json(url).await {
        Some(json) => {
            storage.put_json(tier, key, &json);
            Some(json)
        }
        None => {
            storage.remove(tier, key);
            None
        }
    }
}

/// A team's schedule plus the league standings
pub struct LeagueWidget<F: JsonFetcher = ApiClient> {
    config: WidgetConfig,
    fetcher: F,
    endpoints: Endpoints,
    storage: StorageManager,
    /// Parsed schedule, in ESPN's (chronological) order
    pub schedule: Vec<ScheduledGame>,
    /// Parsed standings for every conference
    pub standings: Vec<Standing>,
    /// When data was last loaded
    pub last_refresh: Option<DateTime<Utc>>,
}

impl<F: JsonFetcher> LeagueWidget<F> {
    pub fn new(config: WidgetConfig, fetcher: F, storage: StorageManager) -> Self {
        Self {
            config,
            fetcher,
            endpoints: Endpoints::default(),
            storage,
            schedule: Vec::new(),
            standings: Vec::new(),
            last_refresh: None,
        }
    }

    /// Points the widget at a different API host
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    pub fn storage(&self) -> &StorageManager {
        &self.storage
    }

    /// Tier the configured season is cached in
    fn tier(&self) -> StorageTier {
        tier_for_season(&self.config.season, CURRENT_SEASON)
    }

    /// Loads the schedule, then the standings
    pub async fn load(&mut self) {
        info!(
            "Loading {} {} season type {}",
            self.config.team_code, self.config.season, self.config.season_type
        );
        let schedule_ok = self.load_schedule().await;
        let standings_ok = self.load_standings().await;
        if !schedule_ok || !standings_ok {
            warn!(
                "Load incomplete: schedule={}, standings={}",
                schedule_ok, standings_ok
            );
        }
        self.last_refresh = Some(Utc::now());
    }

    /// Loads the team schedule; returns whether any data was available
    pub async fn load_schedule(&mut self) -> bool {
        let WidgetConfig {
            team_code,
            season,
            season_type,
            ..
        } = &self.config;
        let key = schedule_key(team_code, season, season_type);
        let json = match self.config.source {
            ApiSource::Espn => {
                let url = self.endpoints.team_schedule(team_code, season, season_type);
                cached_json(&self.fetcher, &self.storage, self.tier(), &key, &url).await
            }
        };

        self.schedule = json
            .map(|json| parse_team_schedule(&json, team_code))
            .unwrap_or_default();
        !self.schedule.is_empty()
    }

    /// Loads the league standings; returns whether any data was available
    pub async fn load_standings(&mut self) -> bool {
        let key = standings_key(&self.config.season, &self.config.season_type);
        let json = match self.config.source {
            ApiSource::Espn => {
                let url = self
                    .endpoints
                    .standings(&self.config.season, &self.config.season_type);
                cached_json(&self.fetcher, &self.storage, self.tier(), &key, &url).await
            }
        };

        self.standings = json.map(|json| parse_standings(&json)).unwrap_or_default();
        !self.standings.is_empty()
    }

    /// Drops this namespace's session data and loads again
    pub async fn refresh(&mut self) {
        let removed = self.storage.clear_namespace(StorageTier::Session);
        debug!("Refresh cleared {} session keys", removed);
        self.load().await;
    }

    /// Drops this namespace's durable data, preferences included
    pub fn clear_local(&self) -> usize {
        self.storage.clear_namespace(StorageTier::Local)
    }

    /// The configured team's row in the standings
    pub fn team_standing(&self) -> Option<&Standing> {
        find_team_standing(&self.standings, &self.config.team_code)
    }

    /// Today's, upcoming and recent games around `now`
    pub fn spotlight<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
        upcoming: usize,
        recent: usize,
    ) -> Spotlight<'_> {
        spotlight(&self.schedule, now, upcoming, recent)
    }
}

/// One remembered date to event id resolution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameIdLookup {
    #[serde(rename = "fetchDate")]
    pub fetch_date: DateTime<Utc>,
    /// Date as `YYYYMMDD`
    #[serde(rename = "cacheDateParam")]
    pub cache_date_param: String,
    #[serde(rename = "cacheEventID")]
    pub cache_event_id: String,
}

/// Parses a strict `YYYY-MM-DD` game parameter
fn parse_date_param(param: &str) -> Option<NaiveDate> {
    let bytes = param.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    NaiveDate::parse_from_str(param, "%Y-%m-%d").ok()
}

/// First scoreboard event whose name mentions `nickname`
fn find_event_id(scoreboard: &Value, nickname: &str) -> Option<String> {
    let nickname = nickname.to_lowercase();
    scoreboard
        .get("events")?
        .as_array()?
        .iter()
        .find(|event| {
            event
                .get("name")
                .and_then(Value::as_str)
                .is_some_and(|name| name.to_lowercase().contains(&nickname))
        })
        .and_then(|event| match event.get("id")? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        })
        .filter(|id| !id.is_empty())
}

/// One game's summary and box score
pub struct GameWidget<F: JsonFetcher = ApiClient> {
    config: WidgetConfig,
    fetcher: F,
    endpoints: Endpoints,
    storage: StorageManager,
    pub game: Option<GameSummary>,
    /// Event id the parameter resolved to
    pub event_id: Option<String>,
    /// When the shown data was fetched, cached or not
    pub last_fetch: Option<DateTime<Utc>>,
    /// Whether the last load went to the network
    pub fetched: bool,
    /// Reader-facing reason nothing could be loaded
    pub error: Option<String>,
}

impl<F: JsonFetcher> GameWidget<F> {
    pub fn new(config: WidgetConfig, fetcher: F, storage: StorageManager) -> Self {
        Self {
            config,
            fetcher,
            endpoints: Endpoints::default(),
            storage,
            game: None,
            event_id: None,
            last_fetch: None,
            fetched: false,
            error: None,
        }
    }

    /// Points the widget at a different API host
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Loads the game named by the configured parameter
    pub async fn load(&mut self) -> bool {
        self.load_at(Utc::now()).await
    }

    /// Loads again; cached data is still served until its refetch time
    pub async fn refresh(&mut self) -> bool {
        self.load().await
    }

    /// Loads as if the current instant were `now`
    pub async fn load_at(&mut self, now: DateTime<Utc>) -> bool {
        self.game = None;
        self.event_id = None;
        self.last_fetch = None;
        self.fetched = false;
        self.error = None;

        let param = self.config.api_parameter.clone().unwrap_or_default();
        let resolved = match self.config.source {
            ApiSource::Espn => self.resolve_event_id(&param, now).await,
        };
        let Some(event_id) = resolved else {
            info!("No game found for parameter {:?}", param);
            self.error = Some(format!("No Games Found for: {}", param));
            return false;
        };
        self.event_id = Some(event_id.clone());

        let Some(json) = self.game_detail(&event_id, now).await else {
            return false;
        };
        let Some(game) = parse_game_summary(&json) else {
            warn!("Game {} returned a summary that could not be parsed", event_id);
            return false;
        };

        if self.fetched {
            let ttl = select_ttl(game.is_live, game.date, now);
            debug!("Caching game {} for {}s", event_id, ttl.num_seconds());
            let entry = CacheEntry::new(event_id, json, now, ttl);
            self.storage.put_json(StorageTier::Local, GAME_DATA_KEY, &entry);
        }
        self.game = Some(game);
        true
    }

    /// Turns the widget parameter into an ESPN event id
    ///
    /// All-digit parameters are already ids. `YYYY-MM-DD` dates are resolved
    /// through the lookup cache or that day's scoreboard. Anything else, or a
    /// date with no game for the team, resolves to `None`.
    pub async fn resolve_event_id(&self, param: &str, now: DateTime<Utc>) -> Option<String> {
        let param = param.trim();
        if !param.is_empty() && param.bytes().all(|b| b.is_ascii_digit()) {
            return Some(param.to_string());
        }

        let date = parse_date_param(param)?;
        let compact = date.format("%Y%m%d").to_string();

        let mut lookups: Vec<GameIdLookup> = self
            .storage
            .get_json(StorageTier::Local, GAME_ID_LOOKUP_KEY)
            .unwrap_or_default();
        if let Some(hit) = lookups.iter().find(|l| l.cache_date_param == compact) {
            debug!("Event id for {} found in lookup cache", compact);
            return Some(hit.cache_event_id.clone());
        }

        let scoreboard = self.fetcher.fetch_json(&self.endpoints.scoreboard(date)).await?;
        let nickname = find_team(&self.config.team_code)
            .map(|team| team.nickname.to_string())
            .unwrap_or_else(|| self.config.team_code.clone());
        let event_id = find_event_id(&scoreboard, &nickname)?;

        let cutoff = now - Duration::days(LOOKUP_RETENTION_DAYS);
        lookups.retain(|l| l.fetch_date >= cutoff);
        lookups.push(GameIdLookup {
            fetch_date: now,
            cache_date_param: compact,
            cache_event_id: event_id.clone(),
        });
        self.storage
            .put_json(StorageTier::Local, GAME_ID_LOOKUP_KEY, &lookups);

        Some(event_id)
    }

    /// Cached summary for `event_id` if still fresh, otherwise a new fetch
    async fn game_detail(&mut self, event_id: &str, now: DateTime<Utc>) -> Option<Value> {
        if let Some(entry) = self
            .storage
            .get_json::<CacheEntry<Value>>(StorageTier::Local, GAME_DATA_KEY)
        {
            if entry.is_fresh(event_id, now) {
                debug!(
                    "Serving cached game {} until {}",
                    event_id, entry.refetch_date
                );
                self.last_fetch = Some(entry.fetch_date);
                return Some(entry.cache_data);
            }
            debug!("Cached game {} is stale or for another event", entry.cache_key);
            self.storage.remove(StorageTier::Local, GAME_DATA_KEY);
        }

        let json = self
            .fetcher
            .fetch_json(&self.endpoints.summary(event_id))
            .await;
        self.fetched = true;
        self.last_fetch = Some(now);
        json
    }
}
