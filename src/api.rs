//! ESPN site API access
//!
//! Issues HTTP GET requests against ESPN's public JSON endpoints. Callers see a
//! single failure channel: any network error, non-2xx status or malformed body
//! is logged and mapped to `None`.

use std::time::Duration;

use chrono::NaiveDate;
use clap::ValueEnum;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

/// Base URL for the ESPN site API
pub const ESPN_SITE_BASE_URL: &str = "https://site.web.api.espn.com";

/// Per-request timeout
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// User agent sent with every request
const USER_AGENT: &str = concat!("courtside/", env!("CARGO_PKG_VERSION"));

/// Upstream data providers the widgets know how to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ApiSource {
    /// ESPN site API
    #[default]
    Espn,
}

/// Errors that can occur when fetching JSON
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP error: {0}")]
    HttpStatus(StatusCode),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Source of JSON documents for the widgets
///
/// `ApiClient` is the production implementation; tests substitute canned
/// fetchers.
#[allow(async_fn_in_trait)]
pub trait JsonFetcher {
    /// Fetches and parses the document at `url`, or `None` on any failure
    async fn fetch_json(&self, url: &str) -> Option<Value>;
}

/// HTTP client for JSON APIs
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClient {
    /// Creates a client with the default timeout and user agent
    pub fn new() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|e| {
                error!("Failed to build HTTP client, using defaults: {}", e);
                Client::new()
            });
        Self { client }
    }

    /// Creates a client around an existing reqwest client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Fetches `url` and parses the body as JSON
    pub async fn try_fetch_json(&self, url: &str) -> Result<Value, ApiError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::HttpStatus(status));
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl JsonFetcher for ApiClient {
    async fn fetch_json(&self, url: &str) -> Option<Value> {
        debug!("Fetching JSON from URL: {}", url);
        match self.try_fetch_json(url).await {
            Ok(value) => {
                if let Some(object) = value.as_object() {
                    debug!(
                        "Fetch successful. Top-level keys: {:?}",
                        object.keys().collect::<Vec<_>>()
                    );
                }
                Some(value)
            }
            Err(e) => {
                error!("Fetch error for {}: {}", url, e);
                None
            }
        }
    }
}

/// URL templates for the ESPN endpoints the widgets read
#[derive(Debug, Clone)]
pub struct Endpoints {
    base_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self::new(ESPN_SITE_BASE_URL)
    }
}

impl Endpoints {
    /// Creates endpoint templates rooted at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Scoreboard for a single date
    pub fn scoreboard(&self, date: NaiveDate) -> String {
        format!(
            "{}/apis/site/v2/sports/basketball/nba/scoreboard?dates={}",
            self.base_url,
            date.format("%Y%m%d")
        )
    }

    /// Full game summary (box score, injuries, broadcasts) for an event
    pub fn summary(&self, event_id: &str) -> String {
        format!(
            "{}/apis/site/v2/sports/basketball/nba/summary?region=us&lang=en&contentorigin=espn&event={}",
            self.base_url, event_id
        )
    }

    /// One team's schedule for a season and season type
    pub fn team_schedule(&self, team_code: &str, season: &str, season_type: &str) -> String {
        format!(
            "{}/apis/site/v2/sports/basketball/nba/teams/{}/schedule?region=us&lang=en&season={}&seasontype={}",
            self.base_url, team_code, season, season_type
        )
    }

    /// League standings by conference, sorted by playoff seed
    ///
    /// Post-season (`3`) has no standings of its own, so regular season (`2`)
    /// is requested instead.
    pub fn standings(&self, season: &str, season_type: &str) -> String {
        let season_type = if season_type == "3" { "2" } else { season_type };
        format!(
            "{}/apis/v2/sports/basketball/nba/standings?region=us&lang=en&type=0&level=2&sort=playoffseed%3Aasc&season={}&seasontype={}",
            self.base_url, season, season_type
        )
    }
}
