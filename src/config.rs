//! Widget configuration
//!
//! `WidgetConfig` is the immutable value every loader receives. The CLI builds
//! it from flags; library users can construct it directly.

use std::path::PathBuf;
use std::sync::Arc;

use crate::api::ApiSource;
use crate::cache::{FileStore, MemoryStore, StorageError, StorageManager};

/// Season whose data is still changing; earlier seasons are cached durably
pub const CURRENT_SEASON: &str = "2026";

/// Season type loaded when none is given (1 preseason, 2 regular, 3 post)
pub const CURRENT_SEASON_TYPE: &str = "1";

/// Team loaded when none is given
pub const DEFAULT_TEAM_CODE: &str = "sa";

/// Storage namespace used when none is given
pub const DEFAULT_NAMESPACE: &str = "bbw-nbawidget";

/// Season types ESPN understands
pub const SEASON_TYPES: [&str; 3] = ["1", "2", "3"];

/// Everything a widget needs to know about what to load and where to cache it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    /// Lowercase ESPN team code
    pub team_code: String,
    /// Prefix isolating this widget's storage keys
    pub namespace: String,
    pub source: ApiSource,
    /// Game widget parameter: an event id or a `YYYY-MM-DD` date
    pub api_parameter: Option<String>,
    pub season: String,
    pub season_type: String,
    pub debug: bool,
    /// Directory for the durable store; the XDG cache dir when `None`
    pub store_dir: Option<PathBuf>,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            team_code: DEFAULT_TEAM_CODE.to_string(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            source: ApiSource::default(),
            api_parameter: None,
            season: CURRENT_SEASON.to_string(),
            season_type: CURRENT_SEASON_TYPE.to_string(),
            debug: false,
            store_dir: None,
        }
    }
}

impl WidgetConfig {
    /// Default configuration for one team
    pub fn for_team(team_code: &str) -> Self {
        Self {
            team_code: team_code.trim().to_lowercase(),
            ..Self::default()
        }
    }

    /// Opens the storage this configuration points at
    ///
    /// The session tier is always a fresh in-memory store.
    pub fn open_storage(&self) -> Result<StorageManager, StorageError> {
        match &self.store_dir {
            Some(dir) => StorageManager::with_stores(
                &self.namespace,
                Arc::new(FileStore::in_dir(dir)),
                Arc::new(MemoryStore::new()),
            ),
            None => StorageManager::new(&self.namespace),
        }
    }
}
