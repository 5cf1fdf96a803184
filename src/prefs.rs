//! Reader preferences
//!
//! Preferences live in local storage under `user_preferences`. Stored values
//! are merged over the defaults one field at a time, so a partial or older
//! record still loads, and a stored `null` never replaces a default.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::cache::{StorageManager, StorageTier};

/// Storage key of the preferences record
pub const PREFERENCES_KEY: &str = "user_preferences";

/// Reader preferences for the league widget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub theme: String,
    /// Tab shown first ("spotlight", "schedule" or "standings")
    pub default_tab: String,
    pub upcoming_games_count: u32,
    pub recent_games_count: u32,
    pub hide_spotlight_standing: bool,
    pub show_recent_first: bool,
    pub auto_load: bool,
    pub window_size: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: "default".to_string(),
            default_tab: "spotlight".to_string(),
            upcoming_games_count: 3,
            recent_games_count: 5,
            hide_spotlight_standing: false,
            show_recent_first: false,
            auto_load: true,
            window_size: "full".to_string(),
        }
    }
}

impl Preferences {
    /// Loads preferences, falling back to defaults for anything not stored
    pub fn load(storage: &StorageManager) -> Self {
        let Some(Value::Object(stored)) =
            storage.get_json::<Value>(StorageTier::Local, PREFERENCES_KEY)
        else {
            debug!("No stored preferences, using defaults");
            return Self::default();
        };
        Self::merged(stored)
    }

    /// Overlays non-null stored fields on the defaults
    fn merged(stored: Map<String, Value>) -> Self {
        let Value::Object(mut merged) = serde_json::to_value(Self::default()).unwrap_or_default()
        else {
            return Self::default();
        };
        for (key, value) in stored {
            if !value.is_null() && merged.contains_key(&key) {
                merged.insert(key, value);
            }
        }
        serde_json::from_value(Value::Object(merged)).unwrap_or_else(|e| {
            warn!("Stored preferences have the wrong shape, using defaults: {}", e);
            Self::default()
        })
    }

    /// Writes preferences to local storage
    pub fn save(&self, storage: &StorageManager) {
        storage.put_json(StorageTier::Local, PREFERENCES_KEY, self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn storage() -> StorageManager {
        StorageManager::in_memory("prefs-test").unwrap()
    }

    #[test]
    fn test_defaults_when_nothing_stored() {
        let prefs = Preferences::load(&storage());
        assert_eq!(prefs, Preferences::default());
        assert_eq!(prefs.upcoming_games_count, 3);
        assert_eq!(prefs.recent_games_count, 5);
        assert!(prefs.auto_load);
    }

    #[test]
    fn test_save_then_load() {
        let storage = storage();
        let prefs = Preferences {
            theme: "dark".to_string(),
            show_recent_first: true,
            ..Preferences::default()
        };

        prefs.save(&storage);

        assert_eq!(Preferences::load(&storage), prefs);
    }

    #[test]
    fn test_null_and_missing_fields_keep_defaults() {
        let storage = storage();
        storage.put_json(
            StorageTier::Local,
            PREFERENCES_KEY,
            &json!({"theme": null, "recentGamesCount": 8, "unknownField": 1}),
        );

        let prefs = Preferences::load(&storage);

        assert_eq!(prefs.theme, "default");
        assert_eq!(prefs.recent_games_count, 8);
        assert_eq!(prefs.upcoming_games_count, 3);
    }

    #[test]
    fn test_wrong_types_fall_back_to_defaults() {
        let storage = storage();
        storage.put_json(
            StorageTier::Local,
            PREFERENCES_KEY,
            &json!({"autoLoad": "yes"}),
        );

        assert_eq!(Preferences::load(&storage), Preferences::default());
    }
}
