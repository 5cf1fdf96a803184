//! Cache module for storing API responses
//!
//! This module provides a namespaced storage manager over two tiers (a durable
//! file-backed "local" tier and an in-memory "session" tier) and the refetch
//! policy that decides how long a cached game payload may be served before the
//! API is consulted again.

mod manager;
mod policy;
mod store;

pub use manager::{StorageManager, StorageTier};
pub use policy::{
    in_live_window, is_live_status, select_ttl, tier_for_season, CacheEntry, CACHE_VERSION,
    DEFAULT_TTL_SECS, LIVE_TTL_SECS, LIVE_WINDOW_SECS,
};
pub use store::{FileStore, KeyValueStore, MemoryStore, StorageError};
