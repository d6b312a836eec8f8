//! Core configuration.
//!
//! # Responsibility
//! - Hold tunables for the calendar store and its derived views.
//! - Resolve remote collection names from the environment.
//!
//! # Invariants
//! - `Default` values reproduce the shipped app behavior
//!   (`calendar_events` key, Sunday weeks, 3 day markers, 5 upcoming).

use crate::calendar::grid::GridOptions;

/// Storage key holding the serialized event collection.
pub const DEFAULT_STORAGE_KEY: &str = "calendar_events";
/// Maximum number of events in the upcoming preview.
pub const DEFAULT_UPCOMING_LIMIT: usize = 5;

/// Calendar store and view configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarConfig {
    pub storage_key: String,
    pub grid: GridOptions,
    pub upcoming_limit: usize,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            grid: GridOptions::default(),
            upcoming_limit: DEFAULT_UPCOMING_LIMIT,
        }
    }
}

/// Names of the remote document collections used by the expense ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCollections {
    pub users: String,
    pub groups: String,
    pub activity: String,
    pub friends: String,
    pub transactions: String,
}

impl Default for RemoteCollections {
    fn default() -> Self {
        Self {
            users: "users".to_string(),
            groups: "groups".to_string(),
            activity: "activity".to_string(),
            friends: "friends".to_string(),
            transactions: "transactions".to_string(),
        }
    }
}

impl RemoteCollections {
    /// Reads `SPLITCAL_<NAME>_COLLECTION_ID` overrides; blank values fall back
    /// to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env`, with an injectable variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let resolve = |name: &str, fallback: String| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or(fallback)
        };

        Self {
            users: resolve("SPLITCAL_USER_COLLECTION_ID", defaults.users),
            groups: resolve("SPLITCAL_GROUPS_COLLECTION_ID", defaults.groups),
            activity: resolve("SPLITCAL_ACTIVITY_COLLECTION_ID", defaults.activity),
            friends: resolve("SPLITCAL_FRIENDS_COLLECTION_ID", defaults.friends),
            transactions: resolve(
                "SPLITCAL_TRANSACTION_COLLECTION_ID",
                defaults.transactions,
            ),
        }
    }
}
