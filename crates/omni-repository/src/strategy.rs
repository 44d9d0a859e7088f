//! Cache freshness policies chosen per request

use std::str::FromStr;

use omni_client::ToolingError;
use serde::{Deserialize, Serialize};

/// How a repository request treats the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStrategy {
    /// Return the cached value or nothing. Never fetches.
    FromCacheOnly,
    /// Return the cached value, fetching and caching it first if absent.
    LoadIfNotCached,
    /// Always fetch, replacing any cached value.
    ForceReload,
}

impl FetchStrategy {
    pub const ALL: [FetchStrategy; 3] = [
        FetchStrategy::FromCacheOnly,
        FetchStrategy::LoadIfNotCached,
        FetchStrategy::ForceReload,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FetchStrategy::FromCacheOnly => "from_cache_only",
            FetchStrategy::LoadIfNotCached => "load_if_not_cached",
            FetchStrategy::ForceReload => "force_reload",
        }
    }

    /// Whether a cached value, when present, answers the request.
    pub fn accepts_cached(self) -> bool {
        !matches!(self, FetchStrategy::ForceReload)
    }

    /// Whether the request may go to the builds when the cache cannot answer.
    pub fn may_fetch(self) -> bool {
        !matches!(self, FetchStrategy::FromCacheOnly)
    }
}

impl std::fmt::Display for FetchStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FetchStrategy {
    type Err = ToolingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.replace('-', "_").to_ascii_lowercase();
        if normalized == "reload_if_not_cached" {
            return Ok(FetchStrategy::LoadIfNotCached);
        }
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.as_str() == normalized)
            .ok_or_else(|| ToolingError::invalid_argument(format!("unknown fetch strategy '{s}'")))
    }
}
