//! Result cache for finished detection reports.
//!
//! Keyed by conversation id plus the requested message limit, with a fixed
//! time-to-live and a bounded entry count. A hit bypasses detection
//! entirely. Expiry and eviction are handled by `moka`.

use std::time::Duration;

use moka::sync::Cache;
use tracing::debug;

use crate::config::CacheConfig;
use crate::types::SchedulingReport;

/// Cache key: one entry per conversation and window size.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Conversation the report belongs to.
    pub conversation_id: String,
    /// Number of messages requested.
    pub limit: usize,
}

impl CacheKey {
    /// Create a new cache key.
    pub fn new(conversation_id: impl Into<String>, limit: usize) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            limit,
        }
    }
}

/// In-memory TTL cache of scheduling reports.
#[derive(Clone)]
pub struct ResultCache {
    ttl: Duration,
    reports: Cache<CacheKey, SchedulingReport>,
}

impl ResultCache {
    /// Create a cache whose entries live for `ttl`, holding at most
    /// `max_entries` reports.
    pub fn new(ttl: Duration, max_entries: u64) -> Self {
        let reports = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();
        Self { ttl, reports }
    }

    /// Create a cache from configuration.
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(Duration::from_secs(config.ttl_secs), config.max_entries)
    }

    /// Entry lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Look up a fresh report.
    pub fn get(&self, key: &CacheKey) -> Option<SchedulingReport> {
        self.reports.get(key)
    }

    /// Store a report.
    pub fn insert(&self, key: CacheKey, report: SchedulingReport) {
        self.reports.insert(key, report);
    }

    /// Drop every entry for a conversation, whatever its limit.
    ///
    /// Returns the number of entries removed.
    pub fn invalidate_conversation(&self, conversation_id: &str) -> usize {
        let stale: Vec<CacheKey> = self
            .reports
            .iter()
            .filter(|(key, _)| key.conversation_id == conversation_id)
            .map(|(key, _)| CacheKey::clone(&key))
            .collect();
        for key in &stale {
            self.reports.invalidate(key);
        }
        debug!(conversation_id, removed = stale.len(), "cache entries invalidated");
        stale.len()
    }

    /// Drop every entry.
    pub fn invalidate_all(&self) {
        self.reports.invalidate_all();
    }

    /// Apply pending evictions and expirations now.
    pub fn run_pending_tasks(&self) {
        self.reports.run_pending_tasks();
    }

    /// Number of live entries after pending maintenance has run.
    pub fn entry_count(&self) -> u64 {
        self.reports.run_pending_tasks();
        self.reports.entry_count()
    }
}

impl std::fmt::Debug for ResultCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResultCache")
            .field("ttl", &self.ttl)
            .field("entries", &self.reports.entry_count())
            .finish()
    }
}
