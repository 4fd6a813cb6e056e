//! Boundary between the detector and its collaborators.
//!
//! The detector itself is synchronous. Fetching messages and summarizing
//! topics are I/O-bound in a real deployment, so those seams are async
//! traits. [`SchedulingService`] wires them together:
//! cache lookup, fetch, detect, optional topic enrichment, cache store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::cache::{CacheKey, ResultCache};
use crate::config::Config;
use crate::scheduling::SchedulingCoordinator;
use crate::types::{Message, SchedulingReport, SchedulingThread};

/// Source of ordered conversation history.
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Fetch up to `limit` most recent text messages, oldest first, indexed
    /// by position.
    ///
    /// # Errors
    ///
    /// Returns an error if the conversation cannot be read.
    async fn fetch_recent(&self, conversation_id: &str, limit: usize)
        -> anyhow::Result<Vec<Message>>;
}

/// Optional natural-language topic generator.
#[async_trait]
pub trait TopicSummarizer: Send + Sync {
    /// Propose a better topic for `thread`. `Ok(None)` keeps the keyword topic.
    ///
    /// # Errors
    ///
    /// Returns an error if the summarizer fails; the caller keeps the
    /// keyword topic.
    async fn summarize(
        &self,
        thread: &SchedulingThread,
        context: &[Message],
    ) -> anyhow::Result<Option<String>>;
}

/// Composes message fetch, detection, enrichment and caching.
pub struct SchedulingService {
    source: Arc<dyn MessageSource>,
    coordinator: SchedulingCoordinator,
    cache: Option<ResultCache>,
    summarizer: Option<Arc<dyn TopicSummarizer>>,
}

impl SchedulingService {
    /// Service without cache or summarizer.
    pub fn new(source: Arc<dyn MessageSource>, coordinator: SchedulingCoordinator) -> Self {
        Self {
            source,
            coordinator,
            cache: None,
            summarizer: None,
        }
    }

    /// Service configured from a loaded [`Config`].
    ///
    /// # Errors
    ///
    /// Returns an error if the detector configuration is invalid.
    pub fn from_config(source: Arc<dyn MessageSource>, config: &Config) -> anyhow::Result<Self> {
        config
            .detector
            .validate()
            .context("invalid detector configuration")?;
        let coordinator = SchedulingCoordinator::new(config.detector.clone());
        let service = Self::new(source, coordinator);
        Ok(if config.cache.enabled {
            service.with_cache(ResultCache::from_config(&config.cache))
        } else {
            service
        })
    }

    /// Attach a result cache.
    pub fn with_cache(mut self, cache: ResultCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Attach a topic summarizer.
    pub fn with_summarizer(mut self, summarizer: Arc<dyn TopicSummarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    /// The attached cache, if any.
    pub fn cache(&self) -> Option<&ResultCache> {
        self.cache.as_ref()
    }

    /// Detect scheduling threads in a conversation.
    ///
    /// `limit` defaults to the configured message limit.
    ///
    /// # Errors
    ///
    /// Returns an error if fetching fails or the fetched window is malformed.
    pub async fn detect(
        &self,
        conversation_id: &str,
        user_id: &str,
        limit: Option<usize>,
    ) -> anyhow::Result<SchedulingReport> {
        let limit = limit.unwrap_or(self.coordinator.config().default_message_limit);
        let key = CacheKey::new(conversation_id, limit);

        if let Some(report) = self.cache.as_ref().and_then(|c| c.get(&key)) {
            debug!(conversation_id, limit, "scheduling report served from cache");
            return Ok(report);
        }

        let messages = self
            .source
            .fetch_recent(conversation_id, limit)
            .await
            .with_context(|| format!("failed to fetch messages for {conversation_id}"))?;

        let threads = self
            .coordinator
            .run(&messages, user_id)
            .with_context(|| format!("invalid message window for {conversation_id}"))?;

        let threads = match &self.summarizer {
            Some(summarizer) => self.enrich_topics(summarizer.as_ref(), threads, &messages).await,
            None => threads,
        };

        let report = SchedulingReport::from_threads(threads);
        info!(
            conversation_id,
            total_threads = report.summary.total_threads,
            needs_action = report.summary.needs_action,
            "scheduling report ready"
        );

        if let Some(cache) = &self.cache {
            cache.insert(key, report.clone());
        }
        Ok(report)
    }

    async fn enrich_topics(
        &self,
        summarizer: &dyn TopicSummarizer,
        threads: Vec<SchedulingThread>,
        messages: &[Message],
    ) -> Vec<SchedulingThread> {
        let radius = self.coordinator.config().neighborhood_radius;
        let mut enriched = Vec::with_capacity(threads.len());

        for thread in threads {
            let low = thread.trigger_message_index.saturating_sub(radius);
            let high = thread.trigger_message_index.saturating_add(radius);
            let context: Vec<Message> = messages
                .iter()
                .filter(|m| (low..=high).contains(&m.index))
                .cloned()
                .collect();

            match summarizer.summarize(&thread, &context).await {
                Ok(Some(topic)) if !topic.trim().is_empty() => {
                    enriched.push(SchedulingThread {
                        topic: topic.trim().to_owned(),
                        ..thread
                    });
                }
                Ok(_) => enriched.push(thread),
                Err(e) => {
                    warn!(thread = %thread.id, error = %e, "topic summarizer failed, keeping keyword topic");
                    enriched.push(thread);
                }
            }
        }

        enriched
    }
}

/// Message as stored in a JSON chat export.
#[derive(Debug, Deserialize)]
struct ExportedMessage {
    id: String,
    #[serde(alias = "senderId")]
    sender_id: String,
    #[serde(default)]
    content: String,
    timestamp: DateTime<Utc>,
}

/// Reads conversations from JSON exports in a directory.
///
/// Conversation `abc` lives in `<dir>/abc.json` as an array of
/// `{ id, sender_id, content, timestamp }` objects.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    dir: PathBuf,
}

impl JsonFileSource {
    /// Source rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Source for a single export file; its stem is the conversation id.
    ///
    /// Returns the source and the conversation id.
    pub fn for_file(path: &Path) -> (Self, String) {
        let dir = path
            .parent()
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let conversation_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        (Self::new(dir), conversation_id)
    }

    fn path_for(&self, conversation_id: &str) -> PathBuf {
        self.dir.join(format!("{conversation_id}.json"))
    }
}

#[async_trait]
impl MessageSource for JsonFileSource {
    async fn fetch_recent(
        &self,
        conversation_id: &str,
        limit: usize,
    ) -> anyhow::Result<Vec<Message>> {
        if conversation_id.is_empty() || conversation_id.contains(['/', '\\']) {
            anyhow::bail!("invalid conversation id '{conversation_id}'");
        }
        let path = self.path_for(conversation_id);
        let raw = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let exported: Vec<ExportedMessage> = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(window_from_export(exported, limit))
    }
}

/// Keep text-bearing messages, order oldest first, take the newest `limit`,
/// and index by position.
fn window_from_export(mut exported: Vec<ExportedMessage>, limit: usize) -> Vec<Message> {
    exported.retain(|m| !m.content.trim().is_empty());
    exported.sort_by_key(|m| m.timestamp);
    let skip = exported.len().saturating_sub(limit);

    exported
        .into_iter()
        .skip(skip)
        .enumerate()
        .map(|(index, m)| Message {
            id: m.id,
            index,
            sender_id: m.sender_id,
            content: m.content,
            timestamp: m.timestamp,
        })
        .collect()
}
