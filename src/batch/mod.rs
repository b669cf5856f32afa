//! Sequential batch lookups with progress and cancellation
//!
//! A batch walks its identifiers in order, one lookup at a time, through the
//! [`LookupCache`]. Item failures are collected, never raised. The
//! [`CancellationToken`] is checked before every item; a cancelled batch
//! returns what it has collected so far.

pub mod cancel;
pub mod progress;

pub use cancel::CancellationToken;
pub use progress::BatchProgress;

use crate::cache::LookupCache;
use crate::compound::{CompoundRecord, Identifier};
use crate::config::schema::BatchConfig;
use crate::error::ChemResult;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// Failure message for identifiers with no upstream record
pub const NOT_FOUND_MESSAGE: &str = "Compound not found";

/// Pacing options for a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Pause between consecutive items, on top of the rate limiter
    pub inter_item_delay: Duration,
    /// Items per chunk for [`BatchOrchestrator::run_configured`] (0 = no chunking)
    pub chunk_size: usize,
}

impl BatchOptions {
    pub fn from_config(config: &BatchConfig) -> Self {
        Self {
            inter_item_delay: config.inter_item_delay(),
            chunk_size: config.chunk_size,
        }
    }
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self::from_config(&BatchConfig::default())
    }
}

/// A successful batch item
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchItem {
    pub identifier: String,
    pub record: CompoundRecord,
}

/// A failed batch item
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub identifier: String,
    pub error: String,
}

/// Outcome of a batch run.
///
/// `total_processed == success.len() + failed.len()`; items skipped by
/// cancellation appear in neither list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchResult {
    pub success: Vec<BatchItem>,
    pub failed: Vec<BatchFailure>,
    pub total_processed: usize,
    /// Whether the run stopped early because of cancellation
    pub cancelled: bool,
}

impl BatchResult {
    fn record_success(&mut self, identifier: &str, record: CompoundRecord) {
        self.success.push(BatchItem {
            identifier: identifier.to_string(),
            record,
        });
        self.total_processed += 1;
    }

    fn record_failure(&mut self, identifier: &str, error: impl Into<String>) {
        self.failed.push(BatchFailure {
            identifier: identifier.to_string(),
            error: error.into(),
        });
        self.total_processed += 1;
    }
}

/// Drives batches of lookups through a [`LookupCache`]
pub struct BatchOrchestrator {
    cache: Arc<LookupCache>,
    options: BatchOptions,
}

impl BatchOrchestrator {
    pub fn new(cache: Arc<LookupCache>, options: BatchOptions) -> Self {
        Self { cache, options }
    }

    pub fn options(&self) -> &BatchOptions {
        &self.options
    }

    /// Process every identifier in order.
    ///
    /// `on_progress` is called exactly once per processed item.
    pub async fn run<S, F>(
        &self,
        identifiers: &[S],
        token: &CancellationToken,
        mut on_progress: F,
    ) -> BatchResult
    where
        S: AsRef<str>,
        F: FnMut(&BatchProgress),
    {
        let run_id = Uuid::new_v4();
        info!("Batch {} started: {} identifiers", run_id, identifiers.len());

        let mut result = BatchResult::default();
        self.process(identifiers, 0, identifiers.len(), token, &mut on_progress, &mut result)
            .await;

        self.finish(run_id, &result);
        result
    }

    /// Process identifiers in fixed-size chunks.
    ///
    /// Progress is reported against the whole list, not per chunk. A
    /// `chunk_size` of zero processes the list as a single chunk.
    pub async fn run_chunked<S, F>(
        &self,
        identifiers: &[S],
        chunk_size: usize,
        token: &CancellationToken,
        mut on_progress: F,
    ) -> BatchResult
    where
        S: AsRef<str>,
        F: FnMut(&BatchProgress),
    {
        if chunk_size == 0 {
            return self.run(identifiers, token, on_progress).await;
        }

        let run_id = Uuid::new_v4();
        let total = identifiers.len();
        let chunk_count = total.div_ceil(chunk_size);
        info!(
            "Batch {} started: {} identifiers in {} chunks of {}",
            run_id, total, chunk_count, chunk_size
        );

        let mut result = BatchResult::default();
        for (index, chunk) in identifiers.chunks(chunk_size).enumerate() {
            if token.is_cancelled() {
                result.cancelled = true;
                break;
            }
            debug!("Batch {} chunk {}/{}", run_id, index + 1, chunk_count);
            let offset = index * chunk_size;
            self.process(chunk, offset, total, token, &mut on_progress, &mut result)
                .await;
        }

        self.finish(run_id, &result);
        result
    }

    /// Run with the configured chunking
    pub async fn run_configured<S, F>(
        &self,
        identifiers: &[S],
        token: &CancellationToken,
        on_progress: F,
    ) -> BatchResult
    where
        S: AsRef<str>,
        F: FnMut(&BatchProgress),
    {
        self.run_chunked(identifiers, self.options.chunk_size, token, on_progress)
            .await
    }

    /// Process `items`, which start at position `offset` of a `total`-item batch
    async fn process<S, F>(
        &self,
        items: &[S],
        offset: usize,
        total: usize,
        token: &CancellationToken,
        on_progress: &mut F,
        result: &mut BatchResult,
    ) where
        S: AsRef<str>,
        F: FnMut(&BatchProgress),
    {
        for (index, item) in items.iter().enumerate() {
            if token.is_cancelled() {
                debug!("Batch cancelled before item {}", offset + index + 1);
                result.cancelled = true;
                return;
            }

            let identifier = item.as_ref();
            match self.lookup(identifier).await {
                Ok(Some(record)) => result.record_success(identifier, record),
                Ok(None) => result.record_failure(identifier, NOT_FOUND_MESSAGE),
                Err(e) => {
                    debug!("Batch item {} failed: {}", identifier, e);
                    result.record_failure(identifier, e.to_string());
                }
            }

            let current = offset + index + 1;
            on_progress(&BatchProgress::new(
                current,
                total,
                Some(identifier.to_string()),
            ));

            if current < total {
                self.pause(token).await;
            }
        }
    }

    async fn lookup(&self, raw: &str) -> ChemResult<Option<CompoundRecord>> {
        match Identifier::parse(raw)? {
            Identifier::Id(id) => self.cache.lookup_by_id(id).await,
            Identifier::Name(name) => self.cache.lookup_by_name(&name).await,
        }
    }

    /// Inter-item delay, cut short by cancellation
    async fn pause(&self, token: &CancellationToken) {
        let delay = self.options.inter_item_delay;
        if delay.is_zero() {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = token.cancelled() => {}
        }
    }

    fn finish(&self, run_id: Uuid, result: &BatchResult) {
        info!(
            "Batch {} {}: {} succeeded, {} failed",
            run_id,
            if result.cancelled { "cancelled" } else { "finished" },
            result.success.len(),
            result.failed.len()
        );
    }
}
