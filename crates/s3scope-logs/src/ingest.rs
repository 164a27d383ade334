use futures::{StreamExt, future, stream};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use s3scope_storage::{ObjectStore, RemoteObjectFetcher};
use s3scope_types::{LoadProgress, LogBatch, ObjectRef};

use crate::{BatchStore, LogParser};

/// Number of objects fetched at once unless configured otherwise
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Outcome of one load
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Objects asked for
    pub requested: usize,

    /// Objects recorded in the batch, failed ones included
    pub processed: usize,

    /// Entries across all recorded objects
    pub total_entries: usize,

    /// Keys that could not be fetched or decoded
    pub failed: Vec<String>,

    /// Whether the load stopped before every object was processed
    pub cancelled: bool,
}

/// Drives fetch, decompress and parse over a list of objects
pub struct IngestionCoordinator<S> {
    fetcher: RemoteObjectFetcher<S>,

    /// Batch of the most recent load
    store: BatchStore,

    /// Maximum fetches in flight
    concurrency: usize,
}

impl<S: ObjectStore> IngestionCoordinator<S> {
    pub fn new(fetcher: RemoteObjectFetcher<S>) -> Self {
        Self {
            fetcher,
            store: BatchStore::new(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Handle to the batch store, shared with the coordinator
    pub fn store(&self) -> BatchStore {
        self.store.clone()
    }

    /// Load `objects` in order and replace the stored batch with the result.
    ///
    /// Objects that fail to load are recorded with no entries. Once `cancel`
    /// fires no further fetches start and nothing more is recorded; the batch
    /// keeps whatever was processed up to that point.
    pub async fn load(
        &mut self,
        objects: &[ObjectRef],
        cancel: &CancellationToken,
        progress: Option<&mpsc::UnboundedSender<LoadProgress>>,
    ) -> LoadSummary {
        let total = objects.len();
        let mut batch = LogBatch::new();
        let mut summary = LoadSummary {
            requested: total,
            ..Default::default()
        };

        tracing::info!(objects = total, concurrency = self.concurrency, "loading log objects");

        let fetcher = &self.fetcher;
        let results = stream::iter(objects)
            .take_while(|_| future::ready(!cancel.is_cancelled()))
            .map(|object| async move {
                let outcome = fetcher.fetch_and_decompress(object).await;
                let content = outcome.content();
                let entries = if content.is_empty() {
                    Vec::new()
                } else {
                    LogParser::parse_content(content)
                };
                (object, outcome.is_failed(), entries)
            })
            .buffered(self.concurrency);
        let mut results = std::pin::pin!(results);

        while let Some((object, failed, entries)) = results.next().await {
            tracing::debug!(key = %object.key, entries = entries.len(), failed, "processed log object");

            if failed {
                summary.failed.push(object.key.clone());
            }
            summary.total_entries += entries.len();
            summary.processed += 1;
            batch.insert(object.key.clone(), entries);

            if let Some(tx) = progress {
                let _ = tx.send(LoadProgress {
                    processed: summary.processed,
                    total,
                });
            }

            if cancel.is_cancelled() {
                break;
            }
        }

        summary.cancelled = summary.processed < total;
        tracing::info!(
            processed = summary.processed,
            requested = total,
            entries = summary.total_entries,
            failed = summary.failed.len(),
            cancelled = summary.cancelled,
            "load finished"
        );

        self.store.replace(batch);
        summary
    }
}
