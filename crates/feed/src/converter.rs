//! FX converter - fetches from a feed, derives the rate table, publishes snapshots

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use fx_core::{ConverterConfig, ConverterError, ConverterResult, Pair};
use fx_resolver::{RateGraph, RateResolver, ResolverConfig};

use crate::feeds::RateFeed;
use crate::state::{RateBook, RateSnapshot};

/// Queryable converter over the latest published snapshot
#[derive(Clone)]
pub struct FxConverter {
    feed: Arc<dyn RateFeed>,
    resolver: RateResolver,
    book: Arc<RateBook>,
}

impl FxConverter {
    /// Create and load the first snapshot.
    ///
    /// A failed first load is logged and leaves an empty table in place.
    pub fn new(feed: Arc<dyn RateFeed>, config: &ConverterConfig) -> Self {
        let converter = Self {
            feed,
            resolver: RateResolver::new(ResolverConfig {
                parallel: config.parallel,
            }),
            book: Arc::new(RateBook::new()),
        };

        if let Err(e) = converter.refresh() {
            error!(
                "Initial load from feed {} failed, starting with an empty table: {}",
                converter.feed.name(),
                e
            );
        }

        converter
    }

    /// Derive a snapshot from `pairs` without publishing it
    pub fn build(&self, pairs: &[Pair]) -> ConverterResult<RateSnapshot> {
        let graph = RateGraph::from_pairs(pairs)?;
        let table = self.resolver.compute_all(&graph);
        Ok(RateSnapshot::new(graph, table, pairs.len()))
    }

    /// Fetch, rebuild and publish.
    ///
    /// On any error the previously published snapshot stays in place.
    pub fn refresh(&self) -> ConverterResult<Arc<RateSnapshot>> {
        let start = Instant::now();
        let pairs = self.feed.fetch()?;
        debug!("Feed {} returned {} pairs", self.feed.name(), pairs.len());

        let snapshot = self.build(&pairs)?;
        let snapshot = self.book.publish(snapshot);

        info!(
            "Published rates from {}: {} currencies, {} derived pairs in {:?}",
            self.feed.name(),
            snapshot.graph.node_count(),
            snapshot.table.len(),
            start.elapsed()
        );

        Ok(snapshot)
    }

    /// Derived rate, or `None` if either currency is unknown or unreachable
    pub fn query(&self, from: &str, to: &str) -> Option<f64> {
        self.book.current().table.query(from, to)
    }

    pub fn convert(&self, amount: f64, from: &str, to: &str) -> Option<f64> {
        self.book.current().table.convert(amount, from, to)
    }

    pub fn snapshot(&self) -> Arc<RateSnapshot> {
        self.book.current()
    }

    /// Shared rate book reference
    pub fn book(&self) -> Arc<RateBook> {
        Arc::clone(&self.book)
    }

    pub fn feed_name(&self) -> &str {
        self.feed.name()
    }

    /// Refresh every `interval` until the returned handle is stopped.
    ///
    /// Must be called from within a tokio runtime. Fetch and rebuild run on the
    /// blocking pool; failures are logged and the loop carries on.
    pub fn spawn_refresh(&self, interval: Duration) -> RefreshHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let converter = self.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick fires immediately; the constructor already loaded.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let worker = converter.clone();
                        match tokio::task::spawn_blocking(move || worker.refresh()).await {
                            Ok(Ok(_)) => {}
                            Ok(Err(e)) => {
                                warn!("Refresh from {} failed, keeping previous rates: {}", converter.feed_name(), e);
                            }
                            Err(e) => {
                                error!("Refresh task for {} panicked: {}", converter.feed_name(), e);
                            }
                        }
                    }
                    _ = &mut shutdown_rx => {
                        info!("Refresh loop for {} stopped", converter.feed_name());
                        break;
                    }
                }
            }
        });

        info!("Started refresh loop every {:?}", interval);
        RefreshHandle {
            shutdown: Some(shutdown_tx),
            handle,
        }
    }
}

impl std::fmt::Debug for FxConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FxConverter")
            .field("feed", &self.feed.name())
            .field("resolver", &self.resolver)
            .field("book", &self.book.stats())
            .finish()
    }
}

/// Handle to a running refresh loop
pub struct RefreshHandle {
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl RefreshHandle {
    /// Signal the loop to stop and wait for it to finish
    pub async fn stop(mut self) -> ConverterResult<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle
            .await
            .map_err(|e| ConverterError::RefreshFailed(e.to_string()))
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
