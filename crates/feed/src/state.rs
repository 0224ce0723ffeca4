//! Published rate state
//!
//! A snapshot is built off to the side and then swapped in behind a short write lock.
//! Readers clone the `Arc` and query it without holding any lock.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use fx_resolver::{RateGraph, RateTable};

/// Immutable graph/table pair derived from one feed fetch
#[derive(Debug, Clone, Default)]
pub struct RateSnapshot {
    pub graph: RateGraph,
    pub table: RateTable,
    pub pair_count: usize,
    pub built_at: DateTime<Utc>,
}

impl RateSnapshot {
    pub fn new(graph: RateGraph, table: RateTable, pair_count: usize) -> Self {
        Self {
            graph,
            table,
            pair_count,
            built_at: Utc::now(),
        }
    }

    pub fn empty() -> Self {
        Self::new(RateGraph::default(), RateTable::default(), 0)
    }

    pub fn query(&self, from: &str, to: &str) -> Option<f64> {
        self.table.query(from, to)
    }
}

/// Holder of the currently published snapshot
#[derive(Debug)]
pub struct RateBook {
    current: RwLock<Arc<RateSnapshot>>,

    /// Stats
    publish_count: AtomicU64,
    last_publish: RwLock<Instant>,
}

impl RateBook {
    pub fn new() -> Self {
        Self::with_snapshot(RateSnapshot::empty())
    }

    pub fn with_snapshot(snapshot: RateSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
            publish_count: AtomicU64::new(0),
            last_publish: RwLock::new(Instant::now()),
        }
    }

    /// Replace the published snapshot; returns the new one
    pub fn publish(&self, snapshot: RateSnapshot) -> Arc<RateSnapshot> {
        let snapshot = Arc::new(snapshot);
        *self.current.write() = Arc::clone(&snapshot);
        self.publish_count.fetch_add(1, Ordering::Relaxed);
        *self.last_publish.write() = Instant::now();
        snapshot
    }

    /// Currently published snapshot
    pub fn current(&self) -> Arc<RateSnapshot> {
        Arc::clone(&self.current.read())
    }

    pub fn stats(&self) -> RateBookStats {
        let current = self.current();
        RateBookStats {
            currency_count: current.graph.node_count(),
            pair_count: current.pair_count,
            derived_count: current.table.len(),
            publish_count: self.publish_count.load(Ordering::Relaxed),
            last_publish_age: self.last_publish.read().elapsed(),
        }
    }
}

impl Default for RateBook {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about the rate book
#[derive(Debug, Clone)]
pub struct RateBookStats {
    pub currency_count: usize,
    pub pair_count: usize,
    pub derived_count: usize,
    pub publish_count: u64,
    pub last_publish_age: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use fx_core::Observation;
    use fx_resolver::RateResolver;

    fn snapshot(rate: f64) -> RateSnapshot {
        let graph = RateGraph::build(&[Observation::try_new("A", "B", rate).unwrap()]).unwrap();
        let table = RateResolver::default().compute_all(&graph);
        RateSnapshot::new(graph, table, 1)
    }

    #[test]
    fn test_starts_empty() {
        let book = RateBook::new();
        assert!(book.current().table.is_empty());
        assert_eq!(book.current().query("A", "B"), None);
        assert_eq!(book.stats().publish_count, 0);
    }

    #[test]
    fn test_readers_keep_old_snapshot_after_swap() {
        let book = RateBook::new();
        book.publish(snapshot(2.0));
        let before = book.current();

        book.publish(snapshot(3.0));

        assert_eq!(before.query("A", "B"), Some(2.0));
        assert_eq!(book.current().query("A", "B"), Some(3.0));

        let stats = book.stats();
        assert_eq!(stats.publish_count, 2);
        assert_eq!(stats.currency_count, 2);
        assert_eq!(stats.derived_count, 4);
    }

    #[test]
    fn test_concurrent_reads_during_publish() {
        use std::thread;

        let book = Arc::new(RateBook::new());
        book.publish(snapshot(1.0));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let book = Arc::clone(&book);
                thread::spawn(move || {
                    for j in 0..100 {
                        if i == 0 {
                            book.publish(snapshot(1.0 + j as f64));
                        } else {
                            let rate = book.current().query("A", "B");
                            assert!(rate.is_some_and(|r| r >= 1.0));
                        }
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(book.stats().publish_count, 101);
        assert_eq!(book.current().query("A", "B"), Some(100.0));
    }
}
