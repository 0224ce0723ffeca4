//! All-sources path search over the rate graph
//!
//! Edge weight is the raw rate value and "shortest" means the smallest sum of rates.
//! This does not pick the best exchange rate or the fewest hops; the derived rate is
//! simply the product of the rates along whichever path has the smallest sum.
//!
//! Every edge is finite and positive, but a product of several edges may still
//! overflow to `inf` or underflow to `0.0`. Such results are stored as computed.
//!
//! Tie-break: the frontier is a min-heap on `(distance, push sequence)`, a tentative
//! distance is only replaced by a strictly smaller one, and neighbours are relaxed in
//! edge-insertion order. Among equal-sum paths the first one discovered is kept.

use indexmap::IndexMap;
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Instant;
use tracing::debug;

use fx_core::CurrencyCode;

use crate::graph::RateGraph;
use crate::table::{Conversion, RateTable};

/// Resolver configuration
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Spread the per-source runs across the rayon pool
    pub parallel: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { parallel: true }
    }
}

/// Heap entry, ordered so that `BinaryHeap` pops the smallest distance first
/// and, among equal distances, the earliest push.
#[derive(Debug, Clone, Copy)]
struct Frontier {
    distance: f64,
    seq: u64,
    node: usize,
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

/// Settled node with the path that reached it
#[derive(Debug, Clone)]
struct Reached {
    node: usize,
    distance: f64,
    rate: f64,
    parent: Option<usize>,
}

/// Single-source search; returns nodes in the order they were settled
fn shortest_paths(adjacency: &[Vec<(usize, f64)>], source: usize) -> Vec<Reached> {
    let n = adjacency.len();
    let mut settled = vec![false; n];
    let mut tentative: Vec<Option<f64>> = vec![None; n];
    let mut parent: Vec<Option<usize>> = vec![None; n];
    let mut rate = vec![1.0_f64; n];
    let mut order = Vec::with_capacity(n);

    let mut heap = BinaryHeap::new();
    let mut seq: u64 = 0;
    tentative[source] = Some(0.0);
    heap.push(Frontier { distance: 0.0, seq, node: source });

    while let Some(Frontier { distance, node, .. }) = heap.pop() {
        if settled[node] {
            continue;
        }
        settled[node] = true;
        order.push(Reached {
            node,
            distance,
            rate: rate[node],
            parent: parent[node],
        });

        for &(next, weight) in &adjacency[node] {
            if settled[next] {
                continue;
            }
            let candidate = distance + weight;
            if matches!(tentative[next], Some(best) if candidate >= best) {
                continue;
            }
            tentative[next] = Some(candidate);
            parent[next] = Some(node);
            // `node` is settled, so its rate is final: product taken left to right
            rate[next] = rate[node] * weight;
            seq += 1;
            heap.push(Frontier { distance: candidate, seq, node: next });
        }
    }

    order
}

/// Derives the full rate table from a graph snapshot
#[derive(Debug, Clone, Default)]
pub struct RateResolver {
    config: ResolverConfig,
}

impl RateResolver {
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// Run one single-source search per currency and materialize every reachable pair.
    ///
    /// Pure function of the graph: the same snapshot always yields the same table.
    pub fn compute_all(&self, graph: &RateGraph) -> RateTable {
        let start = Instant::now();
        let adjacency = graph.indexed();
        let n = adjacency.len();

        let rows: Vec<IndexMap<CurrencyCode, Conversion>> = if self.config.parallel {
            (0..n)
                .into_par_iter()
                .map(|source| self.resolve_from(graph, &adjacency, source))
                .collect()
        } else {
            (0..n)
                .map(|source| self.resolve_from(graph, &adjacency, source))
                .collect()
        };

        let table = RateTable::from_rows(graph.currencies().cloned().zip(rows).collect());

        debug!(
            "Resolved {} pairs over {} currencies / {} edges in {:?}",
            table.len(),
            n,
            graph.edge_count(),
            start.elapsed()
        );

        table
    }

    fn resolve_from(
        &self,
        graph: &RateGraph,
        adjacency: &[Vec<(usize, f64)>],
        source: usize,
    ) -> IndexMap<CurrencyCode, Conversion> {
        let reached = shortest_paths(adjacency, source);

        // Parents settle before children, so each path extends an already built one.
        let mut paths: Vec<Option<Vec<CurrencyCode>>> = vec![None; adjacency.len()];
        let mut row = IndexMap::with_capacity(reached.len());

        for hop in reached {
            let Some(code) = graph.currency_at(hop.node) else {
                continue;
            };
            let mut path = hop
                .parent
                .and_then(|p| paths[p].clone())
                .unwrap_or_default();
            path.push(code.clone());

            row.insert(
                code.clone(),
                Conversion {
                    rate: hop.rate,
                    weight: hop.distance,
                    path: path.clone(),
                },
            );
            paths[hop.node] = Some(path);
        }

        row
    }
}
