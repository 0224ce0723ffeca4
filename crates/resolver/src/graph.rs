//! Directed rate graph built from observed pairs

use indexmap::{Equivalent, IndexMap};
use std::hash::Hash;
use tracing::debug;

use fx_core::{CurrencyCode, GraphResult, Observation, Pair};

/// Weighted directed graph over currencies
///
/// Every stored edge `a -> b` with weight `r` has a partner `b -> a` with weight `1/r`.
/// Nodes keep first-seen order and each node's edges keep first-insertion order;
/// the resolver's tie-break depends on both.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateGraph {
    adjacency: IndexMap<CurrencyCode, IndexMap<CurrencyCode, f64>>,
}

impl RateGraph {
    /// Build from a snapshot of observations
    ///
    /// Later observations of the same directed edge overwrite earlier ones. Self pairs
    /// register the currency but add no edge. The first invalid rate aborts the build.
    pub fn build(observations: &[Observation]) -> GraphResult<Self> {
        let mut adjacency: IndexMap<CurrencyCode, IndexMap<CurrencyCode, f64>> =
            IndexMap::with_capacity(observations.len() + 1);

        for (index, obs) in observations.iter().enumerate() {
            obs.validate(index)?;

            adjacency.entry(obs.from.clone()).or_default();
            adjacency.entry(obs.to.clone()).or_default();

            if obs.is_self_pair() {
                continue;
            }

            adjacency
                .entry(obs.from.clone())
                .or_default()
                .insert(obs.to.clone(), obs.rate);
            adjacency
                .entry(obs.to.clone())
                .or_default()
                .insert(obs.from.clone(), obs.rate.recip());
        }

        let graph = Self { adjacency };
        debug!(
            "Built rate graph: {} currencies, {} edges from {} observations",
            graph.node_count(),
            graph.edge_count(),
            observations.len()
        );
        Ok(graph)
    }

    /// Build from feed records, ignoring their timestamps
    pub fn from_pairs(pairs: &[Pair]) -> GraphResult<Self> {
        let observations: Vec<Observation> = pairs.iter().map(Pair::observation).collect();
        Self::build(&observations)
    }

    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of directed edges (twice the number of distinct unordered pairs)
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn contains<Q>(&self, currency: &Q) -> bool
    where
        Q: ?Sized + Hash + Equivalent<CurrencyCode>,
    {
        self.adjacency.contains_key(currency)
    }

    /// Currencies in first-seen order
    pub fn currencies(&self) -> impl Iterator<Item = &CurrencyCode> {
        self.adjacency.keys()
    }

    /// Direct edge weight, if the pair was observed (in either direction)
    pub fn rate<Q>(&self, from: &Q, to: &Q) -> Option<f64>
    where
        Q: ?Sized + Hash + Equivalent<CurrencyCode>,
    {
        self.adjacency.get(from)?.get(to).copied()
    }

    /// Outgoing edges of `currency` in insertion order
    pub fn neighbors<Q>(&self, currency: &Q) -> impl Iterator<Item = (&CurrencyCode, f64)>
    where
        Q: ?Sized + Hash + Equivalent<CurrencyCode>,
    {
        self.adjacency
            .get(currency)
            .into_iter()
            .flat_map(|edges| edges.iter().map(|(to, rate)| (to, *rate)))
    }

    /// All directed edges as `(from, to, rate)`
    pub fn edges(&self) -> impl Iterator<Item = (&CurrencyCode, &CurrencyCode, f64)> {
        self.adjacency
            .iter()
            .flat_map(|(from, edges)| edges.iter().map(move |(to, rate)| (from, to, *rate)))
    }

    /// Index-based adjacency list for the path search
    pub(crate) fn indexed(&self) -> Vec<Vec<(usize, f64)>> {
        self.adjacency
            .values()
            .map(|edges| {
                edges
                    .iter()
                    .filter_map(|(to, rate)| {
                        self.adjacency.get_index_of(to).map(|idx| (idx, *rate))
                    })
                    .collect()
            })
            .collect()
    }

    pub(crate) fn currency_at(&self, index: usize) -> Option<&CurrencyCode> {
        self.adjacency.get_index(index).map(|(code, _)| code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fx_core::GraphError;

    fn obs(from: &str, to: &str, rate: f64) -> Observation {
        Observation::try_new(from, to, rate).unwrap()
    }

    #[test]
    fn test_build_inserts_reciprocals() {
        let graph = RateGraph::build(&[obs("A", "B", 2.0), obs("B", "C", 4.0)]).unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(graph.rate("A", "B"), Some(2.0));
        assert_eq!(graph.rate("B", "A"), Some(0.5));
        assert_eq!(graph.rate("C", "B"), Some(0.25));
        assert_eq!(graph.rate("A", "C"), None);
    }

    #[test]
    fn test_every_edge_has_a_reciprocal() {
        let graph = RateGraph::build(&[
            obs("EUR", "USD", 1.08),
            obs("USD", "JPY", 110.0),
            obs("GBP", "EUR", 1.17),
        ])
        .unwrap();

        for (from, to, rate) in graph.edges() {
            let back = graph.rate(to, from).unwrap();
            assert!((rate * back - 1.0).abs() < 1e-12, "{from}->{to}");
        }
    }

    #[test]
    fn test_last_write_wins() {
        let graph = RateGraph::build(&[obs("A", "B", 2.0), obs("A", "B", 3.0)]).unwrap();
        assert_eq!(graph.rate("A", "B"), Some(3.0));
        assert_eq!(graph.rate("B", "A"), Some(1.0 / 3.0));
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_reverse_observation_overwrites_reciprocal() {
        let graph = RateGraph::build(&[obs("A", "B", 2.0), obs("B", "A", 0.25)]).unwrap();
        assert_eq!(graph.rate("B", "A"), Some(0.25));
        assert_eq!(graph.rate("A", "B"), Some(4.0));
    }

    #[test]
    fn test_overwrite_keeps_edge_position() {
        let graph = RateGraph::build(&[
            obs("A", "B", 2.0),
            obs("A", "C", 5.0),
            obs("A", "B", 3.0),
        ])
        .unwrap();

        let order: Vec<&str> = graph.neighbors("A").map(|(to, _)| to.as_str()).collect();
        assert_eq!(order, vec!["B", "C"]);
    }

    #[test]
    fn test_self_pair_registers_node_without_edge() {
        let graph = RateGraph::build(&[obs("X", "X", 7.0)]).unwrap();
        assert!(graph.contains("X"));
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.rate("X", "X"), None);
    }

    #[test]
    fn test_invalid_rate_aborts_build() {
        let result = RateGraph::build(&[obs("A", "B", 2.0), obs("B", "C", -1.0)]);
        match result {
            Err(GraphError::InvalidRate { index, rate, .. }) => {
                assert_eq!(index, 1);
                assert_eq!(rate, -1.0);
            }
            other => panic!("expected InvalidRate, got {:?}", other),
        }

        assert!(RateGraph::build(&[obs("A", "B", 0.0)]).is_err());
        assert!(RateGraph::build(&[obs("A", "B", f64::NAN)]).is_err());
        assert!(RateGraph::build(&[obs("A", "B", f64::INFINITY)]).is_err());
        // Self pairs are validated too
        assert!(RateGraph::build(&[obs("A", "A", -3.0)]).is_err());
    }

    #[test]
    fn test_from_pairs_matches_observations() {
        let pair = |from: &str, to: &str, rate: f64| {
            let o = obs(from, to, rate);
            Pair::new(o.from, o.to, o.rate, Default::default())
        };

        let from_pairs = RateGraph::from_pairs(&[pair("A", "B", 2.0), pair("B", "C", 4.0)]).unwrap();
        let built = RateGraph::build(&[obs("A", "B", 2.0), obs("B", "C", 4.0)]).unwrap();
        assert_eq!(from_pairs, built);

        assert!(matches!(
            RateGraph::from_pairs(&[pair("A", "B", -2.0)]),
            Err(GraphError::InvalidRate { index: 0, .. })
        ));
    }

    #[test]
    fn test_empty_build() {
        let graph = RateGraph::build(&[]).unwrap();
        assert!(graph.is_empty());
        assert_eq!(graph.edges().count(), 0);
    }

    #[test]
    fn test_first_seen_node_order() {
        let graph = RateGraph::build(&[obs("B", "C", 1.0), obs("A", "B", 1.0)]).unwrap();
        let order: Vec<&str> = graph.currencies().map(CurrencyCode::as_str).collect();
        assert_eq!(order, vec!["B", "C", "A"]);
        assert_eq!(graph.currency_at(2).map(CurrencyCode::as_str), Some("A"));
    }
}
