//! Rate feed implementations
//!
//! A feed only hands over already parsed pairs; transport and parsing live elsewhere.

use chrono::Utc;

use fx_core::{FeedResult, Observation, Pair};

/// Source of observed pairs
pub trait RateFeed: Send + Sync {
    fn name(&self) -> &str;
    fn fetch(&self) -> FeedResult<Vec<Pair>>;
}

/// Fixed set of pairs, e.g. from configuration
#[derive(Debug, Clone)]
pub struct StaticFeed {
    name: String,
    pairs: Vec<Pair>,
}

impl StaticFeed {
    pub fn new(name: &str, pairs: Vec<Pair>) -> Self {
        Self {
            name: name.to_string(),
            pairs,
        }
    }

    /// Wrap bare observations, stamping them with the current time
    pub fn from_observations(name: &str, observations: &[Observation]) -> Self {
        let now = Utc::now();
        let pairs = observations
            .iter()
            .map(|o| Pair::new(o.from.clone(), o.to.clone(), o.rate, now))
            .collect();
        Self::new(name, pairs)
    }
}

impl RateFeed for StaticFeed {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> FeedResult<Vec<Pair>> {
        Ok(self.pairs.clone())
    }
}

/// Feed backed by a closure
pub struct FnFeed<F> {
    name: String,
    fetch: F,
}

impl<F> FnFeed<F>
where
    F: Fn() -> FeedResult<Vec<Pair>> + Send + Sync,
{
    pub fn new(name: &str, fetch: F) -> Self {
        Self {
            name: name.to_string(),
            fetch,
        }
    }
}

impl<F> RateFeed for FnFeed<F>
where
    F: Fn() -> FeedResult<Vec<Pair>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self) -> FeedResult<Vec<Pair>> {
        (self.fetch)()
    }
}
