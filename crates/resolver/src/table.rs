//! Derived rate table and query surface

use indexmap::{Equivalent, IndexMap};
use serde::Serialize;
use std::hash::Hash;

use fx_core::CurrencyCode;

/// A derived rate together with the path it was computed along
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conversion {
    /// Product of the edge rates along `path`
    pub rate: f64,
    /// Sum of the edge rates along `path` (what the path search minimized)
    pub weight: f64,
    /// Currencies visited, source first and target last
    pub path: Vec<CurrencyCode>,
}

impl Conversion {
    pub fn hops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Immutable `from -> {to -> conversion}` table
///
/// Holds exactly the mutually reachable ordered pairs. Unreachable or unknown pairs
/// are absent, never zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct RateTable {
    rows: IndexMap<CurrencyCode, IndexMap<CurrencyCode, Conversion>>,
}

impl RateTable {
    pub(crate) fn from_rows(rows: IndexMap<CurrencyCode, IndexMap<CurrencyCode, Conversion>>) -> Self {
        Self { rows }
    }

    /// Derived rate from `from` to `to`, or `None` if either is unknown or unreachable
    pub fn query<Q>(&self, from: &Q, to: &Q) -> Option<f64>
    where
        Q: ?Sized + Hash + Equivalent<CurrencyCode>,
    {
        self.conversion(from, to).map(|c| c.rate)
    }

    /// Full conversion record, including the chosen path
    pub fn conversion<Q>(&self, from: &Q, to: &Q) -> Option<&Conversion>
    where
        Q: ?Sized + Hash + Equivalent<CurrencyCode>,
    {
        self.rows.get(from)?.get(to)
    }

    /// Convert an amount of `from` into `to`
    pub fn convert<Q>(&self, amount: f64, from: &Q, to: &Q) -> Option<f64>
    where
        Q: ?Sized + Hash + Equivalent<CurrencyCode>,
    {
        self.query(from, to).map(|rate| amount * rate)
    }

    /// Every currency reachable from `from`, with its rate
    pub fn rates_from<Q>(&self, from: &Q) -> impl Iterator<Item = (&CurrencyCode, f64)>
    where
        Q: ?Sized + Hash + Equivalent<CurrencyCode>,
    {
        self.rows
            .get(from)
            .into_iter()
            .flat_map(|row| row.iter().map(|(to, c)| (to, c.rate)))
    }

    /// Every stored pair as `(from, to, rate)`
    pub fn iter(&self) -> impl Iterator<Item = (&CurrencyCode, &CurrencyCode, f64)> {
        self.rows
            .iter()
            .flat_map(|(from, row)| row.iter().map(move |(to, c)| (from, to, c.rate)))
    }

    pub fn currencies(&self) -> impl Iterator<Item = &CurrencyCode> {
        self.rows.keys()
    }

    pub fn contains_currency<Q>(&self, currency: &Q) -> bool
    where
        Q: ?Sized + Hash + Equivalent<CurrencyCode>,
    {
        self.rows.contains_key(currency)
    }

    /// Number of stored ordered pairs, identities included
    pub fn len(&self) -> usize {
        self.rows.values().map(IndexMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
