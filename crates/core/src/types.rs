//! Core type definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

use crate::{GraphError, GraphResult};

/// Currency identifier
///
/// Opaque and case-sensitive: `"usd"` and `"USD"` are different currencies.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn try_new(code: &str) -> GraphResult<Self> {
        if code.is_empty() {
            return Err(GraphError::EmptyCurrencyCode);
        }
        Ok(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = GraphError;

    fn try_from(code: String) -> Result<Self, Self::Error> {
        if code.is_empty() {
            return Err(GraphError::EmptyCurrencyCode);
        }
        Ok(Self(code))
    }
}

impl TryFrom<&str> for CurrencyCode {
    type Error = GraphError;

    fn try_from(code: &str) -> Result<Self, Self::Error> {
        Self::try_new(code)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

// Lets maps keyed by `CurrencyCode` be queried with a plain `&str`.
impl Borrow<str> for CurrencyCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for CurrencyCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Returns true if `rate` can be stored as an edge weight together with its reciprocal.
pub fn is_valid_rate(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0 && rate.recip().is_finite()
}

/// A directly observed rate: 1 unit of `from` buys `rate` units of `to`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub rate: f64,
}

impl Observation {
    pub fn new(from: CurrencyCode, to: CurrencyCode, rate: f64) -> Self {
        Self { from, to, rate }
    }

    /// Convenience constructor from string codes
    pub fn try_new(from: &str, to: &str, rate: f64) -> GraphResult<Self> {
        Ok(Self {
            from: CurrencyCode::try_new(from)?,
            to: CurrencyCode::try_new(to)?,
            rate,
        })
    }

    pub fn is_self_pair(&self) -> bool {
        self.from == self.to
    }

    /// Reject rates that are not finite and strictly positive.
    ///
    /// `index` is the observation's position in its feed, reported in the error.
    pub fn validate(&self, index: usize) -> GraphResult<()> {
        if is_valid_rate(self.rate) {
            return Ok(());
        }
        Err(GraphError::InvalidRate {
            index,
            from: self.from.clone(),
            to: self.to.clone(),
            rate: self.rate,
        })
    }
}

impl fmt::Display for Observation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{} @ {}", self.from, self.to, self.rate)
    }
}

/// A quoted pair as produced by a rate feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pair {
    pub currency_from: CurrencyCode,
    pub currency_to: CurrencyCode,
    pub rate: f64,
    pub last_update: DateTime<Utc>,
}

impl Pair {
    pub fn new(
        currency_from: CurrencyCode,
        currency_to: CurrencyCode,
        rate: f64,
        last_update: DateTime<Utc>,
    ) -> Self {
        Self {
            currency_from,
            currency_to,
            rate,
            last_update,
        }
    }

    /// Project to the triple the graph consumes; the timestamp is dropped.
    pub fn observation(&self) -> Observation {
        Observation::new(
            self.currency_from.clone(),
            self.currency_to.clone(),
            self.rate,
        )
    }

    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.last_update
    }
}

impl From<&Pair> for Observation {
    fn from(pair: &Pair) -> Self {
        pair.observation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_currency_code_is_case_sensitive() {
        let upper = CurrencyCode::try_new("USD").unwrap();
        let lower = CurrencyCode::try_new("usd").unwrap();
        assert_ne!(upper, lower);
        assert_eq!(upper.as_str(), "USD");
        assert_eq!(upper.to_string(), "USD");
    }

    #[test]
    fn test_empty_currency_code_rejected() {
        assert_eq!(CurrencyCode::try_new(""), Err(GraphError::EmptyCurrencyCode));
        assert!(CurrencyCode::try_from(String::new()).is_err());
    }

    #[test]
    fn test_currency_code_serde_is_a_plain_string() {
        let code = CurrencyCode::try_new("EUR").unwrap();
        let json = serde_json::to_string(&code).unwrap();
        assert_eq!(json, "\"EUR\"");

        let back: CurrencyCode = serde_json::from_str(&json).unwrap();
        assert_eq!(back, code);
        assert!(serde_json::from_str::<CurrencyCode>("\"\"").is_err());
    }

    #[test]
    fn test_rate_validity() {
        assert!(is_valid_rate(2.0));
        assert!(is_valid_rate(1e-9));
        assert!(!is_valid_rate(0.0));
        assert!(!is_valid_rate(-1.0));
        assert!(!is_valid_rate(f64::NAN));
        assert!(!is_valid_rate(f64::INFINITY));
        // Reciprocal overflows to infinity
        assert!(!is_valid_rate(f64::MIN_POSITIVE / 4.0));
    }

    #[test]
    fn test_observation_validate() {
        assert!(Observation::try_new("A", "B", 2.0).unwrap().validate(0).is_ok());

        let bad = Observation::try_new("A", "B", -1.0).unwrap();
        assert_eq!(
            bad.validate(3),
            Err(GraphError::InvalidRate {
                index: 3,
                from: CurrencyCode::try_new("A").unwrap(),
                to: CurrencyCode::try_new("B").unwrap(),
                rate: -1.0,
            })
        );
        assert!(Observation::try_new("A", "B", 0.0).unwrap().validate(0).is_err());
        assert!(Observation::try_new("A", "A", f64::NAN).unwrap().validate(0).is_err());
    }

    #[test]
    fn test_pair_projects_to_observation() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let pair = Pair::new(
            CurrencyCode::try_new("EUR").unwrap(),
            CurrencyCode::try_new("USD").unwrap(),
            1.08,
            ts,
        );

        let obs = pair.observation();
        assert_eq!(obs, Observation::try_new("EUR", "USD", 1.08).unwrap());
        assert!(!obs.is_self_pair());
        assert_eq!(pair.age(ts + chrono::Duration::seconds(30)).num_seconds(), 30);
    }
}
