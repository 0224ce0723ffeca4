//! Error types

use thiserror::Error;

use crate::CurrencyCode;

/// Graph construction errors
///
/// Any of these aborts the build: no graph, and therefore no table, is produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("Invalid rate {rate} for {from}->{to} (observation #{index}): must be finite and > 0")]
    InvalidRate {
        index: usize,
        from: CurrencyCode,
        to: CurrencyCode,
        rate: f64,
    },

    #[error("Currency code must not be empty")]
    EmptyCurrencyCode,
}

/// Rate feed errors
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Feed {name} unavailable: {reason}")]
    Unavailable { name: String, reason: String },

    #[error("Invalid feed record: {0}")]
    InvalidRecord(String),
}

/// Converter errors (fetch, build, configuration)
#[derive(Debug, Error)]
pub enum ConverterError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Refresh loop failed: {0}")]
    RefreshFailed(String),
}

/// Result type alias
pub type GraphResult<T> = Result<T, GraphError>;
pub type FeedResult<T> = Result<T, FeedError>;
pub type ConverterResult<T> = Result<T, ConverterError>;
