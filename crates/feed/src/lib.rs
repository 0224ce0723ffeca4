//! Rate feed plumbing and the published rate book
//!
//! Features:
//! - `RateFeed` seam for whatever source supplies observed pairs
//! - Immutable snapshots swapped in atomically, so readers never block on a rebuild
//! - Periodic refresh on a tokio timer

pub mod converter;
pub mod feeds;
pub mod state;

pub use converter::{FxConverter, RefreshHandle};
pub use feeds::{FnFeed, RateFeed, StaticFeed};
pub use state::{RateBook, RateBookStats, RateSnapshot};
