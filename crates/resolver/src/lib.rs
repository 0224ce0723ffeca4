//! Cross-rate derivation engine
//!
//! Turns a sparse set of observed currency pairs into a complete conversion table:
//! - `RateGraph`: bidirectional weighted graph (each rate plus its reciprocal)
//! - `RateResolver`: one shortest-path run per source currency
//! - `RateTable`: immutable query surface over the derived rates

pub mod graph;
pub mod resolver;
pub mod table;

pub use graph::RateGraph;
pub use resolver::{RateResolver, ResolverConfig};
pub use table::{Conversion, RateTable};
