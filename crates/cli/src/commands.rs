//! Text rendering for the CLI subcommands

use fx_core::{AppConfig, GraphResult};
use fx_resolver::{RateGraph, RateResolver, RateTable, ResolverConfig};

const NOT_AVAILABLE: &str = "n/a";

/// Build graph and table from the configured observations.
///
/// Unlike the long-running converter, an invalid rate is returned as an error here so
/// one-shot commands fail instead of answering from an empty table.
pub fn build_rates(config: &AppConfig) -> GraphResult<(RateGraph, RateTable)> {
    let graph = RateGraph::build(&config.observations)?;
    let resolver = RateResolver::new(ResolverConfig {
        parallel: config.converter.parallel,
    });
    let table = resolver.compute_all(&graph);
    Ok((graph, table))
}

pub fn render_query(table: &RateTable, from: &str, to: &str) -> String {
    match table.query(from, to) {
        Some(rate) => format!("{from}/{to} = {rate}"),
        None => format!("{from}/{to} = {NOT_AVAILABLE}"),
    }
}

pub fn render_convert(table: &RateTable, amount: f64, from: &str, to: &str) -> String {
    match table.convert(amount, from, to) {
        Some(value) => format!("{amount} {from} = {value} {to}"),
        None => format!("{amount} {from} = {NOT_AVAILABLE} {to}"),
    }
}

/// One line per derived pair, with the path it was derived along
pub fn render_table(table: &RateTable) -> String {
    if table.is_empty() {
        return "(no rates)".to_string();
    }

    table
        .iter()
        .filter_map(|(from, to, _)| {
            let conversion = table.conversion(from, to)?;
            let path: Vec<&str> = conversion.path.iter().map(|c| c.as_str()).collect();
            Some(format!("{from} -> {to}  {}  via {}", conversion.rate, path.join(" > ")))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_table_json(table: &RateTable) -> serde_json::Result<String> {
    serde_json::to_string_pretty(table)
}

/// Currencies followed by every directed edge
pub fn render_graph(graph: &RateGraph) -> String {
    let currencies: Vec<&str> = graph.currencies().map(|c| c.as_str()).collect();
    std::iter::once(format!("currencies: {}", currencies.join(", ")))
        .chain(graph.edges().map(|(from, to, rate)| format!("{from} -> {to}  {rate}")))
        .collect::<Vec<_>>()
        .join("\n")
}
