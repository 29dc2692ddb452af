mod graph;
mod layout;
mod render;

use log::debug;

use crate::data::CorrelationRecord;
use crate::filter::{NetworkFilter, filter_correlations};

pub use graph::{CorrelationGraph, NodeKey, NodeKind};
pub use layout::{Layout, Point, layout_with_fallback};
pub use render::{
    DOWN_REGULATED_BORDER, GENE_BORDER, GENE_FILL, LABEL_COLOR, NEGATIVE_EDGE_COLOR, NetworkChart,
    POSITIVE_EDGE_COLOR, TE_FILL, UP_REGULATED_BORDER, build_chart,
};

#[derive(Clone, Debug)]
pub struct NetworkView {
    pub filter: NetworkFilter,
    pub records: Vec<CorrelationRecord>,
    pub graph: CorrelationGraph,
    pub layout: Layout,
    pub chart: NetworkChart,
}

pub fn run_pipeline(records: &[CorrelationRecord], filter: NetworkFilter) -> NetworkView {
    let selected = filter_correlations(records, filter);
    let graph = CorrelationGraph::build(&selected);
    let layout = layout_with_fallback(&graph.absolute());
    let chart = build_chart(&graph, &layout.positions);

    debug!(
        "network: {} of {} rows, {} nodes, {} edges, {} layout",
        selected.len(),
        records.len(),
        graph.node_count(),
        graph.edge_count(),
        layout.strategy.label()
    );

    NetworkView {
        filter,
        records: selected,
        graph,
        layout,
        chart,
    }
}
