use std::collections::HashMap;

use petgraph::graph::{NodeIndex, UnGraph};
use serde::Serialize;

use crate::data::{CorrelationRecord, ExpressionDirection};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Gene,
    Te,
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NodeKey {
    pub kind: NodeKind,
    pub id: String,
}

impl NodeKey {
    pub fn gene(id: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Gene,
            id: id.into(),
        }
    }

    pub fn te(id: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Te,
            id: id.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
    pub key: NodeKey,
    pub direction: Option<ExpressionDirection>,
}

pub type LayoutGraph = UnGraph<NodeKey, f64>;

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeView<'a> {
    pub gene: &'a GraphNode,
    pub te: &'a GraphNode,
    pub weight: f64,
}

/// Undirected gene–TE graph with signed correlation weights.
///
/// Nodes and edges are upserted: a later record for an existing node or
/// gene–TE pair overwrites its attributes instead of adding a duplicate, so
/// the graph stays simple. Iteration follows first-insertion order.
#[derive(Clone, Debug, Default)]
pub struct CorrelationGraph {
    graph: UnGraph<GraphNode, f64>,
    index_by_key: HashMap<NodeKey, NodeIndex>,
}

impl CorrelationGraph {
    pub fn build(records: &[CorrelationRecord]) -> Self {
        let mut graph = Self::default();
        for record in records {
            graph.upsert_record(record);
        }
        graph
    }

    pub fn upsert_record(&mut self, record: &CorrelationRecord) {
        let gene = self.upsert_node(NodeKey::gene(record.gene.as_str()), None);
        let te = self.upsert_node(
            NodeKey::te(record.te.as_str()),
            Some(record.direction.clone()),
        );
        self.graph.update_edge(gene, te, record.coef);
    }

    fn upsert_node(&mut self, key: NodeKey, direction: Option<ExpressionDirection>) -> NodeIndex {
        if let Some(&index) = self.index_by_key.get(&key) {
            if direction.is_some() {
                self.graph[index].direction = direction;
            }
            return index;
        }

        let index = self.graph.add_node(GraphNode {
            key: key.clone(),
            direction,
        });
        self.index_by_key.insert(key, index);
        index
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn node(&self, key: &NodeKey) -> Option<&GraphNode> {
        self.index_by_key.get(key).map(|index| &self.graph[*index])
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> + '_ {
        self.graph.node_indices().map(|index| &self.graph[index])
    }

    pub fn edges(&self) -> impl Iterator<Item = EdgeView<'_>> + '_ {
        self.graph.edge_indices().filter_map(|edge| {
            let (source, target) = self.graph.edge_endpoints(edge)?;
            let (source, target) = (&self.graph[source], &self.graph[target]);
            let (gene, te) = if source.key.kind == NodeKind::Gene {
                (source, target)
            } else {
                (target, source)
            };
            Some(EdgeView {
                gene,
                te,
                weight: self.graph[edge],
            })
        })
    }

    #[cfg(test)]
    pub fn edge_weight(&self, gene: &str, te: &str) -> Option<f64> {
        let gene = self.index_by_key.get(&NodeKey::gene(gene))?;
        let te = self.index_by_key.get(&NodeKey::te(te))?;
        let edge = self.graph.find_edge(*gene, *te)?;
        self.graph.edge_weight(edge).copied()
    }

    pub fn absolute(&self) -> LayoutGraph {
        self.graph
            .map(|_, node| node.key.clone(), |_, weight| weight.abs())
    }
}
