use serde::Serialize;

use crate::color::{BLACK, CORNFLOWER, CRIMSON, LIGHT_GREEN, ORANGE, Rgb};
use crate::data::ExpressionDirection;

use super::graph::{CorrelationGraph, GraphNode, NodeKind};
use super::layout::{Point, PositionMap};

pub const POSITIVE_EDGE_COLOR: Rgb = CRIMSON;
pub const NEGATIVE_EDGE_COLOR: Rgb = CORNFLOWER;
pub const GENE_FILL: Rgb = ORANGE;
pub const TE_FILL: Rgb = LIGHT_GREEN;
pub const GENE_BORDER: Rgb = BLACK;
pub const UP_REGULATED_BORDER: Rgb = CRIMSON;
pub const DOWN_REGULATED_BORDER: Rgb = CORNFLOWER;
pub const LABEL_COLOR: Rgb = BLACK;

const EDGE_WIDTH: f32 = 2.0;
const MARKER_SIZE: f32 = 15.0;
const MARKER_BORDER_WIDTH: f32 = 3.0;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Canvas {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub margin: u32,
    pub transparent_background: bool,
    pub show_axes: bool,
    pub equal_aspect: bool,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            title: "Correlation Network".to_owned(),
            width: 700,
            height: 700,
            margin: 40,
            transparent_background: true,
            show_axes: false,
            equal_aspect: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EdgeSegment {
    pub gene: String,
    pub te: String,
    pub coef: f64,
    pub from: Point,
    pub to: Point,
    pub color: Rgb,
    pub width: f32,
    pub hover: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeMarker {
    pub id: String,
    pub kind: NodeKind,
    pub position: Point,
    pub label: String,
    pub fill: Rgb,
    pub border: Rgb,
    pub border_width: f32,
    pub size: f32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct NetworkChart {
    pub canvas: Canvas,
    pub edges: Vec<EdgeSegment>,
    pub markers: Vec<NodeMarker>,
}

impl NetworkChart {
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty() && self.markers.is_empty()
    }
}

pub fn edge_color(weight: f64) -> Rgb {
    if weight > 0.0 {
        POSITIVE_EDGE_COLOR
    } else {
        NEGATIVE_EDGE_COLOR
    }
}

pub fn fill_color(kind: NodeKind) -> Rgb {
    match kind {
        NodeKind::Gene => GENE_FILL,
        NodeKind::Te => TE_FILL,
    }
}

pub fn border_color(node: &GraphNode) -> Rgb {
    match (node.key.kind, &node.direction) {
        (NodeKind::Gene, _) => GENE_BORDER,
        (NodeKind::Te, Some(ExpressionDirection::DownRegulated)) => DOWN_REGULATED_BORDER,
        (NodeKind::Te, _) => UP_REGULATED_BORDER,
    }
}

pub fn edge_hover(gene: &str, te: &str, coef: f64) -> String {
    format!("{gene} ↔ {te}\ncoef={coef:.2}")
}

pub fn build_chart(graph: &CorrelationGraph, positions: &PositionMap) -> NetworkChart {
    let position = |node: &GraphNode| positions.get(&node.key).copied().unwrap_or_default();

    let edges = graph
        .edges()
        .map(|edge| EdgeSegment {
            gene: edge.gene.key.id.clone(),
            te: edge.te.key.id.clone(),
            coef: edge.weight,
            from: position(edge.gene),
            to: position(edge.te),
            color: edge_color(edge.weight),
            width: EDGE_WIDTH,
            hover: edge_hover(&edge.gene.key.id, &edge.te.key.id, edge.weight),
        })
        .collect();

    let markers = graph
        .nodes()
        .map(|node| NodeMarker {
            id: node.key.id.clone(),
            kind: node.key.kind,
            position: position(node),
            label: node.key.id.clone(),
            fill: fill_color(node.key.kind),
            border: border_color(node),
            border_width: MARKER_BORDER_WIDTH,
            size: MARKER_SIZE,
        })
        .collect();

    NetworkChart {
        canvas: Canvas::default(),
        edges,
        markers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CorrelationRecord;
    use crate::network::graph::NodeKey;

    fn example_graph() -> CorrelationGraph {
        CorrelationGraph::build(&[
            CorrelationRecord::new("TF1", "L1PA2", 0.8, "up-regulated"),
            CorrelationRecord::new("TF1", "AluSx", -0.3, "down-regulated"),
        ])
    }

    #[test]
    fn empty_graph_renders_empty_chart() {
        let chart = build_chart(&CorrelationGraph::default(), &PositionMap::new());
        assert!(chart.is_empty());
        assert!(chart.canvas.transparent_background);
        assert!(!chart.canvas.show_axes);
    }

    #[test]
    fn edges_are_coloured_by_sign_with_hover_text() {
        let graph = example_graph();
        let positions = PositionMap::from([
            (NodeKey::gene("TF1"), Point::new(0.0, 0.0)),
            (NodeKey::te("L1PA2"), Point::new(1.0, 0.0)),
            (NodeKey::te("AluSx"), Point::new(-1.0, 0.5)),
        ]);
        let chart = build_chart(&graph, &positions);

        assert_eq!(chart.edges.len(), 2);
        assert_eq!(chart.edges[0].color, POSITIVE_EDGE_COLOR);
        assert_eq!(chart.edges[0].to, Point::new(1.0, 0.0));
        assert_eq!(chart.edges[0].hover, "TF1 ↔ L1PA2\ncoef=0.80");
        assert_eq!(chart.edges[1].color, NEGATIVE_EDGE_COLOR);
        assert_eq!(chart.edges[1].hover, "TF1 ↔ AluSx\ncoef=-0.30");
    }

    #[test]
    fn markers_encode_kind_and_direction() {
        let chart = build_chart(&example_graph(), &PositionMap::new());
        let marker = |id: &str| chart.markers.iter().find(|m| m.id == id).unwrap();

        assert_eq!(chart.markers.len(), 3);
        assert_eq!(marker("TF1").fill, GENE_FILL);
        assert_eq!(marker("TF1").border, GENE_BORDER);
        assert_eq!(marker("L1PA2").fill, TE_FILL);
        assert_eq!(marker("L1PA2").border, UP_REGULATED_BORDER);
        assert_eq!(marker("AluSx").border, DOWN_REGULATED_BORDER);
        assert_eq!(marker("AluSx").label, "AluSx");
    }

    #[test]
    fn unknown_direction_defaults_to_up_colour() {
        let graph = CorrelationGraph::build(&[CorrelationRecord::new("TF1", "MER11", 0.2, "")]);
        let node = graph.node(&NodeKey::te("MER11")).unwrap();
        assert_eq!(border_color(node), UP_REGULATED_BORDER);
    }

    #[test]
    fn chart_serializes_colours_as_hex() {
        let chart = build_chart(&example_graph(), &PositionMap::new());
        let json = serde_json::to_value(&chart).unwrap();

        assert_eq!(json["edges"][0]["color"], "#C41E3A");
        assert_eq!(json["markers"][0]["kind"], "gene");
        assert_eq!(json["canvas"]["title"], "Correlation Network");
    }
}
