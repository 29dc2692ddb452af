use std::collections::HashMap;
use std::f64::consts::TAU;

use log::{debug, warn};
use petgraph::algo::{connected_components, dijkstra};
use petgraph::graph::NodeIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use super::graph::{LayoutGraph, NodeKey};

pub const SPRING_SEED: u64 = 42;
const SPRING_ITERATIONS: usize = 50;
const SPRING_THRESHOLD: f64 = 1e-4;

const KK_TOLERANCE: f64 = 1e-4;
const KK_MAX_NEWTON_STEPS: usize = 64;
const KK_ITERATIONS_PER_NODE: usize = 200;
const KK_ITERATION_CAP: usize = 50_000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

pub type PositionMap = HashMap<NodeKey, Point>;

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum LayoutFailure {
    #[error("graph has no nodes")]
    Empty,
    #[error("graph is split into {components} disconnected components")]
    Disconnected { components: usize },
    #[error("`{a}` and `{b}` are joined by a zero-length path")]
    ZeroDistance { a: String, b: String },
    #[error("energy did not settle within {iterations} iterations")]
    NotConverged { iterations: usize },
    #[error("layout produced non-finite coordinates")]
    NonFinite,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LayoutOutcome {
    Positioned(PositionMap),
    Failed(LayoutFailure),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutStrategy {
    KamadaKawai,
    Spring,
}

impl LayoutStrategy {
    pub fn label(self) -> &'static str {
        match self {
            Self::KamadaKawai => "Kamada-Kawai",
            Self::Spring => "spring (seeded)",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    pub positions: PositionMap,
    pub strategy: LayoutStrategy,
    pub fallback_reason: Option<LayoutFailure>,
}

/// Runs Kamada–Kawai and falls back to the seeded spring layout when it fails.
/// Always yields a position for every node.
pub fn layout_with_fallback(graph: &LayoutGraph) -> Layout {
    match kamada_kawai(graph) {
        LayoutOutcome::Positioned(positions) => Layout {
            positions,
            strategy: LayoutStrategy::KamadaKawai,
            fallback_reason: None,
        },
        LayoutOutcome::Failed(reason) => {
            if reason != LayoutFailure::Empty {
                warn!("Kamada-Kawai layout failed ({reason}); using seeded spring layout");
            }
            Layout {
                positions: spring(graph, SPRING_SEED),
                strategy: LayoutStrategy::Spring,
                fallback_reason: Some(reason),
            }
        }
    }
}

pub fn kamada_kawai(graph: &LayoutGraph) -> LayoutOutcome {
    let n = graph.node_count();
    match n {
        0 => return LayoutOutcome::Failed(LayoutFailure::Empty),
        1 => {
            return LayoutOutcome::Positioned(collect_positions(graph, &[Point::ORIGIN]));
        }
        _ => {}
    }

    let components = connected_components(graph);
    if components > 1 {
        return LayoutOutcome::Failed(LayoutFailure::Disconnected { components });
    }

    let distances = match shortest_paths(graph) {
        Ok(distances) => distances,
        Err(failure) => return LayoutOutcome::Failed(failure),
    };

    // Spring constants k_ij = 1 / d_ij^2 with ideal lengths l_ij = d_ij.
    let mut positions = (0..n)
        .map(|index| {
            let angle = TAU * index as f64 / n as f64;
            Point::new(angle.cos(), angle.sin())
        })
        .collect::<Vec<_>>();

    let mut gradients = (0..n)
        .map(|m| {
            let gradient = energy_gradient(&positions, &distances, m);
            (gradient.dx, gradient.dy)
        })
        .collect::<Vec<_>>();

    let max_iterations = (KK_ITERATIONS_PER_NODE * n).min(KK_ITERATION_CAP);
    let mut converged = false;
    for _ in 0..max_iterations {
        let Some((node, magnitude)) = gradients
            .iter()
            .map(|(dx, dy)| (dx * dx + dy * dy).sqrt())
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
        else {
            break;
        };

        if !magnitude.is_finite() {
            return LayoutOutcome::Failed(LayoutFailure::NonFinite);
        }
        if magnitude < KK_TOLERANCE {
            converged = true;
            break;
        }

        let previous = positions[node];
        for _ in 0..KK_MAX_NEWTON_STEPS {
            let local = energy_gradient(&positions, &distances, node);
            if local.norm() < KK_TOLERANCE {
                break;
            }

            let det = local.dxx * local.dyy - local.dxy * local.dxy;
            if det.abs() < f64::EPSILON || !det.is_finite() {
                return LayoutOutcome::Failed(LayoutFailure::NonFinite);
            }
            positions[node].x += (-local.dx * local.dyy + local.dy * local.dxy) / det;
            positions[node].y += (local.dx * local.dxy - local.dy * local.dxx) / det;
        }

        // Only pairs involving the moved node change.
        let moved = positions[node];
        for (other, gradient) in gradients.iter_mut().enumerate() {
            if other == node {
                continue;
            }
            let target = distances[other * n + node];
            let (old_x, old_y) = pair_gradient(positions[other], previous, target);
            let (new_x, new_y) = pair_gradient(positions[other], moved, target);
            gradient.0 += new_x - old_x;
            gradient.1 += new_y - old_y;
        }
        let refreshed = energy_gradient(&positions, &distances, node);
        gradients[node] = (refreshed.dx, refreshed.dy);
    }

    if !converged {
        return LayoutOutcome::Failed(LayoutFailure::NotConverged {
            iterations: max_iterations,
        });
    }
    let finite = |p: &Point| p.x.is_finite() && p.y.is_finite();
    if !positions.iter().all(finite) {
        return LayoutOutcome::Failed(LayoutFailure::NonFinite);
    }

    rescale(&mut positions);
    debug!("Kamada-Kawai placed {n} nodes");
    LayoutOutcome::Positioned(collect_positions(graph, &positions))
}

pub fn spring(graph: &LayoutGraph, seed: u64) -> PositionMap {
    let n = graph.node_count();
    match n {
        0 => return PositionMap::new(),
        1 => return collect_positions(graph, &[Point::ORIGIN]),
        _ => {}
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut positions = (0..n)
        .map(|_| Point::new(rng.r#gen::<f64>(), rng.r#gen::<f64>()))
        .collect::<Vec<_>>();

    let mut adjacency = vec![0.0_f64; n * n];
    for edge in graph.raw_edges() {
        let (a, b) = (edge.source().index(), edge.target().index());
        let weight = if edge.weight.is_finite() { edge.weight } else { 0.0 };
        adjacency[a * n + b] = weight;
        adjacency[b * n + a] = weight;
    }

    let k = (1.0 / n as f64).sqrt();
    let (min, max) = bounds(&positions);
    let mut temperature = ((max.x - min.x).max(max.y - min.y) * 0.1).max(0.01);
    let cooling = temperature / (SPRING_ITERATIONS as f64 + 1.0);

    for _ in 0..SPRING_ITERATIONS {
        let mut shift_total = 0.0;
        let mut displacement = vec![Point::ORIGIN; n];

        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let dx = positions[i].x - positions[j].x;
                let dy = positions[i].y - positions[j].y;
                let distance = (dx * dx + dy * dy).sqrt().max(0.01);
                let force = k * k / (distance * distance) - adjacency[i * n + j] * distance / k;
                displacement[i].x += dx * force;
                displacement[i].y += dy * force;
            }
        }

        for (position, shift) in positions.iter_mut().zip(&displacement) {
            let length = (shift.x * shift.x + shift.y * shift.y).sqrt().max(0.01);
            let step_x = shift.x * temperature / length;
            let step_y = shift.y * temperature / length;
            position.x += step_x;
            position.y += step_y;
            shift_total += (step_x * step_x + step_y * step_y).sqrt();
        }

        temperature -= cooling;
        if shift_total / (n as f64) < SPRING_THRESHOLD {
            break;
        }
    }

    rescale(&mut positions);
    collect_positions(graph, &positions)
}

#[derive(Clone, Copy, Debug, Default)]
struct Gradient {
    dx: f64,
    dy: f64,
    dxx: f64,
    dxy: f64,
    dyy: f64,
}

impl Gradient {
    fn norm(&self) -> f64 {
        (self.dx * self.dx + self.dy * self.dy).sqrt()
    }
}

fn pair_gradient(m: Point, i: Point, target: f64) -> (f64, f64) {
    let spring = 1.0 / (target * target);
    let dx = m.x - i.x;
    let dy = m.y - i.y;
    let length = (dx * dx + dy * dy).sqrt().max(1e-9);
    (
        spring * (dx - target * dx / length),
        spring * (dy - target * dy / length),
    )
}

fn energy_gradient(positions: &[Point], distances: &[f64], m: usize) -> Gradient {
    let n = positions.len();
    let mut gradient = Gradient::default();
    for i in 0..n {
        if i == m {
            continue;
        }

        let target = distances[m * n + i];
        let spring = 1.0 / (target * target);
        let dx = positions[m].x - positions[i].x;
        let dy = positions[m].y - positions[i].y;
        let length = (dx * dx + dy * dy).sqrt().max(1e-9);
        let cube = length * length * length;

        gradient.dx += spring * (dx - target * dx / length);
        gradient.dy += spring * (dy - target * dy / length);
        gradient.dxx += spring * (1.0 - target * dy * dy / cube);
        gradient.dxy += spring * (target * dx * dy / cube);
        gradient.dyy += spring * (1.0 - target * dx * dx / cube);
    }
    gradient
}

fn shortest_paths(graph: &LayoutGraph) -> Result<Vec<f64>, LayoutFailure> {
    let n = graph.node_count();
    let mut distances = vec![f64::INFINITY; n * n];

    for source in graph.node_indices() {
        let reached = dijkstra(graph, source, None, |edge| *edge.weight());
        for target in graph.node_indices() {
            if source == target {
                distances[source.index() * n + target.index()] = 0.0;
                continue;
            }

            let Some(&length) = reached.get(&target) else {
                return Err(LayoutFailure::Disconnected { components: 2 });
            };
            if length <= 0.0 || !length.is_finite() {
                return Err(LayoutFailure::ZeroDistance {
                    a: graph[source].id.clone(),
                    b: graph[target].id.clone(),
                });
            }
            distances[source.index() * n + target.index()] = length;
        }
    }

    Ok(distances)
}

fn bounds(positions: &[Point]) -> (Point, Point) {
    positions.iter().fold(
        (
            Point::new(f64::INFINITY, f64::INFINITY),
            Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        ),
        |(min, max), p| {
            (
                Point::new(min.x.min(p.x), min.y.min(p.y)),
                Point::new(max.x.max(p.x), max.y.max(p.y)),
            )
        },
    )
}

fn rescale(positions: &mut [Point]) {
    if positions.is_empty() {
        return;
    }

    let count = positions.len() as f64;
    let mean_x = positions.iter().map(|p| p.x).sum::<f64>() / count;
    let mean_y = positions.iter().map(|p| p.y).sum::<f64>() / count;
    for p in positions.iter_mut() {
        p.x -= mean_x;
        p.y -= mean_y;
    }

    let limit = positions
        .iter()
        .map(|p| p.x.abs().max(p.y.abs()))
        .fold(0.0_f64, f64::max);
    if limit > 0.0 {
        for p in positions.iter_mut() {
            p.x /= limit;
            p.y /= limit;
        }
    }
}

fn collect_positions(graph: &LayoutGraph, positions: &[Point]) -> PositionMap {
    graph
        .node_indices()
        .zip(positions.iter().copied())
        .map(|(index, point): (NodeIndex, Point)| (graph[index].clone(), point))
        .collect()
}
