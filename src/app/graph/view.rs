use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Stroke, Ui, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::network::{LABEL_COLOR, NodeKey, NodeKind};

use super::super::render_utils::{
    blend_color, draw_frame, edge_visible, fade_color, layout_to_world, to_color32,
    world_to_screen,
};
use super::super::{NetworkModel, SearchMatchCache};

const CANVAS_MIN_SIDE: f32 = 240.0;
const LABEL_FONT_SIZE: f32 = 12.0;
const SEARCH_COLOR: Color32 = Color32::from_rgb(103, 196, 255);
const SEARCH_FADE: f32 = 0.15;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl NetworkModel {
    fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let search_query = self.search.trim();
        if search_query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.query == search_query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .view
            .chart
            .markers
            .iter()
            .enumerate()
            .filter(|(_, marker)| {
                fuzzy_match_score(&matcher, &marker.label, search_query).is_some()
            })
            .map(|(index, _)| index)
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: search_query.to_owned(),
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    pub(in crate::app) fn search_match_count(&mut self) -> Option<usize> {
        self.cached_search_matches().map(|matches| matches.len())
    }

    pub(in crate::app) fn draw_network_canvas(&mut self, ui: &mut Ui) {
        let canvas = &self.view.chart.canvas;
        let canvas_size = canvas.width.min(canvas.height) as f32;
        let side = ui
            .available_width()
            .min(ui.available_height())
            .min(canvas_size)
            .max(CANVAS_MIN_SIDE);
        let (rect, response) = ui.allocate_exact_size(vec2(side, side), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_frame(&painter, rect);
        self.handle_canvas_zoom(ui, rect, &response);
        self.handle_canvas_pan(&response);

        let search_matches = self.cached_search_matches();
        let search_active = search_matches.is_some();
        let pan = self.pan;
        let zoom = self.zoom;
        let chart = &self.view.chart;

        painter.text(
            rect.center_top() + vec2(0.0, 10.0),
            Align2::CENTER_TOP,
            &chart.canvas.title,
            FontId::proportional(16.0),
            Color32::from_gray(40),
        );

        if chart.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No correlations match the current filters.",
                FontId::proportional(14.0),
                Color32::from_gray(110),
            );
            return;
        }

        if response.dragged() {
            ui.ctx().request_repaint();
        }

        let unit = (side * 0.5 - chart.canvas.margin as f32).max(20.0);
        let screen_positions = chart
            .markers
            .iter()
            .map(|marker| world_to_screen(rect, pan, zoom, layout_to_world(marker.position, unit)))
            .collect::<Vec<Pos2>>();
        let segments = chart
            .edges
            .iter()
            .map(|edge| {
                (
                    world_to_screen(rect, pan, zoom, layout_to_world(edge.from, unit)),
                    world_to_screen(rect, pan, zoom, layout_to_world(edge.to, unit)),
                )
            })
            .collect::<Vec<_>>();

        let size_scale = zoom.sqrt().clamp(0.6, 2.0);
        let marker_radius = chart
            .markers
            .first()
            .map(|marker| marker.size * 0.5 * size_scale)
            .unwrap_or_default();
        let edge_width = chart
            .edges
            .first()
            .map(|edge| edge.width * size_scale)
            .unwrap_or(1.0);

        let hovered_marker = Self::hovered_marker(ui, rect, &screen_positions, marker_radius);
        let hovered_edge = if hovered_marker.is_none() {
            Self::hovered_edge(ui, rect, &segments, edge_width)
        } else {
            None
        };
        if hovered_marker.is_some() || hovered_edge.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        let matched_nodes = search_matches
            .as_ref()
            .map(|matches| {
                matches
                    .iter()
                    .filter_map(|index| chart.markers.get(*index))
                    .map(|marker| (marker.kind, marker.id.as_str()))
                    .collect::<HashSet<_>>()
            })
            .unwrap_or_default();

        for (index, edge) in chart.edges.iter().enumerate() {
            let (start, end) = segments[index];
            if !edge_visible(rect, start, end, edge_width) {
                continue;
            }

            let matched = matched_nodes.contains(&(NodeKind::Gene, edge.gene.as_str()))
                || matched_nodes.contains(&(NodeKind::Te, edge.te.as_str()));
            let mut color = to_color32(edge.color);
            if search_active && !matched {
                color = fade_color(color, SEARCH_FADE);
            }
            let width = if hovered_edge == Some(index) {
                edge_width + 1.5
            } else {
                edge_width
            };

            painter.line_segment([start, end], Stroke::new(width, color));
        }

        for (index, marker) in chart.markers.iter().enumerate() {
            let position = screen_positions[index];
            if !rect.expand(marker_radius * 4.0).contains(position) {
                continue;
            }

            let is_hovered = hovered_marker == Some(index);
            let is_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index));

            let mut fill = to_color32(marker.fill);
            let mut border = to_color32(marker.border);
            if is_hovered {
                fill = blend_color(fill, Color32::WHITE, 0.35);
            } else if search_active && !is_match {
                fill = fade_color(fill, SEARCH_FADE);
                border = fade_color(border, SEARCH_FADE);
            }

            if is_match {
                painter.circle_stroke(
                    position,
                    marker_radius + 5.0,
                    Stroke::new(2.0, SEARCH_COLOR),
                );
            }
            painter.circle_filled(position, marker_radius, fill);
            painter.circle_stroke(
                position,
                marker_radius,
                Stroke::new(marker.border_width * size_scale.min(1.0), border),
            );

            let label_color = if search_active && !is_match {
                fade_color(to_color32(LABEL_COLOR), SEARCH_FADE)
            } else {
                to_color32(LABEL_COLOR)
            };
            painter.text(
                position - vec2(0.0, marker_radius + 2.0),
                Align2::CENTER_BOTTOM,
                &marker.label,
                FontId::proportional(LABEL_FONT_SIZE),
                label_color,
            );
        }

        let hover_text = if let Some(index) = hovered_marker {
            let marker = &chart.markers[index];
            let detail = match marker.kind {
                NodeKind::Gene => "KRAB-ZNF".to_owned(),
                NodeKind::Te => {
                    let direction = self
                        .view
                        .graph
                        .node(&NodeKey::te(marker.id.as_str()))
                        .and_then(|node| node.direction.as_ref())
                        .map(|direction| direction.label().to_owned())
                        .unwrap_or_default();
                    format!("TE  {direction}")
                }
            };
            Some(format!("{}\n{detail}", marker.label))
        } else {
            hovered_edge.map(|index| chart.edges[index].hover.clone())
        };

        if let Some(text) = hover_text {
            let galley =
                painter.layout_no_wrap(text, FontId::proportional(13.0), Color32::from_gray(20));
            let anchor = rect.left_top() + vec2(10.0, 36.0);
            painter.rect_filled(
                egui::Rect::from_min_size(anchor, galley.size()).expand(5.0),
                4.0,
                Color32::from_rgba_unmultiplied(255, 255, 255, 230),
            );
            painter.galley(anchor, galley, Color32::from_gray(20));
        }
    }
}
