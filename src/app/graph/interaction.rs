use eframe::egui::{self, Pos2, Rect, Ui, Vec2};

use super::super::NetworkModel;
use super::super::render_utils::{circle_visible, distance_to_segment, screen_to_world};

const EDGE_HOVER_SLACK: f32 = 3.0;

impl NetworkModel {
    pub(in crate::app) fn handle_canvas_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        let world_before = screen_to_world(rect, self.pan, self.zoom, pointer);

        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom = (self.zoom * zoom_factor).clamp(0.2, 12.0);
        self.pan = pointer - rect.center() - (world_before * self.zoom);
    }

    pub(in crate::app) fn handle_canvas_pan(&mut self, response: &egui::Response) {
        if response.dragged_by(egui::PointerButton::Primary)
            || response.dragged_by(egui::PointerButton::Secondary)
            || response.dragged_by(egui::PointerButton::Middle)
        {
            self.pan += response.drag_delta();
        }

        if response.double_clicked() {
            self.reset_view();
        }
    }

    pub(in crate::app) fn reset_view(&mut self) {
        self.pan = Vec2::ZERO;
        self.zoom = 1.0;
    }

    pub(in crate::app) fn hovered_marker(
        ui: &Ui,
        rect: Rect,
        screen_positions: &[Pos2],
        radius: f32,
    ) -> Option<usize> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        if !rect.contains(pointer) {
            return None;
        }

        screen_positions
            .iter()
            .enumerate()
            .filter(|(_, position)| circle_visible(rect, **position, radius))
            .filter_map(|(index, position)| {
                let distance = position.distance(pointer);
                (distance <= radius).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    pub(in crate::app) fn hovered_edge(
        ui: &Ui,
        rect: Rect,
        segments: &[(Pos2, Pos2)],
        width: f32,
    ) -> Option<usize> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        if !rect.contains(pointer) {
            return None;
        }

        segments
            .iter()
            .enumerate()
            .filter_map(|(index, (start, end))| {
                let distance = distance_to_segment(pointer, *start, *end);
                (distance <= width * 0.5 + EDGE_HOVER_SLACK).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }
}
