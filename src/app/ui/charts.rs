use eframe::egui::{self, Align2, Color32, FontId, Pos2, Rect, Sense, Stroke, Ui, pos2, vec2};

use crate::color::PERIWINKLE;
use crate::plot::{CategoryCounts, EMPTY_CHART_NOTE, StripPlot};
use crate::util::format_grouped;

use super::super::render_utils::{draw_frame, to_color32};

const AXIS_COLOR: Color32 = Color32::from_gray(120);
const TEXT_COLOR: Color32 = Color32::from_gray(40);
const TITLE_HEIGHT: f32 = 30.0;
const POINT_RADIUS: f32 = 3.0;

fn plot_area(rect: Rect, left: f32, bottom: f32) -> Rect {
    Rect::from_min_max(
        pos2(rect.left() + left, rect.top() + TITLE_HEIGHT),
        pos2(rect.right() - 12.0, rect.bottom() - bottom),
    )
}

fn draw_title(painter: &egui::Painter, rect: Rect, title: &str) {
    painter.text(
        rect.center_top() + vec2(0.0, 8.0),
        Align2::CENTER_TOP,
        title,
        FontId::proportional(15.0),
        TEXT_COLOR,
    );
}

fn draw_empty_note(painter: &egui::Painter, rect: Rect) {
    painter.text(
        rect.center(),
        Align2::CENTER_CENTER,
        EMPTY_CHART_NOTE,
        FontId::proportional(14.0),
        Color32::from_gray(110),
    );
}

fn draw_tooltip(painter: &egui::Painter, anchor: Pos2, text: String) {
    let galley = painter.layout_no_wrap(text, FontId::proportional(12.0), TEXT_COLOR);
    let min = anchor + vec2(10.0, -galley.size().y - 10.0);
    painter.rect_filled(
        Rect::from_min_size(min, galley.size()).expand(4.0),
        3.0,
        Color32::from_rgba_unmultiplied(255, 255, 255, 235),
    );
    painter.galley(min, galley, TEXT_COLOR);
}

pub(in crate::app) fn draw_bar_chart(ui: &mut Ui, chart: &CategoryCounts, height: f32) {
    let (rect, response) =
        ui.allocate_exact_size(vec2(ui.available_width(), height), Sense::hover());
    let painter = ui.painter_at(rect);
    draw_frame(&painter, rect);
    draw_title(&painter, rect, chart.title);

    if chart.is_empty() {
        draw_empty_note(&painter, rect);
        return;
    }

    let area = plot_area(rect, 52.0, 44.0);
    let max_count = chart.max_count().max(1) as f32;
    painter.line_segment(
        [area.left_bottom(), area.right_bottom()],
        Stroke::new(1.0, AXIS_COLOR),
    );
    painter.line_segment(
        [area.left_bottom(), area.left_top()],
        Stroke::new(1.0, AXIS_COLOR),
    );

    for tick in [0.0, 0.5, 1.0] {
        let y = area.bottom() - area.height() * tick;
        painter.text(
            pos2(area.left() - 6.0, y),
            Align2::RIGHT_CENTER,
            format!("{:.0}", max_count * tick),
            FontId::proportional(11.0),
            TEXT_COLOR,
        );
    }
    painter.text(
        pos2(rect.left() + 4.0, area.center().y),
        Align2::LEFT_CENTER,
        chart.y_title,
        FontId::proportional(10.0),
        AXIS_COLOR,
    );
    painter.text(
        pos2(area.center().x, rect.bottom() - 4.0),
        Align2::CENTER_BOTTOM,
        chart.x_title,
        FontId::proportional(12.0),
        TEXT_COLOR,
    );

    let slot = area.width() / chart.bars.len() as f32;
    let label_stride = ((28.0 / slot).ceil() as usize).max(1);
    let pointer = response.hover_pos();
    let mut hovered = None;

    for (index, bar) in chart.bars.iter().enumerate() {
        let left = area.left() + slot * index as f32 + slot * 0.1;
        let bar_height = area.height() * (bar.count as f32 / max_count);
        let bar_rect = Rect::from_min_max(
            pos2(left, area.bottom() - bar_height),
            pos2(left + slot * 0.8, area.bottom()),
        );
        painter.rect_filled(bar_rect, 1.0, to_color32(bar.color));

        if index % label_stride == 0 {
            painter.text(
                pos2(bar_rect.center().x, area.bottom() + 4.0),
                Align2::CENTER_TOP,
                &bar.label,
                FontId::proportional(10.0),
                TEXT_COLOR,
            );
        }

        if let Some(pointer) = pointer
            && pointer.x >= bar_rect.left()
            && pointer.x <= bar_rect.right()
            && pointer.y >= area.top()
            && pointer.y <= area.bottom()
        {
            hovered = Some((pointer, bar));
        }
    }

    if let Some((pointer, bar)) = hovered {
        draw_tooltip(
            &painter,
            pointer,
            format!("{}: {} hits", bar.label, bar.count),
        );
    }
}

pub(in crate::app) fn draw_strip_plot(ui: &mut Ui, plot: &StripPlot, height: f32) {
    let (rect, response) =
        ui.allocate_exact_size(vec2(ui.available_width(), height), Sense::hover());
    let painter = ui.painter_at(rect);
    draw_frame(&painter, rect);
    draw_title(&painter, rect, plot.title);

    let Some((low, high)) = plot.midpoint_range() else {
        draw_empty_note(&painter, rect);
        return;
    };

    let area = plot_area(rect, 64.0, 40.0);
    let span = (high - low).max(1.0);
    let band = area.height() / plot.categories.len().max(1) as f32;
    let x_of = |midpoint: f64| area.left() + ((midpoint - low) / span) as f32 * area.width();

    painter.line_segment(
        [area.left_bottom(), area.right_bottom()],
        Stroke::new(1.0, AXIS_COLOR),
    );
    for (index, label) in plot.categories.iter().enumerate() {
        let center = area.top() + band * (index as f32 + 0.5);
        painter.line_segment(
            [pos2(area.left(), center), pos2(area.right(), center)],
            Stroke::new(1.0, Color32::from_gray(235)),
        );
        painter.text(
            pos2(area.left() - 6.0, center),
            Align2::RIGHT_CENTER,
            label,
            FontId::proportional(11.0),
            TEXT_COLOR,
        );
    }

    for (value, align) in [(low, Align2::LEFT_TOP), (high, Align2::RIGHT_TOP)] {
        painter.text(
            pos2(x_of(value), area.bottom() + 4.0),
            align,
            format_grouped(value.round() as i64),
            FontId::proportional(11.0),
            TEXT_COLOR,
        );
    }
    painter.text(
        pos2(area.center().x, rect.bottom() - 4.0),
        Align2::CENTER_BOTTOM,
        "midpoint",
        FontId::proportional(12.0),
        TEXT_COLOR,
    );

    let pointer = response.hover_pos();
    let color = to_color32(PERIWINKLE);
    let mut hovered = None::<(f32, Pos2, usize)>;
    for (index, point) in plot.points.iter().enumerate() {
        let center = area.top() + band * (point.category as f32 + 0.5);
        let position = pos2(x_of(point.midpoint), center + point.jitter as f32 * band);
        painter.circle_filled(position, POINT_RADIUS, color);

        if let Some(pointer) = pointer {
            let distance = position.distance(pointer);
            if distance <= POINT_RADIUS + 2.0 && hovered.is_none_or(|(best, _, _)| distance < best)
            {
                hovered = Some((distance, position, index));
            }
        }
    }

    if let Some((_, position, index)) = hovered {
        let point = &plot.points[index];
        painter.circle_stroke(position, POINT_RADIUS + 2.0, Stroke::new(1.5, TEXT_COLOR));
        let midpoint = format_grouped(point.midpoint.round() as i64);
        draw_tooltip(
            &painter,
            position,
            format!("{}\nmidpoint={midpoint}", point.label),
        );
    }
}
