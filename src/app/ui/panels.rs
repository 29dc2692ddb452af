use std::path::Path;

use eframe::egui::{self, Align, Context, Layout, RichText, Ui};

use crate::data::export_hits;

use super::super::{AtlasApp, Dashboard, HitsModel, MotifModel, NetworkModel};
use super::charts::{draw_bar_chart, draw_strip_plot};
use super::controls::error_label;
use super::table::{TableColumn, draw_table, hit_cell, hit_columns};

const CHART_HEIGHT: f32 = 340.0;
const MIN_TABLE_HEIGHT: f32 = 160.0;

impl AtlasApp {
    pub(in crate::app) fn show(&mut self, ctx: &Context) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("te-atlas");
                    ui.separator();
                    for dashboard in Dashboard::ALL {
                        ui.selectable_value(&mut self.dashboard, dashboard, dashboard.title());
                    }
                });
            });

        match self.dashboard {
            Dashboard::Network => {
                egui::SidePanel::left("network_controls")
                    .resizable(true)
                    .default_width(300.0)
                    .show(ctx, |ui| self.network.draw_network_controls(ui));
                egui::CentralPanel::default().show(ctx, |ui| self.network.draw_network_panel(ui));
            }
            Dashboard::Motifs => {
                egui::SidePanel::left("motif_controls")
                    .resizable(true)
                    .default_width(300.0)
                    .show(ctx, |ui| self.motifs.draw_motif_controls(ui));
                egui::CentralPanel::default().show(ctx, |ui| self.motifs.draw_motif_panel(ui));
            }
            Dashboard::Hits => {
                egui::SidePanel::left("hit_controls")
                    .resizable(true)
                    .default_width(320.0)
                    .show(ctx, |ui| {
                        egui::ScrollArea::vertical()
                            .id_salt("hit_controls_scroll")
                            .show(ui, |ui| self.hits.draw_hits_controls(ui));
                    });
                egui::CentralPanel::default().show(ctx, |ui| self.hits.draw_hits_panel(ui));
            }
        }
    }
}

impl NetworkModel {
    pub(in crate::app) fn draw_network_panel(&mut self, ui: &mut Ui) {
        ui.heading("Gene Regulatory Network");
        ui.add_space(4.0);

        let canvas_height = (ui.available_height() - MIN_TABLE_HEIGHT - 40.0).max(240.0);
        ui.allocate_ui(egui::vec2(ui.available_width(), canvas_height), |ui| {
            ui.vertical_centered(|ui| self.draw_network_canvas(ui));
        });

        ui.separator();
        ui.label(RichText::new("Correlation Table").strong());
        let columns = [
            TableColumn::new("KRAB-ZNF", 140.0),
            TableColumn::new("Gene", 140.0),
            TableColumn::new("coef", 90.0),
            TableColumn::new("exp", 140.0),
        ];
        let records = &self.view.records;
        let table_height = ui.available_height();
        draw_table(
            ui,
            "correlation_table",
            &columns,
            records.len(),
            table_height,
            |row, column| {
                let record = &records[row];
                match column {
                    0 => record.gene.clone(),
                    1 => record.te.clone(),
                    2 => record.coef.to_string(),
                    _ => record.direction.label().to_owned(),
                }
            },
        );
    }
}

impl MotifModel {
    pub(in crate::app) fn draw_motif_panel(&mut self, ui: &mut Ui) {
        ui.heading("KRAB-ZNF-related Motifs Features");
        if let Some(error) = &self.load_error {
            error_label(ui, error);
        }

        ui.label(RichText::new(self.view.heading()).size(18.0).strong());
        ui.add_space(4.0);

        let columns = hit_columns(self.table.schema, &self.table.extra_headers);
        let schema = self.table.schema;
        let rows = &self.view.rows;
        let table_height = (ui.available_height() - CHART_HEIGHT - 40.0).max(MIN_TABLE_HEIGHT);
        draw_table(
            ui,
            "motif_table",
            &columns,
            rows.len(),
            table_height,
            |row, column| hit_cell(schema, &rows[row], column),
        );

        ui.add_space(8.0);
        draw_strip_plot(ui, &self.view.strip, CHART_HEIGHT);
    }
}

impl HitsModel {
    pub(in crate::app) fn draw_hits_panel(&mut self, ui: &mut Ui) {
        ui.heading("Genomic Data Interactive Dashboard");
        ui.label(
            RichText::new(
                "Visualize and analyze genomic motif data with filtering and interactive charts",
            )
            .italics(),
        );
        ui.add_space(4.0);

        if self.loaded.table.is_empty() {
            error_label(
                ui,
                "No data available. Please drop a CSV file or make sure the default table exists.",
            );
            return;
        }

        self.refresh_view();
        let Some(view) = &self.view else {
            return;
        };

        let total = self.loaded.table.len();
        if view.rows.len() != total {
            ui.label(format!(
                "Showing {} of {total} records after filtering",
                view.rows.len()
            ));
        }

        ui.columns(2, |columns| {
            columns[0].label(RichText::new("Distribution Chart").strong());
            draw_bar_chart(&mut columns[0], &view.counts, CHART_HEIGHT);

            columns[1].label(RichText::new("Data Statistics").strong());
            match &view.summary {
                Some(summary) => {
                    egui::Grid::new("hit_statistics")
                        .striped(true)
                        .num_columns(2)
                        .show(&mut columns[1], |ui| {
                            ui.label(RichText::new("Metric").strong());
                            ui.label(RichText::new("Value").strong());
                            ui.end_row();
                            for (label, value) in summary.lines() {
                                ui.label(label);
                                ui.label(value);
                                ui.end_row();
                            }
                        });
                }
                None => {
                    columns[1].label("No data matches the current filters");
                }
            }
        });

        ui.separator();
        ui.label(RichText::new("Filtered Data Table").strong());
        if view.rows.is_empty() {
            ui.label("No data matches the current filters");
            return;
        }

        let schema = self.loaded.table.schema;
        let columns = hit_columns(schema, &self.loaded.table.extra_headers);
        let rows = &view.rows;
        let table_height = (ui.available_height() - 60.0).max(MIN_TABLE_HEIGHT);
        draw_table(
            ui,
            "hit_table",
            &columns,
            rows.len(),
            table_height,
            |row, column| hit_cell(schema, &rows[row], column),
        );

        ui.add_space(4.0);
        let mut export_requested = false;
        ui.with_layout(Layout::left_to_right(Align::Center), |ui| {
            ui.label("Export to");
            ui.text_edit_singleline(&mut self.export_path);
            export_requested = ui.button("Download Filtered Data as CSV").clicked();
        });

        if export_requested {
            let path = Path::new(self.export_path.trim());
            self.export_status = Some(
                export_hits(path, schema, &self.loaded.table.extra_headers, &view.rows)
                    .map(|()| format!("Wrote {} rows to {}", view.rows.len(), path.display()))
                    .map_err(|error| format!("{error:#}")),
            );
        }

        match &self.export_status {
            Some(Ok(message)) => {
                ui.label(message);
            }
            Some(Err(error)) => error_label(ui, error),
            None => {}
        }
    }
}
