use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::HitField;
use crate::filter::{CategoryFilter, SignFilter};
use crate::network::{
    DOWN_REGULATED_BORDER, GENE_BORDER, GENE_FILL, NEGATIVE_EDGE_COLOR, POSITIVE_EDGE_COLOR,
    TE_FILL, UP_REGULATED_BORDER,
};
use crate::plot::distinct;
use crate::util::format_scientific;

use super::super::render_utils::to_color32;
use super::super::{HIT_FILTER_FIELDS, HitsModel, MOTIF_FILTER_FIELDS, MotifModel, NetworkModel};

const STRAND_OPTIONS: [&str; 2] = ["+", "-"];
const ANY_OPTION: &str = "(any)";

pub(in crate::app) fn error_label(ui: &mut Ui, error: &str) {
    ui.label(RichText::new(error).color(Color32::from_rgb(190, 30, 45)));
}

fn legend_swatch(ui: &mut Ui, fill: Color32, border: Color32, text: &str) {
    ui.horizontal(|ui| {
        let (rect, _) = ui.allocate_exact_size(egui::vec2(14.0, 14.0), egui::Sense::hover());
        let painter = ui.painter();
        painter.circle_filled(rect.center(), 6.0, fill);
        painter.circle_stroke(rect.center(), 6.0, egui::Stroke::new(2.0, border));
        ui.label(text);
    });
}

fn draw_legend(ui: &mut Ui) {
    legend_swatch(
        ui,
        to_color32(GENE_FILL),
        to_color32(GENE_BORDER),
        "KRAB-ZNF",
    );
    legend_swatch(
        ui,
        to_color32(TE_FILL),
        to_color32(UP_REGULATED_BORDER),
        "TE, up-regulated",
    );
    legend_swatch(
        ui,
        to_color32(TE_FILL),
        to_color32(DOWN_REGULATED_BORDER),
        "TE, down-regulated",
    );
    ui.label(RichText::new("positive coef").color(to_color32(POSITIVE_EDGE_COLOR)));
    ui.label(RichText::new("negative coef").color(to_color32(NEGATIVE_EDGE_COLOR)));
}

fn hit_filter_label(field: HitField) -> &'static str {
    match field {
        HitField::Chrom => "Chromosome",
        HitField::Motif => "Motif",
        HitField::Strand => "Strand",
        HitField::Class => "Class",
        HitField::Family => "TE Family",
        HitField::Gene => "Gene",
        HitField::Species => "Species",
        HitField::Te => "TE",
        HitField::Start | HitField::End | HitField::Pvalue | HitField::Length => "",
    }
}

impl NetworkModel {
    pub(in crate::app) fn draw_network_controls(&mut self, ui: &mut Ui) {
        ui.heading("Filters");
        ui.separator();
        ui.small(format!("source: {}", self.source.display()));
        if let Some(error) = &self.load_error {
            error_label(ui, error);
        }
        ui.add_space(4.0);

        egui::ComboBox::from_label("Correlation direction")
            .selected_text(self.filter.sign.label())
            .show_ui(ui, |ui| {
                for sign in SignFilter::ALL {
                    ui.selectable_value(&mut self.filter.sign, sign, sign.label());
                }
            })
            .response
            .on_hover_text("Keep positive (coef > 0), negative (coef < 0) or all correlations.");

        egui::ComboBox::from_label("Expression type")
            .selected_text(self.filter.category.label())
            .show_ui(ui, |ui| {
                for category in CategoryFilter::ALL {
                    ui.selectable_value(&mut self.filter.category, category, category.label());
                }
            })
            .response
            .on_hover_text("Keep correlations whose TE is up- or down-regulated.");

        self.refresh();

        ui.separator();
        ui.label("Search (gene or TE name)")
            .on_hover_text("Fuzzy-highlight matching nodes without changing the rendered graph.");
        ui.text_edit_singleline(&mut self.search);
        if let Some(count) = self.search_match_count() {
            ui.small(format!("{count} matching nodes"));
        }

        ui.separator();
        ui.label(format!(
            "rows: {} of {}",
            self.view.records.len(),
            self.records.len()
        ));
        ui.label(format!("nodes: {}", self.view.graph.node_count()));
        ui.label(format!("edges: {}", self.view.graph.edge_count()));
        if !self.view.graph.is_empty() {
            ui.label(format!("layout: {}", self.view.layout.strategy.label()));
        }
        if let Some(reason) = &self.view.layout.fallback_reason
            && !self.view.graph.is_empty()
        {
            ui.small(format!("Kamada-Kawai unavailable: {reason}"));
        }
        if ui.button("Reset view").clicked() {
            self.reset_view();
        }
        ui.small("Scroll to zoom, drag to pan, double-click to reset.");

        ui.separator();
        ui.label(RichText::new("Legend").strong());
        draw_legend(ui);
    }
}

impl MotifModel {
    pub(in crate::app) fn draw_motif_controls(&mut self, ui: &mut Ui) {
        ui.heading("Filter Options");
        ui.separator();
        ui.small(format!("source: {}", self.source.display()));
        if let Some(error) = &self.load_error {
            error_label(ui, error);
        }
        ui.add_space(4.0);

        let schema = self.table.schema;
        egui::ScrollArea::vertical()
            .id_salt("motif_filter_scroll")
            .max_height((ui.available_height() - 80.0).max(120.0))
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for field in MOTIF_FILTER_FIELDS {
                    let options = self
                        .options
                        .get(&field)
                        .map(Vec::as_slice)
                        .unwrap_or_default();
                    let selected = self
                        .pending
                        .selection(field)
                        .map(|values| values.len())
                        .unwrap_or(0);
                    let title = if selected > 0 {
                        format!("{} ({selected} selected)", schema.display_name(field))
                    } else {
                        schema.display_name(field).to_owned()
                    };

                    egui::CollapsingHeader::new(title)
                        .id_salt(("motif_filter", field))
                        .show(ui, |ui| {
                            if options.is_empty() {
                                ui.small("no values");
                            }
                            egui::ScrollArea::vertical()
                                .id_salt(("motif_options", field))
                                .max_height(180.0)
                                .show(ui, |ui| {
                                    for option in options {
                                        let mut checked = self.pending.is_selected(field, option);
                                        if ui.checkbox(&mut checked, option.as_str()).changed() {
                                            self.pending.toggle(field, option, checked);
                                        }
                                    }
                                });
                        });
                }
            });

        ui.separator();
        ui.horizontal(|ui| {
            if ui.button("Apply Filters").clicked() {
                self.apply_filters();
            }
            if ui
                .add_enabled(
                    !self.pending.is_empty(),
                    egui::Button::new("Clear selections"),
                )
                .clicked()
            {
                self.pending.clear();
            }
        });
    }
}

impl HitsModel {
    pub(in crate::app) fn draw_hits_controls(&mut self, ui: &mut Ui) {
        ui.heading("Data Source");
        ui.separator();
        if let Some(error) = &self.loaded.error {
            error_label(ui, error);
        } else {
            ui.label(self.loaded.source.describe(self.loaded.table.len()));
        }
        ui.small("Drop a CSV file on the window to load it.");

        let rows = &self.loaded.table.rows;
        if !rows.is_empty() {
            ui.add_space(6.0);
            ui.heading("Data Overview");
            ui.separator();
            ui.columns(3, |columns| {
                let metrics = [
                    ("Total Records", rows.len()),
                    ("Chromosomes", distinct(rows, |row| row.chrom.as_str())),
                    ("Motifs", distinct(rows, |row| row.motif.as_str())),
                ];
                for (column, (label, value)) in columns.iter_mut().zip(metrics) {
                    column.small(label);
                    column.label(RichText::new(value.to_string()).size(20.0).strong());
                }
            });

            ui.add_space(6.0);
            ui.heading("Filters");
            ui.separator();
            self.draw_hit_filters(ui);
        }
    }

    fn draw_hit_filters(&mut self, ui: &mut Ui) {
        for field in HIT_FILTER_FIELDS {
            let options = if field == HitField::Strand {
                STRAND_OPTIONS.map(str::to_owned).to_vec()
            } else {
                self.options.get(&field).cloned().unwrap_or_default()
            };

            let current = self.filter.single(field).unwrap_or_default().to_owned();
            let mut selected = current.clone();
            egui::ComboBox::from_label(hit_filter_label(field))
                .selected_text(if selected.is_empty() {
                    ANY_OPTION
                } else {
                    selected.as_str()
                })
                .height(320.0)
                .show_ui(ui, |ui| {
                    ui.selectable_value(&mut selected, String::new(), ANY_OPTION);
                    for option in &options {
                        ui.selectable_value(&mut selected, option.clone(), option.as_str());
                    }
                });

            if selected != current {
                let value = (!selected.is_empty()).then_some(selected.as_str());
                self.filter.select_single(field, value);
            }
        }

        ui.horizontal(|ui| {
            let pvalue = egui::DragValue::new(&mut self.pvalue_max)
                .range(0.0..=1.0)
                .speed(1e-6)
                .custom_formatter(|value, _| format_scientific(value))
                .custom_parser(|text| text.trim().parse::<f64>().ok());
            ui.add(pvalue)
                .on_hover_text("Keep p-values at or below this value. 0 disables the filter.");
            ui.label("Max P-value");
        });

        ui.horizontal(|ui| {
            let length = egui::DragValue::new(&mut self.length_min).range(0..=1_000_000);
            ui.add(length)
                .on_hover_text("Keep lengths at or above this value. 0 disables the filter.");
            ui.label("Min Length");
        });

        ui.add_space(4.0);
        if ui.button("Reset all filters").clicked() {
            self.reset_filters();
        }
    }
}
