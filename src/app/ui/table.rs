use eframe::egui::{self, Label, RichText, Ui};

use crate::data::{HitField, HitRecord, HitSchema};
use crate::util::{format_grouped, format_scientific};

const ROW_HEIGHT: f32 = 20.0;
const INDEX_WIDTH: f32 = 56.0;

pub(in crate::app) struct TableColumn {
    pub title: String,
    pub width: f32,
}

impl TableColumn {
    pub(in crate::app) fn new(title: impl Into<String>, width: f32) -> Self {
        Self {
            title: title.into(),
            width,
        }
    }
}

fn column_width(field: HitField) -> f32 {
    match field {
        HitField::Chrom | HitField::Strand | HitField::Length => 70.0,
        HitField::Start | HitField::End | HitField::Pvalue => 100.0,
        HitField::Motif | HitField::Te | HitField::Family | HitField::Class => 110.0,
        HitField::Gene | HitField::Species => 100.0,
    }
}

pub(in crate::app) fn hit_columns(schema: HitSchema, extra_headers: &[String]) -> Vec<TableColumn> {
    schema
        .fields()
        .iter()
        .map(|field| TableColumn::new(schema.display_name(*field), column_width(*field)))
        .chain(
            extra_headers
                .iter()
                .map(|header| TableColumn::new(header.as_str(), 100.0)),
        )
        .collect()
}

pub(in crate::app) fn hit_cell(schema: HitSchema, row: &HitRecord, column: usize) -> String {
    let fields = schema.fields();
    let Some(field) = fields.get(column) else {
        return row
            .extras
            .get(column - fields.len())
            .cloned()
            .unwrap_or_default();
    };

    match field {
        HitField::Start if schema == HitSchema::GenomicHits => format_grouped(row.start),
        HitField::End if schema == HitSchema::GenomicHits => format_grouped(row.end),
        HitField::Pvalue => format_scientific(row.pvalue),
        _ => row.raw_value(*field),
    }
}

pub(in crate::app) fn draw_table(
    ui: &mut Ui,
    id_salt: &str,
    columns: &[TableColumn],
    row_count: usize,
    max_height: f32,
    mut cell: impl FnMut(usize, usize) -> String,
) {
    egui::ScrollArea::horizontal()
        .id_salt((id_salt, "columns"))
        .auto_shrink([false, true])
        .show(ui, |ui| {
            ui.vertical(|ui| {
                ui.horizontal(|ui| {
                    ui.add_sized([INDEX_WIDTH, ROW_HEIGHT], Label::new(""));
                    for column in columns {
                        ui.add_sized(
                            [column.width, ROW_HEIGHT],
                            Label::new(RichText::new(&column.title).strong()).truncate(),
                        );
                    }
                });
                ui.separator();

                egui::ScrollArea::vertical()
                    .id_salt((id_salt, "rows"))
                    .max_height(max_height)
                    .auto_shrink([false, true])
                    .show_rows(ui, ROW_HEIGHT, row_count, |ui, row_range| {
                        for row in row_range {
                            ui.horizontal(|ui| {
                                ui.add_sized(
                                    [INDEX_WIDTH, ROW_HEIGHT],
                                    Label::new(RichText::new(row.to_string()).weak()),
                                );
                                for (index, column) in columns.iter().enumerate() {
                                    let text = cell(row, index);
                                    ui.add_sized(
                                        [column.width, ROW_HEIGHT],
                                        Label::new(text.as_str()).truncate(),
                                    )
                                    .on_hover_text(text);
                                }
                            });
                        }
                    });
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> HitRecord {
        HitRecord {
            chrom: "chr2".to_owned(),
            start: 227_070_450,
            end: 227_070_471,
            motif: "MA1987.1".to_owned(),
            pvalue: 1.08e-9,
            extras: vec!["17.5".to_owned()],
            ..HitRecord::default()
        }
    }

    #[test]
    fn genomic_cells_are_formatted_for_display() {
        let row = sample();
        let schema = HitSchema::GenomicHits;

        assert_eq!(hit_cell(schema, &row, 0), "chr2");
        assert_eq!(hit_cell(schema, &row, 1), "227,070,450");
        assert_eq!(hit_cell(schema, &row, 5), "1.08e-09");
    }

    #[test]
    fn motif_cells_keep_raw_coordinates_and_extras() {
        let row = sample();
        let schema = HitSchema::MotifFeatures;
        let columns = hit_columns(schema, &["SCORE".to_owned()]);

        assert_eq!(columns.len(), schema.fields().len() + 1);
        assert_eq!(columns[6].title, "Family ID");
        assert_eq!(hit_cell(schema, &row, 1), "227070450");
        assert_eq!(hit_cell(schema, &row, 4), "1.08e-09");
        assert_eq!(hit_cell(schema, &row, schema.fields().len()), "17.5");
    }
}
