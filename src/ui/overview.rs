use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::Dataset;
use crate::data::stats::Summary;
use crate::state::DatasetView;

const ROW_HEIGHT: f32 = 18.0;

/// "Data Overview": collapsible preview and summary tables.
pub fn data_overview(ui: &mut Ui, view: &DatasetView, preview_rows: usize) {
    ui.heading("Data Overview");

    egui::CollapsingHeader::new(format!("Show first {preview_rows} rows"))
        .id_salt("preview")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            let (labels, head) = view.preview(preview_rows);
            preview_table(ui, labels, &head);
        });

    egui::CollapsingHeader::new("Show statistical summary")
        .id_salt("summary")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            summary_table(ui, &view.summary);
        });
}

/// `labels` are the source row indices, so filtered previews keep their row numbers.
fn preview_table(ui: &mut Ui, labels: &[usize], head: &Dataset) {
    ui.push_id("preview_table", |ui: &mut Ui| {
        egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .column(Column::auto())
                .columns(Column::auto().at_least(60.0), head.columns.len())
                .header(ROW_HEIGHT + 4.0, |mut header| {
                    header.col(|ui| {
                        ui.strong("#");
                    });
                    for col in &head.columns {
                        header.col(|ui| {
                            ui.strong(&col.name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, head.len(), |mut row| {
                        let r = row.index();
                        let label = labels.get(r).copied().unwrap_or(r);
                        row.col(|ui| {
                            ui.label(RichText::new(label.to_string()).weak());
                        });
                        for col in &head.columns {
                            row.col(|ui| {
                                if let Some(v) = col.values.get(r) {
                                    ui.label(v.to_string());
                                }
                            });
                        }
                    });
                });
        });
    });
}

fn summary_table(ui: &mut Ui, summary: &[Summary]) {
    ui.push_id("summary_table", |ui: &mut Ui| {
        egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .column(Column::auto())
                .columns(Column::auto().at_least(80.0), summary.len())
                .header(ROW_HEIGHT + 4.0, |mut header| {
                    header.col(|ui| {
                        ui.strong("");
                    });
                    for s in summary {
                        header.col(|ui| {
                            ui.strong(&s.column);
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, Summary::LABELS.len(), |mut row| {
                        let stat = row.index();
                        row.col(|ui| {
                            ui.strong(Summary::LABELS[stat]);
                        });
                        for s in summary {
                            row.col(|ui| {
                                ui.label(format_stat(s.values()[stat]));
                            });
                        }
                    });
                });
        });
    });
}

/// Six decimal places, as `describe()` prints them.
fn format_stat(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{v:.6}")
    }
}
