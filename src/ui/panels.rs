use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::config::DataSource;
use crate::state::{AppState, ViewStatus};

// ---------------------------------------------------------------------------
// Left side panel – data source and filter widgets
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Controls");
    ui.separator();

    // ---- Data source ----
    ui.strong("Choose Data Source");
    let mut source = state.source;
    for option in [DataSource::Sample, DataSource::Upload] {
        ui.radio_value(&mut source, option, option.label());
    }
    if source != state.source {
        state.set_source(source);
    }

    if state.source == DataSource::Upload {
        ui.add_space(4.0);
        if ui.button("Upload CSV…").clicked() {
            open_file_dialog(state);
        }
        if let Some(path) = &state.uploaded_path {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            ui.label(RichText::new(name).weak());
        }
    }
    ui.separator();

    // ---- Category filter ----
    let Some(dataset) = state.active_dataset() else {
        ui.label("No dataset loaded.");
        return;
    };
    if dataset.validate().is_err() {
        return;
    }
    let categories = dataset.categorical_columns();
    if categories.is_empty() {
        return;
    }
    let Some(filter) = state.filter.clone() else {
        return;
    };

    ui.strong("Filter column");
    egui::ComboBox::from_id_salt("filter_column")
        .selected_text(&filter.column)
        .show_ui(ui, |ui: &mut Ui| {
            for col in &categories {
                if ui.selectable_label(filter.column == *col, col).clicked()
                    && filter.column != *col
                {
                    state.set_filter_column(col);
                }
            }
        });

    // Show count of selected / total in the header
    let header_text = format!(
        "Select {}  ({}/{})",
        filter.column,
        filter.selected.len(),
        filter.options.len()
    );

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .id_salt("filter_values")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    // Select all / none buttons
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all();
                        }
                        if ui.small_button("None").clicked() {
                            state.select_none();
                        }
                    });

                    for val in &filter.options {
                        let mut text = RichText::new(val.to_string());
                        if let Some(cm) = &state.color_map {
                            text = text.color(cm.color_for(val));
                        }
                        let mut checked = filter.is_selected(val);
                        if ui.checkbox(&mut checked, text).changed() {
                            state.toggle_filter_value(val);
                        }
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Sample Iris Dataset").clicked() {
                state.set_source(DataSource::Sample);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = state.active_dataset() {
            ui.label(format!("{}: {} rows × {} columns", ds.name, ds.len(), ds.columns.len()));
        }
        if let ViewStatus::Ready(view) = &state.view {
            ui.separator();
            let mut text = format!("{} visible", view.filtered.len());
            if view.is_sampled() {
                text.push_str(&format!(", plotting {}", view.plot_data.len()));
            }
            ui.label(text);
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open dataset")
        .add_filter("CSV", &["csv"])
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}
