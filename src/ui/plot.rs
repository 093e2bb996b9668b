use eframe::egui::{self, Align2, Color32, RichText, Stroke, Ui};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Line, Plot, PlotPoint, Points, Polygon,
    Text,
};

use crate::charts::{ChartData, ChartKind, ChartTab, ScatterGroup};
use crate::color::{ColorMap, contrasting_text, diverging};
use crate::data::stats::CorrelationMatrix;
use crate::state::{AppState, ViewStatus};
use crate::ui::overview;

const CHART_HEIGHT: f32 = 320.0;
const ACCENT: Color32 = Color32::from_rgb(99, 110, 250);

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the dashboard body: overview, axis controls and chart tabs.
pub fn main_area(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Interactive EDA Dashboard");
    ui.add_space(4.0);

    let numeric = match &state.view {
        ViewStatus::AwaitingUpload => {
            ui.label(RichText::new("Upload a CSV file to continue.").color(Color32::YELLOW));
            return;
        }
        ViewStatus::Invalid(e) => {
            ui.label(RichText::new(e.to_string()).color(Color32::RED));
            return;
        }
        ViewStatus::EmptyAfterFilter => {
            ui.label(RichText::new("No data after filtering.").color(Color32::YELLOW));
            return;
        }
        ViewStatus::Ready(view) => {
            overview::data_overview(ui, view, state.config.preview_rows);
            view.numeric_columns.clone()
        }
    };

    ui.separator();
    axis_selectors(ui, state, &numeric);

    ui.add_space(6.0);
    ui.heading("Visualizations");
    ui.horizontal(|ui: &mut Ui| {
        for tab in ChartTab::ALL {
            ui.selectable_value(&mut state.active_tab, tab, tab.label());
        }
    });
    ui.separator();

    if let Some(err) = &state.chart_error {
        ui.label(RichText::new(err.to_string()).color(Color32::RED));
    }

    for &kind in state.active_tab.charts() {
        let mut enabled = state.toggles.is_enabled(kind);
        if ui.checkbox(&mut enabled, kind.label()).changed() {
            state.set_chart_enabled(kind, enabled);
        }
        if let Some(data) = state.chart(kind) {
            draw_chart(ui, kind, data, state.color_map.as_ref());
            ui.add_space(8.0);
        }
    }

    ui.separator();
    ui.label(RichText::new("Optimized EDA Dashboard • Cached • Safe • Stable").small().weak());
}

fn axis_selectors(ui: &mut Ui, state: &mut AppState, numeric: &[String]) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label("X-axis");
        let current_x = state.x_column.clone().unwrap_or_default();
        egui::ComboBox::from_id_salt("x_axis")
            .selected_text(&current_x)
            .show_ui(ui, |ui: &mut Ui| {
                for col in numeric {
                    if ui.selectable_label(current_x == *col, col).clicked() {
                        state.set_x_column(col.clone());
                    }
                }
            });

        ui.add_space(12.0);
        ui.label("Y-axis");
        let current_y = state.y_column.clone().unwrap_or_default();
        egui::ComboBox::from_id_salt("y_axis")
            .selected_text(&current_y)
            .show_ui(ui, |ui: &mut Ui| {
                for col in numeric {
                    if ui.selectable_label(current_y == *col, col).clicked() {
                        state.set_y_column(col.clone());
                    }
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Chart rendering
// ---------------------------------------------------------------------------

fn draw_chart(ui: &mut Ui, kind: ChartKind, data: &ChartData, color_map: Option<&ColorMap>) {
    let plot = || Plot::new(kind.plot_id()).height(CHART_HEIGHT);
    match data {
        ChartData::Histogram { column, bins } => {
            let bars: Vec<Bar> = bins
                .iter()
                .map(|b| Bar::new(b.center(), b.count as f64).width(b.width()))
                .collect();
            plot()
                .x_axis_label(column.as_str())
                .y_axis_label("count")
                .show(ui, |plot_ui| {
                    plot_ui.bar_chart(BarChart::new(bars).color(ACCENT).name(column.as_str()));
                });
        }
        ChartData::BoxPlot { column, summary } => {
            let Some(s) = summary else {
                ui.label(RichText::new(format!("No values in {column}")).weak());
                return;
            };
            let spread = BoxSpread::new(s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker);
            let elem = BoxElem::new(0.0, spread)
                .name(column.as_str())
                .box_width(0.5)
                .whisker_width(0.25);
            let outliers: Vec<[f64; 2]> = s.outliers.iter().map(|&v| [0.0, v]).collect();
            plot()
                .y_axis_label(column.as_str())
                .show(ui, |plot_ui| {
                    plot_ui.box_plot(BoxPlot::new(vec![elem]).color(ACCENT).name(column.as_str()));
                    if !outliers.is_empty() {
                        plot_ui.points(Points::new(outliers).radius(3.0).color(ACCENT).name("outliers"));
                    }
                });
        }
        ChartData::Scatter { x, y, groups } => {
            plot()
                .x_axis_label(x.as_str())
                .y_axis_label(y.as_str())
                .legend(Legend::default())
                .show(ui, |plot_ui| {
                    for group in groups {
                        let (name, color) = scatter_style(group, color_map);
                        plot_ui.points(
                            Points::new(group.points.clone())
                                .radius(2.5)
                                .color(color)
                                .name(name),
                        );
                    }
                });
        }
        ChartData::Line { x, y, points } => {
            plot()
                .x_axis_label(x.as_str())
                .y_axis_label(y.as_str())
                .show(ui, |plot_ui| {
                    plot_ui.line(Line::new(points.clone()).color(ACCENT).width(1.5).name(y.as_str()));
                });
        }
        ChartData::Bar { x, y, bars } => {
            let width = bar_width(bars);
            let bars: Vec<Bar> = bars.iter().map(|[bx, by]| Bar::new(*bx, *by).width(width)).collect();
            plot()
                .x_axis_label(x.as_str())
                .y_axis_label(y.as_str())
                .show(ui, |plot_ui| {
                    plot_ui.bar_chart(BarChart::new(bars).color(ACCENT).name(y.as_str()));
                });
        }
        ChartData::Heatmap(matrix) => heatmap(ui, kind, matrix),
    }
}

fn scatter_style(group: &ScatterGroup, color_map: Option<&ColorMap>) -> (String, Color32) {
    match (&group.value, color_map) {
        (Some(value), Some(cm)) => (value.to_string(), cm.color_for(value)),
        (Some(value), None) => (value.to_string(), ACCENT),
        (None, _) => ("rows".to_string(), ACCENT),
    }
}

/// 80 % of the smallest gap between neighbouring bars.
fn bar_width(bars: &[[f64; 2]]) -> f64 {
    let gap = bars
        .windows(2)
        .map(|w| w[1][0] - w[0][0])
        .filter(|g| *g > 0.0)
        .fold(f64::INFINITY, f64::min);
    if gap.is_finite() { gap * 0.8 } else { 0.8 }
}

/// Annotated correlation grid; row 0 is drawn at the top.
fn heatmap(ui: &mut Ui, kind: ChartKind, matrix: &CorrelationMatrix) {
    let n = matrix.columns.len();
    Plot::new(kind.plot_id())
        .height(CHART_HEIGHT)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .allow_boxed_zoom(false)
        .show(ui, |plot_ui| {
            for i in 0..n {
                let y = (n - 1 - i) as f64;
                for j in 0..n {
                    let x = j as f64;
                    let r = matrix.get(i, j);
                    let fill = diverging(r);
                    let cell = vec![
                        [x - 0.5, y - 0.5],
                        [x + 0.5, y - 0.5],
                        [x + 0.5, y + 0.5],
                        [x - 0.5, y + 0.5],
                    ];
                    plot_ui.polygon(
                        Polygon::new(cell)
                            .fill_color(fill)
                            .stroke(Stroke::new(1.0, Color32::WHITE)),
                    );
                    let label = if r.is_nan() { String::new() } else { format!("{r:.2}") };
                    plot_ui.text(
                        Text::new(PlotPoint::new(x, y), RichText::new(label).small())
                            .color(contrasting_text(fill)),
                    );
                }
                plot_ui.text(
                    Text::new(PlotPoint::new(-0.6, y), matrix.columns[i].as_str())
                        .anchor(Align2::RIGHT_CENTER),
                );
            }
            for (j, name) in matrix.columns.iter().enumerate() {
                plot_ui.text(
                    Text::new(PlotPoint::new(j as f64, -0.6), name.as_str())
                        .anchor(Align2::CENTER_TOP),
                );
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_width_follows_smallest_gap() {
        assert!((bar_width(&[[1.0, 1.0], [1.5, 2.0], [3.5, 1.0]]) - 0.4).abs() < 1e-12);
        assert_eq!(bar_width(&[[2.0, 1.0]]), 0.8);
        assert_eq!(bar_width(&[]), 0.8);
    }
}
