//! Chart selection and UI-free chart data.
//!
//! Every enabled chart is turned into a [`ChartData`] value here; the
//! rendering layer only draws what it is given.

use std::collections::HashMap;

use crate::data::model::{CellValue, Dataset};
use crate::data::stats::{
    self, BoxSummary, CorrelationMatrix, HistogramBin, paired_points, sorted_by_x, totals_by_x,
};
use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// Tabs and chart kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartTab {
    #[default]
    Distributions,
    Relationships,
    Correlation,
}

impl ChartTab {
    pub const ALL: [ChartTab; 3] = [
        ChartTab::Distributions,
        ChartTab::Relationships,
        ChartTab::Correlation,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ChartTab::Distributions => "Distributions",
            ChartTab::Relationships => "Relationships",
            ChartTab::Correlation => "Correlation",
        }
    }

    /// Charts shown under this tab, in display order.
    pub fn charts(self) -> &'static [ChartKind] {
        match self {
            ChartTab::Distributions => &[ChartKind::Histogram, ChartKind::BoxPlot],
            ChartTab::Relationships => &[ChartKind::Scatter, ChartKind::Line, ChartKind::Bar],
            ChartTab::Correlation => &[ChartKind::CorrelationHeatmap],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChartKind {
    Histogram,
    BoxPlot,
    Scatter,
    Line,
    Bar,
    CorrelationHeatmap,
}

impl ChartKind {
    pub const ALL: [ChartKind; 6] = [
        ChartKind::Histogram,
        ChartKind::BoxPlot,
        ChartKind::Scatter,
        ChartKind::Line,
        ChartKind::Bar,
        ChartKind::CorrelationHeatmap,
    ];

    /// Checkbox label.
    pub fn label(self) -> &'static str {
        match self {
            ChartKind::Histogram => "Show Histogram",
            ChartKind::BoxPlot => "Show Box Plot",
            ChartKind::Scatter => "Show Scatter Plot",
            ChartKind::Line => "Show Line Chart",
            ChartKind::Bar => "Show Bar Chart",
            ChartKind::CorrelationHeatmap => "Show Correlation Heatmap",
        }
    }

    /// Stable id for the egui plot widget.
    pub fn plot_id(self) -> &'static str {
        match self {
            ChartKind::Histogram => "histogram",
            ChartKind::BoxPlot => "box_plot",
            ChartKind::Scatter => "scatter",
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
            ChartKind::CorrelationHeatmap => "correlation_heatmap",
        }
    }
}

/// Checkbox state; everything starts disabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChartToggles {
    pub histogram: bool,
    pub box_plot: bool,
    pub scatter: bool,
    pub line: bool,
    pub bar: bool,
    pub correlation: bool,
}

impl ChartToggles {
    pub fn flag_mut(&mut self, kind: ChartKind) -> &mut bool {
        match kind {
            ChartKind::Histogram => &mut self.histogram,
            ChartKind::BoxPlot => &mut self.box_plot,
            ChartKind::Scatter => &mut self.scatter,
            ChartKind::Line => &mut self.line,
            ChartKind::Bar => &mut self.bar,
            ChartKind::CorrelationHeatmap => &mut self.correlation,
        }
    }

    pub fn is_enabled(&self, kind: ChartKind) -> bool {
        match kind {
            ChartKind::Histogram => self.histogram,
            ChartKind::BoxPlot => self.box_plot,
            ChartKind::Scatter => self.scatter,
            ChartKind::Line => self.line,
            ChartKind::Bar => self.bar,
            ChartKind::CorrelationHeatmap => self.correlation,
        }
    }

    pub fn set(&mut self, kind: ChartKind, enabled: bool) {
        *self.flag_mut(kind) = enabled;
    }

    pub fn enabled(&self) -> Vec<ChartKind> {
        ChartKind::ALL
            .into_iter()
            .filter(|k| self.is_enabled(*k))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Chart data
// ---------------------------------------------------------------------------

/// One colour group of a scatter plot.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterGroup {
    /// Category value; `None` when the plot is not grouped.
    pub value: Option<CellValue>,
    pub points: Vec<[f64; 2]>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    Histogram {
        column: String,
        bins: Vec<HistogramBin>,
    },
    BoxPlot {
        column: String,
        summary: Option<BoxSummary>,
    },
    Scatter {
        x: String,
        y: String,
        groups: Vec<ScatterGroup>,
    },
    Line {
        x: String,
        y: String,
        points: Vec<[f64; 2]>,
    },
    Bar {
        x: String,
        y: String,
        bars: Vec<[f64; 2]>,
    },
    Heatmap(CorrelationMatrix),
}

/// Everything a chart builder reads.
#[derive(Debug, Clone, Copy)]
pub struct ChartInputs<'a> {
    /// Filtered and row-capped frame.
    pub plot_data: &'a Dataset,
    /// Filtered frame without the row cap (correlation uses all rows).
    pub full_data: &'a Dataset,
    pub x: &'a str,
    pub y: &'a str,
    /// Categorical column used to colour the scatter plot.
    pub color_by: Option<&'a str>,
    pub histogram_bins: usize,
}

pub fn build_chart(kind: ChartKind, input: &ChartInputs<'_>) -> Result<ChartData, DashboardError> {
    let data = input.plot_data;
    match kind {
        ChartKind::Histogram => {
            let values: Vec<f64> = data.numeric_column(input.x)?.numbers().flatten().collect();
            Ok(ChartData::Histogram {
                column: input.x.to_string(),
                bins: stats::histogram(&values, input.histogram_bins),
            })
        }
        ChartKind::BoxPlot => {
            let values: Vec<f64> = data.numeric_column(input.y)?.numbers().flatten().collect();
            Ok(ChartData::BoxPlot {
                column: input.y.to_string(),
                summary: stats::box_summary(&values),
            })
        }
        ChartKind::Scatter => Ok(ChartData::Scatter {
            x: input.x.to_string(),
            y: input.y.to_string(),
            groups: scatter_groups(data, input.x, input.y, input.color_by)?,
        }),
        ChartKind::Line => Ok(ChartData::Line {
            x: input.x.to_string(),
            y: input.y.to_string(),
            points: sorted_by_x(paired_points(data, input.x, input.y)?),
        }),
        ChartKind::Bar => Ok(ChartData::Bar {
            x: input.x.to_string(),
            y: input.y.to_string(),
            bars: totals_by_x(&paired_points(data, input.x, input.y)?),
        }),
        ChartKind::CorrelationHeatmap => {
            let columns = input.full_data.numeric_columns();
            Ok(ChartData::Heatmap(stats::correlation_matrix(
                input.full_data,
                &columns,
            )?))
        }
    }
}

/// Build data for every enabled chart; disabled charts are absent.
pub fn build_enabled(
    toggles: &ChartToggles,
    input: &ChartInputs<'_>,
) -> Result<Vec<(ChartKind, ChartData)>, DashboardError> {
    toggles
        .enabled()
        .into_iter()
        .map(|kind| Ok((kind, build_chart(kind, input)?)))
        .collect()
}

fn scatter_groups(
    data: &Dataset,
    x: &str,
    y: &str,
    color_by: Option<&str>,
) -> Result<Vec<ScatterGroup>, DashboardError> {
    let Some(category) = color_by.and_then(|c| data.column(c)) else {
        return Ok(vec![ScatterGroup {
            value: None,
            points: paired_points(data, x, y)?,
        }]);
    };

    let xs = data.numeric_column(x)?;
    let ys = data.numeric_column(y)?;
    let values = data.unique_values(&category.name)?;
    let slot: HashMap<&CellValue, usize> = values.iter().enumerate().map(|(i, v)| (v, i)).collect();
    let mut points: Vec<Vec<[f64; 2]>> = vec![Vec::new(); values.len()];

    for ((xv, yv), cat) in xs.numbers().zip(ys.numbers()).zip(&category.values) {
        let (Some(xv), Some(yv)) = (xv, yv) else {
            continue;
        };
        if let Some(&i) = slot.get(cat) {
            points[i].push([xv, yv]);
        }
    }
    Ok(values
        .iter()
        .zip(points)
        .map(|(value, points)| ScatterGroup {
            value: Some(value.clone()),
            points,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_csv_reader;
    use crate::data::sample::iris;

    fn inputs<'a>(ds: &'a Dataset, x: &'a str, y: &'a str) -> ChartInputs<'a> {
        ChartInputs {
            plot_data: ds,
            full_data: ds,
            x,
            y,
            color_by: None,
            histogram_bins: 0,
        }
    }

    fn all_enabled() -> ChartToggles {
        let mut t = ChartToggles::default();
        for kind in ChartKind::ALL {
            t.set(kind, true);
        }
        t
    }

    #[test]
    fn toggles_start_disabled() {
        let t = ChartToggles::default();
        assert!(t.enabled().is_empty());
        assert!(ChartKind::ALL.iter().all(|k| !t.is_enabled(*k)));
    }

    #[test]
    fn every_chart_sits_in_exactly_one_tab() {
        for kind in ChartKind::ALL {
            let tabs = ChartTab::ALL
                .iter()
                .filter(|t| t.charts().contains(&kind))
                .count();
            assert_eq!(tabs, 1, "{kind:?}");
        }
    }

    #[test]
    fn disabled_charts_are_absent() {
        let ds = iris().unwrap();
        let mut t = ChartToggles::default();
        t.set(ChartKind::Scatter, true);
        t.set(ChartKind::CorrelationHeatmap, true);
        let built = build_enabled(&t, &inputs(&ds, "sepal length (cm)", "sepal width (cm)")).unwrap();
        let kinds: Vec<ChartKind> = built.iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, vec![ChartKind::Scatter, ChartKind::CorrelationHeatmap]);

        t.set(ChartKind::Scatter, false);
        let built = build_enabled(&t, &inputs(&ds, "sepal length (cm)", "sepal width (cm)")).unwrap();
        assert_eq!(built.len(), 1);
    }

    #[test]
    fn all_charts_render_for_iris() {
        let ds = iris().unwrap();
        let built = build_enabled(
            &all_enabled(),
            &inputs(&ds, "petal length (cm)", "petal width (cm)"),
        )
        .unwrap();
        let kinds: Vec<ChartKind> = built.iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, ChartKind::ALL.to_vec());
        for (_, data) in &built {
            match data {
                ChartData::Histogram { bins, .. } => {
                    assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 150)
                }
                ChartData::BoxPlot { summary, .. } => assert!(summary.is_some()),
                ChartData::Scatter { groups, .. } => assert_eq!(groups[0].points.len(), 150),
                ChartData::Line { points, .. } => {
                    assert!(points.windows(2).all(|w| w[0][0] <= w[1][0]))
                }
                ChartData::Bar { bars, .. } => assert!(!bars.is_empty()),
                ChartData::Heatmap(m) => assert_eq!(m.columns.len(), 4),
            }
        }
    }

    #[test]
    fn all_charts_render_for_a_single_numeric_column() {
        let ds = load_csv_reader("v,label\n1,a\n,b\n3,c\n".as_bytes(), "one.csv").unwrap();
        let built = build_enabled(&all_enabled(), &inputs(&ds, "v", "v")).unwrap();
        assert_eq!(built.len(), 6);
    }

    #[test]
    fn all_charts_render_for_a_single_row() {
        let ds = load_csv_reader("a,b\n1,2\n".as_bytes(), "row.csv").unwrap();
        let built = build_enabled(&all_enabled(), &inputs(&ds, "a", "b")).unwrap();
        assert_eq!(built.len(), 6);
    }

    #[test]
    fn all_null_column_yields_empty_charts() {
        let ds = load_csv_reader("a,b\n,1\n,2\n".as_bytes(), "null.csv").unwrap();
        let built = build_enabled(&all_enabled(), &inputs(&ds, "a", "b")).unwrap();
        for (_, data) in built {
            match data {
                ChartData::Histogram { bins, .. } => assert!(bins.is_empty()),
                ChartData::Scatter { groups, .. } => assert!(groups[0].points.is_empty()),
                _ => {}
            }
        }
    }

    #[test]
    fn scatter_groups_by_category() {
        let ds = iris().unwrap();
        let mut input = inputs(&ds, "sepal length (cm)", "sepal width (cm)");
        input.color_by = Some("species");
        let ChartData::Scatter { groups, .. } = build_chart(ChartKind::Scatter, &input).unwrap() else {
            panic!("expected scatter data");
        };
        assert_eq!(groups.len(), 3);
        assert!(groups.iter().all(|g| g.points.len() == 50));
        assert_eq!(groups[0].value, Some(CellValue::Text("setosa".into())));
    }

    #[test]
    fn heatmap_uses_unsampled_rows() {
        let ds = iris().unwrap();
        let head = ds.head(2);
        let input = ChartInputs {
            plot_data: &head,
            full_data: &ds,
            x: "sepal length (cm)",
            y: "sepal width (cm)",
            color_by: None,
            histogram_bins: 0,
        };
        let ChartData::Heatmap(m) = build_chart(ChartKind::CorrelationHeatmap, &input).unwrap() else {
            panic!("expected heatmap");
        };
        assert!((m.get(2, 3) - 0.962865).abs() < 1e-5);
    }

    #[test]
    fn non_numeric_axis_is_an_error() {
        let ds = iris().unwrap();
        let err = build_chart(ChartKind::Histogram, &inputs(&ds, "species", "species")).unwrap_err();
        assert_eq!(err, DashboardError::NotNumeric("species".into()));
    }
}
