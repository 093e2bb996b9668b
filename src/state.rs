use std::path::{Path, PathBuf};

use crate::charts::{ChartData, ChartInputs, ChartKind, ChartTab, ChartToggles, build_enabled};
use crate::color::ColorMap;
use crate::config::{DashboardConfig, DataSource};
use crate::data::filter::{CategoryFilter, filtered_indices};
use crate::data::model::{CellValue, Dataset};
use crate::data::sampling::sample_indices;
use crate::data::stats::{Summary, describe};
use crate::data::{loader, sample};
use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// Derived view
// ---------------------------------------------------------------------------

/// Everything rendered below the controls, derived from the active dataset.
#[derive(Debug, Clone)]
pub struct DatasetView {
    /// Rows passing the category filter.
    pub filtered: Dataset,
    /// Source row index of each row in `filtered`.
    pub row_labels: Vec<usize>,
    /// `filtered` after the row cap.
    pub plot_data: Dataset,
    pub summary: Vec<Summary>,
    pub numeric_columns: Vec<String>,
}

impl DatasetView {
    pub fn is_sampled(&self) -> bool {
        self.plot_data.len() < self.filtered.len()
    }

    /// First `rows` filtered rows with their source row labels.
    pub fn preview(&self, rows: usize) -> (&[usize], Dataset) {
        let n = rows.min(self.row_labels.len());
        (&self.row_labels[..n], self.filtered.head(rows))
    }
}

/// What the main area shows this frame.
#[derive(Debug, Clone)]
pub enum ViewStatus {
    /// Upload source selected, nothing uploaded yet.
    AwaitingUpload,
    /// The dataset cannot drive the dashboard.
    Invalid(DashboardError),
    /// The filter removed every row.
    EmptyAfterFilter,
    Ready(Box<DatasetView>),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    pub source: DataSource,

    /// Bundled sample, loaded once.
    pub sample: Option<Dataset>,

    /// Last successfully loaded upload.
    pub uploaded: Option<Dataset>,
    pub uploaded_path: Option<PathBuf>,

    /// Category filter (only when the dataset has categorical columns).
    pub filter: Option<CategoryFilter>,

    /// Colours for the filter column's values.
    pub color_map: Option<ColorMap>,

    pub x_column: Option<String>,
    pub y_column: Option<String>,

    pub toggles: ChartToggles,
    pub active_tab: ChartTab,

    pub view: ViewStatus,

    /// Built data for enabled charts (cached).
    pub charts: Vec<(ChartKind, ChartData)>,
    /// Error from the last chart build, if any.
    pub chart_error: Option<DashboardError>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = Self {
            source: config.default_source,
            config,
            sample: None,
            uploaded: None,
            uploaded_path: None,
            filter: None,
            color_map: None,
            x_column: None,
            y_column: None,
            toggles: ChartToggles::default(),
            active_tab: ChartTab::default(),
            view: ViewStatus::AwaitingUpload,
            charts: Vec::new(),
            chart_error: None,
            status_message: None,
        };
        state.on_dataset_changed();
        state
    }

    /// The dataset for the current source.
    pub fn active_dataset(&self) -> Option<&Dataset> {
        match self.source {
            DataSource::Sample => self.sample.as_ref(),
            DataSource::Upload => self.uploaded.as_ref(),
        }
    }

    fn ensure_sample(&mut self) {
        if self.source != DataSource::Sample || self.sample.is_some() {
            return;
        }
        match sample::iris() {
            Ok(ds) => self.sample = Some(ds),
            Err(e) => {
                log::error!("Failed to load sample dataset: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    // -- inputs --

    pub fn set_source(&mut self, source: DataSource) {
        if self.source == source {
            return;
        }
        self.source = source;
        self.on_dataset_changed();
    }

    /// Load a file and make it the active upload.
    pub fn load_path(&mut self, path: &Path) {
        match loader::load_file(path) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} rows with columns {:?}",
                    dataset.len(),
                    dataset.column_names()
                );
                self.set_uploaded(dataset, Some(path.to_path_buf()));
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest an uploaded dataset and switch to it.
    pub fn set_uploaded(&mut self, dataset: Dataset, path: Option<PathBuf>) {
        self.uploaded = Some(dataset);
        self.uploaded_path = path;
        self.source = DataSource::Upload;
        self.status_message = None;
        self.on_dataset_changed();
    }

    /// Choose the categorical column to filter on; all its values start selected.
    /// Re-choosing the current column keeps its selection.
    pub fn set_filter_column(&mut self, column: &str) {
        if self.filter.as_ref().is_some_and(|f| f.column == column) {
            return;
        }
        let Some(ds) = self.active_dataset() else {
            return;
        };
        match CategoryFilter::new(ds, column) {
            Ok(filter) => {
                self.color_map = Some(ColorMap::new(column, &filter.options));
                self.filter = Some(filter);
            }
            Err(e) => log::warn!("cannot filter on {column}: {e}"),
        }
        self.refilter();
    }

    pub fn toggle_filter_value(&mut self, value: &CellValue) {
        if let Some(f) = &mut self.filter {
            f.toggle(value);
            self.refilter();
        }
    }

    pub fn select_all(&mut self) {
        if let Some(f) = &mut self.filter {
            f.select_all();
            self.refilter();
        }
    }

    pub fn select_none(&mut self) {
        if let Some(f) = &mut self.filter {
            f.select_none();
            self.refilter();
        }
    }

    pub fn set_x_column(&mut self, column: String) {
        self.x_column = Some(column);
        self.rebuild_charts();
    }

    pub fn set_y_column(&mut self, column: String) {
        self.y_column = Some(column);
        self.rebuild_charts();
    }

    pub fn set_chart_enabled(&mut self, kind: ChartKind, enabled: bool) {
        self.toggles.set(kind, enabled);
        self.rebuild_charts();
    }

    pub fn chart(&self, kind: ChartKind) -> Option<&ChartData> {
        self.charts.iter().find(|(k, _)| *k == kind).map(|(_, d)| d)
    }

    // -- recomputation --

    /// New dataset or source: reset the filter, then recompute everything.
    fn on_dataset_changed(&mut self) {
        self.ensure_sample();
        self.filter = None;
        self.color_map = None;

        let first_category = self
            .active_dataset()
            .filter(|ds| ds.validate().is_ok())
            .and_then(|ds| ds.categorical_columns().into_iter().next());
        match first_category {
            Some(col) => self.set_filter_column(&col),
            None => self.refilter(),
        }
    }

    /// Recompute the derived view from the active dataset and filter.
    pub fn refilter(&mut self) {
        self.view = self.compute_view();
        if let ViewStatus::Ready(view) = &self.view {
            let numeric = &view.numeric_columns;
            let keep = |c: &Option<String>| c.as_ref().is_some_and(|c| numeric.contains(c));
            if !keep(&self.x_column) {
                self.x_column = numeric.first().cloned();
            }
            if !keep(&self.y_column) {
                self.y_column = numeric.get(1).or_else(|| numeric.first()).cloned();
            }
            log::debug!(
                "view: {} filtered rows, {} plotted",
                view.filtered.len(),
                view.plot_data.len()
            );
        }
        self.rebuild_charts();
    }

    fn compute_view(&self) -> ViewStatus {
        let Some(ds) = self.active_dataset() else {
            return match self.source {
                DataSource::Upload => ViewStatus::AwaitingUpload,
                DataSource::Sample => ViewStatus::Invalid(DashboardError::EmptyDataset),
            };
        };
        if let Err(e) = ds.validate() {
            return ViewStatus::Invalid(e);
        }

        let visible = filtered_indices(ds, self.filter.as_ref());
        if visible.is_empty() {
            return ViewStatus::EmptyAfterFilter;
        }
        let plotted = sample_indices(&visible, self.config.max_points, self.config.sampling);

        let filtered = ds.take_rows(&visible);
        let plot_data = ds.take_rows(&plotted);
        ViewStatus::Ready(Box::new(DatasetView {
            summary: describe(&filtered),
            numeric_columns: filtered.numeric_columns(),
            filtered,
            row_labels: visible,
            plot_data,
        }))
    }

    /// Rebuild data for the enabled charts.
    pub fn rebuild_charts(&mut self) {
        self.charts.clear();
        self.chart_error = None;
        let ViewStatus::Ready(view) = &self.view else {
            return;
        };
        let (Some(x), Some(y)) = (&self.x_column, &self.y_column) else {
            return;
        };
        let input = ChartInputs {
            plot_data: &view.plot_data,
            full_data: &view.filtered,
            x,
            y,
            color_by: self.filter.as_ref().map(|f| f.column.as_str()),
            histogram_bins: self.config.histogram_bins,
        };
        match build_enabled(&self.toggles, &input) {
            Ok(charts) => self.charts = charts,
            Err(e) => {
                log::error!("chart build failed: {e}");
                self.chart_error = Some(e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_csv_reader;
    use crate::data::sampling::SamplingMode;

    fn ready(state: &AppState) -> &DatasetView {
        match &state.view {
            ViewStatus::Ready(v) => v.as_ref(),
            other => panic!("expected ready view, got {other:?}"),
        }
    }

    #[test]
    fn starts_on_the_sample_dataset() {
        let state = AppState::default();
        let view = ready(&state);
        assert_eq!(view.filtered.len(), 150);
        assert_eq!(state.filter.as_ref().unwrap().column, "species");
        assert_eq!(state.x_column.as_deref(), Some("sepal length (cm)"));
        assert_eq!(state.y_column.as_deref(), Some("sepal width (cm)"));
        assert!(state.charts.is_empty());
    }

    #[test]
    fn upload_source_without_file_waits() {
        let mut state = AppState::default();
        state.set_source(DataSource::Upload);
        assert!(matches!(state.view, ViewStatus::AwaitingUpload));
        state.set_source(DataSource::Sample);
        assert!(matches!(state.view, ViewStatus::Ready(_)));
    }

    #[test]
    fn uploaded_csv_summary() {
        let csv = "a,b,g\n1,10,x\n2,20,y\n3,30,x\n4,40,y\n";
        let ds = load_csv_reader(csv.as_bytes(), "up.csv").unwrap();
        let mut state = AppState::default();
        state.set_uploaded(ds, None);

        let view = ready(&state);
        assert_eq!(view.summary.len(), 2);
        assert_eq!(view.summary[1].column, "b");
        assert_eq!(view.summary[1].mean, 25.0);
        assert_eq!(view.summary[1].q50, 25.0);
    }

    #[test]
    fn preview_shows_first_filtered_rows() {
        // n = 1..=15; the first three rows are group "a", the rest "b"
        let mut csv = String::from("n,grp\n");
        for i in 1..=15 {
            let grp = if i <= 3 { "a" } else { "b" };
            csv.push_str(&format!("{i},{grp}\n"));
        }
        let ds = load_csv_reader(csv.as_bytes(), "p.csv").unwrap();
        let mut state = AppState::default();
        state.set_uploaded(ds, None);

        let (labels, head) = ready(&state).preview(state.config.preview_rows);
        assert_eq!(head.len(), 10);
        assert_eq!(labels, (0..10usize).collect::<Vec<_>>().as_slice());
        for r in 0..10 {
            let expected_grp = if r < 3 { "a" } else { "b" };
            assert_eq!(head.columns[0].values[r], CellValue::Number((r + 1) as f64));
            assert_eq!(head.columns[1].values[r], CellValue::Text(expected_grp.into()));
        }

        state.toggle_filter_value(&CellValue::Text("a".into()));
        let (labels, head) = ready(&state).preview(state.config.preview_rows);
        assert_eq!(head.len(), 10);
        assert_eq!(labels, (3..13usize).collect::<Vec<_>>().as_slice());
        assert_eq!(head.columns[0].values[0], CellValue::Number(4.0));
        assert_eq!(head.columns[0].values[9], CellValue::Number(13.0));
        assert!(head.columns[1].values.iter().all(|v| *v == CellValue::Text("b".into())));
    }

    #[test]
    fn reselecting_filter_column_keeps_selection() {
        let mut state = AppState::default();
        state.toggle_filter_value(&CellValue::Text("setosa".into()));
        assert_eq!(ready(&state).row_labels[0], 50);
        state.set_filter_column("species");
        assert_eq!(ready(&state).filtered.len(), 100);
        assert_eq!(state.filter.as_ref().unwrap().selected.len(), 2);
    }

    #[test]
    fn invalid_uploads_report_errors() {
        let mut state = AppState::default();
        let empty = load_csv_reader("a,b\n".as_bytes(), "e.csv").unwrap();
        state.set_uploaded(empty, None);
        assert!(matches!(
            state.view,
            ViewStatus::Invalid(DashboardError::EmptyDataset)
        ));

        let text = load_csv_reader("a\nx\ny\n".as_bytes(), "t.csv").unwrap();
        state.set_uploaded(text, None);
        assert!(matches!(
            state.view,
            ViewStatus::Invalid(DashboardError::NoNumericColumns)
        ));
    }

    #[test]
    fn filtering_everything_out_is_reported() {
        let mut state = AppState::default();
        state.select_none();
        assert!(matches!(state.view, ViewStatus::EmptyAfterFilter));
        state.toggle_filter_value(&CellValue::Text("virginica".into()));
        assert_eq!(ready(&state).filtered.len(), 50);
        state.select_all();
        assert_eq!(ready(&state).filtered.len(), 150);
    }

    #[test]
    fn row_cap_limits_plot_data_only() {
        let config = DashboardConfig {
            max_points: 40,
            sampling: SamplingMode::Random { seed: 11 },
            ..DashboardConfig::default()
        };
        let state = AppState::new(config);
        let view = ready(&state);
        assert_eq!(view.filtered.len(), 150);
        assert_eq!(view.plot_data.len(), 40);
        assert!(view.is_sampled());
        assert_eq!(view.plot_data.column_names(), view.filtered.column_names());
    }

    #[test]
    fn chart_checkboxes_control_presence() {
        let mut state = AppState::default();
        for kind in ChartKind::ALL {
            assert!(state.chart(kind).is_none());
            state.set_chart_enabled(kind, true);
            assert!(state.chart(kind).is_some(), "{kind:?} should render");
            assert!(state.chart_error.is_none());
        }
        state.set_chart_enabled(ChartKind::Bar, false);
        assert!(state.chart(ChartKind::Bar).is_none());
        assert_eq!(state.charts.len(), 5);
    }

    #[test]
    fn single_numeric_column_uses_it_for_both_axes() {
        let ds = load_csv_reader("v,label\n1,a\n2,b\n".as_bytes(), "one.csv").unwrap();
        let mut state = AppState::default();
        state.set_uploaded(ds, None);
        assert_eq!(state.x_column.as_deref(), Some("v"));
        assert_eq!(state.y_column.as_deref(), Some("v"));
        for kind in ChartKind::ALL {
            state.set_chart_enabled(kind, true);
        }
        assert_eq!(state.charts.len(), 6);
    }

    #[test]
    fn failed_load_keeps_previous_state() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::default();
        state.load_path(&dir.path().join("missing.csv"));
        assert!(state.status_message.is_some());
        assert_eq!(state.source, DataSource::Sample);
        assert!(matches!(state.view, ViewStatus::Ready(_)));
    }
}
