//! Descriptive statistics and chart-series preparation over numeric columns.
//!
//! Nulls and NaN are skipped everywhere. Quantiles use linear interpolation
//! between closest ranks, the same rule as `DataFrame.describe()`.

use super::model::Dataset;
use crate::error::DashboardError;

// ---------------------------------------------------------------------------
// Summary (describe)
// ---------------------------------------------------------------------------

/// Per-column summary row of the "statistical summary" table.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1 denominator).
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl Summary {
    pub const LABELS: [&'static str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

    /// Statistics in the order of [`Summary::LABELS`].
    pub fn values(&self) -> [f64; 8] {
        [
            self.count as f64,
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.q50,
            self.q75,
            self.max,
        ]
    }

    pub fn from_values(column: &str, values: &[f64]) -> Self {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        sorted.sort_by(f64::total_cmp);
        let count = sorted.len();
        let mean = mean(&sorted);
        Summary {
            column: column.to_string(),
            count,
            mean,
            std: sample_std(&sorted, mean),
            min: sorted.first().copied().unwrap_or(f64::NAN),
            q25: quantile_sorted(&sorted, 0.25),
            q50: quantile_sorted(&sorted, 0.5),
            q75: quantile_sorted(&sorted, 0.75),
            max: sorted.last().copied().unwrap_or(f64::NAN),
        }
    }
}

/// Summary for every numeric column, in table order.
pub fn describe(dataset: &Dataset) -> Vec<Summary> {
    dataset
        .columns
        .iter()
        .filter(|c| c.is_numeric())
        .map(|c| {
            let values: Vec<f64> = c.numbers().flatten().collect();
            Summary::from_values(&c.name, &values)
        })
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_std(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (ss / (values.len() - 1) as f64).sqrt()
}

/// Linear-interpolated quantile of an ascending slice; NaN when empty.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

// ---------------------------------------------------------------------------
// Correlation
// ---------------------------------------------------------------------------

/// Square matrix of pairwise Pearson coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major, `columns.len()` × `columns.len()`.
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.values
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(f64::NAN)
    }
}

/// Pairwise Pearson correlation on pairwise-complete rows.
///
/// Fewer than two complete pairs, or zero variance in either column, gives NaN.
pub fn correlation_matrix(
    dataset: &Dataset,
    columns: &[String],
) -> Result<CorrelationMatrix, DashboardError> {
    let series: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|name| Ok(dataset.numeric_column(name)?.numbers().collect()))
        .collect::<Result<_, DashboardError>>()?;

    let n = columns.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = pearson(&series[i], &series[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }
    Ok(CorrelationMatrix {
        columns: columns.to_vec(),
        values,
    })
}

fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0)
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Upper bound on automatically chosen bin counts.
const MAX_AUTO_BINS: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl HistogramBin {
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Equal-width bins over `[min, max]`; the last bin is closed on the right.
///
/// `bins == 0` picks Sturges' rule. Constant input yields one unit-wide bin.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let data: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if data.is_empty() {
        return Vec::new();
    }
    let min = data.iter().copied().fold(f64::INFINITY, f64::min);
    let max = data.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if max - min <= f64::EPSILON * max.abs().max(1.0) {
        return vec![HistogramBin {
            start: min - 0.5,
            end: min + 0.5,
            count: data.len(),
        }];
    }

    let n_bins = if bins == 0 {
        sturges_bins(data.len())
    } else {
        bins
    };
    let width = (max - min) / n_bins as f64;
    let mut counts = vec![0usize; n_bins];
    for v in &data {
        let idx = (((v - min) / width) as usize).min(n_bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            start: min + width * i as f64,
            end: if i + 1 == n_bins {
                max
            } else {
                min + width * (i + 1) as f64
            },
            count,
        })
        .collect()
}

fn sturges_bins(n: usize) -> usize {
    let k = (n as f64).log2().ceil() as usize + 1;
    k.clamp(1, MAX_AUTO_BINS)
}

// ---------------------------------------------------------------------------
// Box plot
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct BoxSummary {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    /// Points beyond the whiskers.
    pub outliers: Vec<f64>,
}

/// Quartiles plus Tukey whiskers (furthest points within 1.5 × IQR).
pub fn box_summary(values: &[f64]) -> Option<BoxSummary> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(f64::total_cmp);

    let q1 = quantile_sorted(&sorted, 0.25);
    let median = quantile_sorted(&sorted, 0.5);
    let q3 = quantile_sorted(&sorted, 0.75);
    let iqr = q3 - q1;
    let lo_fence = q1 - 1.5 * iqr;
    let hi_fence = q3 + 1.5 * iqr;

    let inside = sorted.iter().copied().filter(|v| *v >= lo_fence && *v <= hi_fence);
    let lower_whisker = inside.clone().fold(f64::INFINITY, f64::min);
    let upper_whisker = inside.fold(f64::NEG_INFINITY, f64::max);
    let outliers = sorted
        .iter()
        .copied()
        .filter(|v| *v < lo_fence || *v > hi_fence)
        .collect();

    Some(BoxSummary {
        lower_whisker,
        q1,
        median,
        q3,
        upper_whisker,
        outliers,
    })
}

// ---------------------------------------------------------------------------
// Paired series (scatter / line / bar)
// ---------------------------------------------------------------------------

/// `[x, y]` points for rows where both columns have a value, in row order.
pub fn paired_points(
    dataset: &Dataset,
    x: &str,
    y: &str,
) -> Result<Vec<[f64; 2]>, DashboardError> {
    let xs = dataset.numeric_column(x)?;
    let ys = dataset.numeric_column(y)?;
    Ok(xs
        .numbers()
        .zip(ys.numbers())
        .filter_map(|(a, b)| Some([a?, b?]))
        .collect())
}

/// Points stably sorted by x, for line charts.
pub fn sorted_by_x(mut points: Vec<[f64; 2]>) -> Vec<[f64; 2]> {
    points.sort_by(|a, b| a[0].total_cmp(&b[0]));
    points
}

/// Sum of y per distinct x, ascending in x.
pub fn totals_by_x(points: &[[f64; 2]]) -> Vec<[f64; 2]> {
    let sorted = sorted_by_x(points.to_vec());
    let mut out: Vec<[f64; 2]> = Vec::new();
    for [x, y] in sorted {
        match out.last_mut() {
            Some(last) if last[0] == x => last[1] += y,
            _ => out.push([x, y]),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_csv_reader;
    use crate::data::sample::iris;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn describe_matches_reference_values() {
        // Reference: pandas `load_iris` frame `.describe()`.
        let ds = iris().unwrap();
        let summary = describe(&ds);
        assert_eq!(summary.len(), 4);

        let sl = &summary[0];
        assert_eq!(sl.column, "sepal length (cm)");
        assert_eq!(sl.count, 150);
        assert!(close(sl.mean, 5.843333), "{}", sl.mean);
        assert!((sl.std - 0.828066).abs() < 1e-5, "{}", sl.std);
        assert_eq!(sl.min, 4.3);
        assert!(close(sl.q25, 5.1));
        assert!(close(sl.q50, 5.8));
        assert!(close(sl.q75, 6.4));
        assert_eq!(sl.max, 7.9);

        let pw = &summary[3];
        assert!(close(pw.mean, 1.199333), "{}", pw.mean);
        assert!(close(pw.q25, 0.3));
        assert!(close(pw.q50, 1.3));
        assert!(close(pw.q75, 1.8));
    }

    #[test]
    fn describe_skips_nulls() {
        let ds = load_csv_reader("v,w\n1,a\n,b\n3,c\n4,d\n".as_bytes(), "n.csv").unwrap();
        let s = &describe(&ds)[0];
        assert_eq!(s.count, 3);
        assert!(close(s.mean, 8.0 / 3.0));
        assert!(close(s.q50, 3.0));
        assert!(close(s.q25, 2.0));
    }

    #[test]
    fn single_value_has_nan_std() {
        let s = Summary::from_values("v", &[2.0]);
        assert_eq!(s.count, 1);
        assert!(s.std.is_nan());
        assert_eq!(s.q75, 2.0);
    }

    #[test]
    fn quantile_interpolates_linearly() {
        let v = [1.0, 2.0, 3.0, 4.0];
        assert!(close(quantile_sorted(&v, 0.25), 1.75));
        assert!(close(quantile_sorted(&v, 0.5), 2.5));
        assert!(quantile_sorted(&[], 0.5).is_nan());
    }

    #[test]
    fn correlation_matches_reference() {
        let ds = iris().unwrap();
        let cols = ds.numeric_columns();
        let m = correlation_matrix(&ds, &cols).unwrap();
        assert!(close(m.get(0, 0), 1.0));
        // petal length vs petal width
        assert!((m.get(2, 3) - 0.962865).abs() < 1e-5, "{}", m.get(2, 3));
        // sepal length vs sepal width
        assert!((m.get(0, 1) + 0.117570).abs() < 1e-5, "{}", m.get(0, 1));
        assert_eq!(m.get(1, 0), m.get(0, 1));
    }

    #[test]
    fn correlation_of_constant_column_is_nan() {
        let ds = load_csv_reader("a,b\n1,5\n2,5\n3,5\n".as_bytes(), "c.csv").unwrap();
        let m = correlation_matrix(&ds, &ds.numeric_columns()).unwrap();
        assert!(m.get(0, 1).is_nan());
        assert!(m.get(1, 1).is_nan());
        assert!(close(m.get(0, 0), 1.0));
    }

    #[test]
    fn correlation_uses_pairwise_complete_rows() {
        let ds = load_csv_reader("a,b\n1,2\n2,4\n,100\n3,6\n".as_bytes(), "p.csv").unwrap();
        let m = correlation_matrix(&ds, &ds.numeric_columns()).unwrap();
        assert!(close(m.get(0, 1), 1.0));
    }

    #[test]
    fn histogram_counts_every_value() {
        let values: Vec<f64> = (0..100).map(f64::from).collect();
        let bins = histogram(&values, 10);
        assert_eq!(bins.len(), 10);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 100);
        assert!(bins.iter().all(|b| b.count == 10));
        assert_eq!(bins.last().unwrap().end, 99.0);
    }

    #[test]
    fn histogram_auto_bins_and_constant_input() {
        let values: Vec<f64> = (0..150).map(|i| f64::from(i % 7)).collect();
        assert_eq!(histogram(&values, 0).len(), 9); // ceil(log2 150) + 1
        let flat = histogram(&[3.0, 3.0, 3.0], 0);
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].count, 3);
        assert!(histogram(&[], 5).is_empty());
    }

    #[test]
    fn box_summary_flags_outliers() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        let b = box_summary(&values).unwrap();
        assert!(close(b.q1, 2.25));
        assert!(close(b.median, 3.5));
        assert!(close(b.q3, 4.75));
        assert_eq!(b.upper_whisker, 5.0);
        assert_eq!(b.lower_whisker, 1.0);
        assert_eq!(b.outliers, vec![100.0]);
        assert!(box_summary(&[]).is_none());
    }

    #[test]
    fn line_and_bar_series() {
        let pts = vec![[3.0, 1.0], [1.0, 2.0], [3.0, 4.0], [2.0, 0.5]];
        assert_eq!(
            sorted_by_x(pts.clone()),
            vec![[1.0, 2.0], [2.0, 0.5], [3.0, 1.0], [3.0, 4.0]]
        );
        assert_eq!(totals_by_x(&pts), vec![[1.0, 2.0], [2.0, 0.5], [3.0, 5.0]]);
    }

    #[test]
    fn paired_points_skip_incomplete_rows() {
        let ds = load_csv_reader("a,b,c\n1,2,x\n,3,y\n4,5,z\n".as_bytes(), "p.csv").unwrap();
        assert_eq!(
            paired_points(&ds, "a", "b").unwrap(),
            vec![[1.0, 2.0], [4.0, 5.0]]
        );
        assert!(paired_points(&ds, "a", "c").is_err());
    }
}
