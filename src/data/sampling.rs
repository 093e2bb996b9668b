use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// How rows are chosen when the plotting frame exceeds the row cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum SamplingMode {
    /// Keep the first `max_points` rows.
    #[default]
    Head,
    /// Uniform random rows without replacement, reproducible per seed.
    Random { seed: u64 },
}

/// Cap `indices` at `max_points` entries. `max_points == 0` disables the cap.
///
/// The result is always a subsequence of `indices` (original order kept).
pub fn sample_indices(indices: &[usize], max_points: usize, mode: SamplingMode) -> Vec<usize> {
    if max_points == 0 || indices.len() <= max_points {
        return indices.to_vec();
    }
    match mode {
        SamplingMode::Head => indices[..max_points].to_vec(),
        SamplingMode::Random { seed } => {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut picked = rand::seq::index::sample(&mut rng, indices.len(), max_points).into_vec();
            picked.sort_unstable();
            picked.into_iter().map(|i| indices[i]).collect()
        }
    }
}
