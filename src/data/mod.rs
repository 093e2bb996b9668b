/// Data layer: core types, loading, filtering, sampling and statistics.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet      bundled Iris
///        │                          │
///        ▼                          ▼
///   ┌──────────┐              ┌──────────┐
///   │  loader   │  parse file  │  sample   │
///   └──────────┘              └──────────┘
///        │                          │
///        └────────────┬─────────────┘
///                     ▼
///               ┌──────────┐
///               │ Dataset   │  typed columns
///               └──────────┘
///                     │
///                     ▼
///   ┌──────────┐  row indices  ┌──────────┐  capped rows  ┌──────────┐
///   │  filter   │ ───────────▶ │ sampling  │ ────────────▶ │  stats    │
///   └──────────┘               └──────────┘               └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
pub mod sample;
pub mod sampling;
pub mod stats;
