/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .json export
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → FurnaceDataset
///   └──────────┘
///        │
///        ▼
///   ┌───────────────┐
///   │ FurnaceDataset │  Vec<HeatRecord>, column index
///   └───────────────┘
///        │
///        ▼  metrics::enrich_all (dates, grades, improvements)
///   ┌──────────┐
///   │  filter   │  apply criteria → filtered Vec<HeatSummary>
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
