/// Data layer: trace schemas, loading, axis alignment and comparison sets.
///
/// Architecture:
/// ```text
///  .csv / .txt / .dat / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file under a TraceSchema → TraceTable / Series
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  align    │  step / rescale axis → AlignedSeries
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  compare  │  labeled members, length policy → ComparisonSet
///   └──────────┘
///
///   stats: interval widths and max/mean summaries over aligned series
/// ```

pub mod align;
pub mod compare;
pub mod loader;
pub mod model;
pub mod stats;
