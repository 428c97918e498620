/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → ObservationTable, coerce numeric columns
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  cache    │  one Arc<ObservationTable> for the life of the process
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  Year / Season / Location_Type membership → row indices
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  group-by counts, distinct counts, bins, points
///   └───────────┘
/// ```

pub mod aggregate;
pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;
