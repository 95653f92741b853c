/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///  .csv / .json / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file + column map → TrackDataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ TrackDataset  │  Vec<Track>, genre / artist / popularity options
///   └──────────────┘
///        │   FilterSpec
///        ▼
///   ┌──────────┐
///   │  filter   │  popularity / genre / artist → DerivedView
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ aggregate  │  means, mode, correlation, bins, series
///   └───────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ dashboard  │  every chart table for one FilterSpec
///   └───────────┘
/// ```

pub mod aggregate;
pub mod dashboard;
pub mod filter;
pub mod loader;
pub mod model;
