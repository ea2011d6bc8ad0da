/// Data layer: table model, acquisition, and the column subsetter.
///
/// Architecture:
/// ```text
///  local file / drive link
///        │
///        ▼
///   ┌──────────┐
///   │  source   │  download if absent, cache per process
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  .csv / .json / .parquet → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ selection  │  parse → validate → project
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  Dataset → subset.csv bytes
///   └──────────┘
/// ```

pub mod export;
pub mod loader;
pub mod model;
pub mod selection;
pub mod source;
