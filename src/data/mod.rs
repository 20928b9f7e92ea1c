/// Data layer: core types, loading, classification, filtering and output.
///
/// Architecture:
/// ```text
///   Google Sheet URL
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  fetch CSV (cached) → typed Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ classify  │  per-column bucket: few / many / too_many / numeric
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  specs + selections → predicates → filtered indices
///   └──────────┘
///        │
///        ├──▶ sample  (random rows)
///        ├──▶ export  (CSV / XLSX bytes)
///        └──▶ stats   (overview charts)
/// ```

pub mod classify;
pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
pub mod sample;
pub mod stats;
