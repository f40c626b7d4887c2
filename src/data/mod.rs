/// Data layer: the slot vocabulary and internal-key inspection of
/// referenced dataset files.
///
/// Architecture:
/// ```text
///  .json / .tpd / .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │ inspect  │  list top-level internal keys
///   └──────────┘
///        │  exactly one key → adopted
///        ▼
///   ┌──────────┐
///   │  model   │  Slot → Reference { path, key }
///   └──────────┘
/// ```

pub mod inspect;
pub mod model;
