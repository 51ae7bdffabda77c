/// Data layer: track model, loading, genre parsing, filtering and memoization.
///
/// Architecture:
/// ```text
///  .csv / .parquet / .json
///        │
///        ▼
///   ┌──────────┐
///   │  loader  │  parse file → Dataset            (memoized per path)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset  │  Vec<Track>, artist set, genre frequencies
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter  │  apply predicates → TrackTable   (memoized per filter set)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  genres  │  serialized list → tokens, exploded rows
///   └──────────┘
/// ```

pub mod cache;
pub mod filter;
pub mod genres;
pub mod loader;
pub mod model;
