/// Data layer: core types, loading, filtering and aggregation.
///
/// Architecture:
/// ```text
///   penguins.csv  (URL or path; .json also accepted)
///        │
///        ▼
///   ┌──────────────┐
///   │ cache/loader  │  fetch + parse once per source id → Arc<Dataset>
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ Dataset   │  Vec<Record>, distinct categorical values
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  species ∈ S AND island ∈ I → FilteredView (row indices)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ summary   │  group-by + mean → Summary, histogram bins
///   └──────────┘
/// ```

pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;
pub mod summary;

/// Errors surfaced by the pipeline to the dashboard.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The source could not be fetched, parsed, or lacks required columns.
    #[error("data unavailable from {source_id}: {reason}")]
    DataUnavailable { source_id: String, reason: String },

    /// An attribute name that is not part of the schema was requested.
    #[error("configuration error: {0}")]
    Configuration(String),
}
