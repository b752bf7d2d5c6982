//! Error types for the sasmap crate.
//!
//! [`SasMapError`] wraps I/O, path-resolution, CSV, and JSON failures alongside
//! a catch-all variant for validation messages. Extraction itself is
//! infallible on a per-construct basis: unrecognized text is left in the
//! residual rather than surfaced as an error.

/// The main error type for the sasmap crate.
///
/// All failures are recoverable at file-level granularity; the extraction
/// core never panics on user input.
#[derive(Debug, thiserror::Error)]
pub enum SasMapError {
    /// I/O error.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Path resolution error.
    #[error("{0}")]
    PathAbs(#[from] path_abs::Error),

    /// CSV serialization error.
    #[error("{0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("{0}")]
    SerdeJson(#[from] serde_json::Error),

    /// Progress bar template error.
    #[error("{0}")]
    IndicatifTemplate(#[from] indicatif::style::TemplateError),

    /// Catch-all error with a custom message.
    #[error("{0}")]
    Other(String),
}
