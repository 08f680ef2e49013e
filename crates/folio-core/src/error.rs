//! Error types for folio.
//!
//! Only the mount boundary produces errors. Everything past it degrades
//! silently: failed preloads, unknown content and late layout passes are
//! no-ops rather than failures.

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for folio operations.
#[derive(Debug, Error, Diagnostic)]
pub enum FolioError {
    /// The payload handed to the surface is not a document at all.
    #[error("invalid document: {0}")]
    #[diagnostic(
        code(folio::document::invalid),
        help("a document is a JSON array of Portable Text blocks")
    )]
    InvalidDocument(#[source] serde_json::Error),

    /// Configuration JSON could not be parsed.
    #[error("failed to parse config: {0}")]
    #[diagnostic(code(folio::config::parse))]
    ConfigParse(#[source] serde_json::Error),

    /// Configuration parsed but holds an unusable value.
    #[error("invalid config: {0}")]
    #[diagnostic(code(folio::config::invalid))]
    InvalidConfig(String),

    /// A required host object (window, document, body) is missing.
    #[error("host unavailable: {0}")]
    #[diagnostic(code(folio::host::unavailable))]
    HostUnavailable(&'static str),

    /// A host call failed while mounting.
    #[error("host operation failed: {0}")]
    #[diagnostic(code(folio::host::failed))]
    Host(String),
}

pub type Result<T, E = FolioError> = std::result::Result<T, E>;
