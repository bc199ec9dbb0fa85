//! Error types for the mapping widget core.

use thiserror::Error;

/// Errors raised while fetching or editing mappings.
///
/// The widget swallows fetch-side variants at its boundary; they exist so the
/// failure can be logged with a useful message.
#[derive(Debug, Error)]
pub enum MappingError {
    /// Transport-level failure (connect, timeout, body read).
    #[error("mapping request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("mapping request returned HTTP {status}: {snippet}")]
    Status { status: u16, snippet: String },

    /// The response body is not well-formed XML.
    #[error("unparsable mapping response: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The configured server URL cannot be used as a base.
    #[error("invalid server url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("no build configuration selected")]
    NoBuildTypeSelected,

    #[error("build configuration index {index} is out of range ({options} options)")]
    SelectionOutOfRange { index: usize, options: usize },

    #[error("unknown mapping row {0}")]
    UnknownRow(u64),
}

impl From<quick_xml::events::attributes::AttrError> for MappingError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        MappingError::Xml(quick_xml::Error::from(e))
    }
}
