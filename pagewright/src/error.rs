//! Error types for document composition

use crate::canvas::CanvasError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while composing or finalizing a document
///
/// Every variant is fatal for the document: composition stops at the call
/// that failed and nothing after it is laid out.
#[derive(Error, Debug)]
pub enum ComposeError {
    /// Heading level outside 1-6
    #[error("Invalid level supplied to heading ({0})")]
    InvalidHeadingLevel(u8),

    /// List item level below 1
    #[error("Invalid level supplied to list item ({0})")]
    InvalidListLevel(usize),

    /// Unknown alignment token
    #[error("Invalid alignment ({0})")]
    InvalidAlignment(String),

    /// Unknown font style token
    #[error("Invalid font style ({0})")]
    InvalidFontStyle(String),

    /// Malformed hex colour
    #[error("Invalid colour ({0}), expected #rgb or #rrggbb")]
    InvalidColour(String),

    /// Unknown page size name
    #[error("{0} is not a valid page size")]
    InvalidPageSize(String),

    /// Unknown orientation token
    #[error("Invalid orientation ({0})")]
    InvalidOrientation(String),

    /// Image file does not exist
    #[error("Image could not be located ({})", .0.display())]
    ImageNotFound(PathBuf),

    /// Image file exists but its dimensions could not be read
    #[error("Image size could not be read ({}): {message}", path.display())]
    ImageSize { path: PathBuf, message: String },

    /// The document has already been finalized
    #[error("Document has already been finalized")]
    AlreadyFinalized,

    /// An earlier finalize failed part way, leaving pages partly drawn
    #[error("Document failed to finalize and can no longer be used")]
    FinalizeFailed,

    /// Table of contents rows ran past the last page of the document
    #[error("Table of contents needs page {needed_page} but the document only has {page_count} pages")]
    TocOverflow { needed_page: usize, page_count: usize },

    /// Fault reported by the rendering canvas
    #[error(transparent)]
    Canvas(#[from] CanvasError),

    /// IO error while writing output
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the composition layer
pub type Result<T, E = ComposeError> = std::result::Result<T, E>;
