//! Page-description backend
//!
//! A [`Canvas`] owns the pages of a document and knows how to place
//! primitives on them: positioned text in a resolved font, rectangles,
//! circles, lines, images, link areas and outline entries. It knows nothing
//! about cursors, margins or text flow; that lives in [`crate::flow`].
//!
//! All coordinates are millimetres from the top-left corner of the page,
//! font sizes are points. [`PdfCanvas`] is the shipped implementation.

pub mod metrics;
mod pdf;

pub use pdf::PdfCanvas;

use crate::geometry::{Rect, Size};
use crate::style::{Colour, FontStyle};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors reported by a canvas
#[derive(Error, Debug)]
pub enum CanvasError {
    /// No font is registered for the family/style combination
    #[error("Unknown font: family '{family}' with style {style}")]
    UnknownFont { family: String, style: FontStyle },

    /// Text was placed before any font was selected
    #[error("No font selected")]
    NoFont,

    /// A drawing call was made before the first page was created
    #[error("No page has been added to the document")]
    NoPage,

    /// Page selection outside the existing pages
    #[error("Page {page} is out of range (document has {page_count} pages)")]
    PageOutOfRange { page: usize, page_count: usize },

    /// Image could not be decoded
    #[error("Image error ({}): {message}", path.display())]
    Image { path: PathBuf, message: String },

    /// IO error while reading or writing
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Handle to an internal link target created with [`Canvas::add_link`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkId(pub usize);

/// What a clickable area points to
#[derive(Debug, Clone, PartialEq)]
pub enum LinkTarget {
    /// A position inside the document
    Internal(LinkId),
    /// An external URI
    Uri(String),
}

/// How a closed shape is painted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paint {
    pub fill: bool,
    pub stroke: bool,
}

impl Paint {
    /// Build from fill/border flags; with neither set the shape is stroked
    pub fn new(fill: bool, border: bool) -> Self {
        Self {
            fill,
            stroke: border || !fill,
        }
    }
}

/// Document information written alongside the pages
#[derive(Debug, Clone, Default)]
pub struct Metadata {
    pub title: String,
    pub author: String,
    pub subject: String,
    pub keywords: Vec<String>,
    pub creator: String,
    pub producer: String,
    pub creation_date: Option<NaiveDateTime>,
    pub modification_date: Option<NaiveDateTime>,
}

/// Primitive page-description operations
///
/// Pages are numbered from 1. `current_page` is 0 until the first page is
/// begun. Drawing calls act on the current page and fail with
/// [`CanvasError::NoPage`] before it exists.
pub trait Canvas {
    /// Append a page of the given size and make it current
    fn begin_page(&mut self, size: Size);

    /// Number of pages begun so far
    fn page_count(&self) -> usize;

    /// 1-based number of the current page, 0 before the first page
    fn current_page(&self) -> usize;

    /// Make an existing page current
    fn set_current_page(&mut self, page: usize) -> Result<(), CanvasError>;

    /// Size of the current page
    fn page_size(&self) -> Option<Size>;

    /// Resolve and select a font for subsequent text and measurement
    fn set_font(&mut self, family: &str, style: FontStyle, size: f64) -> Result<(), CanvasError>;

    /// Width of `text` in an arbitrary font, without changing the selection
    fn measure(
        &self,
        family: &str,
        style: FontStyle,
        size: f64,
        text: &str,
    ) -> Result<f64, CanvasError>;

    /// Width of `text` in the selected font (0 when no font is selected)
    fn string_width(&self, text: &str) -> f64;

    fn set_text_colour(&mut self, colour: Colour);
    fn set_fill_colour(&mut self, colour: Colour);
    fn set_draw_colour(&mut self, colour: Colour);
    fn set_line_width(&mut self, width: f64);

    /// Place `text` with its baseline starting at (`x`, `y`)
    fn text(&mut self, x: f64, y: f64, text: &str) -> Result<(), CanvasError>;

    fn rect(&mut self, rect: Rect, paint: Paint) -> Result<(), CanvasError>;
    fn circle(&mut self, x: f64, y: f64, radius: f64, paint: Paint) -> Result<(), CanvasError>;
    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<(), CanvasError>;

    /// Draw the image file stretched over `rect`
    fn image(&mut self, path: &Path, rect: Rect) -> Result<(), CanvasError>;

    /// Create an internal link target; bind it with [`Canvas::set_link`]
    fn add_link(&mut self) -> LinkId;

    /// Bind a link target to a page and vertical position
    fn set_link(&mut self, link: LinkId, page: usize, y: f64);

    /// Make `rect` on the current page a clickable area
    fn link_area(&mut self, rect: Rect, target: LinkTarget) -> Result<(), CanvasError>;

    /// Add an outline entry for the current page at nesting `level` (0 = top)
    fn bookmark(&mut self, title: &str, level: usize, y: f64) -> Result<(), CanvasError>;

    /// Replace `alias` with `replacement` in all text when serializing
    fn register_alias(&mut self, alias: &str, replacement: &str);

    /// Serialize every page
    fn finish(&mut self, metadata: &Metadata) -> Result<Vec<u8>, CanvasError>;
}
