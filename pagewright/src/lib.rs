//! pagewright - imperative document composition
//!
//! Build paginated PDF documents by issuing a sequence of calls ("write this
//! heading", "write this paragraph", "insert this list") against a
//! [`Document`]. The document keeps track of the cursor, font, line height,
//! margins, headers and footers, and fills in a table of contents once every
//! page number is known.
//!
//! ```no_run
//! use pagewright::{Align, Document, ListItem, TextSection};
//!
//! let mut doc = Document::new();
//! doc.set_title("Field notes");
//! doc.page()?;
//! doc.set_footer("", vec![TextSection::new("Page {page} of {pages}", Align::Centre)])?;
//! doc.table_of_contents(1)?;
//! doc.heading(1, "Observations")?;
//! doc.paragraph("The weather held all week.")?;
//! doc.list(&[ListItem::new(1, "Clear skies"), ListItem::new(2, "Light wind")])?;
//! doc.save_as("notes.pdf")?;
//! # Ok::<(), pagewright::ComposeError>(())
//! ```

#![deny(unsafe_code)]
#![cfg_attr(all(not(debug_assertions), not(test)), deny(clippy::all))]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

pub mod canvas;
pub mod decoration;
pub mod document;
pub mod error;
pub mod flow;
pub mod geometry;
pub mod heading;
pub mod list;
pub mod script;
pub mod style;
pub mod toc;

pub use canvas::{Canvas, CanvasError, PdfCanvas};
pub use decoration::TextSection;
pub use document::Document;
pub use error::ComposeError;
pub use geometry::{Orientation, PageSize};
pub use heading::HeadingRecord;
pub use list::ListItem;
pub use script::{DocumentScript, ScriptError};
pub use style::{Align, Colour, FontDescriptor, FontStyle};
