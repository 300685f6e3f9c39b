//! The document being composed
//!
//! [`Document`] owns the composition state (cursor, font, line height,
//! colours, page geometry), the heading log and the table of contents
//! reservation. Content is laid out as it is added; the table of contents
//! is filled in when the document is finalized.

use crate::canvas::{Canvas, LinkTarget, Metadata, Paint, PdfCanvas};
use crate::decoration::{Band, Decorations, TextSection, PAGES_TOKEN};
use crate::error::{ComposeError, Result};
use crate::flow::Flow;
use crate::geometry::{Orientation, PageSize, Rect, Size, PT_PER_MM};
use crate::heading::HeadingRecord;
use crate::style::{Colour, FontDescriptor};
use crate::toc::TocReservation;
use base64::Engine;
use chrono::NaiveDateTime;
use std::path::Path;

pub const DEFAULT_MARGIN: f64 = 20.0;
pub const DEFAULT_FONT_FAMILY: &str = "Arial";
pub const DEFAULT_FONT_SIZE: f64 = 12.0;
pub const DEFAULT_LINE_HEIGHT: f64 = 6.0;
pub const DEFAULT_INDENT: f64 = 4.0;

/// Scale a line height along with a font size change
///
/// A previous size of 0 has nothing to scale from, so the line height is
/// returned unchanged.
pub fn rescale_line_height(line_height: f64, old_size: f64, new_size: f64) -> f64 {
    if old_size > 0.0 {
        line_height * new_size / old_size
    } else {
        line_height
    }
}

/// An imperatively composed document
pub struct Document<C = PdfCanvas> {
    pub(crate) flow: Flow<C, Decorations>,
    pub(crate) font: FontDescriptor,
    pub(crate) line_height: f64,
    pub(crate) foreground: Colour,
    pub(crate) accent: Colour,
    background: Colour,
    pub(crate) margin: f64,
    page_size: PageSize,
    page_width: f64,
    page_height: f64,
    orientation: Orientation,
    pub(crate) indent: f64,
    pub(crate) headings: Vec<HeadingRecord>,
    pub(crate) toc: Option<TocReservation>,
    pub(crate) writing_contents: bool,
    metadata: Metadata,
    finalized: bool,
    failed: bool,
}

impl Document<PdfCanvas> {
    /// A4 portrait document rendered to PDF
    pub fn new() -> Self {
        Self::with_canvas(PdfCanvas::new())
    }
}

impl Default for Document<PdfCanvas> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Canvas> Document<C> {
    pub fn with_canvas(canvas: C) -> Self {
        let page_size = PageSize::A4;
        let dimensions = page_size.dimensions();
        let font = FontDescriptor::new(DEFAULT_FONT_FAMILY, DEFAULT_FONT_SIZE);
        let now = chrono::Local::now().naive_local();

        let mut flow = Flow::new(
            canvas,
            dimensions,
            DEFAULT_MARGIN,
            font.clone(),
            Decorations::default(),
        );
        flow.set_text_colour(Colour::BLACK);

        Self {
            flow,
            font,
            line_height: DEFAULT_LINE_HEIGHT,
            foreground: Colour::BLACK,
            accent: Colour::rgb(255, 0, 0),
            background: Colour::WHITE,
            margin: DEFAULT_MARGIN,
            page_size,
            page_width: dimensions.width,
            page_height: dimensions.height,
            orientation: Orientation::Portrait,
            indent: DEFAULT_INDENT,
            headings: Vec::new(),
            toc: None,
            writing_contents: false,
            metadata: Metadata {
                creator: env!("CARGO_PKG_NAME").to_string(),
                producer: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
                creation_date: Some(now),
                modification_date: Some(now),
                ..Metadata::default()
            },
            finalized: false,
            failed: false,
        }
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.finalized {
            return Err(ComposeError::AlreadyFinalized);
        }
        if self.failed {
            return Err(ComposeError::FinalizeFailed);
        }
        Ok(())
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn canvas(&self) -> &C {
        self.flow.canvas()
    }

    // Metadata

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.metadata.title = title.into();
        log::debug!("Title set");
    }

    pub fn title(&self) -> &str {
        &self.metadata.title
    }

    pub fn set_author(&mut self, author: impl Into<String>) {
        self.metadata.author = author.into();
        log::debug!("Author set");
    }

    pub fn author(&self) -> &str {
        &self.metadata.author
    }

    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.metadata.subject = subject.into();
        log::debug!("Subject set");
    }

    pub fn subject(&self) -> &str {
        &self.metadata.subject
    }

    pub fn set_keywords(&mut self, keywords: Vec<String>) {
        self.metadata.keywords = keywords;
        log::debug!("Keywords set");
    }

    pub fn keywords(&self) -> &[String] {
        &self.metadata.keywords
    }

    pub fn set_creator(&mut self, creator: impl Into<String>) {
        self.metadata.creator = creator.into();
    }

    pub fn creator(&self) -> &str {
        &self.metadata.creator
    }

    pub fn set_creation_date(&mut self, date: NaiveDateTime) {
        self.metadata.creation_date = Some(date);
        log::debug!("Creation date set");
    }

    pub fn creation_date(&self) -> Option<NaiveDateTime> {
        self.metadata.creation_date
    }

    pub fn set_modification_date(&mut self, date: NaiveDateTime) {
        self.metadata.modification_date = Some(date);
        log::debug!("Modification date set");
    }

    pub fn modification_date(&self) -> Option<NaiveDateTime> {
        self.metadata.modification_date
    }

    // Style and geometry

    pub fn set_accent_colour(&mut self, hex: &str) -> Result<()> {
        self.accent = Colour::parse(hex)?;
        Ok(())
    }

    pub fn accent_colour(&self) -> Colour {
        self.accent
    }

    /// Page fill colour for pages begun from now on
    pub fn set_background(&mut self, hex: &str) -> Result<()> {
        self.background = Colour::parse(hex)?;
        if let Some(decorations) = self.flow.hooks_mut() {
            decorations.background = self.background;
        }
        Ok(())
    }

    pub fn background(&self) -> Colour {
        self.background
    }

    pub fn set_indent_size(&mut self, indent: f64) {
        self.indent = indent;
    }

    pub fn indent_size(&self) -> f64 {
        self.indent
    }

    pub fn set_line_height(&mut self, line_height: f64) {
        self.line_height = line_height;
    }

    pub fn line_height(&self) -> f64 {
        self.line_height
    }

    pub fn set_margin(&mut self, margin: f64) {
        self.margin = margin;
        self.flow.set_margins(margin, margin, margin);
        let footer_height = self.footer_height();
        let break_margin = if footer_height > 0.0 {
            footer_height
        } else {
            margin
        };
        let (enabled, _) = self.flow.auto_page_break();
        self.flow.set_auto_page_break(enabled, break_margin);
        if let Some(decorations) = self.flow.hooks_mut() {
            decorations.margin = margin;
        }
        log::debug!("Margins set");
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }

    /// Select a named page size (A1-A6, Letter, Legal, Tabloid)
    pub fn set_page_size(&mut self, name: &str) -> Result<()> {
        let size = PageSize::parse(name)?;
        let dimensions = size.dimensions();
        self.page_size = size;
        self.page_width = dimensions.width;
        self.page_height = dimensions.height;
        self.sync_page_size();
        log::debug!("Page size set to {}", size);
        Ok(())
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn set_orientation(&mut self, orientation: &str) -> Result<()> {
        self.orientation = Orientation::parse(orientation)?;
        self.sync_page_size();
        Ok(())
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Portrait width of pages begun from now on
    pub fn set_page_width(&mut self, width: f64) {
        self.page_width = width;
        self.sync_page_size();
    }

    /// Portrait height of pages begun from now on
    pub fn set_page_height(&mut self, height: f64) {
        self.page_height = height;
        self.sync_page_size();
    }

    /// Width of the current page
    pub fn page_width(&self) -> f64 {
        self.flow.page_size().width
    }

    /// Height of the current page
    pub fn page_height(&self) -> f64 {
        self.flow.page_size().height
    }

    fn sync_page_size(&mut self) {
        let size = self
            .orientation
            .apply(Size::new(self.page_width, self.page_height));
        self.flow.set_page_size(size);
    }

    /// Page width between the margins
    pub fn content_width(&self) -> f64 {
        self.page_width() - self.margin * 2.0
    }

    pub fn header_height(&self) -> f64 {
        self.flow.hooks().map_or(0.0, Decorations::header_height)
    }

    pub fn footer_height(&self) -> f64 {
        self.flow.hooks().map_or(0.0, Decorations::footer_height)
    }

    // Cursor

    pub fn set_x(&mut self, x: f64) {
        self.flow.set_x(x);
    }

    /// Move vertically; x returns to the left margin
    pub fn set_y(&mut self, y: f64) {
        self.flow.set_y(y);
    }

    /// Move the cursor; `None` leaves that coordinate alone
    pub fn set_position(&mut self, x: Option<f64>, y: Option<f64>) {
        if let Some(y) = y {
            let current_x = self.flow.x();
            self.flow.set_y(y);
            self.flow.set_x(current_x);
        }
        if let Some(x) = x {
            self.flow.set_x(x);
        }
    }

    pub fn position(&self) -> (f64, f64) {
        (self.flow.x(), self.flow.y())
    }

    pub fn x(&self) -> f64 {
        self.flow.x()
    }

    pub fn y(&self) -> f64 {
        self.flow.y()
    }

    // Font and colour

    /// Change the active font
    ///
    /// A size of 0 (or less) keeps the current size and an empty family keeps
    /// the current family. The line height scales with the size. Nothing
    /// changes when the canvas cannot resolve the font.
    pub fn set_font(&mut self, font: FontDescriptor) -> Result<()> {
        let mut font = font;
        if font.size <= 0.0 {
            font.size = self.font.size;
        }
        if font.family.is_empty() {
            font.family = self.font.family.clone();
        }

        self.flow.set_font(&font)?;
        self.line_height = rescale_line_height(self.line_height, self.font.size, font.size);
        self.font = font;
        Ok(())
    }

    pub fn font(&self) -> &FontDescriptor {
        &self.font
    }

    pub fn set_font_size(&mut self, size: f64) -> Result<()> {
        let font = FontDescriptor {
            size,
            ..self.font.clone()
        };
        self.set_font(font)
    }

    /// Text colour as `#rgb` or `#rrggbb`
    pub fn set_foreground(&mut self, hex: &str) -> Result<()> {
        let colour = Colour::parse(hex)?;
        self.set_foreground_colour(colour);
        Ok(())
    }

    pub(crate) fn set_foreground_colour(&mut self, colour: Colour) {
        self.foreground = colour;
        self.flow.set_text_colour(colour);
    }

    pub fn foreground(&self) -> Colour {
        self.foreground
    }

    // Pages and decorations

    /// Start a new page
    pub fn page(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.flow.add_page()
    }

    /// Current page number, 0 before the first page
    pub fn page_number(&self) -> usize {
        self.flow.page()
    }

    pub fn page_count(&self) -> usize {
        self.flow.page_count()
    }

    /// Register a header drawn at the top of every page begun from now on
    pub fn set_header(&mut self, family: &str, sections: Vec<TextSection>) -> Result<()> {
        self.ensure_open()?;
        let band = Band::new(family, sections, self.page_number());
        if let Some(decorations) = self.flow.hooks_mut() {
            decorations.header = Some(band);
        }
        log::debug!("Header set");
        Ok(())
    }

    /// Register a footer drawn at the bottom of every page after this one
    ///
    /// `{page}` is replaced by the page number and `{pages}` by the final
    /// page count. Automatic page breaks move up to the top of the footer.
    pub fn set_footer(&mut self, family: &str, sections: Vec<TextSection>) -> Result<()> {
        self.ensure_open()?;
        let band = Band::new(family, sections, self.page_number());
        let height = band.height;
        if let Some(decorations) = self.flow.hooks_mut() {
            decorations.footer = Some(band);
        }
        self.flow.set_auto_page_break(true, height);
        log::debug!("Footer set");
        Ok(())
    }

    // Shapes

    /// Draw a rectangle filled with `hex` and/or outlined with the line colour
    #[allow(clippy::too_many_arguments)]
    pub fn box_at(
        &mut self,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        hex: &str,
        fill: bool,
        border: bool,
    ) -> Result<()> {
        self.ensure_open()?;
        let colour = Colour::parse(hex)?;
        let previous = self.flow.fill_colour();
        self.flow.set_fill_colour(colour);
        let result = self
            .flow
            .rect(Rect::new(x, y, w, h), Paint::new(fill, border));
        self.flow.set_fill_colour(previous);
        log::debug!("Box created");
        result
    }

    /// Draw a box at the cursor and move past it, wrapping at the content width
    pub fn box_inline(&mut self, w: f64, h: f64, hex: &str, fill: bool, border: bool) -> Result<()> {
        let (x, y) = self.position();
        self.box_at(x, y, w, h, hex, fill, border)?;
        if x + w < self.content_width() {
            self.flow.set_x(x + w);
        } else {
            self.flow.set_y(y + h);
            self.flow.set_x(self.margin);
        }
        Ok(())
    }

    pub fn circle(
        &mut self,
        x: f64,
        y: f64,
        radius: f64,
        hex: &str,
        fill: bool,
        border: bool,
    ) -> Result<()> {
        self.ensure_open()?;
        let colour = Colour::parse(hex)?;
        let previous = self.flow.fill_colour();
        self.flow.set_fill_colour(colour);
        let result = self.flow.circle(x, y, radius, Paint::new(fill, border));
        self.flow.set_fill_colour(previous);
        log::debug!("Circle created");
        result
    }

    /// Draw a line without changing the current line colour or weight
    pub fn line(
        &mut self,
        from: (f64, f64),
        to: (f64, f64),
        hex: &str,
        weight: f64,
    ) -> Result<()> {
        self.ensure_open()?;
        let colour = Colour::parse(hex)?;
        self.draw_line(from, to, colour, weight)?;
        log::debug!("Line created");
        Ok(())
    }

    pub(crate) fn draw_line(
        &mut self,
        from: (f64, f64),
        to: (f64, f64),
        colour: Colour,
        weight: f64,
    ) -> Result<()> {
        let previous_colour = self.flow.draw_colour();
        let previous_weight = self.flow.line_width();
        self.flow.set_draw_colour(colour);
        self.flow.set_line_width(weight);
        let result = self.flow.line(from.0, from.1, to.0, to.1);
        self.flow.set_draw_colour(previous_colour);
        self.flow.set_line_width(previous_weight);
        result
    }

    /// Set the line colour and weight used by borders
    pub fn set_line(&mut self, hex: &str, weight: f64) -> Result<()> {
        let colour = Colour::parse(hex)?;
        self.flow.set_draw_colour(colour);
        self.flow.set_line_width(weight);
        Ok(())
    }

    // Text

    /// Insert `lines` line breaks of the current line height
    pub fn ln(&mut self, lines: usize) -> Result<()> {
        self.ensure_open()?;
        for _ in 0..lines {
            self.flow.ln(self.line_height);
        }
        Ok(())
    }

    /// Flow text from the cursor using the current line height
    pub fn write(&mut self, text: &str) -> Result<()> {
        self.ensure_open()?;
        self.flow.write(self.line_height, text, None)
    }

    pub fn write_line(&mut self, text: &str) -> Result<()> {
        self.write(text)?;
        self.ln(1)
    }

    /// Write text followed by a blank line
    pub fn paragraph(&mut self, text: &str) -> Result<()> {
        self.write(text)?;
        self.ln(2)
    }

    /// Write with altered style flags, putting the previous font back after
    fn write_styled(&mut self, text: &str, apply: impl FnOnce(&mut FontDescriptor)) -> Result<()> {
        self.ensure_open()?;
        let saved = self.font.clone();
        let mut styled = saved.clone();
        apply(&mut styled);
        self.set_font(styled)?;
        let written = self.write(text);
        let restored = self.set_font(saved);
        written.and(restored)
    }

    pub fn bold(&mut self, text: &str) -> Result<()> {
        self.write_styled(text, |font| font.bold = true)
    }

    pub fn bold_line(&mut self, text: &str) -> Result<()> {
        self.bold(text)?;
        self.ln(1)
    }

    pub fn italic(&mut self, text: &str) -> Result<()> {
        self.write_styled(text, |font| font.italic = true)
    }

    pub fn italic_line(&mut self, text: &str) -> Result<()> {
        self.italic(text)?;
        self.ln(1)
    }

    pub fn bold_italic(&mut self, text: &str) -> Result<()> {
        self.write_styled(text, |font| {
            font.bold = true;
            font.italic = true;
        })
    }

    pub fn bold_italic_line(&mut self, text: &str) -> Result<()> {
        self.bold_italic(text)?;
        self.ln(1)
    }

    /// Write `label` in blue as a link to `url`
    pub fn hyperlink(&mut self, label: &str, url: &str) -> Result<()> {
        self.ensure_open()?;
        let previous = self.foreground;
        self.set_foreground_colour(Colour::BLUE);
        let target = LinkTarget::Uri(url.to_string());
        let written = self.flow.write(self.line_height, label, Some(&target));
        self.set_foreground_colour(previous);
        log::debug!("Hyperlink printed");
        written
    }

    /// Place an image below the cursor
    ///
    /// A zero `w` or `h` keeps the aspect ratio; both zero uses the pixel size
    /// at 72 dpi. `align` is `l`/`left`/empty (use `x`), `c`/`centre` or
    /// `r`/`right`. The cursor moves below the image, on a new page if it
    /// does not fit.
    pub fn image(
        &mut self,
        path: impl AsRef<Path>,
        align: &str,
        x: f64,
        w: f64,
        h: f64,
    ) -> Result<()> {
        self.ensure_open()?;
        let path = path.as_ref();
        if !path.exists() {
            return Err(ComposeError::ImageNotFound(path.to_path_buf()));
        }

        let (mut w, mut h) = (w, h);
        if w == 0.0 || h == 0.0 {
            let size = imagesize::size(path).map_err(|e| ComposeError::ImageSize {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            let (iw, ih) = (size.width as f64, size.height as f64);
            if w == 0.0 && h == 0.0 {
                w = iw / PT_PER_MM;
                h = ih / PT_PER_MM;
            } else if w == 0.0 {
                w = h * iw / ih;
            } else {
                h = w * ih / iw;
            }
        }

        let x = match align.to_lowercase().as_str() {
            "" | "l" | "left" => x,
            "c" | "centre" => self.flow.x() + self.content_width() / 2.0 - w / 2.0,
            "r" | "right" => self.page_width() - self.margin - w,
            _ => return Err(ComposeError::InvalidAlignment(align.to_string())),
        };

        self.flow.image(path, x, w, h)?;
        log::debug!("Image printed: {}", path.display());
        Ok(())
    }

    // Output

    /// Lay out the table of contents and close the last page
    ///
    /// Only allowed once; afterwards the document can be serialized any
    /// number of times but no longer changed. If it fails, the document is
    /// left unusable and every later call returns `FinalizeFailed`.
    pub fn finalize(&mut self) -> Result<()> {
        self.ensure_open()?;

        let page_count = self.flow.page_count();
        if let Err(error) = self.complete_pages(page_count) {
            // Rows may already be drawn; a second attempt would draw them twice
            self.failed = true;
            log::error!("Finalize failed: {}", error);
            return Err(error);
        }

        self.finalized = true;
        log::info!("Document finalized with {} pages", page_count);
        Ok(())
    }

    fn complete_pages(&mut self, page_count: usize) -> Result<()> {
        self.flow
            .canvas_mut()
            .register_alias(PAGES_TOKEN, &page_count.to_string());

        if let Some(reservation) = self.toc {
            self.reconcile_toc(reservation)?;
        }

        self.flow.close()
    }

    /// Serialize the document, finalizing it first if needed
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        if !self.finalized {
            self.finalize()?;
        }
        let metadata = self.metadata.clone();
        Ok(self.flow.canvas_mut().finish(&metadata)?)
    }

    /// Write the document to `path`
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        std::fs::write(path, &bytes)?;
        log::info!("PDF saved to {} ({} bytes)", path.display(), bytes.len());
        Ok(())
    }

    /// The serialized document as standard base64
    pub fn export_base64(&mut self) -> Result<String> {
        let bytes = self.to_bytes()?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        log::info!("Base64 encoding returned");
        Ok(encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn test_rescale_line_height() {
        assert!(approx_eq!(f64, rescale_line_height(6.0, 12.0, 24.0), 12.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, rescale_line_height(6.0, 12.0, 12.0), 6.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, rescale_line_height(6.0, 0.0, 24.0), 6.0, epsilon = 1e-12));
    }

    #[test]
    fn test_defaults() {
        let doc = Document::new();
        assert_eq!(doc.page_size(), PageSize::A4);
        assert_eq!(doc.orientation(), Orientation::Portrait);
        assert_eq!(doc.margin(), 20.0);
        assert_eq!(doc.font().family, "Arial");
        assert_eq!(doc.font().size, 12.0);
        assert_eq!(doc.line_height(), 6.0);
        assert_eq!(doc.indent_size(), 4.0);
        assert_eq!(doc.accent_colour(), Colour::rgb(255, 0, 0));
        assert_eq!(doc.foreground(), Colour::BLACK);
        assert_eq!(doc.background(), Colour::WHITE);
        assert_eq!(doc.page_width(), 210.0);
        assert_eq!(doc.page_height(), 297.0);
    }

    #[test]
    fn test_landscape_swaps_page_dimensions() {
        let mut doc = Document::new();
        doc.set_page_size("a5").unwrap();
        doc.set_orientation("L").unwrap();
        doc.page().unwrap();
        assert_eq!(doc.page_width(), 210.0);
        assert_eq!(doc.page_height(), 148.0);
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let mut doc = Document::new();
        assert!(matches!(
            doc.set_page_size("B5"),
            Err(ComposeError::InvalidPageSize(_))
        ));
        assert!(matches!(
            doc.set_accent_colour("red"),
            Err(ComposeError::InvalidColour(_))
        ));
        assert!(matches!(
            doc.set_orientation("sideways"),
            Err(ComposeError::InvalidOrientation(_))
        ));
    }

    #[test]
    fn test_set_position_keeps_unspecified_axis() {
        let mut doc = Document::new();
        doc.page().unwrap();
        doc.set_position(Some(50.0), None);
        doc.set_position(None, Some(80.0));
        assert_eq!(doc.position(), (50.0, 80.0));
    }

    #[test]
    fn test_unknown_font_leaves_state_alone() {
        let mut doc = Document::new();
        doc.page().unwrap();
        let err = doc
            .set_font(FontDescriptor::new("Papyrus", 30.0))
            .unwrap_err();
        assert!(matches!(err, ComposeError::Canvas(_)));
        assert_eq!(doc.font().family, "Arial");
        assert_eq!(doc.line_height(), 6.0);
    }

    #[test]
    fn test_export_base64_is_a_pdf() {
        let mut doc = Document::new();
        doc.page().unwrap();
        doc.write("hello").unwrap();
        let encoded = doc.export_base64().unwrap();
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }
}
