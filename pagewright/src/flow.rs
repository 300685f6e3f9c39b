//! Cursor and text flow over a canvas
//!
//! [`Flow`] tracks the write position, margins and the active pen (font and
//! colours), and turns cells, flowed text and images into canvas primitives.
//! When content would cross the page-break trigger a new page is begun, and
//! the [`PageLifecycle`] hooks run around every page so headers and footers
//! can be drawn.

use crate::canvas::{Canvas, LinkTarget, Paint};
use crate::error::Result;
use crate::geometry::{Rect, Size, PT_PER_MM};
use crate::style::{Align, Colour, FontDescriptor};
use std::path::Path;

/// Position of the underline below the baseline, in font sizes
const UNDERLINE_OFFSET: f64 = 0.1;
const UNDERLINE_THICKNESS: f64 = 0.05;
/// Position of the strike line above the baseline, in font sizes
const STRIKE_OFFSET: f64 = 0.4;

/// Callbacks run when a page begins or ends
///
/// The hooks get the flow itself so they can draw. Automatic page breaks are
/// suppressed while a hook runs, and hooks are never re-entered.
pub trait PageLifecycle<C: Canvas>: Sized {
    /// Called right after a page has been begun
    fn page_started(&mut self, flow: &mut Flow<C, Self>) -> Result<()>;

    /// Called before the next page is begun and when the flow is closed
    fn page_finished(&mut self, flow: &mut Flow<C, Self>) -> Result<()>;
}

/// Page lifecycle without any decorations
#[derive(Debug, Default, Clone, Copy)]
pub struct NoDecorations;

impl<C: Canvas> PageLifecycle<C> for NoDecorations {
    fn page_started(&mut self, _flow: &mut Flow<C, Self>) -> Result<()> {
        Ok(())
    }

    fn page_finished(&mut self, _flow: &mut Flow<C, Self>) -> Result<()> {
        Ok(())
    }
}

/// Where the cursor goes after a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellBreak {
    /// To the right of the cell
    #[default]
    Right,
    /// To the left margin of the next line
    NextLine,
    /// Directly below the cell
    Below,
}

/// A rectangular text cell
#[derive(Debug, Clone, Default)]
pub struct Cell<'a> {
    /// Width in mm; 0 extends the cell to the right margin
    pub width: f64,
    pub height: f64,
    pub text: &'a str,
    pub align: Align,
    pub fill: bool,
    pub border: bool,
    pub then: CellBreak,
    pub link: Option<LinkTarget>,
}

impl<'a> Cell<'a> {
    pub fn new(width: f64, height: f64, text: &'a str) -> Self {
        Self {
            width,
            height,
            text,
            ..Self::default()
        }
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn then(mut self, then: CellBreak) -> Self {
        self.then = then;
        self
    }

    pub fn link(mut self, link: Option<LinkTarget>) -> Self {
        self.link = link;
        self
    }
}

/// Cursor state and text flow on top of a [`Canvas`]
pub struct Flow<C, L = NoDecorations> {
    canvas: C,
    hooks: Option<L>,
    page_size: Size,
    left_margin: f64,
    top_margin: f64,
    right_margin: f64,
    break_margin: f64,
    auto_page_break: bool,
    decorating: bool,
    closed: bool,
    x: f64,
    y: f64,
    font: FontDescriptor,
    text_colour: Colour,
    fill_colour: Colour,
    draw_colour: Colour,
    line_width: f64,
}

impl<C: Canvas, L: PageLifecycle<C>> Flow<C, L> {
    /// Create a flow with equal margins on every side
    ///
    /// The font is only handed to the canvas when the first page begins.
    pub fn new(canvas: C, page_size: Size, margin: f64, font: FontDescriptor, hooks: L) -> Self {
        Self {
            canvas,
            hooks: Some(hooks),
            page_size,
            left_margin: margin,
            top_margin: margin,
            right_margin: margin,
            break_margin: margin,
            auto_page_break: true,
            decorating: false,
            closed: false,
            x: margin,
            y: margin,
            font,
            text_colour: Colour::BLACK,
            fill_colour: Colour::BLACK,
            draw_colour: Colour::BLACK,
            line_width: 0.2,
        }
    }

    pub fn canvas(&self) -> &C {
        &self.canvas
    }

    pub fn canvas_mut(&mut self) -> &mut C {
        &mut self.canvas
    }

    /// The lifecycle hooks, unless one of them is currently running
    pub fn hooks(&self) -> Option<&L> {
        self.hooks.as_ref()
    }

    pub fn hooks_mut(&mut self) -> Option<&mut L> {
        self.hooks.as_mut()
    }

    pub fn set_margins(&mut self, left: f64, top: f64, right: f64) {
        self.left_margin = left;
        self.top_margin = top;
        self.right_margin = right;
    }

    /// Enable or disable automatic page breaks `margin` mm above the bottom
    pub fn set_auto_page_break(&mut self, enabled: bool, margin: f64) {
        self.auto_page_break = enabled;
        self.break_margin = margin;
    }

    pub fn auto_page_break(&self) -> (bool, f64) {
        (self.auto_page_break, self.break_margin)
    }

    /// Size used for pages begun from now on
    pub fn set_page_size(&mut self, size: Size) {
        self.page_size = size;
    }

    /// Size of the current page, or of the next page when none exists yet
    pub fn page_size(&self) -> Size {
        self.canvas.page_size().unwrap_or(self.page_size)
    }

    /// Distance between the left and right margins
    pub fn content_width(&self) -> f64 {
        self.page_size().width - self.left_margin - self.right_margin
    }

    /// The y position below which content triggers a page break
    pub fn page_break_trigger(&self) -> f64 {
        self.page_size().height - self.break_margin
    }

    pub fn page(&self) -> usize {
        self.canvas.current_page()
    }

    pub fn page_count(&self) -> usize {
        self.canvas.page_count()
    }

    /// Move to an existing page without running any hooks
    pub fn set_page(&mut self, page: usize) -> Result<()> {
        self.canvas.set_current_page(page)?;
        Ok(())
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn set_x(&mut self, x: f64) {
        self.x = x;
    }

    /// Move vertically; the cursor also returns to the left margin
    pub fn set_y(&mut self, y: f64) {
        self.x = self.left_margin;
        self.y = y;
    }

    pub fn set_xy(&mut self, x: f64, y: f64) {
        self.set_y(y);
        self.set_x(x);
    }

    /// Select a font on the canvas and make it the pen font
    pub fn set_font(&mut self, font: &FontDescriptor) -> Result<()> {
        if self.page() > 0 {
            self.canvas.set_font(&font.family, font.style(), font.size)?;
        } else {
            // Nothing to select on yet, but an unknown font still fails here
            self.canvas
                .measure(&font.family, font.style(), font.size, "")?;
        }
        self.font = font.clone();
        Ok(())
    }

    pub fn font(&self) -> &FontDescriptor {
        &self.font
    }

    /// Font size of the pen in mm
    pub fn font_size_mm(&self) -> f64 {
        self.font.size / PT_PER_MM
    }

    pub fn string_width(&self, text: &str) -> f64 {
        self.canvas.string_width(text)
    }

    pub fn set_text_colour(&mut self, colour: Colour) {
        self.text_colour = colour;
        self.canvas.set_text_colour(colour);
    }

    pub fn text_colour(&self) -> Colour {
        self.text_colour
    }

    pub fn set_fill_colour(&mut self, colour: Colour) {
        self.fill_colour = colour;
        self.canvas.set_fill_colour(colour);
    }

    pub fn fill_colour(&self) -> Colour {
        self.fill_colour
    }

    pub fn set_draw_colour(&mut self, colour: Colour) {
        self.draw_colour = colour;
        self.canvas.set_draw_colour(colour);
    }

    pub fn draw_colour(&self) -> Colour {
        self.draw_colour
    }

    pub fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
        self.canvas.set_line_width(width);
    }

    pub fn line_width(&self) -> f64 {
        self.line_width
    }

    /// Finish the current page (if any) and begin a new one
    pub fn add_page(&mut self) -> Result<()> {
        if self.page() > 0 {
            self.run_hook(false)?;
        }

        self.canvas.begin_page(self.page_size);
        self.x = self.left_margin;
        self.y = self.top_margin;
        self.restore_pen()?;
        log::debug!("Page {} added", self.page());

        self.run_hook(true)
    }

    /// Run the page-finished hook on the current page, once
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if self.page() > 0 {
            self.run_hook(false)?;
        }
        Ok(())
    }

    fn run_hook(&mut self, started: bool) -> Result<()> {
        // Taken out while running so a hook can never re-enter itself
        let Some(mut hooks) = self.hooks.take() else {
            return Ok(());
        };
        self.decorating = true;
        let result = if started {
            hooks.page_started(self)
        } else {
            hooks.page_finished(self)
        };
        self.decorating = false;
        self.hooks = Some(hooks);
        result
    }

    fn restore_pen(&mut self) -> Result<()> {
        self.canvas
            .set_font(&self.font.family, self.font.style(), self.font.size)?;
        self.canvas.set_text_colour(self.text_colour);
        self.canvas.set_fill_colour(self.fill_colour);
        self.canvas.set_draw_colour(self.draw_colour);
        self.canvas.set_line_width(self.line_width);
        Ok(())
    }

    fn accepts_page_break(&self) -> bool {
        self.auto_page_break && !self.decorating
    }

    /// Begin a new page when `height` more content would cross the trigger
    fn break_if_needed(&mut self, height: f64) -> Result<()> {
        if self.y + height > self.page_break_trigger() && self.accepts_page_break() {
            let x = self.x;
            self.add_page()?;
            self.x = x;
        }
        Ok(())
    }

    /// Begin a new page now, the way an automatic break would
    ///
    /// Nothing happens while automatic breaks are off or a hook is running.
    /// The cursor lands at the left margin of the new page.
    pub fn break_page(&mut self) -> Result<()> {
        if self.accepts_page_break() {
            self.add_page()?;
        }
        Ok(())
    }

    /// Move to the left margin, `height` mm lower
    pub fn ln(&mut self, height: f64) {
        self.x = self.left_margin;
        self.y += height;
    }

    /// Draw a cell at the cursor and move past it
    pub fn cell(&mut self, cell: Cell<'_>) -> Result<()> {
        self.break_if_needed(cell.height)?;

        let width = if cell.width == 0.0 {
            self.page_size().width - self.right_margin - self.x
        } else {
            cell.width
        };

        if cell.fill || cell.border {
            self.canvas.rect(
                Rect::new(self.x, self.y, width, cell.height),
                Paint {
                    fill: cell.fill,
                    stroke: cell.border,
                },
            )?;
        }

        if !cell.text.is_empty() {
            self.draw_cell_text(&cell, width)?;
        }

        match cell.then {
            CellBreak::Right => self.x += width,
            CellBreak::NextLine => self.ln(cell.height),
            CellBreak::Below => self.y += cell.height,
        }
        Ok(())
    }

    fn draw_cell_text(&mut self, cell: &Cell<'_>, width: f64) -> Result<()> {
        let text_width = self.canvas.string_width(cell.text);
        let dx = match cell.align {
            Align::Left => 0.0,
            Align::Centre => (width - text_width) / 2.0,
            Align::Right => width - text_width,
        };
        let font_size = self.font_size_mm();
        let x = self.x + dx;
        let baseline = self.y + 0.5 * cell.height + 0.3 * font_size;

        self.canvas.text(x, baseline, cell.text)?;

        if self.font.underline {
            self.text_rule(x, baseline + UNDERLINE_OFFSET * font_size, text_width)?;
        }
        if self.font.strikethrough {
            self.text_rule(x, baseline - STRIKE_OFFSET * font_size, text_width)?;
        }

        if let Some(target) = &cell.link {
            let area = Rect::new(
                x,
                self.y + 0.5 * cell.height - 0.5 * font_size,
                text_width,
                font_size,
            );
            self.canvas.link_area(area, target.clone())?;
        }
        Ok(())
    }

    /// Thin bar in the text colour, for underline and strike-through
    fn text_rule(&mut self, x: f64, y: f64, width: f64) -> Result<()> {
        let thickness = UNDERLINE_THICKNESS * self.font_size_mm();
        self.canvas.set_fill_colour(self.text_colour);
        self.canvas
            .rect(Rect::new(x, y, width, thickness), Paint::new(true, false))?;
        self.canvas.set_fill_colour(self.fill_colour);
        Ok(())
    }

    /// Flow text from the cursor, wrapping at the right margin
    ///
    /// Lines after the first start at the left margin. The cursor ends up
    /// right after the last piece of text.
    pub fn write(&mut self, height: f64, text: &str, link: Option<&LinkTarget>) -> Result<()> {
        for (index, paragraph) in text.split('\n').enumerate() {
            if index > 0 {
                self.ln(height);
            }

            let mut rest = paragraph;
            while !rest.is_empty() {
                let available = self.page_size().width - self.right_margin - self.x;
                let at_line_start = self.x <= self.left_margin;
                let split = {
                    let canvas = &self.canvas;
                    split_line(rest, available, at_line_start, |s| canvas.string_width(s))
                };

                match split {
                    None => {
                        let width = self.canvas.string_width(rest);
                        self.cell(Cell::new(width, height, rest).link(link.cloned()))?;
                        rest = "";
                    }
                    Some((end, next)) => {
                        let line = &rest[..end];
                        if !line.is_empty() {
                            let width = self.canvas.string_width(line);
                            self.cell(Cell::new(width, height, line).link(link.cloned()))?;
                        }
                        self.ln(height);
                        rest = &rest[next..];
                    }
                }
            }
        }
        Ok(())
    }

    /// Print wrapped text as a column of cells starting at the cursor
    ///
    /// Every line starts at the cursor's x. Afterwards the cursor is at the
    /// left margin below the last line.
    pub fn multi_cell(&mut self, width: f64, height: f64, text: &str, align: Align) -> Result<()> {
        let width = if width == 0.0 {
            self.page_size().width - self.right_margin - self.x
        } else {
            width
        };

        let lines = {
            let canvas = &self.canvas;
            wrap_lines(text, width, |s| canvas.string_width(s))
        };

        for line in &lines {
            self.cell(
                Cell::new(width, height, line)
                    .align(align)
                    .then(CellBreak::Below),
            )?;
        }
        self.x = self.left_margin;
        Ok(())
    }

    /// Place an image at `x` below the cursor and move the cursor under it
    pub fn image(&mut self, path: &Path, x: f64, width: f64, height: f64) -> Result<()> {
        self.break_if_needed(height)?;
        let rect = Rect::new(x, self.y, width, height);
        self.canvas.image(path, rect)?;
        self.y += height;
        Ok(())
    }

    pub fn rect(&mut self, rect: Rect, paint: Paint) -> Result<()> {
        self.canvas.rect(rect, paint)?;
        Ok(())
    }

    pub fn circle(&mut self, x: f64, y: f64, radius: f64, paint: Paint) -> Result<()> {
        self.canvas.circle(x, y, radius, paint)?;
        Ok(())
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<()> {
        self.canvas.line(x1, y1, x2, y2)?;
        Ok(())
    }
}

/// Find where `text` has to break to fit in `max_width`
///
/// Returns `None` when everything fits, otherwise the byte offset where the
/// current line ends and the offset where the next one starts. Lines break
/// after the last space that fits. A word that does not fit moves to the next
/// line as a whole unless the line is empty, in which case it is split.
pub fn split_line(
    text: &str,
    max_width: f64,
    at_line_start: bool,
    measure: impl Fn(&str) -> f64,
) -> Option<(usize, usize)> {
    let mut width = 0.0;
    let mut last_space = None;
    let mut buf = [0u8; 4];

    for (index, c) in text.char_indices() {
        if c == ' ' {
            last_space = Some(index);
        }
        width += measure(c.encode_utf8(&mut buf));
        if width > max_width {
            if let Some(space) = last_space {
                return Some((space, space + 1));
            }
            if !at_line_start {
                return Some((0, 0));
            }
            // Always keep at least one character on a line
            let end = if index == 0 { c.len_utf8() } else { index };
            return Some((end, end));
        }
    }
    None
}

/// Wrap `text` into lines no wider than `max_width`, honouring newlines
pub fn wrap_lines(text: &str, max_width: f64, measure: impl Fn(&str) -> f64) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut rest = paragraph;
        loop {
            match split_line(rest, max_width, true, &measure) {
                None => {
                    lines.push(rest.to_string());
                    break;
                }
                Some((end, next)) => {
                    lines.push(rest[..end].to_string());
                    rest = &rest[next..];
                    if rest.is_empty() {
                        break;
                    }
                }
            }
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    // Every character is 2 mm wide
    fn measure(s: &str) -> f64 {
        s.chars().count() as f64 * 2.0
    }

    #[test]
    fn test_split_line_fits() {
        assert_eq!(split_line("hello", 10.0, true, measure), None);
    }

    #[test]
    fn test_split_line_at_space() {
        // "hello world" is 22 mm
        assert_eq!(split_line("hello world", 15.0, true, measure), Some((5, 6)));
    }

    #[test]
    fn test_split_line_moves_long_word_to_next_line() {
        assert_eq!(split_line("wordy", 4.0, false, measure), Some((0, 0)));
    }

    #[test]
    fn test_split_line_breaks_word_at_line_start() {
        assert_eq!(split_line("abcdef", 7.0, true, measure), Some((3, 3)));
        // Nothing fits: still one character per line
        assert_eq!(split_line("abc", 1.0, true, measure), Some((1, 1)));
    }

    #[test]
    fn test_wrap_lines() {
        let lines = wrap_lines("one two three\nfour", 16.0, measure);
        assert_eq!(lines, vec!["one two", "three", "four"]);
    }

    #[test]
    fn test_wrap_empty_text_is_one_empty_line() {
        assert_eq!(wrap_lines("", 10.0, measure), vec![String::new()]);
    }

    #[test]
    fn test_cell_builder() {
        let cell = Cell::new(10.0, 5.0, "x")
            .align(Align::Right)
            .then(CellBreak::NextLine);
        assert_eq!(cell.align, Align::Right);
        assert_eq!(cell.then, CellBreak::NextLine);
        assert!(cell.link.is_none());
    }
}
