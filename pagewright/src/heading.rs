//! Headings and the heading log
//!
//! Every heading gets an internal link anchor and an outline entry, and is
//! appended to the document's heading log for the table of contents.

use crate::canvas::{Canvas, LinkId};
use crate::document::Document;
use crate::error::{ComposeError, Result};
use crate::style::FontDescriptor;

/// Font size in points for heading levels 1 to 6
pub const HEADING_SIZES: [f64; 6] = [19.5, 17.0, 15.0, 13.5, 12.5, 12.0];

/// Title of the table of contents heading
pub const CONTENTS_TITLE: &str = "Contents";

/// Weight of the rule under level 1 headings, in mm
const RULE_WEIGHT: f64 = 0.5;

/// A heading as it was placed in the document
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingRecord {
    pub text: String,
    pub level: u8,
    /// Page the heading text was written on
    pub page: usize,
    pub link: LinkId,
    /// Written by the table of contents itself rather than by the caller
    pub synthetic: bool,
}

/// Font size for a heading level
pub fn heading_size(level: u8) -> Result<f64> {
    match level {
        1..=6 => Ok(HEADING_SIZES[usize::from(level) - 1]),
        _ => Err(ComposeError::InvalidHeadingLevel(level)),
    }
}

/// Whether a heading written at `y` should move to the next page
///
/// The heading has to fit together with one line of the following body text
/// plus a quarter line of spacing above `page_height - bottom_reserve`.
pub fn needs_page_break(
    y: f64,
    heading_line_height: f64,
    body_line_height: f64,
    page_height: f64,
    bottom_reserve: f64,
) -> bool {
    y + heading_line_height + body_line_height + body_line_height / 4.0
        > page_height - bottom_reserve
}

impl<C: Canvas> Document<C> {
    /// Write a heading of level 1 to 6
    ///
    /// Level 1 headings are drawn in the accent colour with a rule below.
    pub fn heading(&mut self, level: u8, text: &str) -> Result<()> {
        self.ensure_open()?;
        self.place_heading(level, text, false)
    }

    /// Headings registered so far, in document order
    pub fn headings(&self) -> &[HeadingRecord] {
        &self.headings
    }

    pub(crate) fn place_heading(&mut self, level: u8, text: &str, synthetic: bool) -> Result<()> {
        let size = heading_size(level)?;

        let page = self.flow.page();
        let anchor_y = self.flow.y();
        let canvas = self.flow.canvas_mut();
        let link = canvas.add_link();
        canvas.set_link(link, page, anchor_y);
        if !self.writing_contents {
            canvas.bookmark(text, usize::from(level) - 1, anchor_y)?;
        }

        let saved_font = self.font.clone();
        let saved_line_height = self.line_height;
        let saved_foreground = self.foreground;

        let mut heading_font = FontDescriptor::new(saved_font.family.clone(), size);
        heading_font.bold = true;
        self.set_font(heading_font)?;

        let footer_height = self.footer_height();
        let bottom_reserve = if footer_height > 0.0 {
            footer_height
        } else {
            self.margin
        };
        if needs_page_break(
            self.flow.y(),
            self.line_height,
            saved_line_height,
            self.page_height(),
            bottom_reserve,
        ) {
            self.flow.break_page()?;
        }

        if level == 1 {
            self.set_foreground_colour(self.accent);
        }

        self.write_line(text)?;

        let y = self.flow.y();
        if level == 1 {
            let right = self.page_width() - self.margin;
            self.draw_line((self.margin, y), (right, y), self.accent, RULE_WEIGHT)?;
            self.flow.set_y(y + self.line_height * 0.25);
        } else {
            self.flow.set_y(y + self.line_height * 0.1);
        }

        self.set_font(saved_font)?;
        self.line_height = saved_line_height;
        self.set_foreground_colour(saved_foreground);

        self.headings.push(HeadingRecord {
            text: text.to_string(),
            level,
            page: self.flow.page(),
            link,
            synthetic,
        });

        log::debug!("Heading created: {} (level {})", text, level);
        Ok(())
    }
}
