//! Page headers, footers and background
//!
//! Decorations are plain data registered on the document. They implement
//! [`PageLifecycle`] so the flow draws them whenever a page begins or ends.

use crate::canvas::{Canvas, Paint};
use crate::error::Result;
use crate::flow::{Cell, Flow, PageLifecycle};
use crate::geometry::Rect;
use crate::style::{Align, Colour, FontDescriptor};

/// Height reserved for a header or footer band, in mm
pub const BAND_HEIGHT: f64 = 25.0;

/// Font size of header and footer text, in points
pub const BAND_FONT_SIZE: f64 = 12.0;

/// Replaced by the current page number in headers and footers
pub const PAGE_TOKEN: &str = "{page}";

/// Replaced by the final page count when the document is written
pub const PAGES_TOKEN: &str = "{pages}";

/// A piece of header or footer text with its alignment
#[derive(Debug, Clone, PartialEq)]
pub struct TextSection {
    pub text: String,
    pub align: Align,
}

impl TextSection {
    pub fn new(text: impl Into<String>, align: Align) -> Self {
        Self {
            text: text.into(),
            align,
        }
    }
}

/// A header or footer: equal-width sections across the content width
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    /// Font family; empty means the font active when the band is drawn
    pub family: String,
    pub sections: Vec<TextSection>,
    pub height: f64,
    /// Page that was current when the band was registered
    pub registered_on: usize,
}

impl Band {
    pub fn new(family: impl Into<String>, sections: Vec<TextSection>, registered_on: usize) -> Self {
        Self {
            family: family.into(),
            sections,
            height: BAND_HEIGHT,
            registered_on,
        }
    }

    fn section_width(&self, content_width: f64) -> f64 {
        content_width / self.sections.len().max(1) as f64
    }
}

/// Everything drawn around the body of each page
#[derive(Debug, Clone)]
pub struct Decorations {
    pub header: Option<Band>,
    pub footer: Option<Band>,
    pub background: Colour,
    pub margin: f64,
}

impl Default for Decorations {
    fn default() -> Self {
        Self {
            header: None,
            footer: None,
            background: Colour::WHITE,
            margin: 20.0,
        }
    }
}

impl Decorations {
    pub fn header_height(&self) -> f64 {
        self.header.as_ref().map_or(0.0, |band| band.height)
    }

    pub fn footer_height(&self) -> f64 {
        self.footer.as_ref().map_or(0.0, |band| band.height)
    }
}

/// Font and colour that a decoration puts back when it is done
struct SavedPen {
    font: FontDescriptor,
    text_colour: Colour,
}

impl SavedPen {
    fn take<C: Canvas, L: PageLifecycle<C>>(flow: &Flow<C, L>) -> Self {
        Self {
            font: flow.font().clone(),
            text_colour: flow.text_colour(),
        }
    }

    fn restore<C: Canvas, L: PageLifecycle<C>>(self, flow: &mut Flow<C, L>) -> Result<()> {
        flow.set_font(&self.font)?;
        flow.set_text_colour(self.text_colour);
        Ok(())
    }
}

fn band_font<C: Canvas, L: PageLifecycle<C>>(flow: &Flow<C, L>, band: &Band) -> FontDescriptor {
    let family = if band.family.is_empty() {
        flow.font().family.clone()
    } else {
        band.family.clone()
    };
    FontDescriptor::new(family, BAND_FONT_SIZE)
}

fn paint_background<C: Canvas, L: PageLifecycle<C>>(
    flow: &mut Flow<C, L>,
    colour: Colour,
) -> Result<()> {
    let size = flow.page_size();
    let previous = flow.fill_colour();
    flow.set_fill_colour(colour);
    flow.rect(
        Rect::new(0.0, 0.0, size.width, size.height),
        Paint::new(true, false),
    )?;
    flow.set_fill_colour(previous);
    Ok(())
}

/// Width lost when the page tokens are replaced by short numbers
///
/// Half the width of the tokens present, less half the width of a
/// two-digit number, so centred text stays roughly centred.
pub fn token_offset(text: &str, measure: impl Fn(&str) -> f64) -> f64 {
    let mut offset = 0.0;
    if text.contains(PAGE_TOKEN) {
        offset += measure(PAGE_TOKEN);
    }
    if text.contains(PAGES_TOKEN) {
        offset += measure(PAGES_TOKEN);
    }
    offset / 2.0 - measure("00") / 2.0
}

impl<C: Canvas> PageLifecycle<C> for Decorations {
    fn page_started(&mut self, flow: &mut Flow<C, Self>) -> Result<()> {
        if self.background != Colour::WHITE {
            paint_background(flow, self.background)?;
        }

        let Some(header) = &self.header else {
            return Ok(());
        };

        let saved = SavedPen::take(flow);
        let font = band_font(flow, header);
        flow.set_y(0.0);
        flow.set_font(&font)?;
        flow.set_text_colour(Colour::BLACK);

        let section_width = header.section_width(flow.content_width());
        let page = flow.page().to_string();
        for section in &header.sections {
            let text = section.text.replace(PAGE_TOKEN, &page);
            flow.cell(Cell::new(section_width, header.height, &text).align(section.align))?;
        }

        saved.restore(flow)?;
        flow.set_xy(self.margin, header.height);
        log::debug!("Header printed on page {}", flow.page());
        Ok(())
    }

    fn page_finished(&mut self, flow: &mut Flow<C, Self>) -> Result<()> {
        let Some(footer) = &self.footer else {
            return Ok(());
        };
        // The page the footer was registered on stays bare, as with headers
        if flow.page() == footer.registered_on {
            return Ok(());
        }

        let saved = SavedPen::take(flow);
        let font = band_font(flow, footer);
        let top = flow.page_size().height - footer.height;
        flow.set_y(top);
        flow.set_font(&font)?;
        flow.set_text_colour(Colour::BLACK);

        let section_width = footer.section_width(flow.content_width());
        let page = flow.page().to_string();
        for section in &footer.sections {
            let offset = token_offset(&section.text, |s| flow.string_width(s));
            let text = section.text.replace(PAGE_TOKEN, &page);
            flow.set_x(flow.x() + offset);
            flow.cell(
                Cell::new(section_width - offset, footer.height, &text).align(section.align),
            )?;
        }

        saved.restore(flow)?;
        log::debug!("Footer printed on page {}", flow.page());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    fn per_char(s: &str) -> f64 {
        s.chars().count() as f64
    }

    #[test]
    fn test_token_offset_without_tokens() {
        assert!(approx_eq!(f64, token_offset("Report", per_char), -1.0, epsilon = 1e-12));
    }

    #[test]
    fn test_token_offset_with_both_tokens() {
        // (6 + 7) / 2 - 2 / 2
        let offset = token_offset("Page {page} of {pages}", per_char);
        assert!(approx_eq!(f64, offset, 5.5, epsilon = 1e-12));
    }

    #[test]
    fn test_band_heights() {
        let mut decorations = Decorations::default();
        assert_eq!(decorations.header_height(), 0.0);
        decorations.footer = Some(Band::new("", vec![TextSection::new("x", Align::Left)], 1));
        assert_eq!(decorations.footer_height(), BAND_HEIGHT);
    }

    #[test]
    fn test_section_width_splits_content() {
        let band = Band::new(
            "Arial",
            vec![
                TextSection::new("a", Align::Left),
                TextSection::new("b", Align::Centre),
            ],
            0,
        );
        assert!(approx_eq!(f64, band.section_width(170.0), 85.0, epsilon = 1e-12));
    }
}
