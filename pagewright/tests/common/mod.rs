//! Recording canvas shared by the integration tests
//!
//! Every glyph is half an em wide, so a string is `0.5 * size` points per
//! character regardless of family or style.

#![allow(dead_code)]

use pagewright::canvas::{Canvas, CanvasError, LinkId, LinkTarget, Metadata, Paint};
use pagewright::geometry::{Rect, Size, PT_PER_MM};
use pagewright::{Colour, Document, FontStyle};
use std::path::{Path, PathBuf};

const FAMILIES: [&str; 5] = ["arial", "helvetica", "times", "courier", "zapfdingbats"];

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveFont {
    pub family: String,
    pub style: FontStyle,
    pub size: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Text {
        x: f64,
        y: f64,
        text: String,
        font: ActiveFont,
        colour: Colour,
    },
    Rect {
        rect: Rect,
        paint: Paint,
        fill: Colour,
    },
    Circle {
        x: f64,
        y: f64,
        radius: f64,
        paint: Paint,
    },
    Line {
        from: (f64, f64),
        to: (f64, f64),
        colour: Colour,
        width: f64,
    },
    Image {
        path: PathBuf,
        rect: Rect,
    },
    LinkArea {
        rect: Rect,
        target: LinkTarget,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bookmark {
    pub title: String,
    pub level: usize,
    pub page: usize,
    pub y: f64,
}

#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub pages: Vec<(Size, Vec<Op>)>,
    pub current: usize,
    pub font: Option<ActiveFont>,
    pub text_colour: Option<Colour>,
    pub fill_colour: Option<Colour>,
    pub draw_colour: Option<Colour>,
    pub line_width: f64,
    pub links: Vec<Option<(usize, f64)>>,
    pub bookmarks: Vec<Bookmark>,
    pub aliases: Vec<(String, String)>,
}

/// Width of `text` in mm under the fixed metrics
pub fn fixed_width(text: &str, size: f64) -> f64 {
    text.chars().count() as f64 * 0.5 * size / PT_PER_MM
}

fn known(family: &str) -> bool {
    FAMILIES.contains(&family.to_lowercase().as_str())
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, op: Op) -> Result<(), CanvasError> {
        let index = self.current.checked_sub(1).ok_or(CanvasError::NoPage)?;
        self.pages[index].1.push(op);
        Ok(())
    }

    /// Operations recorded on a 1-based page
    pub fn ops(&self, page: usize) -> &[Op] {
        &self.pages[page - 1].1
    }

    /// Text placed on a page, in drawing order
    pub fn texts(&self, page: usize) -> Vec<(String, f64, f64, ActiveFont, Colour)> {
        self.ops(page)
            .iter()
            .filter_map(|op| match op {
                Op::Text {
                    x,
                    y,
                    text,
                    font,
                    colour,
                } => Some((text.clone(), *x, *y, font.clone(), *colour)),
                _ => None,
            })
            .collect()
    }

    pub fn link_areas(&self, page: usize) -> Vec<(Rect, LinkTarget)> {
        self.ops(page)
            .iter()
            .filter_map(|op| match op {
                Op::LinkArea { rect, target } => Some((*rect, target.clone())),
                _ => None,
            })
            .collect()
    }

    pub fn link_destination(&self, link: LinkId) -> Option<(usize, f64)> {
        self.links.get(link.0).copied().flatten()
    }

    fn substitute(&self, text: &str) -> String {
        self.aliases
            .iter()
            .fold(text.to_string(), |acc, (alias, value)| acc.replace(alias.as_str(), value))
    }
}

impl Canvas for RecordingCanvas {
    fn begin_page(&mut self, size: Size) {
        self.pages.push((size, Vec::new()));
        self.current = self.pages.len();
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn current_page(&self) -> usize {
        self.current
    }

    fn set_current_page(&mut self, page: usize) -> Result<(), CanvasError> {
        if page == 0 || page > self.pages.len() {
            return Err(CanvasError::PageOutOfRange {
                page,
                page_count: self.pages.len(),
            });
        }
        self.current = page;
        Ok(())
    }

    fn page_size(&self) -> Option<Size> {
        self.current
            .checked_sub(1)
            .and_then(|index| self.pages.get(index))
            .map(|(size, _)| *size)
    }

    fn set_font(&mut self, family: &str, style: FontStyle, size: f64) -> Result<(), CanvasError> {
        if !known(family) {
            return Err(CanvasError::UnknownFont {
                family: family.to_string(),
                style,
            });
        }
        self.font = Some(ActiveFont {
            family: family.to_string(),
            style,
            size,
        });
        Ok(())
    }

    fn measure(
        &self,
        family: &str,
        style: FontStyle,
        size: f64,
        text: &str,
    ) -> Result<f64, CanvasError> {
        if !known(family) {
            return Err(CanvasError::UnknownFont {
                family: family.to_string(),
                style,
            });
        }
        Ok(fixed_width(text, size))
    }

    fn string_width(&self, text: &str) -> f64 {
        self.font
            .as_ref()
            .map_or(0.0, |font| fixed_width(text, font.size))
    }

    fn set_text_colour(&mut self, colour: Colour) {
        self.text_colour = Some(colour);
    }

    fn set_fill_colour(&mut self, colour: Colour) {
        self.fill_colour = Some(colour);
    }

    fn set_draw_colour(&mut self, colour: Colour) {
        self.draw_colour = Some(colour);
    }

    fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    fn text(&mut self, x: f64, y: f64, text: &str) -> Result<(), CanvasError> {
        let font = self.font.clone().ok_or(CanvasError::NoFont)?;
        let colour = self.text_colour.unwrap_or(Colour::BLACK);
        self.push(Op::Text {
            x,
            y,
            text: text.to_string(),
            font,
            colour,
        })
    }

    fn rect(&mut self, rect: Rect, paint: Paint) -> Result<(), CanvasError> {
        let fill = self.fill_colour.unwrap_or(Colour::BLACK);
        self.push(Op::Rect { rect, paint, fill })
    }

    fn circle(&mut self, x: f64, y: f64, radius: f64, paint: Paint) -> Result<(), CanvasError> {
        self.push(Op::Circle {
            x,
            y,
            radius,
            paint,
        })
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<(), CanvasError> {
        let colour = self.draw_colour.unwrap_or(Colour::BLACK);
        let width = self.line_width;
        self.push(Op::Line {
            from: (x1, y1),
            to: (x2, y2),
            colour,
            width,
        })
    }

    fn image(&mut self, path: &Path, rect: Rect) -> Result<(), CanvasError> {
        self.push(Op::Image {
            path: path.to_path_buf(),
            rect,
        })
    }

    fn add_link(&mut self) -> LinkId {
        self.links.push(None);
        LinkId(self.links.len() - 1)
    }

    fn set_link(&mut self, link: LinkId, page: usize, y: f64) {
        if let Some(slot) = self.links.get_mut(link.0) {
            *slot = Some((page, y));
        }
    }

    fn link_area(&mut self, rect: Rect, target: LinkTarget) -> Result<(), CanvasError> {
        self.push(Op::LinkArea { rect, target })
    }

    fn bookmark(&mut self, title: &str, level: usize, y: f64) -> Result<(), CanvasError> {
        if self.current == 0 {
            return Err(CanvasError::NoPage);
        }
        self.bookmarks.push(Bookmark {
            title: title.to_string(),
            level,
            page: self.current,
            y,
        });
        Ok(())
    }

    fn register_alias(&mut self, alias: &str, replacement: &str) {
        self.aliases.retain(|(existing, _)| existing != alias);
        self.aliases
            .push((alias.to_string(), replacement.to_string()));
    }

    /// One line per text op: `page<TAB>text`, aliases substituted
    fn finish(&mut self, _metadata: &Metadata) -> Result<Vec<u8>, CanvasError> {
        if self.pages.is_empty() {
            return Err(CanvasError::NoPage);
        }
        let mut out = String::new();
        for (index, (_, ops)) in self.pages.iter().enumerate() {
            for op in ops {
                if let Op::Text { text, .. } = op {
                    out.push_str(&format!("{}\t{}\n", index + 1, self.substitute(text)));
                }
            }
        }
        Ok(out.into_bytes())
    }
}

/// A document over a fresh recording canvas
pub fn recording_document() -> Document<RecordingCanvas> {
    Document::with_canvas(RecordingCanvas::new())
}
