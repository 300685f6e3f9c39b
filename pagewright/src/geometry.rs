//! Page geometry: sizes, rectangles, named paper sizes and orientation
//!
//! All lengths are millimetres with the origin in the top-left corner of the
//! page and y growing downwards. Font sizes are the only values expressed in
//! points; [`PT_PER_MM`] converts between the two.

use crate::error::ComposeError;

/// Points per millimetre
pub const PT_PER_MM: f64 = 72.0 / 25.4;

/// Width and height of a page or box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle in page coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Named paper sizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    A1,
    A2,
    A3,
    A4,
    A5,
    A6,
    Letter,
    Legal,
    Tabloid,
}

impl PageSize {
    /// Every supported size, in the order they are listed by the CLI
    pub const ALL: [PageSize; 9] = [
        PageSize::A1,
        PageSize::A2,
        PageSize::A3,
        PageSize::A4,
        PageSize::A5,
        PageSize::A6,
        PageSize::Letter,
        PageSize::Legal,
        PageSize::Tabloid,
    ];

    /// Parse a page size name (case-insensitive)
    pub fn parse(name: &str) -> Result<Self, ComposeError> {
        match name.to_lowercase().as_str() {
            "a1" => Ok(PageSize::A1),
            "a2" => Ok(PageSize::A2),
            "a3" => Ok(PageSize::A3),
            "a4" => Ok(PageSize::A4),
            "a5" => Ok(PageSize::A5),
            "a6" => Ok(PageSize::A6),
            "letter" => Ok(PageSize::Letter),
            "legal" => Ok(PageSize::Legal),
            "tabloid" => Ok(PageSize::Tabloid),
            _ => Err(ComposeError::InvalidPageSize(name.to_string())),
        }
    }

    /// Canonical display name
    pub fn name(self) -> &'static str {
        match self {
            PageSize::A1 => "A1",
            PageSize::A2 => "A2",
            PageSize::A3 => "A3",
            PageSize::A4 => "A4",
            PageSize::A5 => "A5",
            PageSize::A6 => "A6",
            PageSize::Letter => "Letter",
            PageSize::Legal => "Legal",
            PageSize::Tabloid => "Tabloid",
        }
    }

    /// Portrait dimensions in millimetres
    pub fn dimensions(self) -> Size {
        match self {
            PageSize::A1 => Size::new(594.0, 841.0),
            PageSize::A2 => Size::new(420.0, 594.0),
            PageSize::A3 => Size::new(297.0, 420.0),
            PageSize::A4 => Size::new(210.0, 297.0),
            PageSize::A5 => Size::new(148.0, 210.0),
            PageSize::A6 => Size::new(105.0, 148.0),
            PageSize::Letter => Size::new(215.9, 279.4),
            PageSize::Legal => Size::new(215.9, 355.6),
            PageSize::Tabloid => Size::new(279.4, 431.8),
        }
    }
}

impl std::fmt::Display for PageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Page orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

impl Orientation {
    /// Parse `p`/`portrait` or `l`/`landscape` (case-insensitive)
    pub fn parse(value: &str) -> Result<Self, ComposeError> {
        match value.to_lowercase().as_str() {
            "p" | "portrait" => Ok(Orientation::Portrait),
            "l" | "landscape" => Ok(Orientation::Landscape),
            _ => Err(ComposeError::InvalidOrientation(value.to_string())),
        }
    }

    /// Orient portrait dimensions, swapping them for landscape
    pub fn apply(self, size: Size) -> Size {
        match self {
            Orientation::Portrait => size,
            Orientation::Landscape => Size::new(size.height, size.width),
        }
    }
}
