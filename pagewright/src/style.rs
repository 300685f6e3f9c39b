//! Colours, font descriptors and alignment tokens

use crate::error::ComposeError;

/// An RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Colour {
    pub const BLACK: Colour = Colour::rgb(0, 0, 0);
    pub const WHITE: Colour = Colour::rgb(255, 255, 255);
    pub const BLUE: Colour = Colour::rgb(0, 0, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a `#rgb` or `#rrggbb` hex string
    pub fn parse(hex: &str) -> Result<Self, ComposeError> {
        let invalid = || ComposeError::InvalidColour(hex.to_string());
        let digits = hex.strip_prefix('#').ok_or_else(invalid)?;
        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match digits.len() {
            3 => {
                let expand = |i: usize| channel(&digits[i..=i].repeat(2));
                Ok(Colour::rgb(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Ok(Colour::rgb(
                channel(&digits[0..2])?,
                channel(&digits[2..4])?,
                channel(&digits[4..6])?,
            )),
            _ => Err(invalid()),
        }
    }

    /// Channels scaled to `0.0..=1.0`
    pub fn to_unit(self) -> (f32, f32, f32) {
        (
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        )
    }
}

/// Style flags of a font
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FontStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
}

impl FontStyle {
    pub const REGULAR: FontStyle = FontStyle {
        bold: false,
        italic: false,
        underline: false,
        strikethrough: false,
    };

    /// Parse a face token: `regular`/empty, `b`/`bold`, `i`/`italic`,
    /// `bi`/`bolditalic` (case-insensitive)
    pub fn parse(token: &str) -> Result<Self, ComposeError> {
        let (bold, italic) = match token.to_lowercase().as_str() {
            "" | "regular" => (false, false),
            "b" | "bold" => (true, false),
            "i" | "italic" => (false, true),
            "bi" | "bolditalic" => (true, true),
            _ => return Err(ComposeError::InvalidFontStyle(token.to_string())),
        };
        Ok(FontStyle {
            bold,
            italic,
            ..FontStyle::REGULAR
        })
    }
}

impl std::fmt::Display for FontStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut flags = String::new();
        if self.bold {
            flags.push('B');
        }
        if self.italic {
            flags.push('I');
        }
        if self.underline {
            flags.push('U');
        }
        if self.strikethrough {
            flags.push('S');
        }
        if flags.is_empty() {
            flags.push_str("regular");
        }
        write!(f, "{}", flags)
    }
}

/// The font state of a document: family, size in points and style flags
///
/// This is a plain value. Code that changes the font for a moment (a bold
/// word, a heading) copies the current descriptor and puts the copy back
/// afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct FontDescriptor {
    pub family: String,
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
}

impl FontDescriptor {
    pub fn new(family: impl Into<String>, size: f64) -> Self {
        Self {
            family: family.into(),
            size,
            bold: false,
            italic: false,
            underline: false,
            strikethrough: false,
        }
    }

    pub fn with_style(mut self, style: FontStyle) -> Self {
        self.bold = style.bold;
        self.italic = style.italic;
        self.underline = style.underline;
        self.strikethrough = style.strikethrough;
        self
    }

    pub fn style(&self) -> FontStyle {
        FontStyle {
            bold: self.bold,
            italic: self.italic,
            underline: self.underline,
            strikethrough: self.strikethrough,
        }
    }
}

/// Horizontal alignment of text within a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Centre,
    Right,
}

impl Align {
    /// Parse `l`/`left`, `c`/`centre` or `r`/`right` (case-insensitive)
    pub fn parse(token: &str) -> Result<Self, ComposeError> {
        match token.to_lowercase().as_str() {
            "l" | "left" => Ok(Align::Left),
            "c" | "centre" => Ok(Align::Centre),
            "r" | "right" => Ok(Align::Right),
            _ => Err(ComposeError::InvalidAlignment(token.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_colours() {
        assert_eq!(Colour::parse("#f00").unwrap(), Colour::rgb(255, 0, 0));
        assert_eq!(Colour::parse("#ffffff").unwrap(), Colour::WHITE);
        assert_eq!(Colour::parse("#1A2b3C").unwrap(), Colour::rgb(0x1a, 0x2b, 0x3c));
    }

    #[test]
    fn test_reject_malformed_colours() {
        for bad in ["f00", "#ff", "#12345", "#ggg", "#ffffff00", ""] {
            let err = Colour::parse(bad).unwrap_err();
            assert!(
                matches!(err, ComposeError::InvalidColour(ref value) if value == bad),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_alignment_tokens() {
        assert_eq!(Align::parse("Left").unwrap(), Align::Left);
        assert_eq!(Align::parse("c").unwrap(), Align::Centre);
        assert_eq!(Align::parse("CENTRE").unwrap(), Align::Centre);
        assert_eq!(Align::parse("r").unwrap(), Align::Right);
        assert!(matches!(
            Align::parse("middle"),
            Err(ComposeError::InvalidAlignment(_))
        ));
    }

    #[test]
    fn test_parse_font_style_tokens() {
        assert_eq!(FontStyle::parse("").unwrap(), FontStyle::REGULAR);
        assert!(FontStyle::parse("Bold").unwrap().bold);
        let bi = FontStyle::parse("bi").unwrap();
        assert!(bi.bold && bi.italic);
        assert!(matches!(
            FontStyle::parse("heavy"),
            Err(ComposeError::InvalidFontStyle(_))
        ));
    }

    #[test]
    fn test_descriptor_style_roundtrip() {
        let style = FontStyle {
            bold: true,
            underline: true,
            ..FontStyle::REGULAR
        };
        let font = FontDescriptor::new("Courier", 10.0).with_style(style);
        assert_eq!(font.style(), style);
        assert_eq!(font.style().to_string(), "BU");
    }
}
