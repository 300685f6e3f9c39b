//! The PDF standard fonts and their advance widths
//!
//! Widths are in thousandths of an em for the printable ASCII range
//! (0x20..=0x7E). Characters outside that range use the font's fallback
//! width. Oblique/italic faces share the widths of their upright face.

use crate::geometry::PT_PER_MM;
use crate::style::FontStyle;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    278, 278, 584, 584, 584, 556, 1015,
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    278, 278, 278, 469, 556, 333,
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];

#[rustfmt::skip]
const TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    278, 278, 564, 564, 564, 444, 921,
    722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889,
    722, 722, 556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611,
    333, 278, 333, 469, 500, 333,
    444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778,
    500, 500, 500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444,
    480, 200, 480, 541,
];

#[rustfmt::skip]
const TIMES_BOLD: [u16; 95] = [
    250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278,
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500,
    333, 333, 570, 570, 570, 500, 930,
    722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944,
    722, 778, 611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667,
    333, 278, 333, 581, 500, 333,
    500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833,
    556, 500, 556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444,
    394, 220, 394, 520,
];

/// One of the standard Type 1 fonts every PDF reader provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    ZapfDingbats,
}

/// Resolve a family name and style to a standard font
///
/// `Arial` is an alias of Helvetica. Style flags are ignored for the symbol
/// font. Returns `None` for families that are not available.
pub fn resolve(family: &str, style: FontStyle) -> Option<StandardFont> {
    let family: String = family
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect::<String>()
        .to_lowercase();

    let faces = match family.as_str() {
        "helvetica" | "arial" => [
            StandardFont::Helvetica,
            StandardFont::HelveticaBold,
            StandardFont::HelveticaOblique,
            StandardFont::HelveticaBoldOblique,
        ],
        "courier" | "couriernew" => [
            StandardFont::Courier,
            StandardFont::CourierBold,
            StandardFont::CourierOblique,
            StandardFont::CourierBoldOblique,
        ],
        "times" | "timesroman" | "timesnewroman" => [
            StandardFont::TimesRoman,
            StandardFont::TimesBold,
            StandardFont::TimesItalic,
            StandardFont::TimesBoldItalic,
        ],
        "zapfdingbats" => return Some(StandardFont::ZapfDingbats),
        _ => return None,
    };

    Some(match (style.bold, style.italic) {
        (false, false) => faces[0],
        (true, false) => faces[1],
        (false, true) => faces[2],
        (true, true) => faces[3],
    })
}

impl StandardFont {
    /// PostScript name used as `BaseFont`
    pub fn base_name(self) -> &'static str {
        match self {
            StandardFont::Helvetica => "Helvetica",
            StandardFont::HelveticaBold => "Helvetica-Bold",
            StandardFont::HelveticaOblique => "Helvetica-Oblique",
            StandardFont::HelveticaBoldOblique => "Helvetica-BoldOblique",
            StandardFont::Courier => "Courier",
            StandardFont::CourierBold => "Courier-Bold",
            StandardFont::CourierOblique => "Courier-Oblique",
            StandardFont::CourierBoldOblique => "Courier-BoldOblique",
            StandardFont::TimesRoman => "Times-Roman",
            StandardFont::TimesBold => "Times-Bold",
            StandardFont::TimesItalic => "Times-Italic",
            StandardFont::TimesBoldItalic => "Times-BoldItalic",
            StandardFont::ZapfDingbats => "ZapfDingbats",
        }
    }

    /// Whether text in this font is encoded as WinAnsi
    pub fn uses_win_ansi(self) -> bool {
        self != StandardFont::ZapfDingbats
    }

    /// Advance width of a character in thousandths of an em
    pub fn char_width(self, c: char) -> u16 {
        let table = match self {
            StandardFont::Helvetica | StandardFont::HelveticaOblique => &HELVETICA,
            StandardFont::HelveticaBold | StandardFont::HelveticaBoldOblique => &HELVETICA_BOLD,
            StandardFont::TimesRoman | StandardFont::TimesItalic => &TIMES_ROMAN,
            StandardFont::TimesBold | StandardFont::TimesBoldItalic => &TIMES_BOLD,
            StandardFont::Courier
            | StandardFont::CourierBold
            | StandardFont::CourierOblique
            | StandardFont::CourierBoldOblique => return 600,
            StandardFont::ZapfDingbats => return dingbat_width(c),
        };

        let code = c as u32;
        if (0x20..=0x7e).contains(&code) {
            table[(code - 0x20) as usize]
        } else {
            self.fallback_width()
        }
    }

    fn fallback_width(self) -> u16 {
        match self {
            StandardFont::HelveticaBold | StandardFont::HelveticaBoldOblique => 611,
            StandardFont::TimesRoman
            | StandardFont::TimesItalic
            | StandardFont::TimesBold
            | StandardFont::TimesBoldItalic => 500,
            _ => 556,
        }
    }

    /// Width of `text` in millimetres at `size` points
    pub fn text_width(self, text: &str, size: f64) -> f64 {
        let units: u32 = text.chars().map(|c| u32::from(self.char_width(c))).sum();
        f64::from(units) * size / 1000.0 / PT_PER_MM
    }
}

// Only the list bullets are exact; other glyphs use a typical width
fn dingbat_width(c: char) -> u16 {
    match c {
        ' ' => 278,
        'l' => 791,
        'm' => 873,
        'n' => 761,
        _ => 788,
    }
}

/// Encode text for a standard font
///
/// WinAnsi fonts get Latin-1 plus the typographic characters of the
/// Windows-1252 block; anything else becomes `?`. The symbol font takes raw
/// byte values.
pub fn encode(text: &str, win_ansi: bool) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if !win_ansi {
                return u8::try_from(code).unwrap_or(b'?');
            }
            match c {
                '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => code as u8,
                '€' => 0x80,
                '‚' => 0x82,
                '„' => 0x84,
                '…' => 0x85,
                '‘' => 0x91,
                '’' => 0x92,
                '“' => 0x93,
                '”' => 0x94,
                '•' => 0x95,
                '–' => 0x96,
                '—' => 0x97,
                '™' => 0x99,
                _ => b'?',
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn test_resolve_families() {
        assert_eq!(
            resolve("Arial", FontStyle::REGULAR),
            Some(StandardFont::Helvetica)
        );
        let bold_italic = FontStyle::parse("bi").unwrap();
        assert_eq!(
            resolve("helvetica", bold_italic),
            Some(StandardFont::HelveticaBoldOblique)
        );
        assert_eq!(
            resolve("Times New Roman", FontStyle::parse("b").unwrap()),
            Some(StandardFont::TimesBold)
        );
        assert_eq!(
            resolve("zapfdingbats", bold_italic),
            Some(StandardFont::ZapfDingbats)
        );
        assert_eq!(resolve("Comic Sans", FontStyle::REGULAR), None);
    }

    #[test]
    fn test_text_width_in_millimetres() {
        // "Hi" in Helvetica: 722 + 222 units
        let width = StandardFont::Helvetica.text_width("Hi", 12.0);
        assert!(approx_eq!(f64, width, 944.0 * 12.0 / 1000.0 / PT_PER_MM, epsilon = 1e-9));

        // Courier is monospaced
        let a = StandardFont::Courier.text_width("iii", 10.0);
        let b = StandardFont::Courier.text_width("WWW", 10.0);
        assert!(approx_eq!(f64, a, b, epsilon = 1e-12));
    }

    #[test]
    fn test_bold_is_wider() {
        let regular = StandardFont::Helvetica.text_width("Contents", 12.0);
        let bold = StandardFont::HelveticaBold.text_width("Contents", 12.0);
        assert!(bold > regular);
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode("Abc", true), b"Abc".to_vec());
        assert_eq!(encode("café", true), vec![b'c', b'a', b'f', 0xe9]);
        assert_eq!(encode("“x”", true), vec![0x93, b'x', 0x94]);
        assert_eq!(encode("漢", true), vec![b'?']);
        assert_eq!(encode("l", false), vec![0x6c]);
    }
}
