//! Document scripts
//!
//! A script is a TOML file describing a whole document: settings, optional
//! header and footer, and an ordered list of content blocks. Loading parses
//! and validates the structure; [`DocumentScript::apply`] replays the blocks
//! against a [`Document`].
//!
//! ```toml
//! [document]
//! title = "Report"
//! page_size = "A4"
//!
//! [footer]
//! sections = [{ text = "Page {page} of {pages}", align = "c" }]
//!
//! [[blocks]]
//! kind = "page"
//!
//! [[blocks]]
//! kind = "heading"
//! level = 1
//! text = "Introduction"
//! ```

use crate::canvas::Canvas;
use crate::decoration::TextSection;
use crate::document::Document;
use crate::error::ComposeError;
use crate::list::ListItem;
use crate::style::{Align, FontDescriptor, FontStyle};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while loading or running a script
#[derive(Error, Debug)]
pub enum ScriptError {
    /// The script file could not be read
    #[error("Failed to read script {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The script is not valid TOML or does not match the schema
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A content block could not be laid out
    #[error("Block {index} ({kind}) failed: {source}")]
    Block {
        index: usize,
        kind: &'static str,
        #[source]
        source: ComposeError,
    },

    /// A document setting was rejected
    #[error(transparent)]
    Compose(#[from] ComposeError),
}

/// A complete document description
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocumentScript {
    #[serde(default)]
    pub document: Settings,

    pub header: Option<BandConfig>,

    pub footer: Option<BandConfig>,

    #[serde(default)]
    pub blocks: Vec<Block>,
}

/// Document-wide settings; anything left out keeps the default
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub creator: Option<String>,
    pub page_size: Option<String>,
    pub orientation: Option<String>,
    pub margin: Option<f64>,
    pub accent: Option<String>,
    pub foreground: Option<String>,
    pub background: Option<String>,
    pub indent_size: Option<f64>,
    pub line_height: Option<f64>,
    pub font: Option<FontConfig>,
}

/// A font change; missing family or size keep the current one
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FontConfig {
    #[serde(default)]
    pub family: String,
    #[serde(default)]
    pub size: f64,
    /// `regular`, `b`, `i` or `bi`
    #[serde(default)]
    pub style: String,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub strikethrough: bool,
}

impl FontConfig {
    fn descriptor(&self) -> Result<FontDescriptor, ComposeError> {
        let style = FontStyle {
            underline: self.underline,
            strikethrough: self.strikethrough,
            ..FontStyle::parse(&self.style)?
        };
        Ok(FontDescriptor::new(self.family.clone(), self.size).with_style(style))
    }
}

/// Header or footer contents
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BandConfig {
    /// Font family; empty uses the document font
    #[serde(default)]
    pub font: String,
    pub sections: Vec<SectionConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionConfig {
    pub text: String,
    #[serde(default = "default_align")]
    pub align: String,
}

impl BandConfig {
    fn sections(&self) -> Result<Vec<TextSection>, ComposeError> {
        self.sections
            .iter()
            .map(|section| Ok(TextSection::new(section.text.clone(), Align::parse(&section.align)?)))
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ListItemConfig {
    pub level: usize,
    pub text: String,
}

fn default_align() -> String {
    "l".to_string()
}

fn default_one() -> usize {
    1
}

fn default_weight() -> f64 {
    0.2
}

/// One step of document content
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum Block {
    Page,
    Heading {
        level: u8,
        text: String,
    },
    Paragraph {
        text: String,
    },
    Write {
        text: String,
    },
    WriteLine {
        text: String,
    },
    Bold {
        text: String,
    },
    BoldLine {
        text: String,
    },
    Italic {
        text: String,
    },
    ItalicLine {
        text: String,
    },
    BoldItalic {
        text: String,
    },
    BoldItalicLine {
        text: String,
    },
    LineBreak {
        #[serde(default = "default_one")]
        lines: usize,
    },
    List {
        items: Vec<ListItemConfig>,
    },
    Image {
        path: PathBuf,
        #[serde(default)]
        align: String,
        #[serde(default)]
        x: f64,
        #[serde(default)]
        width: f64,
        #[serde(default)]
        height: f64,
    },
    Hyperlink {
        text: String,
        url: String,
    },
    Toc {
        #[serde(default = "default_one")]
        pages: usize,
    },
    BoxInline {
        width: f64,
        height: f64,
        colour: String,
        #[serde(default)]
        fill: bool,
        #[serde(default)]
        border: bool,
    },
    Box {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        colour: String,
        #[serde(default)]
        fill: bool,
        #[serde(default)]
        border: bool,
    },
    Circle {
        x: f64,
        y: f64,
        radius: f64,
        colour: String,
        #[serde(default)]
        fill: bool,
        #[serde(default)]
        border: bool,
    },
    Line {
        from: [f64; 2],
        to: [f64; 2],
        colour: String,
        #[serde(default = "default_weight")]
        weight: f64,
    },
    Font {
        #[serde(default)]
        family: String,
        #[serde(default)]
        size: f64,
        #[serde(default)]
        style: String,
        #[serde(default)]
        underline: bool,
        #[serde(default)]
        strikethrough: bool,
    },
    FontSize {
        size: f64,
    },
    Foreground {
        colour: String,
    },
    Position {
        x: Option<f64>,
        y: Option<f64>,
    },
}

impl Block {
    /// The `kind` tag of the block
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Page => "page",
            Block::Heading { .. } => "heading",
            Block::Paragraph { .. } => "paragraph",
            Block::Write { .. } => "write",
            Block::WriteLine { .. } => "write_line",
            Block::Bold { .. } => "bold",
            Block::BoldLine { .. } => "bold_line",
            Block::Italic { .. } => "italic",
            Block::ItalicLine { .. } => "italic_line",
            Block::BoldItalic { .. } => "bold_italic",
            Block::BoldItalicLine { .. } => "bold_italic_line",
            Block::LineBreak { .. } => "line_break",
            Block::List { .. } => "list",
            Block::Image { .. } => "image",
            Block::Hyperlink { .. } => "hyperlink",
            Block::Toc { .. } => "toc",
            Block::BoxInline { .. } => "box_inline",
            Block::Box { .. } => "box",
            Block::Circle { .. } => "circle",
            Block::Line { .. } => "line",
            Block::Font { .. } => "font",
            Block::FontSize { .. } => "font_size",
            Block::Foreground { .. } => "foreground",
            Block::Position { .. } => "position",
        }
    }

    /// Lay the block out; relative image paths are taken from `base_dir`
    pub fn apply<C: Canvas>(&self, doc: &mut Document<C>, base_dir: &Path) -> Result<(), ComposeError> {
        match self {
            Block::Page => doc.page(),
            Block::Heading { level, text } => doc.heading(*level, text),
            Block::Paragraph { text } => doc.paragraph(text),
            Block::Write { text } => doc.write(text),
            Block::WriteLine { text } => doc.write_line(text),
            Block::Bold { text } => doc.bold(text),
            Block::BoldLine { text } => doc.bold_line(text),
            Block::Italic { text } => doc.italic(text),
            Block::ItalicLine { text } => doc.italic_line(text),
            Block::BoldItalic { text } => doc.bold_italic(text),
            Block::BoldItalicLine { text } => doc.bold_italic_line(text),
            Block::LineBreak { lines } => doc.ln(*lines),
            Block::List { items } => {
                let items: Vec<ListItem> = items
                    .iter()
                    .map(|item| ListItem::new(item.level, item.text.clone()))
                    .collect();
                doc.list(&items)
            }
            Block::Image {
                path,
                align,
                x,
                width,
                height,
            } => doc.image(base_dir.join(path), align, *x, *width, *height),
            Block::Hyperlink { text, url } => doc.hyperlink(text, url),
            Block::Toc { pages } => doc.table_of_contents(*pages),
            Block::BoxInline {
                width,
                height,
                colour,
                fill,
                border,
            } => doc.box_inline(*width, *height, colour, *fill, *border),
            Block::Box {
                x,
                y,
                width,
                height,
                colour,
                fill,
                border,
            } => doc.box_at(*x, *y, *width, *height, colour, *fill, *border),
            Block::Circle {
                x,
                y,
                radius,
                colour,
                fill,
                border,
            } => doc.circle(*x, *y, *radius, colour, *fill, *border),
            Block::Line {
                from,
                to,
                colour,
                weight,
            } => doc.line((from[0], from[1]), (to[0], to[1]), colour, *weight),
            Block::Font {
                family,
                size,
                style,
                underline,
                strikethrough,
            } => {
                let config = FontConfig {
                    family: family.clone(),
                    size: *size,
                    style: style.clone(),
                    underline: *underline,
                    strikethrough: *strikethrough,
                };
                doc.set_font(config.descriptor()?)
            }
            Block::FontSize { size } => doc.set_font_size(*size),
            Block::Foreground { colour } => doc.set_foreground(colour),
            Block::Position { x, y } => {
                doc.set_position(*x, *y);
                Ok(())
            }
        }
    }
}

impl DocumentScript {
    /// Load a script from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ScriptError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply the settings and run every block against `doc`
    pub fn apply<C: Canvas>(&self, doc: &mut Document<C>, base_dir: &Path) -> Result<(), ScriptError> {
        self.apply_settings(doc)?;

        if let Some(header) = &self.header {
            doc.set_header(&header.font, header.sections()?)?;
        }
        if let Some(footer) = &self.footer {
            doc.set_footer(&footer.font, footer.sections()?)?;
        }

        for (index, block) in self.blocks.iter().enumerate() {
            log::debug!("Block {}: {}", index, block.kind());
            block
                .apply(doc, base_dir)
                .map_err(|source| ScriptError::Block {
                    index,
                    kind: block.kind(),
                    source,
                })?;
        }
        Ok(())
    }

    fn apply_settings<C: Canvas>(&self, doc: &mut Document<C>) -> Result<(), ComposeError> {
        let settings = &self.document;

        if let Some(title) = &settings.title {
            doc.set_title(title.clone());
        }
        if let Some(author) = &settings.author {
            doc.set_author(author.clone());
        }
        if let Some(subject) = &settings.subject {
            doc.set_subject(subject.clone());
        }
        if !settings.keywords.is_empty() {
            doc.set_keywords(settings.keywords.clone());
        }
        if let Some(creator) = &settings.creator {
            doc.set_creator(creator.clone());
        }
        if let Some(page_size) = &settings.page_size {
            doc.set_page_size(page_size)?;
        }
        if let Some(orientation) = &settings.orientation {
            doc.set_orientation(orientation)?;
        }
        if let Some(margin) = settings.margin {
            doc.set_margin(margin);
        }
        if let Some(accent) = &settings.accent {
            doc.set_accent_colour(accent)?;
        }
        if let Some(foreground) = &settings.foreground {
            doc.set_foreground(foreground)?;
        }
        if let Some(background) = &settings.background {
            doc.set_background(background)?;
        }
        if let Some(indent) = settings.indent_size {
            doc.set_indent_size(indent);
        }
        // The font rescales the line height, so an explicit one goes last
        if let Some(font) = &settings.font {
            doc.set_font(font.descriptor()?)?;
        }
        if let Some(line_height) = settings.line_height {
            doc.set_line_height(line_height);
        }
        Ok(())
    }

    /// Build a PDF document from the script
    pub fn build(&self, base_dir: &Path) -> Result<Document, ScriptError> {
        let mut doc = Document::new();
        self.apply(&mut doc, base_dir)?;
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_script() {
        let script = DocumentScript::parse(
            r##"
[document]
title = "Quarterly report"
keywords = ["finance", "q3"]
page_size = "letter"
orientation = "l"
accent = "#0a0"

[document.font]
family = "Times"
size = 11

[footer]
sections = [
    { text = "Confidential" },
    { text = "Page {page} of {pages}", align = "r" },
]

[[blocks]]
kind = "page"

[[blocks]]
kind = "heading"
level = 2
text = "Summary"

[[blocks]]
kind = "list"
items = [{ level = 1, text = "one" }, { level = 2, text = "two" }]

[[blocks]]
kind = "line_break"
"##,
        )
        .unwrap();

        assert_eq!(script.document.title.as_deref(), Some("Quarterly report"));
        assert_eq!(script.document.keywords, vec!["finance", "q3"]);
        assert_eq!(script.document.font.as_ref().unwrap().size, 11.0);
        let footer = script.footer.as_ref().unwrap();
        assert_eq!(footer.sections[0].align, "l");
        assert_eq!(footer.sections().unwrap()[1].align, Align::Right);

        let kinds: Vec<_> = script.blocks.iter().map(Block::kind).collect();
        assert_eq!(kinds, vec!["page", "heading", "list", "line_break"]);
        assert!(matches!(script.blocks[3], Block::LineBreak { lines: 1 }));
    }

    #[test]
    fn test_unknown_block_kind_is_rejected() {
        let result = DocumentScript::parse(
            r#"
[[blocks]]
kind = "table"
"#,
        );
        assert!(matches!(result, Err(ScriptError::Parse(_))));
    }

    #[test]
    fn test_unknown_setting_is_rejected() {
        let result = DocumentScript::parse(
            r#"
[document]
colour_scheme = "dark"
"#,
        );
        assert!(matches!(result, Err(ScriptError::Parse(_))));
    }

    #[test]
    fn test_font_config_descriptor() {
        let config = FontConfig {
            family: "Courier".to_string(),
            size: 9.0,
            style: "bi".to_string(),
            underline: true,
            strikethrough: false,
        };
        let font = config.descriptor().unwrap();
        assert!(font.bold && font.italic && font.underline);
        assert!(!font.strikethrough);

        let bad = FontConfig {
            style: "heavy".to_string(),
            ..FontConfig::default()
        };
        assert!(matches!(
            bad.descriptor(),
            Err(ComposeError::InvalidFontStyle(_))
        ));
    }

    #[test]
    fn test_failing_block_is_named() {
        let script = DocumentScript::parse(
            r#"
[[blocks]]
kind = "page"

[[blocks]]
kind = "heading"
level = 9
text = "Too deep"
"#,
        )
        .unwrap();

        let err = script.build(Path::new(".")).err().unwrap();
        match err {
            ScriptError::Block { index, kind, source } => {
                assert_eq!(index, 1);
                assert_eq!(kind, "heading");
                assert!(matches!(source, ComposeError::InvalidHeadingLevel(9)));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_settings_are_applied() {
        let script = DocumentScript::parse(
            r##"
[document]
author = "A. Writer"
margin = 15
line_height = 8
background = "#eee"

[document.font]
size = 24
"##,
        )
        .unwrap();

        let doc = script.build(Path::new(".")).unwrap();
        assert_eq!(doc.author(), "A. Writer");
        assert_eq!(doc.margin(), 15.0);
        assert_eq!(doc.font().size, 24.0);
        assert_eq!(doc.font().family, "Arial");
        assert_eq!(doc.line_height(), 8.0);
    }
}
