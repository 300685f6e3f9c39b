//! Bulleted lists

use crate::canvas::Canvas;
use crate::document::Document;
use crate::error::{ComposeError, Result};
use crate::style::{Align, FontDescriptor};

/// Deepest level that still indents further
pub const LIST_LEVEL_CAP: usize = 10;

/// Font the bullets are drawn in
pub const BULLET_FONT: &str = "ZapfDingbats";

/// Space left under each item, in mm
const ITEM_SPACING: f64 = 2.0;

/// A list entry; level 1 is the outermost
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub level: usize,
    pub text: String,
}

impl ListItem {
    pub fn new(level: usize, text: impl Into<String>) -> Self {
        Self {
            level,
            text: text.into(),
        }
    }
}

/// The glyph drawn in front of an item and how much smaller than the body
/// text it is set, in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bullet {
    pub glyph: &'static str,
    pub size_reduction: f64,
}

const DISC: Bullet = Bullet {
    glyph: "l",
    size_reduction: 5.0,
};
const CIRCLE: Bullet = Bullet {
    glyph: "m ",
    size_reduction: 6.0,
};
const SQUARE: Bullet = Bullet {
    glyph: "n",
    size_reduction: 5.0,
};

/// Bullet for a nesting level; the three glyphs repeat every three levels
pub fn bullet_for(level: usize) -> Bullet {
    if level > LIST_LEVEL_CAP {
        return DISC;
    }
    if level == 1 || level % 3 == 1 {
        DISC
    } else if level == 2 || level % 3 == 2 {
        CIRCLE
    } else {
        SQUARE
    }
}

/// x position of an item's bullet
pub fn list_indent(margin: f64, indent_unit: f64, level: usize) -> f64 {
    margin + indent_unit * 1.5 * level.min(LIST_LEVEL_CAP) as f64
}

impl<C: Canvas> Document<C> {
    /// Write a bulleted list
    ///
    /// Every item starts on its own line, indented by its level. Font and
    /// line height are the same afterwards as before.
    pub fn list(&mut self, items: &[ListItem]) -> Result<()> {
        self.ensure_open()?;
        if let Some(item) = items.iter().find(|item| item.level == 0) {
            return Err(ComposeError::InvalidListLevel(item.level));
        }

        let saved_font = self.font.clone();
        let line_height = self.line_height;

        for item in items {
            self.flow
                .set_x(list_indent(self.margin, self.indent, item.level));

            let bullet = bullet_for(item.level);
            let mut size = saved_font.size - bullet.size_reduction;
            if size <= 0.0 {
                size = saved_font.size;
            }
            self.flow.set_font(&FontDescriptor::new(BULLET_FONT, size))?;
            self.flow.write(line_height, bullet.glyph, None)?;

            let x = self.flow.x();
            self.flow.set_x(x + self.indent / 1.25);
            self.flow.set_font(&saved_font)?;
            self.flow.multi_cell(0.0, line_height, &item.text, Align::Left)?;

            let y = self.flow.y();
            self.flow.set_y(y + ITEM_SPACING);
        }

        self.font = saved_font;
        self.line_height = line_height;
        log::debug!("List printed ({} items)", items.len());
        Ok(())
    }
}
