//! PDF canvas built on pdf-writer
//!
//! Pages are recorded as display lists while the document is composed, so
//! earlier pages can still be drawn on (the table of contents is filled in
//! last) and text aliases such as `{pages}` are substituted only when the
//! file is written.

use super::metrics::{self, StandardFont};
use super::{Canvas, CanvasError, LinkId, LinkTarget, Metadata, Paint};
use crate::geometry::{Rect, Size, PT_PER_MM};
use crate::style::{Colour, FontStyle};
use chrono::{Datelike, NaiveDateTime, Timelike};
use miniz_oxide::deflate::compress_to_vec_zlib;
use pdf_writer::types::{ActionType, AnnotationType, PageMode};
use pdf_writer::{Content, Date, Filter, Finish, Name, Pdf, Ref, Str, TextStr};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Control points of a quarter circle drawn as a cubic Bézier
const KAPPA: f64 = 0.552_284_749_831;

const COMPRESSION_LEVEL: u8 = 6;

#[derive(Debug, Clone, Copy)]
struct ActiveFont {
    font: StandardFont,
    size: f64,
}

#[derive(Debug)]
enum Op {
    Text {
        font: StandardFont,
        size: f64,
        colour: Colour,
        x: f64,
        y: f64,
        text: String,
    },
    Rect {
        rect: Rect,
        paint: Paint,
        fill: Colour,
        stroke: Colour,
        width: f64,
    },
    Circle {
        x: f64,
        y: f64,
        radius: f64,
        paint: Paint,
        fill: Colour,
        stroke: Colour,
        width: f64,
    },
    Line {
        from: (f64, f64),
        to: (f64, f64),
        colour: Colour,
        width: f64,
    },
    Image {
        index: usize,
        rect: Rect,
    },
}

#[derive(Debug)]
struct LinkArea {
    rect: Rect,
    target: LinkTarget,
}

#[derive(Debug)]
struct PageRecord {
    size: Size,
    ops: Vec<Op>,
    links: Vec<LinkArea>,
}

#[derive(Debug)]
struct OutlineEntry {
    title: String,
    level: usize,
    page: usize,
    y: f64,
}

#[derive(Debug)]
struct ImageResource {
    path: PathBuf,
    width: u32,
    height: u32,
    rgb: Vec<u8>,
}

/// In-memory PDF canvas using the standard Type 1 fonts
#[derive(Debug)]
pub struct PdfCanvas {
    pages: Vec<PageRecord>,
    current: usize,
    font: Option<ActiveFont>,
    text_colour: Colour,
    fill_colour: Colour,
    draw_colour: Colour,
    line_width: f64,
    links: Vec<Option<(usize, f64)>>,
    outline: Vec<OutlineEntry>,
    aliases: Vec<(String, String)>,
    images: Vec<ImageResource>,
}

impl Default for PdfCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfCanvas {
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            current: 0,
            font: None,
            text_colour: Colour::BLACK,
            fill_colour: Colour::BLACK,
            draw_colour: Colour::BLACK,
            // 0.2 mm, the customary hairline
            line_width: 0.2,
            links: Vec::new(),
            outline: Vec::new(),
            aliases: Vec::new(),
            images: Vec::new(),
        }
    }

    fn page_mut(&mut self) -> Result<&mut PageRecord, CanvasError> {
        let index = self.current.checked_sub(1).ok_or(CanvasError::NoPage)?;
        self.pages.get_mut(index).ok_or(CanvasError::NoPage)
    }

    fn push(&mut self, op: Op) -> Result<(), CanvasError> {
        self.page_mut()?.ops.push(op);
        Ok(())
    }

    fn load_image(&mut self, path: &Path) -> Result<usize, CanvasError> {
        if let Some(index) = self.images.iter().position(|image| image.path == path) {
            return Ok(index);
        }

        let decoded = image::open(path).map_err(|e| CanvasError::Image {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let rgb = decoded.to_rgb8();
        log::debug!(
            "Decoded image {} ({}x{})",
            path.display(),
            rgb.width(),
            rgb.height()
        );

        self.images.push(ImageResource {
            path: path.to_path_buf(),
            width: rgb.width(),
            height: rgb.height(),
            rgb: rgb.into_raw(),
        });
        Ok(self.images.len() - 1)
    }

    fn substitute_aliases(&self, text: &str) -> String {
        self.aliases
            .iter()
            .fold(text.to_string(), |acc, (alias, replacement)| {
                acc.replace(alias.as_str(), replacement)
            })
    }

    fn used_fonts(&self) -> Vec<StandardFont> {
        let mut fonts: Vec<StandardFont> = self
            .pages
            .iter()
            .flat_map(|page| page.ops.iter())
            .filter_map(|op| match op {
                Op::Text { font, .. } => Some(*font),
                _ => None,
            })
            .collect();
        fonts.sort();
        fonts.dedup();
        fonts
    }

    fn write_content(
        &self,
        page: &PageRecord,
        font_names: &BTreeMap<StandardFont, String>,
    ) -> Vec<u8> {
        let page_height = page.size.height;
        let mut content = Content::new();

        for op in &page.ops {
            match op {
                Op::Text {
                    font,
                    size,
                    colour,
                    x,
                    y,
                    text,
                } => {
                    let Some(name) = font_names.get(font) else {
                        continue;
                    };
                    let (r, g, b) = colour.to_unit();
                    let text = self.substitute_aliases(text);
                    let encoded = metrics::encode(&text, font.uses_win_ansi());
                    content.set_fill_rgb(r, g, b);
                    content.begin_text();
                    content.set_font(Name(name.as_bytes()), *size as f32);
                    content.next_line(pt(*x), pt(page_height - *y));
                    content.show(Str(&encoded));
                    content.end_text();
                }
                Op::Rect {
                    rect,
                    paint,
                    fill,
                    stroke,
                    width,
                } => {
                    content.save_state();
                    set_paint_colours(&mut content, *fill, *stroke, *width);
                    content.rect(
                        pt(rect.x),
                        pt(page_height - rect.y - rect.height),
                        pt(rect.width),
                        pt(rect.height),
                    );
                    apply_paint(&mut content, *paint);
                    content.restore_state();
                }
                Op::Circle {
                    x,
                    y,
                    radius,
                    paint,
                    fill,
                    stroke,
                    width,
                } => {
                    content.save_state();
                    set_paint_colours(&mut content, *fill, *stroke, *width);
                    circle_path(&mut content, *x, page_height - *y, *radius);
                    apply_paint(&mut content, *paint);
                    content.restore_state();
                }
                Op::Line {
                    from,
                    to,
                    colour,
                    width,
                } => {
                    let (r, g, b) = colour.to_unit();
                    content.save_state();
                    content.set_stroke_rgb(r, g, b);
                    content.set_line_width(pt(*width));
                    content.move_to(pt(from.0), pt(page_height - from.1));
                    content.line_to(pt(to.0), pt(page_height - to.1));
                    content.stroke();
                    content.restore_state();
                }
                Op::Image { index, rect } => {
                    let name = image_name(*index);
                    content.save_state();
                    content.transform([
                        pt(rect.width),
                        0.0,
                        0.0,
                        pt(rect.height),
                        pt(rect.x),
                        pt(page_height - rect.y - rect.height),
                    ]);
                    content.x_object(Name(name.as_bytes()));
                    content.restore_state();
                }
            }
        }

        content.finish()
    }
}

fn pt(mm: f64) -> f32 {
    (mm * PT_PER_MM) as f32
}

fn image_name(index: usize) -> String {
    format!("Im{}", index + 1)
}

fn set_paint_colours(content: &mut Content, fill: Colour, stroke: Colour, width: f64) {
    let (r, g, b) = fill.to_unit();
    content.set_fill_rgb(r, g, b);
    let (r, g, b) = stroke.to_unit();
    content.set_stroke_rgb(r, g, b);
    content.set_line_width(pt(width));
}

fn apply_paint(content: &mut Content, paint: Paint) {
    match (paint.fill, paint.stroke) {
        (true, true) => {
            content.fill_nonzero_and_stroke();
        }
        (true, false) => {
            content.fill_nonzero();
        }
        _ => {
            content.stroke();
        }
    }
}

/// Four Bézier quarter arcs around (`cx`, `cy`), in PDF coordinates
fn circle_path(content: &mut Content, cx: f64, cy: f64, radius: f64) {
    let k = KAPPA * radius;
    content.move_to(pt(cx + radius), pt(cy));
    content.cubic_to(
        pt(cx + radius),
        pt(cy + k),
        pt(cx + k),
        pt(cy + radius),
        pt(cx),
        pt(cy + radius),
    );
    content.cubic_to(
        pt(cx - k),
        pt(cy + radius),
        pt(cx - radius),
        pt(cy + k),
        pt(cx - radius),
        pt(cy),
    );
    content.cubic_to(
        pt(cx - radius),
        pt(cy - k),
        pt(cx - k),
        pt(cy - radius),
        pt(cx),
        pt(cy - radius),
    );
    content.cubic_to(
        pt(cx + k),
        pt(cy - radius),
        pt(cx + radius),
        pt(cy - k),
        pt(cx + radius),
        pt(cy),
    );
    content.close_path();
}

fn pdf_date(value: NaiveDateTime) -> Date {
    Date::new(value.year().clamp(0, 9999) as u16)
        .month(value.month() as u8)
        .day(value.day() as u8)
        .hour(value.hour() as u8)
        .minute(value.minute() as u8)
        .second(value.second() as u8)
}

/// Parent, siblings and children of every outline entry, derived from levels
struct OutlineTree {
    parent: Vec<Option<usize>>,
    prev: Vec<Option<usize>>,
    next: Vec<Option<usize>>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
}

impl OutlineTree {
    fn build(entries: &[OutlineEntry]) -> Self {
        let n = entries.len();
        let mut parent = vec![None; n];
        let mut children = vec![Vec::new(); n];
        let mut roots = Vec::new();
        let mut stack: Vec<usize> = Vec::new();

        for (i, entry) in entries.iter().enumerate() {
            while let Some(&top) = stack.last() {
                if entries[top].level >= entry.level {
                    stack.pop();
                } else {
                    break;
                }
            }
            match stack.last() {
                Some(&p) => {
                    parent[i] = Some(p);
                    children[p].push(i);
                }
                None => roots.push(i),
            }
            stack.push(i);
        }

        let mut prev = vec![None; n];
        let mut next = vec![None; n];
        for siblings in children.iter().chain(std::iter::once(&roots)) {
            for pair in siblings.windows(2) {
                next[pair[0]] = Some(pair[1]);
                prev[pair[1]] = Some(pair[0]);
            }
        }

        Self {
            parent,
            prev,
            next,
            children,
            roots,
        }
    }

    fn descendants(&self, node: usize) -> usize {
        self.children[node]
            .iter()
            .map(|&child| 1 + self.descendants(child))
            .sum()
    }
}

impl Canvas for PdfCanvas {
    fn begin_page(&mut self, size: Size) {
        self.pages.push(PageRecord {
            size,
            ops: Vec::new(),
            links: Vec::new(),
        });
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
            .map(|page| page.size)
    }

    fn set_font(&mut self, family: &str, style: FontStyle, size: f64) -> Result<(), CanvasError> {
        let font = metrics::resolve(family, style).ok_or_else(|| CanvasError::UnknownFont {
            family: family.to_string(),
            style,
        })?;
        self.font = Some(ActiveFont { font, size });
        Ok(())
    }

    fn measure(
        &self,
        family: &str,
        style: FontStyle,
        size: f64,
        text: &str,
    ) -> Result<f64, CanvasError> {
        let font = metrics::resolve(family, style).ok_or_else(|| CanvasError::UnknownFont {
            family: family.to_string(),
            style,
        })?;
        Ok(font.text_width(text, size))
    }

    fn string_width(&self, text: &str) -> f64 {
        self.font
            .map(|active| active.font.text_width(text, active.size))
            .unwrap_or(0.0)
    }

    fn set_text_colour(&mut self, colour: Colour) {
        self.text_colour = colour;
    }

    fn set_fill_colour(&mut self, colour: Colour) {
        self.fill_colour = colour;
    }

    fn set_draw_colour(&mut self, colour: Colour) {
        self.draw_colour = colour;
    }

    fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    fn text(&mut self, x: f64, y: f64, text: &str) -> Result<(), CanvasError> {
        let active = self.font.ok_or(CanvasError::NoFont)?;
        let op = Op::Text {
            font: active.font,
            size: active.size,
            colour: self.text_colour,
            x,
            y,
            text: text.to_string(),
        };
        self.push(op)
    }

    fn rect(&mut self, rect: Rect, paint: Paint) -> Result<(), CanvasError> {
        let op = Op::Rect {
            rect,
            paint,
            fill: self.fill_colour,
            stroke: self.draw_colour,
            width: self.line_width,
        };
        self.push(op)
    }

    fn circle(&mut self, x: f64, y: f64, radius: f64, paint: Paint) -> Result<(), CanvasError> {
        let op = Op::Circle {
            x,
            y,
            radius,
            paint,
            fill: self.fill_colour,
            stroke: self.draw_colour,
            width: self.line_width,
        };
        self.push(op)
    }

    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<(), CanvasError> {
        let op = Op::Line {
            from: (x1, y1),
            to: (x2, y2),
            colour: self.draw_colour,
            width: self.line_width,
        };
        self.push(op)
    }

    fn image(&mut self, path: &Path, rect: Rect) -> Result<(), CanvasError> {
        // Fail before decoding when there is nowhere to draw
        self.page_mut()?;
        let index = self.load_image(path)?;
        self.push(Op::Image { index, rect })
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
        self.page_mut()?.links.push(LinkArea { rect, target });
        Ok(())
    }

    fn bookmark(&mut self, title: &str, level: usize, y: f64) -> Result<(), CanvasError> {
        if self.current == 0 {
            return Err(CanvasError::NoPage);
        }
        self.outline.push(OutlineEntry {
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

    fn finish(&mut self, metadata: &Metadata) -> Result<Vec<u8>, CanvasError> {
        if self.pages.is_empty() {
            return Err(CanvasError::NoPage);
        }

        let mut pdf = Pdf::new();
        let mut alloc = Ref::new(1);
        let catalog_id = alloc.bump();
        let tree_id = alloc.bump();
        let info_id = alloc.bump();

        let page_ids: Vec<Ref> = self.pages.iter().map(|_| alloc.bump()).collect();
        let content_ids: Vec<Ref> = self.pages.iter().map(|_| alloc.bump()).collect();

        // Fonts
        let mut font_names = BTreeMap::new();
        let mut font_refs = Vec::new();
        for (i, font) in self.used_fonts().into_iter().enumerate() {
            let id = alloc.bump();
            let name = format!("F{}", i + 1);
            let mut type1 = pdf.type1_font(id);
            type1.base_font(Name(font.base_name().as_bytes()));
            if font.uses_win_ansi() {
                type1.encoding_predefined(Name(b"WinAnsiEncoding"));
            }
            type1.finish();
            font_refs.push((name.clone(), id));
            font_names.insert(font, name);
        }

        // Images
        let mut image_refs = Vec::new();
        for (i, resource) in self.images.iter().enumerate() {
            let id = alloc.bump();
            let compressed = compress_to_vec_zlib(&resource.rgb, COMPRESSION_LEVEL);
            let mut xobject = pdf.image_xobject(id, &compressed);
            xobject.filter(Filter::FlateDecode);
            xobject.width(resource.width as i32);
            xobject.height(resource.height as i32);
            xobject.color_space().device_rgb();
            xobject.bits_per_component(8);
            xobject.finish();
            image_refs.push((image_name(i), id));
        }

        // Link annotations
        let mut annotation_refs: Vec<Vec<Ref>> = Vec::with_capacity(self.pages.len());
        for page in &self.pages {
            let page_height = page.size.height;
            let mut refs = Vec::new();
            for link in &page.links {
                let destination = match &link.target {
                    LinkTarget::Internal(id) => match self.links.get(id.0).copied().flatten() {
                        Some(bound) => Some(bound),
                        None => {
                            log::warn!("Link target {} was never bound, skipping", id.0);
                            continue;
                        }
                    },
                    LinkTarget::Uri(_) => None,
                };

                let id = alloc.bump();
                let rect = link.rect;
                let mut annotation = pdf.annotation(id);
                annotation.subtype(AnnotationType::Link);
                annotation.rect(pdf_writer::Rect::new(
                    pt(rect.x),
                    pt(page_height - rect.y - rect.height),
                    pt(rect.x + rect.width),
                    pt(page_height - rect.y),
                ));
                annotation.border(0.0, 0.0, 0.0, None);
                match (&link.target, destination) {
                    (LinkTarget::Uri(uri), _) => {
                        annotation
                            .action()
                            .action_type(ActionType::Uri)
                            .uri(Str(uri.as_bytes()));
                    }
                    (LinkTarget::Internal(_), Some((target_page, y))) => {
                        let target_height = self.pages[target_page - 1].size.height;
                        annotation
                            .insert(Name(b"Dest"))
                            .start::<pdf_writer::writers::Destination>()
                            .page(page_ids[target_page - 1])
                            .xyz(0.0, pt(target_height - y), None);
                    }
                    (LinkTarget::Internal(_), None) => {}
                }
                annotation.finish();
                refs.push(id);
            }
            annotation_refs.push(refs);
        }

        // Outline
        let outline_id = if self.outline.is_empty() {
            None
        } else {
            let root = alloc.bump();
            let tree = OutlineTree::build(&self.outline);
            let item_ids: Vec<Ref> = self.outline.iter().map(|_| alloc.bump()).collect();

            for (i, entry) in self.outline.iter().enumerate() {
                let mut item = pdf.outline_item(item_ids[i]);
                item.title(TextStr(&entry.title));
                item.parent(tree.parent[i].map_or(root, |p| item_ids[p]));
                if let Some(prev) = tree.prev[i] {
                    item.prev(item_ids[prev]);
                }
                if let Some(next) = tree.next[i] {
                    item.next(item_ids[next]);
                }
                if let (Some(&first), Some(&last)) =
                    (tree.children[i].first(), tree.children[i].last())
                {
                    item.first(item_ids[first]);
                    item.last(item_ids[last]);
                    item.count(tree.descendants(i) as i32);
                }
                let page_height = self.pages[entry.page - 1].size.height;
                item.insert(Name(b"Dest"))
                    .start::<pdf_writer::writers::Destination>()
                    .page(page_ids[entry.page - 1])
                    .xyz(0.0, pt(page_height - entry.y), None);
                item.finish();
            }

            let mut outline = pdf.outline(root);
            if let (Some(&first), Some(&last)) = (tree.roots.first(), tree.roots.last()) {
                outline.first(item_ids[first]);
                outline.last(item_ids[last]);
            }
            outline.count(self.outline.len() as i32);
            outline.finish();
            Some(root)
        };

        // Pages
        for (i, page) in self.pages.iter().enumerate() {
            let raw = self.write_content(page, &font_names);
            let compressed = compress_to_vec_zlib(&raw, COMPRESSION_LEVEL);
            pdf.stream(content_ids[i], &compressed)
                .filter(Filter::FlateDecode);

            let mut page_writer = pdf.page(page_ids[i]);
            page_writer
                .media_box(pdf_writer::Rect::new(
                    0.0,
                    0.0,
                    pt(page.size.width),
                    pt(page.size.height),
                ))
                .parent(tree_id)
                .contents(content_ids[i]);
            if !annotation_refs[i].is_empty() {
                page_writer.annotations(annotation_refs[i].iter().copied());
            }
            {
                let mut resources = page_writer.resources();
                {
                    let mut fonts = resources.fonts();
                    for (name, id) in &font_refs {
                        fonts.pair(Name(name.as_bytes()), *id);
                    }
                }
                if !image_refs.is_empty() {
                    let mut xobjects = resources.x_objects();
                    for (name, id) in &image_refs {
                        xobjects.pair(Name(name.as_bytes()), *id);
                    }
                }
            }
            page_writer.finish();
        }

        pdf.pages(tree_id)
            .kids(page_ids.iter().copied())
            .count(page_ids.len() as i32);

        {
            let mut catalog = pdf.catalog(catalog_id);
            catalog.pages(tree_id);
            if let Some(root) = outline_id {
                catalog.outlines(root);
                catalog.page_mode(PageMode::UseOutlines);
            }
        }

        {
            let mut info = pdf.document_info(info_id);
            info.title(TextStr(&metadata.title));
            info.author(TextStr(&metadata.author));
            info.subject(TextStr(&metadata.subject));
            info.keywords(TextStr(&metadata.keywords.join(";")));
            info.creator(TextStr(&metadata.creator));
            info.producer(TextStr(&metadata.producer));
            if let Some(created) = metadata.creation_date {
                info.creation_date(pdf_date(created));
            }
            if let Some(modified) = metadata.modification_date {
                info.modified_date(pdf_date(modified));
            }
        }

        log::debug!(
            "Serialized {} pages, {} fonts, {} images",
            self.pages.len(),
            font_refs.len(),
            image_refs.len()
        );

        Ok(pdf.finish())
    }
}
