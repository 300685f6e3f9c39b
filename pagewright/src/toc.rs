//! Table of contents
//!
//! Pages for the table of contents are reserved while the document is
//! composed. When it is finalized the heading log is laid out into rows
//! (title, dot leader, page number) by [`layout_rows`], and the rows are drawn
//! onto the reserved pages.

use crate::canvas::{Canvas, LinkTarget};
use crate::document::Document;
use crate::error::{ComposeError, Result};
use crate::flow::Cell;
use crate::heading::{HeadingRecord, CONTENTS_TITLE};
use crate::style::{Align, FontDescriptor};

/// Dot leaders stop this far short of the page number, in mm
const LEADER_GAP: f64 = 0.75;

/// Rows are spaced this many body line heights apart
const ROW_SPACING: f64 = 1.5;

/// Where the table of contents goes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TocReservation {
    /// Page that was current when the table was requested; rows start here
    pub trigger_page: usize,
    /// Blank pages inserted after the trigger page
    pub reserved_pages: usize,
}

/// Page measurements the row layout depends on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TocGeometry {
    /// y of the first row, below the "Contents" heading
    pub start_y: f64,
    /// y of the first row on each following page
    pub top_y: f64,
    pub page_height: f64,
    pub footer_height: f64,
    pub margin: f64,
    pub content_width: f64,
    pub indent_unit: f64,
    pub line_height: f64,
}

/// One laid-out line of the table of contents
#[derive(Debug, Clone, PartialEq)]
pub struct TocRow {
    /// Index into the heading log
    pub heading: usize,
    /// Pages after the trigger page
    pub page_offset: usize,
    pub x: f64,
    pub y: f64,
    pub bold: bool,
    pub title_width: f64,
    pub leader: String,
    /// Space between the title and the page number
    pub leader_width: f64,
    pub page_label: String,
    pub page_label_width: f64,
}

/// The shortest run of dots at least `space - 0.75` wide
///
/// Stops early if adding a dot does not make the run any wider.
pub fn dot_leader(space: f64, measure: impl Fn(&str) -> f64) -> String {
    let target = space - LEADER_GAP;
    let mut dots = String::new();
    let mut width = measure(&dots);
    while width < target {
        dots.push('.');
        let grown = measure(&dots);
        if grown <= width {
            break;
        }
        width = grown;
    }
    dots
}

/// Lay out one row per caller heading
///
/// `measure(text, bold)` measures in the table's font. The number of rows
/// per page is fixed by the first row that would cross the footer; from then
/// on every that many rows continue on the next page.
pub fn layout_rows(
    headings: &[HeadingRecord],
    geometry: &TocGeometry,
    measure: impl Fn(&str, bool) -> f64,
) -> Vec<TocRow> {
    let mut rows = Vec::new();
    let mut y = geometry.start_y;
    let mut page_offset = 0;
    let mut rows_per_page: Option<usize> = None;

    let entries = headings
        .iter()
        .enumerate()
        .filter(|(_, heading)| !heading.synthetic);

    for (index, (heading_index, heading)) in entries.enumerate() {
        if rows_per_page.is_none()
            && y + geometry.line_height > geometry.page_height - geometry.footer_height
        {
            rows_per_page = Some(index.max(1));
        }
        if let Some(per_page) = rows_per_page {
            if index % per_page == 0 {
                page_offset += 1;
                y = geometry.top_y;
            }
        }

        let bold = heading.level == 1;
        let indent = geometry.indent_unit * f64::from(heading.level.saturating_sub(1));
        let title_width = measure(&heading.text, bold);
        let page_label = heading.page.to_string();
        let page_label_width = measure(&page_label, bold);
        let leader_width = geometry.content_width - (indent + title_width) - page_label_width;
        let leader = dot_leader(leader_width, |dots| measure(dots, bold));

        rows.push(TocRow {
            heading: heading_index,
            page_offset,
            x: geometry.margin + indent,
            y,
            bold,
            title_width,
            leader,
            leader_width,
            page_label,
            page_label_width,
        });

        y += geometry.line_height;
    }

    rows
}

impl<C: Canvas> Document<C> {
    /// Reserve `pages` blank pages for the table of contents
    ///
    /// The table starts on the current page and is written when the document
    /// is finalized.
    pub fn table_of_contents(&mut self, pages: usize) -> Result<()> {
        self.ensure_open()?;
        self.toc = Some(TocReservation {
            trigger_page: self.flow.page(),
            reserved_pages: pages,
        });
        for _ in 0..pages {
            self.page()?;
        }
        log::debug!("Table of contents reserved ({} pages)", pages);
        Ok(())
    }

    pub(crate) fn reconcile_toc(&mut self, reservation: TocReservation) -> Result<()> {
        let page_count = self.flow.page_count();
        let header_height = self.header_height();
        let top_y = if header_height > 0.0 {
            header_height
        } else {
            self.margin
        };

        self.writing_contents = true;
        self.flow.set_page(reservation.trigger_page)?;
        self.flow.set_y(top_y);
        let (auto_break, break_margin) = self.flow.auto_page_break();
        self.flow.set_auto_page_break(false, break_margin);

        self.place_heading(1, CONTENTS_TITLE, true)?;

        let saved_font = self.font.clone();
        let saved_line_height = self.line_height;
        self.line_height *= ROW_SPACING;

        let regular = FontDescriptor {
            bold: false,
            ..saved_font.clone()
        };
        let bold = FontDescriptor {
            bold: true,
            ..saved_font.clone()
        };
        // Resolve both faces up front so measuring below cannot fail
        let canvas = self.flow.canvas();
        canvas.measure(&regular.family, regular.style(), regular.size, "")?;
        canvas.measure(&bold.family, bold.style(), bold.size, "")?;

        let geometry = TocGeometry {
            start_y: self.flow.y(),
            top_y,
            page_height: self.page_height(),
            footer_height: self.footer_height(),
            margin: self.margin,
            content_width: self.content_width(),
            indent_unit: self.indent,
            line_height: self.line_height,
        };
        let rows = layout_rows(&self.headings, &geometry, |text, is_bold| {
            let face = if is_bold { &bold } else { &regular };
            canvas
                .measure(&face.family, face.style(), face.size, text)
                .unwrap_or(0.0)
        });

        let mut warned = false;
        for row in &rows {
            let page = reservation.trigger_page + row.page_offset;
            if page > page_count {
                return Err(ComposeError::TocOverflow {
                    needed_page: page,
                    page_count,
                });
            }
            if row.page_offset >= reservation.reserved_pages && !warned {
                log::warn!(
                    "Table of contents continues on page {}, past the {} reserved pages",
                    page,
                    reservation.reserved_pages
                );
                warned = true;
            }
            if self.flow.page() != page {
                self.flow.set_page(page)?;
            }

            self.set_font(if row.bold { bold.clone() } else { regular.clone() })?;
            let record = &self.headings[row.heading];
            let title = record.text.clone();
            let target = Some(LinkTarget::Internal(record.link));

            self.flow.set_xy(row.x, row.y);
            self.flow.cell(
                Cell::new(row.title_width, self.line_height, &title)
                    .align(Align::Left)
                    .link(target.clone()),
            )?;
            self.flow.cell(
                Cell::new(row.leader_width, self.line_height, &row.leader)
                    .align(Align::Centre)
                    .link(target.clone()),
            )?;
            self.flow.cell(
                Cell::new(row.page_label_width, self.line_height, &row.page_label)
                    .align(Align::Right)
                    .link(target),
            )?;
        }

        self.flow.set_page(page_count)?;
        self.set_font(saved_font)?;
        self.line_height = saved_line_height;
        self.flow.set_auto_page_break(auto_break, break_margin);
        self.writing_contents = false;

        log::debug!("Table of contents written ({} rows)", rows.len());
        Ok(())
    }
}
