//! Table of contents reconciliation

mod common;

use common::{fixed_width, recording_document, RecordingCanvas};
use pagewright::canvas::LinkTarget;
use pagewright::{ComposeError, Document};

const RIGHT_EDGE: f64 = 190.0;
const LEADER_GAP: f64 = 0.75;

/// Contents on page 1, headings of levels 1, 2, 1, 3, 2 on pages 2 to 4
fn outlined() -> Document<RecordingCanvas> {
    let mut doc = recording_document();
    doc.page().unwrap();
    doc.table_of_contents(1).unwrap();
    doc.heading(1, "Introduction").unwrap();
    doc.paragraph("Opening words.").unwrap();
    doc.heading(2, "Scope").unwrap();
    doc.page().unwrap();
    doc.heading(1, "Design").unwrap();
    doc.heading(3, "Details").unwrap();
    doc.page().unwrap();
    doc.heading(2, "Wrap up").unwrap();
    doc.finalize().unwrap();
    doc
}

#[test]
fn test_reserved_pages_are_added() {
    let mut doc = recording_document();
    doc.page().unwrap();
    doc.table_of_contents(2).unwrap();
    assert_eq!(doc.page_count(), 3);
    assert_eq!(doc.page_number(), 3);
}

#[test]
fn test_rows_point_at_heading_pages() {
    let doc = outlined();
    let records: Vec<_> = doc.headings().iter().filter(|h| !h.synthetic).collect();
    let pages: Vec<_> = records.iter().map(|h| h.page).collect();
    assert_eq!(pages, vec![2, 2, 3, 3, 4]);

    let texts = doc.canvas().texts(1);
    assert_eq!(texts[0].0, "Contents");
    let rows: Vec<_> = texts[1..].chunks(3).collect();
    assert_eq!(rows.len(), records.len());

    for (row, record) in rows.iter().zip(&records) {
        let (title, title_x, _, font, _) = &row[0];
        assert_eq!(title, &record.text);
        assert_eq!(font.style.bold, record.level == 1);
        let indent = 4.0 * f64::from(record.level - 1);
        assert!((title_x - (20.0 + indent)).abs() < 1e-9);
        assert_eq!(row[2].0, record.page.to_string());
    }
}

#[test]
fn test_dot_leaders_are_shortest_filling_run() {
    let doc = outlined();
    let texts = doc.canvas().texts(1);

    for row in texts[1..].chunks(3) {
        let (title, title_x, _, font, _) = &row[0];
        let (leader, _, _, _, _) = &row[1];
        let (label, label_x, _, _, _) = &row[2];
        assert!(leader.chars().all(|c| c == '.'), "Leader '{}'", leader);

        // The page label is right aligned against the right margin
        let label_width = fixed_width(label, font.size);
        assert!((label_x + label_width - RIGHT_EDGE).abs() < 1e-9);

        let space = RIGHT_EDGE - label_width - (title_x + fixed_width(title, font.size));
        let target = space - LEADER_GAP;
        let dots = leader.chars().count();
        assert!(fixed_width(leader, font.size) >= target);
        assert!(
            fixed_width(&".".repeat(dots - 1), font.size) < target,
            "Leader for '{}' is longer than needed",
            title
        );
    }
}

#[test]
fn test_every_row_cell_links_to_its_heading() {
    let doc = outlined();
    let canvas = doc.canvas();
    let areas = canvas.link_areas(1);
    assert_eq!(areas.len(), 15);

    let records: Vec<_> = doc.headings().iter().filter(|h| !h.synthetic).collect();
    for (cells, record) in areas.chunks(3).zip(&records) {
        for (_, target) in cells {
            assert_eq!(*target, LinkTarget::Internal(record.link));
        }
        let (page, _) = canvas.link_destination(record.link).unwrap();
        assert_eq!(page, record.page);
    }
}

#[test]
fn test_contents_heading_is_not_bookmarked() {
    let doc = outlined();
    let titles: Vec<_> = doc
        .canvas()
        .bookmarks
        .iter()
        .map(|b| (b.title.as_str(), b.level))
        .collect();
    assert_eq!(
        titles,
        vec![
            ("Introduction", 0),
            ("Scope", 1),
            ("Design", 0),
            ("Details", 2),
            ("Wrap up", 1),
        ]
    );

    let synthetic: Vec<_> = doc.headings().iter().filter(|h| h.synthetic).collect();
    assert_eq!(synthetic.len(), 1);
    assert_eq!(synthetic[0].text, "Contents");
    assert_eq!(synthetic[0].page, 1);
}

#[test]
fn test_contents_under_header() {
    let mut doc = recording_document();
    doc.set_header("", vec![pagewright::TextSection::new("Report", pagewright::Align::Left)])
        .unwrap();
    doc.page().unwrap();
    doc.table_of_contents(1).unwrap();
    doc.heading(1, "Only").unwrap();
    doc.finalize().unwrap();

    let texts = doc.canvas().texts(1);
    assert_eq!(texts[0].0, "Report");
    assert_eq!(texts[1].0, "Contents");
    // Baseline of a 9.75 mm line starting right below the 25 mm header
    let expected = 25.0 + 0.5 * 9.75 + 0.3 * 19.5 / pagewright::geometry::PT_PER_MM;
    assert!((texts[1].2 - expected).abs() < 1e-9);
}

#[test]
fn test_contents_without_headings() {
    let mut doc = recording_document();
    doc.page().unwrap();
    doc.table_of_contents(0).unwrap();
    doc.write("No headings here").unwrap();
    doc.finalize().unwrap();
    assert_eq!(doc.canvas().link_areas(1).len(), 0);
    assert_eq!(doc.canvas().texts(1)[0].0, "No headings here");
}

#[test]
fn test_rows_past_the_last_page_are_an_error() {
    let mut doc = recording_document();
    doc.page().unwrap();
    for i in 0..40 {
        doc.heading(2, &format!("Section {}", i)).unwrap();
    }
    assert_eq!(doc.page_count(), 2);
    doc.page().unwrap();
    doc.table_of_contents(0).unwrap();

    match doc.finalize() {
        Err(ComposeError::TocOverflow {
            needed_page,
            page_count,
        }) => {
            assert_eq!(needed_page, 4);
            assert_eq!(page_count, 3);
        }
        other => panic!("Expected a table of contents overflow, got {:?}", other),
    }
}

#[test]
fn test_failed_finalize_leaves_document_unusable() {
    let mut doc = recording_document();
    doc.page().unwrap();
    for i in 0..40 {
        doc.heading(2, &format!("Section {}", i)).unwrap();
    }
    doc.page().unwrap();
    doc.table_of_contents(0).unwrap();

    assert!(matches!(
        doc.finalize(),
        Err(ComposeError::TocOverflow { .. })
    ));
    assert!(!doc.is_finalized());
    assert!(matches!(doc.finalize(), Err(ComposeError::FinalizeFailed)));
    assert!(matches!(doc.write("more"), Err(ComposeError::FinalizeFailed)));
    assert!(matches!(doc.to_bytes(), Err(ComposeError::FinalizeFailed)));

    let contents = doc
        .canvas()
        .texts(3)
        .iter()
        .filter(|text| text.0 == "Contents")
        .count();
    assert_eq!(contents, 1, "The contents heading should be drawn once");
    assert_eq!(doc.headings().iter().filter(|h| h.synthetic).count(), 1);
}

#[test]
fn test_rows_spill_onto_following_pages() {
    let mut doc = recording_document();
    doc.page().unwrap();
    doc.table_of_contents(2).unwrap();
    for i in 0..40 {
        doc.heading(2, &format!("Section {}", i)).unwrap();
    }
    doc.finalize().unwrap();

    let first = doc.canvas().link_areas(1).len() / 3;
    let second = doc.canvas().link_areas(2).len() / 3;
    assert_eq!(first + second, 40);
    assert!(first > 0 && second > 0);
    assert_eq!(doc.canvas().current, doc.page_count());
}
