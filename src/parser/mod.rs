pub mod board;
pub mod borough;
pub mod labels;
pub mod layout;
pub mod links;

use scraper::Html;
use tracing::{debug, warn};

use crate::db::BoardRecord;
use crate::error::StructureError;

/// Everything recovered from one borough page.
pub struct BoroughPage {
    pub borough: String,
    pub tables: usize,
    pub records: Vec<BoardRecord>,
    pub skipped: Vec<StructureError>,
}

/// Borough page → board fragments → records.
///
/// A fragment that does not decode is logged and skipped; only a missing
/// borough header fails the whole page.
pub fn process_page(html: &str) -> Result<BoroughPage, StructureError> {
    let doc = Html::parse_document(html);
    let borough = borough::borough_name(&doc)?;
    let tables = borough::board_tables(&doc);
    debug!("Parsing {} tables in {}", tables.len(), borough);

    let mut records = Vec::new();
    let mut skipped = Vec::new();
    for table in &tables {
        match board::extract_record(*table) {
            Ok(record) => records.push(record.in_borough(&borough)),
            Err(e) => {
                match e.board() {
                    Some(name) => warn!("Failed to load {}. Skipping: {}", name, e),
                    None => warn!("Failed to load a board in {}. Skipping: {}", borough, e),
                }
                skipped.push(e);
            }
        }
    }

    Ok(BoroughPage {
        borough,
        tables: tables.len(),
        records,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_fixture() {
        let html = std::fs::read_to_string("tests/fixtures/manhattan.html").unwrap();
        let page = process_page(&html).unwrap();

        assert_eq!(page.borough, "Manhattan");
        assert_eq!(page.tables, 3);
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.skipped.len(), 1);
        assert_eq!(page.skipped[0].board(), Some("Manhattan Community Board 3"));

        let cb1 = &page.records[0];
        assert_eq!(cb1.borough.as_deref(), Some("Manhattan"));
        assert_eq!(cb1.name, "Manhattan Community Board 1");
        assert_eq!(cb1.website.as_deref(), Some("http://www.nyc.gov/mcb1"));
        assert_eq!(cb1.chair.as_deref(), Some("Tammy Meltzer"));

        let cb2 = &page.records[1];
        assert_eq!(cb2.name, "Manhattan Community Board 2");
        assert_eq!(cb2.chair.as_deref(), Some("Jeannine Kiely"));
        assert_eq!(cb2.board_meeting.as_deref(), Some("3rd Thursday, 6:30 PM"));
        assert_eq!(cb2.cabinet_meeting, None);
        assert_eq!(cb2.website, None);
        assert_eq!(cb2.address.as_deref(), Some("3 Washington Square Village Suite 1A New York, NY 10012"));
    }

    #[test]
    fn page_without_header_fails_whole_page() {
        let err = process_page("<html><body><table class=\"cb_table\"></table></body></html>")
            .err()
            .unwrap();
        assert_eq!(err, StructureError::MissingBoroughHeader);
    }
}
