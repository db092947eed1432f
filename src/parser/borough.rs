use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::error::StructureError;

static HEADER_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span.area_header").unwrap());
static BOARD_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table.cb_table").unwrap());

/// "Manhattan Community Boards" -> "Manhattan".
pub fn borough_name(doc: &Html) -> Result<String, StructureError> {
    let header = doc
        .select(&HEADER_SEL)
        .next()
        .ok_or(StructureError::MissingBoroughHeader)?;
    let text = header.text().collect::<String>();
    Ok(text.replace("Community Boards", "").trim().to_string())
}

/// Every board fragment on a borough page, in document order.
pub fn board_tables(doc: &Html) -> Vec<ElementRef<'_>> {
    doc.select(&BOARD_SEL).collect()
}
