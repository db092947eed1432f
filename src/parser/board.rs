use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

use super::labels::{self, Field};
use super::layout::{self, Role, Table};
use crate::db::BoardRecord;
use crate::error::StructureError;

/// Off-site links on the borough pages go through this redirect.
pub const EXIT_URL_PREFIX: &str = "http://www.nyc.gov/cgi-bin/exit.pl?url=";

static TABLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static LINK_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static BR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").unwrap());

/// Rows of the outer board table and, once located, of its nested table.
struct Grid<'a> {
    outer: Vec<ElementRef<'a>>,
    inner: Vec<ElementRef<'a>>,
    board: Option<String>,
}

impl<'a> Grid<'a> {
    fn row(&self, role: Role) -> Result<ElementRef<'a>, StructureError> {
        let slot = layout::slot(role);
        let rows = match slot.table {
            Table::Outer => &self.outer,
            Table::Inner => &self.inner,
        };
        rows.get(slot.row).copied().ok_or_else(|| StructureError::MissingRow {
            role,
            row: slot.row,
            board: self.board.clone(),
        })
    }

    fn cell(&self, role: Role) -> Result<ElementRef<'a>, StructureError> {
        let slot = layout::slot(role);
        let row = self.row(role)?;
        match slot.column {
            None => Ok(row),
            Some(column) => cells(row).nth(column).ok_or_else(|| StructureError::MissingCell {
                role,
                row: slot.row,
                column,
                board: self.board.clone(),
            }),
        }
    }
}

/// Decode one `table.cb_table` fragment into a record.
pub fn extract_record(table: ElementRef<'_>) -> Result<BoardRecord, StructureError> {
    let mut grid = Grid {
        outer: rows(table),
        inner: Vec::new(),
        board: None,
    };

    let name = text(grid.cell(Role::Name)?);
    if name.is_empty() {
        return Err(StructureError::MissingName);
    }
    grid.board = Some(name.clone());

    let wrapper = grid.cell(Role::InnerTable)?;
    let inner = wrapper
        .select(&TABLE_SEL)
        .next()
        .ok_or_else(|| StructureError::MissingInnerTable {
            row: layout::slot(Role::InnerTable).row,
            board: Some(name.clone()),
        })?;
    grid.inner = rows(inner);

    let neighborhoods = non_empty(text(grid.cell(Role::Neighborhoods)?));
    let info = grid.cell(Role::Info)?;
    let precincts = non_empty(text(grid.cell(Role::Precincts)?));
    let precinct_phones = non_empty(text(grid.cell(Role::PrecinctPhones)?));

    let website = info
        .select(&LINK_SEL)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|href| href.strip_prefix(EXIT_URL_PREFIX).unwrap_or(href).trim().to_string())
        .and_then(non_empty);

    let lines = info_block(info);

    Ok(BoardRecord {
        borough: None,
        name,
        neighborhoods,
        address: address(&lines),
        email: labels::field(&lines, Field::Email),
        phone: labels::field(&lines, Field::Phone),
        chair: labels::field(&lines, Field::Chair),
        district_manager: labels::field(&lines, Field::DistrictManager),
        board_meeting: labels::field(&lines, Field::BoardMeeting),
        cabinet_meeting: labels::field(&lines, Field::CabinetMeeting),
        website,
        precincts,
        precinct_phones,
    })
}

/// Split the serialized info cell on its `<br>` markers. Lines keep any
/// markup; line 0 starts with the cell's own opening tag.
pub fn info_block(cell: ElementRef<'_>) -> Vec<String> {
    BR_RE.split(&cell.html()).map(str::to_string).collect()
}

/// Lines 1..=3 of the info block, each trimmed, joined by a space.
pub fn address(lines: &[String]) -> Option<String> {
    let parts: Vec<&str> = lines.iter().skip(1).take(3).map(|l| l.trim()).collect();
    non_empty(parts.join(" "))
}

/// The table's own rows; rows of nested tables are not included.
fn rows(table: ElementRef<'_>) -> Vec<ElementRef<'_>> {
    let mut out = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => out.push(child),
            "thead" | "tbody" | "tfoot" => out.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|e| e.value().name() == "tr"),
            ),
            _ => {}
        }
    }
    out
}

fn cells(row: ElementRef<'_>) -> impl Iterator<Item = ElementRef<'_>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "td")
}

fn text(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    const BOARD_1: &str = r#"
<table class="cb_table">
  <tr><td><b>Board 1</b></td></tr>
  <tr><td>
    <table>
      <tr><td>Neighborhoods:</td><td> Battery Park City, Tribeca </td></tr>
      <tr><td>Contact:</td><td>Manhattan Community Board 1<br>
          1 Centre Street<br/>
          Room 2202 North <br />
          New York, NY 10007<br>
          Phone: (212) 669-7970<br>
          Email: <a href="mailto:man01@cb.nyc.gov">man01@cb.nyc.gov</a><br>
          Website: <a href="http://www.nyc.gov/cgi-bin/exit.pl?url=http://www.nyc.gov/mcb1">www.nyc.gov/mcb1</a><br>
          Chairperson: Tammy Meltzer<br>
          District Manager: Lucian Reynolds<br>
          Board Meeting: 4th Tuesday, 6:00 PM<br>
          Cabinet Meeting: 2nd Wednesday, 10:00 AM</td></tr>
      <tr><td>Precincts:</td><td>1st</td></tr>
      <tr><td>Precinct Phones:</td><td>(212) 334-0611</td></tr>
    </table>
  </td></tr>
</table>"#;

    fn first_table(doc: &Html) -> ElementRef<'_> {
        doc.select(&TABLE_SEL).next().unwrap()
    }

    #[test]
    fn well_formed_board() {
        let doc = Html::parse_fragment(BOARD_1);
        let r = extract_record(first_table(&doc)).unwrap();

        assert_eq!(r.name, "Board 1");
        assert_eq!(r.borough, None);
        assert_eq!(r.neighborhoods.as_deref(), Some("Battery Park City, Tribeca"));
        assert_eq!(
            r.address.as_deref(),
            Some("1 Centre Street Room 2202 North New York, NY 10007")
        );
        assert_eq!(r.phone.as_deref(), Some("(212) 669-7970"));
        assert_eq!(r.email.as_deref(), Some("man01@cb.nyc.gov"));
        assert_eq!(r.chair.as_deref(), Some("Tammy Meltzer"));
        assert_eq!(r.district_manager.as_deref(), Some("Lucian Reynolds"));
        assert_eq!(r.board_meeting.as_deref(), Some("4th Tuesday, 6:00 PM"));
        assert_eq!(r.cabinet_meeting.as_deref(), Some("2nd Wednesday, 10:00 AM"));
        assert_eq!(r.precincts.as_deref(), Some("1st"));
        assert_eq!(r.precinct_phones.as_deref(), Some("(212) 334-0611"));
    }

    #[test]
    fn website_is_first_link_in_info_cell() {
        // The email link comes first on this board, as on the live site.
        let doc = Html::parse_fragment(BOARD_1);
        let r = extract_record(first_table(&doc)).unwrap();
        assert_eq!(r.website.as_deref(), Some("mailto:man01@cb.nyc.gov"));
    }

    #[test]
    fn exit_prefix_is_stripped_from_website() {
        let html = BOARD_1.replace(
            r#"Email: <a href="mailto:man01@cb.nyc.gov">man01@cb.nyc.gov</a>"#,
            "Email: man01@cb.nyc.gov",
        );
        let doc = Html::parse_fragment(&html);
        let r = extract_record(first_table(&doc)).unwrap();
        assert_eq!(r.website.as_deref(), Some("http://www.nyc.gov/mcb1"));
        assert_eq!(r.email.as_deref(), Some("man01@cb.nyc.gov"));
    }

    #[test]
    fn no_link_means_no_website() {
        let html = r#"
<table class="cb_table">
  <tr><td>Board 9</td></tr>
  <tr><td><table>
    <tr><td>Neighborhoods:</td><td></td></tr>
    <tr><td>Contact:</td><td>Board 9<br>10 Main St<br>Floor 2<br>Queens, NY<br>Chair: Pat Lee</td></tr>
    <tr><td>Precincts:</td><td>102nd</td></tr>
    <tr><td>Precinct Phones:</td><td>718-555-0102</td></tr>
  </table></td></tr>
</table>"#;
        let doc = Html::parse_fragment(html);
        let r = extract_record(first_table(&doc)).unwrap();
        assert_eq!(r.website, None);
        assert_eq!(r.neighborhoods, None);
        assert_eq!(r.phone, None);
        assert_eq!(r.chair.as_deref(), Some("Pat Lee"));
        assert_eq!(r.address.as_deref(), Some("10 Main St Floor 2 Queens, NY"));
    }

    #[test]
    fn missing_inner_table_is_structure_error() {
        let html = r#"
<table class="cb_table">
  <tr><td>Board 2</td></tr>
  <tr><td>Contact information coming soon</td></tr>
</table>"#;
        let doc = Html::parse_fragment(html);
        let err = extract_record(first_table(&doc)).unwrap_err();
        assert_eq!(
            err,
            StructureError::MissingInnerTable {
                row: 1,
                board: Some("Board 2".to_string())
            }
        );
        assert_eq!(err.board(), Some("Board 2"));
    }

    #[test]
    fn short_inner_table_is_structure_error() {
        let html = r#"
<table class="cb_table">
  <tr><td>Board 3</td></tr>
  <tr><td><table>
    <tr><td>Neighborhoods:</td><td>Chelsea</td></tr>
    <tr><td>Contact:</td><td>Board 3<br>1 Main St</td></tr>
  </table></td></tr>
</table>"#;
        let doc = Html::parse_fragment(html);
        let err = extract_record(first_table(&doc)).unwrap_err();
        assert!(matches!(
            err,
            StructureError::MissingRow { role: Role::Precincts, row: 2, .. }
        ));
    }

    #[test]
    fn missing_value_column_is_structure_error() {
        let html = r#"
<table class="cb_table">
  <tr><td>Board 4</td></tr>
  <tr><td><table>
    <tr><td>Neighborhoods: Harlem</td></tr>
  </table></td></tr>
</table>"#;
        let doc = Html::parse_fragment(html);
        let err = extract_record(first_table(&doc)).unwrap_err();
        assert!(matches!(
            err,
            StructureError::MissingCell { role: Role::Neighborhoods, column: 1, .. }
        ));
    }

    #[test]
    fn blank_name_is_not_emitted() {
        let html = r#"<table class="cb_table"><tr><td>  </td></tr></table>"#;
        let doc = Html::parse_fragment(html);
        assert_eq!(
            extract_record(first_table(&doc)).unwrap_err(),
            StructureError::MissingName
        );
    }

    #[test]
    fn nested_rows_are_not_outer_rows() {
        // Without the nested table's rows, the outer table has only one row.
        let html = r#"<table class="cb_table"><tr><td>Board 5<table><tr><td>x</td></tr></table></td></tr></table>"#;
        let doc = Html::parse_fragment(html);
        let err = extract_record(first_table(&doc)).unwrap_err();
        assert!(matches!(
            err,
            StructureError::MissingRow { role: Role::InnerTable, row: 1, .. }
        ));
    }

    #[test]
    fn address_joins_trimmed_lines_one_to_three() {
        let lines: Vec<String> = ["<td>Board", "  12 Main St ", "\n Suite 4", "Bronx, NY 10451  ", "Phone: 1"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            address(&lines).as_deref(),
            Some("12 Main St Suite 4 Bronx, NY 10451")
        );
        assert_eq!(address(&lines[..1]), None);
        assert_eq!(address(&lines[..2]).as_deref(), Some("12 Main St"));
    }

    #[test]
    fn re_extracting_is_stable() {
        let doc = Html::parse_fragment(BOARD_1);
        let a = extract_record(first_table(&doc)).unwrap();
        let b = extract_record(first_table(&doc)).unwrap();
        assert_eq!(a, b);
    }
}
