//! Label-driven recovery of contact fields from an info block.
//!
//! The info cell is free text such as `Chairperson: Jane Doe` or
//! `Board Meeting - 3rd Tuesday, 6:30 PM`. Labels vary in spelling across
//! boards, so each field maps to an ordered list of accepted spellings.

use std::sync::LazyLock;

use regex::Regex;
use scraper::Html;

static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*[:-]?\s*").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Phone,
    Email,
    Chair,
    DistrictManager,
    BoardMeeting,
    CabinetMeeting,
}

/// Accepted labels per field, highest priority first.
/// "board metting" is a misspelling present on the live site.
pub const FIELD_LABELS: &[(Field, &[&str])] = &[
    (Field::Phone, &["phone"]),
    (Field::Email, &["email"]),
    (Field::Chair, &["chair person", "chairperson", "chair"]),
    (Field::DistrictManager, &["district manager"]),
    (Field::BoardMeeting, &["board meeting", "board metting"]),
    (Field::CabinetMeeting, &["cabinet meeting"]),
];

impl Field {
    pub fn labels(self) -> &'static [&'static str] {
        FIELD_LABELS
            .iter()
            .find(|(f, _)| *f == self)
            .map(|(_, labels)| *labels)
            .unwrap_or(&[])
    }
}

/// Recover `field` from the info block lines.
pub fn field(lines: &[String], field: Field) -> Option<String> {
    parse_field(lines, field.labels())
}

/// Find the value following the first matching label.
///
/// Labels are tried in order and the first label found on any line wins, even
/// if a later label appears on an earlier line. Matching is ASCII
/// case-insensitive.
pub fn parse_field<S: AsRef<str>>(lines: &[S], labels: &[&str]) -> Option<String> {
    let (label, line) = labels.iter().find_map(|label| {
        let needle = label.to_ascii_lowercase();
        lines
            .iter()
            .map(|l| -> &str { l.as_ref() })
            .find(|l| l.to_ascii_lowercase().contains(&needle))
            .map(|l| (needle, l))
    })?;

    let text = strip_markup(line);
    // Label split across tags (e.g. `Board <b>Meeting</b>`) still matches the
    // plain text; a label only present inside an attribute does not.
    let idx = text.to_ascii_lowercase().rfind(&label)? + label.len();
    let rest = SEPARATOR_RE.replace(&text[idx..], "");
    let value = rest.lines().next().unwrap_or_default();

    let cleaned: String = value.chars().filter(|c| is_printable(*c)).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Plain text of an HTML snippet, entities decoded.
pub fn strip_markup(snippet: &str) -> String {
    Html::parse_fragment(snippet)
        .root_element()
        .text()
        .collect()
}

fn is_printable(c: char) -> bool {
    c.is_ascii_graphic() || matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}
