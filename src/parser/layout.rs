//! Positional schema of a board table on the borough pages.
//!
//! Each board is a `table.cb_table` whose first row holds the name and whose
//! second row wraps a nested table with the details:
//!
//! ```text
//! <table class="cb_table">
//!   <tr><td>Manhattan Community Board 1</td></tr>
//!   <tr><td><table>
//!     <tr><td>Neighborhoods</td><td>Battery Park City, ...</td></tr>
//!     <tr><td>Contact</td><td>Address<br>1 Centre St<br>...</td></tr>
//!     <tr><td>Precincts</td><td>1st</td></tr>
//!     <tr><td>Precinct phones</td><td>212-...</td></tr>
//!   </table></td></tr>
//! </table>
//! ```

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Name,
    InnerTable,
    Neighborhoods,
    Info,
    Precincts,
    PrecinctPhones,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Outer,
    Inner,
}

/// Where a role lives. `column: None` means the row as a whole.
#[derive(Debug, Clone, Copy)]
pub struct Slot {
    pub role: Role,
    pub table: Table,
    pub row: usize,
    pub column: Option<usize>,
}

pub const BOARD_LAYOUT: &[Slot] = &[
    Slot { role: Role::Name, table: Table::Outer, row: 0, column: None },
    Slot { role: Role::InnerTable, table: Table::Outer, row: 1, column: None },
    Slot { role: Role::Neighborhoods, table: Table::Inner, row: 0, column: Some(1) },
    Slot { role: Role::Info, table: Table::Inner, row: 1, column: Some(1) },
    Slot { role: Role::Precincts, table: Table::Inner, row: 2, column: Some(1) },
    Slot { role: Role::PrecinctPhones, table: Table::Inner, row: 3, column: Some(1) },
];

pub fn slot(role: Role) -> &'static Slot {
    BOARD_LAYOUT
        .iter()
        .find(|s| s.role == role)
        .unwrap_or_else(|| unreachable!("BOARD_LAYOUT has no slot for {:?}", role))
}
