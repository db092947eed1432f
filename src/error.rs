use thiserror::Error;

use crate::parser::layout::Role;

/// The page markup no longer matches the positions the parser relies on.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StructureError {
    #[error("content region #{id} not found")]
    MissingRegion { id: String },

    #[error("content region #{id} has {found} paragraph(s), link list expected in the second")]
    MissingLinkList { id: String, found: usize },

    #[error("borough header (span.area_header) not found")]
    MissingBoroughHeader,

    #[error("{}: no row {row} for {role:?}", .board.as_deref().unwrap_or("<unnamed board>"))]
    MissingRow {
        role: Role,
        row: usize,
        board: Option<String>,
    },

    #[error("{}: no column {column} in row {row} for {role:?}", .board.as_deref().unwrap_or("<unnamed board>"))]
    MissingCell {
        role: Role,
        row: usize,
        column: usize,
        board: Option<String>,
    },

    #[error("{}: row {row} has no nested table", .board.as_deref().unwrap_or("<unnamed board>"))]
    MissingInnerTable { row: usize, board: Option<String> },

    #[error("board name row is empty")]
    MissingName,
}

impl StructureError {
    /// Board name recovered before the failure, if any.
    pub fn board(&self) -> Option<&str> {
        match self {
            Self::MissingRow { board, .. }
            | Self::MissingCell { board, .. }
            | Self::MissingInnerTable { board, .. } => board.as_deref(),
            _ => None,
        }
    }
}
