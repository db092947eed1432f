use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, Transaction};
use serde::Serialize;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS community_boards (
        borough          TEXT,
        name             TEXT NOT NULL,
        neighborhoods    TEXT,
        address          TEXT,
        email            TEXT,
        phone            TEXT,
        chair            TEXT,
        district_manager TEXT,
        board_meeting    TEXT,
        cabinet_meeting  TEXT,
        website          TEXT
    );
";

const INSERT_SQL: &str = "
    INSERT INTO community_boards
        (borough, name, neighborhoods, address, email, phone, chair,
         district_manager, board_meeting, cabinet_meeting, website)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
";

const SELECT_SQL: &str = "
    SELECT borough, name, neighborhoods, address, email, phone, chair,
           district_manager, board_meeting, cabinet_meeting, website
    FROM community_boards
";

/// One community board as published on its borough page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BoardRecord {
    pub borough: Option<String>,
    pub name: String,
    pub neighborhoods: Option<String>,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub chair: Option<String>,
    pub district_manager: Option<String>,
    pub board_meeting: Option<String>,
    pub cabinet_meeting: Option<String>,
    pub website: Option<String>,
    // Scraped but not stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precincts: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precinct_phones: Option<String>,
}

impl BoardRecord {
    pub fn in_borough(self, borough: &str) -> Self {
        Self {
            borough: Some(borough.to_string()),
            ..self
        }
    }
}

/// Owns the SQLite connection for the lifetime of a command.
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {:?}", dir))?;
        }
        let conn = Connection::open(path).with_context(|| format!("Failed to open {:?}", path))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Start a full rebuild: the table is created if missing and emptied.
    ///
    /// Nothing is visible to other readers until [`Rebuild::commit`]; dropping
    /// the returned writer rolls the wipe back.
    pub fn rebuild(&mut self) -> Result<Rebuild<'_>> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(SCHEMA)?;
        let wiped = tx.execute("DELETE FROM community_boards", [])?;
        tracing::debug!("Wiped {} existing rows", wiped);
        Ok(Rebuild { tx, inserted: 0 })
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// All stored boards in storage order, optionally for one borough.
    pub fn boards(&self, borough: Option<&str>) -> Result<Vec<BoardRecord>> {
        let sql = match borough {
            Some(_) => format!("{} WHERE borough = ?1 ORDER BY rowid", SELECT_SQL),
            None => format!("{} ORDER BY rowid", SELECT_SQL),
        };
        let mut stmt = self.conn.prepare(&sql)?;
        let map = |row: &rusqlite::Row<'_>| -> rusqlite::Result<BoardRecord> {
            Ok(BoardRecord {
                borough: row.get(0)?,
                name: row.get(1)?,
                neighborhoods: row.get(2)?,
                address: row.get(3)?,
                email: row.get(4)?,
                phone: row.get(5)?,
                chair: row.get(6)?,
                district_manager: row.get(7)?,
                board_meeting: row.get(8)?,
                cabinet_meeting: row.get(9)?,
                website: row.get(10)?,
                precincts: None,
                precinct_phones: None,
            })
        };
        let rows = match borough {
            Some(b) => stmt.query_map([b], map)?.collect::<Result<Vec<_>, _>>()?,
            None => stmt.query_map([], map)?.collect::<Result<Vec<_>, _>>()?,
        };
        Ok(rows)
    }

    /// (borough, boards) in the order boroughs were first inserted.
    pub fn borough_counts(&self) -> Result<Vec<(String, usize)>> {
        let mut stmt = self.conn.prepare(
            "SELECT COALESCE(borough, ''), COUNT(*)
             FROM community_boards
             GROUP BY borough
             ORDER BY MIN(rowid)",
        )?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

/// Writer for one rebuild of the store.
pub struct Rebuild<'a> {
    tx: Transaction<'a>,
    inserted: usize,
}

impl Rebuild<'_> {
    pub fn insert(&mut self, record: &BoardRecord) -> Result<()> {
        let mut stmt = self.tx.prepare_cached(INSERT_SQL)?;
        stmt.execute(rusqlite::params![
            record.borough,
            record.name,
            record.neighborhoods,
            record.address,
            record.email,
            record.phone,
            record.chair,
            record.district_manager,
            record.board_meeting,
            record.cabinet_meeting,
            record.website,
        ])?;
        self.inserted += 1;
        Ok(())
    }

    /// Commit the wipe and every insert; returns the number of rows written.
    pub fn commit(self) -> Result<usize> {
        let inserted = self.inserted;
        self.tx.commit().context("Failed to commit community_boards")?;
        Ok(inserted)
    }
}
