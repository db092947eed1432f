use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::db::Store;

/// Header row plus one row per stored board, in storage order.
/// NULL columns become empty cells. Returns the number of data rows.
pub fn export_csv<W: Write>(store: &Store, mut out: W) -> Result<usize> {
    let mut stmt = store
        .conn()
        .prepare("SELECT * FROM community_boards ORDER BY rowid")?;
    let header: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    write_row(&mut out, &header)?;

    let mut rows = stmt.query([])?;
    let mut count = 0;
    while let Some(row) = rows.next()? {
        let cells = (0..header.len())
            .map(|i| row.get::<_, Option<String>>(i).map(Option::unwrap_or_default))
            .collect::<Result<Vec<_>, _>>()?;
        write_row(&mut out, &cells)?;
        count += 1;
    }
    out.flush()?;
    Ok(count)
}

pub fn export_csv_file(store: &Store, path: &Path) -> Result<usize> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;
    }
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    export_csv(store, BufWriter::new(file))
}

fn needs_quotes(cell: &str) -> bool {
    cell.contains([',', '"', '\n', '\r'])
}

fn write_row<W: Write>(w: &mut W, row: &[String]) -> io::Result<()> {
    for (i, cell) in row.iter().enumerate() {
        if i > 0 {
            w.write_all(b",")?;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            w.write_all(cell.as_bytes())?;
        }
    }
    w.write_all(b"\r\n")
}
