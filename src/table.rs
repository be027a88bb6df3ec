//! CSV tables of listing records
//!
//! Reading keeps the file's column order; writing uses the union of all
//! records' columns in first-seen order, filling gaps with empty cells.

use std::collections::HashSet;
use std::io::{Read, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{EnrichError, Result};
use crate::record::{ListingRecord, LINK};

/// Read records from CSV with a header row. The header must include `link`.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<ListingRecord>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = reader.headers()?.iter().map(String::from).collect();

    if !headers.iter().any(|h| h == LINK) {
        return Err(EnrichError::MissingColumn(LINK.to_string()));
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        let pairs = headers
            .iter()
            .enumerate()
            .map(|(i, column)| (column.as_str(), row.get(i).unwrap_or("")));
        records.push(ListingRecord::from_pairs(pairs));
    }

    Ok(records)
}

pub fn read_csv(path: &Path) -> Result<Vec<ListingRecord>> {
    let file = std::fs::File::open(path)?;
    let records = read_records(file)?;
    info!(file = %path.display(), rows = records.len(), "read table");
    Ok(records)
}

/// Union of all columns, in the order they are first seen
pub fn column_order(rows: &[ListingRecord]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut columns = Vec::new();

    for column in rows.iter().flat_map(|row| row.columns()) {
        if seen.insert(column) {
            columns.push(column.to_string());
        }
    }

    columns
}

/// Write records as CSV with a header row.
pub fn write_records<W: Write>(writer: W, rows: &[ListingRecord]) -> Result<()> {
    let columns = column_order(rows);
    let mut writer = csv::Writer::from_writer(writer);

    writer.write_record(&columns)?;
    for row in rows {
        writer.write_record(columns.iter().map(|column| row.value(column)))?;
    }
    writer.flush()?;

    Ok(())
}

pub fn write_csv(path: &Path, rows: &[ListingRecord]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_records(std::io::BufWriter::new(file), rows)?;
    info!(file = %path.display(), rows = rows.len(), "wrote table");
    Ok(())
}

/// Keep the first record for each link. Records without a link are dropped.
pub fn dedupe_by_link(rows: Vec<ListingRecord>) -> Vec<ListingRecord> {
    let before = rows.len();
    let mut seen = HashSet::new();

    let unique: Vec<ListingRecord> = rows
        .into_iter()
        .filter(|row| match row.link() {
            Some(link) => seen.insert(link.to_string()),
            None => false,
        })
        .collect();

    debug!(before, after = unique.len(), "deduplicated by link");
    unique
}
