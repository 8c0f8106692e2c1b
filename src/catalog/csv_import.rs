//! CSV Import
//!
//! Seeds a catalog from a CSV file with a header row:
//!
//! ```text
//! isbn,title,author,year,genre,available
//! 978-0441013593,Dune,Frank Herbert,1965,Science Fiction,true
//! ```
//!
//! The `available` column is optional and defaults to `true`. Nothing is
//! ever written back.

use crate::catalog::{Book, CatalogResult};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Parse books from any CSV reader
pub fn read_books<R: Read>(reader: R) -> CatalogResult<Vec<Book>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut books = Vec::new();
    for (row, record) in csv_reader.deserialize::<Book>().enumerate() {
        let book = record.map_err(|e| {
            tracing::warn!(row = row + 1, "failed to parse book row: {}", e);
            e
        })?;
        books.push(book);
    }

    tracing::debug!(books = books.len(), "parsed CSV seed");
    Ok(books)
}

/// Parse books from a CSV file
pub fn load_books(path: &Path) -> CatalogResult<Vec<Book>> {
    let file = File::open(path)?;
    read_books(file)
}
