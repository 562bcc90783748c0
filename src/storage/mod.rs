//! Whole-catalog persistence in a single SQLite file.
//!
//! Every save rewrites the complete book list; there is no incremental
//! format. That is O(n) per save and fine for a personal library.

mod books;
mod connection;

use std::path::Path;

use crate::error::Result;
use crate::models::Book;

pub use connection::FORMAT_VERSION;

/// Replace the file at `path` with `books`, preserving their order.
pub fn save_books(path: &Path, books: &[Book]) -> Result<()> {
    connection::replace_with(path, |conn, staging| {
        books::insert_books(conn, staging, books)
    })
}

/// Read the books stored at `path` in the order they were saved.
pub fn load_books(path: &Path) -> Result<Vec<Book>> {
    let conn = connection::open_for_read(path)?;
    books::fetch_books(&conn, path)
}
