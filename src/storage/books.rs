use std::path::Path;

use rusqlite::{params, Connection};

use crate::error::{CatalogError, Result};
use crate::models::Book;

/// Insert every book with its index as `position`, in one transaction.
pub(crate) fn insert_books(conn: &mut Connection, path: &Path, books: &[Book]) -> Result<()> {
    let tx = conn
        .transaction()
        .map_err(|err| CatalogError::storage(path, err))?;

    {
        let mut stmt = tx
            .prepare("INSERT INTO books (position, title, author, year) VALUES (?1, ?2, ?3, ?4)")
            .map_err(|err| CatalogError::storage(path, err))?;

        for (position, book) in books.iter().enumerate() {
            stmt.execute(params![
                position as i64,
                book.title(),
                book.author(),
                book.year()
            ])
            .map_err(|err| CatalogError::storage(path, err))?;
        }
    }

    tx.commit().map_err(|err| CatalogError::storage(path, err))
}

/// Read every book back in saved order.
pub(crate) fn fetch_books(conn: &Connection, path: &Path) -> Result<Vec<Book>> {
    let mut stmt = conn
        .prepare("SELECT title, author, year FROM books ORDER BY position")
        .map_err(|err| CatalogError::storage(path, err))?;

    let books = stmt
        .query_map([], |row| {
            Ok(Book::new(
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, i32>(2)?,
            ))
        })
        .map_err(|err| CatalogError::storage(path, err))?
        .collect::<rusqlite::Result<Vec<_>>>()
        .map_err(|err| CatalogError::storage(path, err))?;

    Ok(books)
}
