//! The sorted in-memory book collection.
//!
//! Books are kept in non-decreasing title order (plain byte order of the UTF-8
//! title, so "Zebra" sorts before "apple") after every public call. Titles do
//! not have to be unique. Books with the same title stay in insertion order.

use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::models::Book;
use crate::storage;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    books: Vec<Book>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Books in title order.
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Insert `book` after any books that share its title.
    pub fn add(&mut self, book: Book) {
        let index = self
            .books
            .partition_point(|existing| existing.title() <= book.title());
        debug!(title = book.title(), index, "adding book");
        self.books.insert(index, book);
    }

    /// Remove the first book equal to `book` in every field. Returns whether
    /// anything was removed; an absent book leaves the catalog untouched.
    pub fn remove(&mut self, book: &Book) -> bool {
        match self.books.iter().position(|existing| existing == book) {
            Some(index) => {
                debug!(title = book.title(), index, "removing book");
                self.books.remove(index);
                true
            }
            None => false,
        }
    }

    /// Binary search for a book titled exactly `title` (case-sensitive).
    ///
    /// When several books share the title, which one comes back is
    /// unspecified. Only unique titles give a deterministic answer.
    pub fn search_by_title(&self, title: &str) -> Option<&Book> {
        self.books
            .binary_search_by(|book| book.title().cmp(title))
            .ok()
            .map(|index| &self.books[index])
    }

    /// Position of a book equal to `book`, used by the front end to keep the
    /// selection on something it just touched.
    pub fn position_of(&self, book: &Book) -> Option<usize> {
        self.books.iter().position(|existing| existing == book)
    }

    /// Write the whole catalog to `path`, replacing whatever was there.
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        storage::save_books(path, &self.books)?;
        debug!(path = %path.display(), count = self.books.len(), "catalog written");
        Ok(())
    }

    /// Replace the catalog with the contents of `path`, returning how many
    /// books were loaded. On error the current books are left as they were.
    ///
    /// The file is re-sorted after reading in case it was edited by hand;
    /// the sort is stable so a well-formed file keeps its saved order.
    pub fn load_from_file(&mut self, path: &Path) -> Result<usize> {
        let mut books = storage::load_books(path)?;
        books.sort_by(|a, b| a.title().cmp(b.title()));
        self.books = books;
        debug!(path = %path.display(), count = self.books.len(), "catalog read");
        Ok(self.books.len())
    }
}
