//! Domain model for a catalogued book. `Book` is a plain value: it has no
//! identity beyond its fields, and it cannot change once built, so the catalog
//! can hand out references freely without worrying about aliasing.

use std::fmt;

/// One book's title, author, and publication year.
///
/// No validation happens at construction time. Empty strings and non-positive
/// years are legal values; the front end decides what it wants to accept.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Book {
    title: String,
    author: String,
    year: i32,
}

impl Book {
    pub fn new(title: impl Into<String>, author: impl Into<String>, year: i32) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            year,
        }
    }

    /// Sort and lookup key for the catalog.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn year(&self) -> i32 {
        self.year
    }
}

impl fmt::Display for Book {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Title: {}, Author: {}, Publication Year: {}",
            self.title, self.author, self.year
        )
    }
}
