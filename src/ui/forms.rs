use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::Book;

/// Internal representation of the "add book" form fields.
#[derive(Default, Clone)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) author: String,
    pub(crate) year: String,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
}

/// Fields available within the book form, in tab order.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub(crate) enum BookField {
    #[default]
    Title,
    Author,
    Year,
}

impl BookField {
    pub(crate) fn label(self) -> &'static str {
        match self {
            BookField::Title => "Title",
            BookField::Author => "Author",
            BookField::Year => "Publication Year",
        }
    }

    fn next(self) -> Self {
        match self {
            BookField::Title => BookField::Author,
            BookField::Author => BookField::Year,
            BookField::Year => BookField::Title,
        }
    }

    fn previous(self) -> Self {
        match self {
            BookField::Title => BookField::Year,
            BookField::Author => BookField::Title,
            BookField::Year => BookField::Author,
        }
    }
}

impl BookForm {
    pub(crate) fn next_field(&mut self) {
        self.active = self.active.next();
    }

    pub(crate) fn previous_field(&mut self) {
        self.active = self.active.previous();
    }

    fn value(&self, field: BookField) -> &str {
        match field {
            BookField::Title => &self.title,
            BookField::Author => &self.author,
            BookField::Year => &self.year,
        }
    }

    /// Append a character to the active field. The year only takes digits and
    /// a leading minus sign.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        match self.active {
            BookField::Title if !ch.is_control() => {
                self.title.push(ch);
                true
            }
            BookField::Author if !ch.is_control() => {
                self.author.push(ch);
                true
            }
            BookField::Year if ch.is_ascii_digit() || (ch == '-' && self.year.is_empty()) => {
                self.year.push(ch);
                true
            }
            _ => false,
        }
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        match self.active {
            BookField::Title => self.title.pop(),
            BookField::Author => self.author.pop(),
            BookField::Year => self.year.pop(),
        };
    }

    /// Build the book. Title and author are taken verbatim, empty or not; the
    /// year has to be a whole number.
    pub(crate) fn parse_inputs(&self) -> Result<Book> {
        let year_raw = self.year.trim();
        if year_raw.is_empty() {
            return Err(anyhow!("Publication year is required."));
        }
        let year = year_raw
            .parse::<i32>()
            .map_err(|_| anyhow!("Publication year must be a whole number."))?;
        Ok(Book::new(self.title.clone(), self.author.clone(), year))
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field: BookField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let display = if value.is_empty() {
            "<empty>".to_string()
        } else {
            value.to_string()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{}: ", field.label())),
            Span::styled(display, style),
        ])
    }

    /// Cursor column offset and row within the form for the active field.
    pub(crate) fn cursor_offset(&self) -> (u16, u16) {
        let row = match self.active {
            BookField::Title => 0,
            BookField::Author => 1,
            BookField::Year => 2,
        };
        let prefix = self.active.label().len() + 2;
        let len = self.value(self.active).chars().count();
        ((prefix + len) as u16, row)
    }
}

/// What a title prompt will do once submitted.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) enum TitleAction {
    Search,
    Remove,
}

impl TitleAction {
    pub(crate) fn heading(self) -> &'static str {
        match self {
            TitleAction::Search => "Search Book by Title",
            TitleAction::Remove => "Remove Book",
        }
    }
}

/// Single-line prompt asking for an exact title.
#[derive(Clone)]
pub(crate) struct TitlePrompt {
    pub(crate) action: TitleAction,
    pub(crate) title: String,
}

impl TitlePrompt {
    pub(crate) fn new(action: TitleAction) -> Self {
        Self {
            action,
            title: String::new(),
        }
    }

    pub(crate) fn push_char(&mut self, ch: char) {
        if !ch.is_control() {
            self.title.push(ch);
        }
    }

    pub(crate) fn backspace(&mut self) {
        self.title.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tab_order_cycles_through_fields() {
        let mut form = BookForm::default();
        assert_eq!(form.active, BookField::Title);
        form.next_field();
        assert_eq!(form.active, BookField::Author);
        form.next_field();
        assert_eq!(form.active, BookField::Year);
        form.next_field();
        assert_eq!(form.active, BookField::Title);
        form.previous_field();
        assert_eq!(form.active, BookField::Year);
    }

    #[test]
    fn year_accepts_only_signed_digits() {
        let mut form = BookForm {
            active: BookField::Year,
            ..BookForm::default()
        };
        assert!(form.push_char('-'));
        assert!(form.push_char('4'));
        assert!(!form.push_char('-'));
        assert!(!form.push_char('x'));
        assert!(form.push_char('4'));
        assert_eq!(form.year, "-44");
    }

    #[test]
    fn empty_title_and_author_are_accepted() {
        let form = BookForm {
            year: "0".to_string(),
            ..BookForm::default()
        };
        assert_eq!(form.parse_inputs().unwrap(), Book::new("", "", 0));
    }

    #[test]
    fn year_is_required_and_must_fit() {
        let mut form = BookForm::default();
        assert!(form.parse_inputs().is_err());

        form.year = "99999999999".to_string();
        assert!(form.parse_inputs().is_err());

        form.year = "-".to_string();
        assert!(form.parse_inputs().is_err());
    }

    #[test]
    fn cursor_follows_active_field() {
        let mut form = BookForm {
            title: "Dune".to_string(),
            ..BookForm::default()
        };
        assert_eq!(form.cursor_offset(), (11, 0));
        form.active = BookField::Year;
        assert_eq!(form.cursor_offset(), (18, 2));
    }
}
