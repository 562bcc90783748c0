use std::mem;
use std::path::{Path, PathBuf};

use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use tracing::{error, info, warn};

use crate::catalog::Catalog;
use crate::models::Book;

use super::forms::{BookField, BookForm, TitleAction, TitlePrompt};
use super::helpers::{centered_rect, clamp_offset, surface_error};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows skipped by PageUp/PageDown.
const PAGE_STEP: isize = 5;

/// Fine-grained modes layered over the book list.
enum Mode {
    Normal,
    AddingBook(BookForm),
    Prompting(TitlePrompt),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state: the catalog, where it is saved, and what the
/// screen currently shows.
pub struct App {
    catalog: Catalog,
    catalog_path: PathBuf,
    selected: usize,
    mode: Mode,
    status: Option<StatusMessage>,
    exit_report: Option<String>,
}

impl App {
    pub fn new(catalog: Catalog, catalog_path: PathBuf) -> Self {
        Self {
            catalog,
            catalog_path,
            selected: 0,
            mode: Mode::Normal,
            status: None,
            exit_report: None,
        }
    }

    /// Start from whatever is stored at `catalog_path`. A missing file means
    /// a first run; any other failure is reported and the catalog starts
    /// empty.
    pub fn load(catalog_path: PathBuf) -> Self {
        let mut catalog = Catalog::new();
        let status = match catalog.load_from_file(&catalog_path) {
            Ok(count) => {
                info!(path = %catalog_path.display(), count, "catalog loaded");
                StatusMessage {
                    text: format!("Catalog loaded from file: {}", catalog_path.display()),
                    kind: StatusKind::Info,
                }
            }
            Err(err) if err.is_missing() => {
                info!(path = %catalog_path.display(), "no saved catalog, starting empty");
                StatusMessage {
                    text: "No saved catalog yet. Press '+' to add a book.".to_string(),
                    kind: StatusKind::Info,
                }
            }
            Err(err) => {
                warn!(error = %err, "failed to load catalog, starting empty");
                StatusMessage {
                    text: format!("Error loading catalog from file: {err}"),
                    kind: StatusKind::Error,
                }
            }
        };

        let mut app = Self::new(catalog, catalog_path);
        app.status = Some(status);
        app
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn catalog_path(&self) -> &Path {
        &self.catalog_path
    }

    /// Outcome of the final save, once the user has exited.
    pub fn exit_report(&self) -> Option<&str> {
        self.exit_report.as_deref()
    }

    /// Feed one key press through the current mode. Returns `true` once the
    /// user asked to exit and the final save has been attempted.
    pub fn handle_key(&mut self, code: KeyCode) -> bool {
        let mut exit = false;
        let mode = mem::replace(&mut self.mode, Mode::Normal);

        self.mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit),
            Mode::AddingBook(form) => self.handle_add_book(code, form),
            Mode::Prompting(prompt) => self.handle_prompt(code, prompt),
        };

        exit
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Mode {
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                let saved = self.save_catalog();
                self.exit_report = Some(saved);
                *exit = true;
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::PageUp => self.move_selection(-PAGE_STEP),
            KeyCode::PageDown => self.move_selection(PAGE_STEP),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.selected = self.catalog.len().saturating_sub(1),
            KeyCode::Char('+') | KeyCode::Char('a') | KeyCode::Char('A') => {
                self.clear_status();
                return Mode::AddingBook(BookForm::default());
            }
            KeyCode::Char('-') | KeyCode::Char('r') | KeyCode::Char('R') => {
                self.clear_status();
                return Mode::Prompting(TitlePrompt::new(TitleAction::Remove));
            }
            KeyCode::Char('f') | KeyCode::Char('F') | KeyCode::Char('/') => {
                self.clear_status();
                return Mode::Prompting(TitlePrompt::new(TitleAction::Search));
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.save_catalog();
            }
            KeyCode::Char(_) => {
                self.set_status("Invalid choice. Please try again.", StatusKind::Error);
            }
            _ => {}
        }
        Mode::Normal
    }

    fn handle_add_book(&mut self, code: KeyCode, mut form: BookForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Add book cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match form.parse_inputs() {
                Ok(book) => {
                    self.add_book(book);
                    return Mode::Normal;
                }
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Mode::AddingBook(form)
    }

    fn handle_prompt(&mut self, code: KeyCode, mut prompt: TitlePrompt) -> Mode {
        match code {
            KeyCode::Esc => {
                self.clear_status();
                return Mode::Normal;
            }
            KeyCode::Backspace => prompt.backspace(),
            KeyCode::Enter => {
                match prompt.action {
                    TitleAction::Search => self.search_book(&prompt.title),
                    TitleAction::Remove => self.remove_book(&prompt.title),
                }
                return Mode::Normal;
            }
            KeyCode::Char(ch) => prompt.push_char(ch),
            _ => {}
        }
        Mode::Prompting(prompt)
    }

    fn add_book(&mut self, book: Book) {
        let message = format!("Book added to the catalog: {book}");
        self.catalog.add(book.clone());
        self.focus_on(&book);
        self.set_status(message, StatusKind::Info);
    }

    fn search_book(&mut self, title: &str) {
        match self.catalog.search_by_title(title).cloned() {
            Some(book) => {
                self.focus_on(&book);
                self.set_status(format!("Book found: {book}"), StatusKind::Info);
            }
            None => self.set_status(format!("Book not found: {title}"), StatusKind::Error),
        }
    }

    fn remove_book(&mut self, title: &str) {
        match self.catalog.search_by_title(title).cloned() {
            Some(book) => {
                self.catalog.remove(&book);
                self.ensure_in_bounds();
                self.set_status(
                    format!("Book removed from the catalog: {book}"),
                    StatusKind::Info,
                );
            }
            None => self.set_status(format!("Book not found: {title}"), StatusKind::Error),
        }
    }

    /// Save to the configured path and report the outcome in the footer. The
    /// message is also returned so the exit path can print it.
    fn save_catalog(&mut self) -> String {
        match self.catalog.save_to_file(&self.catalog_path) {
            Ok(()) => {
                info!(
                    path = %self.catalog_path.display(),
                    count = self.catalog.len(),
                    "catalog saved"
                );
                let message = format!("Catalog saved to file: {}", self.catalog_path.display());
                self.set_status(message.clone(), StatusKind::Info);
                message
            }
            Err(err) => {
                error!(error = %err, "failed to save catalog");
                let message = format!("Error saving catalog to file: {err}");
                self.set_status(message.clone(), StatusKind::Error);
                message
            }
        }
    }

    fn move_selection(&mut self, offset: isize) {
        self.selected = clamp_offset(self.selected, offset, self.catalog.len());
    }

    fn focus_on(&mut self, book: &Book) {
        if let Some(index) = self.catalog.position_of(book) {
            self.selected = index;
        }
    }

    fn ensure_in_bounds(&mut self) {
        if self.selected >= self.catalog.len() {
            self.selected = self.catalog.len().saturating_sub(1);
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        self.draw_book_list(frame, content_area);

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::AddingBook(form) => self.draw_book_form(frame, area, form),
            Mode::Prompting(prompt) => self.draw_title_prompt(frame, area, prompt),
            Mode::Normal => {}
        }
    }

    fn draw_book_list(&self, frame: &mut Frame, area: Rect) {
        if area.height == 0 {
            return;
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("Library Catalog ({})", self.catalog.len()));

        if self.catalog.is_empty() {
            let message = Paragraph::new("No books yet. Press '+' to add one.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let items: Vec<ListItem> = self
            .catalog
            .books()
            .iter()
            .map(|book| ListItem::new(book.to_string()))
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let hints: &[(&str, &str)] = match &self.mode {
            Mode::Normal => &[
                ("[+]", " Add   "),
                ("[-]", " Remove   "),
                ("[f]", " Search   "),
                ("[s]", " Save   "),
                ("[↑↓]", " Navigate   "),
                ("[q]", " Save & Exit"),
            ],
            Mode::AddingBook(_) => &[
                ("[Tab]", " Next field   "),
                ("[Enter]", " Add   "),
                ("[Esc]", " Cancel"),
            ],
            Mode::Prompting(_) => &[("[Enter]", " Submit   "), ("[Esc]", " Cancel")],
        };

        let spans: Vec<Span<'static>> = hints
            .iter()
            .flat_map(|(key, label)| {
                [
                    Span::styled(key.to_string(), key_style),
                    Span::raw(label.to_string()),
                ]
            })
            .collect();
        Line::from(spans)
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, form: &BookForm) {
        let popup_area = centered_rect(60, 40, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("Add Book").borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let mut lines = vec![
            form.build_line(BookField::Title),
            form.build_line(BookField::Author),
            form.build_line(BookField::Year),
            Line::from(""),
        ];

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to add • Tab to switch • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (dx, dy) = form.cursor_offset();
        frame.set_cursor_position((inner.x + dx, inner.y + dy));
    }

    fn draw_title_prompt(&self, frame: &mut Frame, area: Rect, prompt: &TitlePrompt) {
        let popup_area = centered_rect(60, 20, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(prompt.action.heading());
        let paragraph = Paragraph::new(Span::raw(format!("Title: {}", prompt.title)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Title: ".len() as u16 + prompt.title.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    use super::*;

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch));
        }
    }

    fn add_via_form(app: &mut App, title: &str, author: &str, year: &str) {
        app.handle_key(KeyCode::Char('+'));
        type_text(app, title);
        app.handle_key(KeyCode::Tab);
        type_text(app, author);
        app.handle_key(KeyCode::Tab);
        type_text(app, year);
        app.handle_key(KeyCode::Enter);
    }

    fn prompt(app: &mut App, key: char, title: &str) {
        app.handle_key(KeyCode::Char(key));
        type_text(app, title);
        app.handle_key(KeyCode::Enter);
    }

    fn status(app: &App) -> (&str, StatusKind) {
        let status = app.status.as_ref().unwrap();
        (status.text.as_str(), status.kind)
    }

    fn scratch_app() -> (tempfile::TempDir, App) {
        let dir = tempfile::tempdir().unwrap();
        let app = App::load(dir.path().join("catalog.sqlite"));
        (dir, app)
    }

    #[test]
    fn first_run_starts_empty() {
        let (_dir, app) = scratch_app();
        assert!(app.catalog().is_empty());
        assert_eq!(status(&app).1, StatusKind::Info);
    }

    #[test]
    fn corrupt_file_starts_empty_with_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.sqlite");
        std::fs::write(&path, vec![0x11; 1024]).unwrap();

        let app = App::load(path);

        assert!(app.catalog().is_empty());
        let (text, kind) = status(&app);
        assert!(text.starts_with("Error loading catalog from file"));
        assert_eq!(kind, StatusKind::Error);
    }

    #[test]
    fn add_form_inserts_in_title_order() {
        let (_dir, mut app) = scratch_app();

        add_via_form(&mut app, "Dune", "Herbert", "1965");
        add_via_form(&mut app, "1984", "Orwell", "1949");

        let titles: Vec<&str> = app.catalog().books().iter().map(Book::title).collect();
        assert_eq!(titles, vec!["1984", "Dune"]);
        assert_eq!(
            status(&app).0,
            "Book added to the catalog: Title: 1984, Author: Orwell, Publication Year: 1949"
        );
        assert_eq!(app.selected, 0);
        assert!(matches!(app.mode, Mode::Normal));
    }

    #[test]
    fn add_form_without_year_stays_open() {
        let (_dir, mut app) = scratch_app();

        add_via_form(&mut app, "Dune", "Herbert", "");

        assert!(app.catalog().is_empty());
        assert!(matches!(app.mode, Mode::AddingBook(_)));
        assert_eq!(status(&app).1, StatusKind::Error);

        app.handle_key(KeyCode::Esc);
        assert!(matches!(app.mode, Mode::Normal));
    }

    #[test]
    fn search_reports_found_and_missing() {
        let (_dir, mut app) = scratch_app();
        add_via_form(&mut app, "Dune", "Herbert", "1965");
        add_via_form(&mut app, "Foundation", "Asimov", "1951");

        prompt(&mut app, 'f', "Dune");
        assert_eq!(
            status(&app).0,
            "Book found: Title: Dune, Author: Herbert, Publication Year: 1965"
        );
        assert_eq!(app.selected, 0);

        prompt(&mut app, 'f', "Brave New World");
        assert_eq!(status(&app).0, "Book not found: Brave New World");
    }

    #[test]
    fn remove_by_title() {
        let (_dir, mut app) = scratch_app();
        add_via_form(&mut app, "Dune", "Herbert", "1965");
        add_via_form(&mut app, "1984", "Orwell", "1949");

        prompt(&mut app, '-', "1984");
        assert_eq!(
            status(&app).0,
            "Book removed from the catalog: Title: 1984, Author: Orwell, Publication Year: 1949"
        );
        assert_eq!(app.catalog().len(), 1);

        prompt(&mut app, '-', "1984");
        assert_eq!(status(&app).0, "Book not found: 1984");
        assert_eq!(app.catalog().len(), 1);
    }

    #[test]
    fn unknown_key_does_not_touch_catalog() {
        let (_dir, mut app) = scratch_app();
        add_via_form(&mut app, "Dune", "Herbert", "1965");
        let before = app.catalog().clone();

        app.handle_key(KeyCode::Char('9'));

        assert_eq!(app.catalog(), &before);
        assert_eq!(status(&app).0, "Invalid choice. Please try again.");
    }

    #[test]
    fn exit_saves_and_next_run_loads() {
        let (dir, mut app) = scratch_app();
        add_via_form(&mut app, "Dune", "Herbert", "1965");
        add_via_form(&mut app, "Foundation", "Asimov", "1951");

        assert!(app.handle_key(KeyCode::Char('q')));
        let report = app.exit_report().unwrap();
        assert!(report.starts_with("Catalog saved to file"));

        let reopened = App::load(dir.path().join("catalog.sqlite"));
        assert_eq!(reopened.catalog(), app.catalog());
        assert!(status(&reopened).0.starts_with("Catalog loaded from file"));
    }

    #[test]
    fn failed_save_is_reported_not_raised() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new(Catalog::new(), dir.path().join("missing").join("c.sqlite"));

        app.handle_key(KeyCode::Char('s'));

        let (text, kind) = status(&app);
        assert!(text.starts_with("Error saving catalog to file"));
        assert_eq!(kind, StatusKind::Error);
    }

    #[test]
    fn draw_lists_books() {
        let (_dir, mut app) = scratch_app();
        add_via_form(&mut app, "Dune", "Herbert", "1965");

        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|frame| app.draw(frame)).unwrap();

        let rendered: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(rendered.contains("Title: Dune, Author: Herbert"));

        app.handle_key(KeyCode::Char('+'));
        terminal.draw(|frame| app.draw(frame)).unwrap();
        let rendered: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect();
        assert!(rendered.contains("Add Book"));
    }
}
