//! Ratatui front end: a single book list with modal popups for adding,
//! removing, and searching. All catalog logic lives in [`crate::catalog`];
//! this layer only translates key presses into catalog calls and reports the
//! outcome in the footer.

mod app;
mod forms;
mod helpers;
mod terminal;

pub use app::App;
pub use terminal::run_app;
