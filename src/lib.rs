//! Core library surface for the library catalog TUI.
//!
//! The catalog and its persistence are usable on their own; the `ui` module
//! is one front end over them and `main.rs` wires it to a real terminal.
pub mod catalog;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod storage;
pub mod ui;

pub use catalog::Catalog;
pub use config::Config;
pub use error::CatalogError;
pub use models::Book;

/// The interactive application entry point and state container.
pub use ui::{run_app, App};
