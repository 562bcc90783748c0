//! Binary entry point: resolve paths, start logging, load the saved catalog,
//! and drive the Ratatui event loop until the user exits.
use anyhow::Result;
use library_catalog::{logging, run_app, App, Config};

/// Returning a `Result` bubbles up fatal start-up problems (an unwritable data
/// directory, a terminal that refuses raw mode) instead of crashing silently.
/// Catalog load and save failures are not fatal; the app reports them itself.
fn main() -> Result<()> {
    let config = Config::from_env()?;
    config.ensure_dirs()?;
    logging::init(&config.log_path)?;
    tracing::info!(catalog = %config.catalog_path.display(), "starting library catalog");

    let mut app = App::load(config.catalog_path);
    run_app(&mut app)?;

    if let Some(report) = app.exit_report() {
        println!("{report}");
    }
    println!("Exiting...");
    Ok(())
}
