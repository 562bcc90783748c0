use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".library-catalog";
/// Catalog file name stored inside the application data directory.
const CATALOG_FILE_NAME: &str = "library_catalog.sqlite";
/// Log file name stored next to the catalog.
const LOG_FILE_NAME: &str = "library_catalog.log";

/// Overrides the catalog file location.
pub const CATALOG_PATH_VAR: &str = "LIBRARY_CATALOG_PATH";
/// Overrides the log file location.
pub const LOG_PATH_VAR: &str = "LIBRARY_CATALOG_LOG";

/// Where the catalog and its log live for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub catalog_path: PathBuf,
    pub log_path: PathBuf,
}

impl Config {
    /// Resolve paths from the process environment and the user's home.
    pub fn from_env() -> Result<Self> {
        let base_dirs = BaseDirs::new();
        Self::resolve(base_dirs.as_ref().map(BaseDirs::home_dir), |key| {
            std::env::var_os(key).map(PathBuf::from)
        })
    }

    /// Environment overrides win; otherwise both files go under
    /// `<home>/.library-catalog/`. A home directory is only required when
    /// some path is not overridden.
    pub fn resolve<F>(home: Option<&Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<PathBuf>,
    {
        let default_in_home = |file_name: &str| -> Result<PathBuf> {
            let home = home.ok_or_else(|| anyhow!("could not locate home directory"))?;
            Ok(home.join(DATA_DIR_NAME).join(file_name))
        };

        let catalog_path = match lookup(CATALOG_PATH_VAR).filter(|p| !p.as_os_str().is_empty()) {
            Some(path) => path,
            None => default_in_home(CATALOG_FILE_NAME)?,
        };
        let log_path = match lookup(LOG_PATH_VAR).filter(|p| !p.as_os_str().is_empty()) {
            Some(path) => path,
            None => default_in_home(LOG_FILE_NAME)?,
        };

        Ok(Self {
            catalog_path,
            log_path,
        })
    }

    /// Create the parent directories of both files.
    pub fn ensure_dirs(&self) -> Result<()> {
        for path in [&self.catalog_path, &self.log_path] {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create data directory {}", parent.display())
                })?;
            }
        }
        Ok(())
    }
}
