use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OpenFlags};

use crate::error::{CatalogError, Result};

/// Stored in `PRAGMA user_version`; bump whenever the `books` table changes.
pub const FORMAT_VERSION: i64 = 1;

/// Open an existing catalog file read-only and confirm it speaks our format.
///
/// SQLite opens lazily, so a file that is not a database only fails on the
/// first query. The version probe doubles as that first query.
pub(crate) fn open_for_read(path: &Path) -> Result<Connection> {
    match path.try_exists() {
        Ok(true) => {}
        Ok(false) => {
            return Err(CatalogError::Missing {
                path: path.to_path_buf(),
            })
        }
        Err(err) => return Err(CatalogError::io(path, err)),
    }

    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .map_err(|err| CatalogError::storage(path, err))?;

    let found: i64 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|err| CatalogError::storage(path, err))?;

    if found != FORMAT_VERSION {
        return Err(CatalogError::UnsupportedFormat {
            path: path.to_path_buf(),
            found,
            expected: FORMAT_VERSION,
        });
    }

    Ok(conn)
}

/// Write a brand new catalog database next to `target`, then rename it over
/// the target.
///
/// `fill` receives the staging connection with an empty `books` table. The
/// connection is closed before the rename, and on any failure the staging file
/// is removed so the target keeps its previous contents.
pub(crate) fn replace_with<F>(target: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut Connection, &Path) -> Result<()>,
{
    let staging = staging_path(target);

    match fs::remove_file(&staging) {
        Ok(()) => {}
        Err(err) if err.kind() == ErrorKind::NotFound => {}
        Err(err) => return Err(CatalogError::io(&staging, err)),
    }

    let result = write_staged(&staging, fill)
        .and_then(|()| fs::rename(&staging, target).map_err(|err| CatalogError::io(target, err)));

    if result.is_err() {
        // Best effort; the next save clears a leftover staging file anyway.
        let _ = fs::remove_file(&staging);
    }
    result
}

fn write_staged<F>(staging: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut Connection, &Path) -> Result<()>,
{
    let mut conn = Connection::open(staging).map_err(|err| CatalogError::storage(staging, err))?;

    conn.execute_batch(&format!(
        "CREATE TABLE books (
            position INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            author TEXT NOT NULL,
            year INTEGER NOT NULL
        );
        PRAGMA user_version = {FORMAT_VERSION};"
    ))
    .map_err(|err| CatalogError::storage(staging, err))?;

    fill(&mut conn, staging)?;

    conn.close()
        .map_err(|(_, err)| CatalogError::storage(staging, err))
}

/// `library.sqlite` stages as `library.sqlite.tmp` in the same directory so
/// the final rename never crosses filesystems.
fn staging_path(target: &Path) -> PathBuf {
    let mut name = target
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("catalog"));
    name.push(".tmp");
    target.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staging_file_sits_beside_target() {
        let target = Path::new("/data/library_catalog.sqlite");
        assert_eq!(
            staging_path(target),
            PathBuf::from("/data/library_catalog.sqlite.tmp")
        );
    }

    #[test]
    fn missing_file_is_reported_as_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_for_read(&dir.path().join("absent.sqlite")).unwrap_err();
        assert!(err.is_missing());
    }

    #[test]
    fn failed_fill_leaves_target_and_no_staging_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("catalog.sqlite");
        fs::write(&target, b"previous contents").unwrap();

        let result = replace_with(&target, |_, staging| {
            Err(CatalogError::io(
                staging,
                std::io::Error::new(ErrorKind::Other, "disk full"),
            ))
        });

        assert!(result.is_err());
        assert_eq!(fs::read(&target).unwrap(), b"previous contents");
        assert!(!staging_path(&target).exists());
    }

    #[test]
    fn stale_staging_file_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("catalog.sqlite");
        fs::write(staging_path(&target), b"leftover from a crash").unwrap();

        replace_with(&target, |_, _| Ok(())).unwrap();

        assert!(open_for_read(&target).is_ok());
        assert!(!staging_path(&target).exists());
    }

    #[test]
    fn foreign_version_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.sqlite");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch("PRAGMA user_version = 7;").unwrap();
        }

        match open_for_read(&path) {
            Err(CatalogError::UnsupportedFormat {
                found, expected, ..
            }) => {
                assert_eq!(found, 7);
                assert_eq!(expected, FORMAT_VERSION);
            }
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }
}
