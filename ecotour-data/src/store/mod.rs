//! SQLite persistence for the visitor's selection.
//!
//! Lists live in two tables: `string_lists` records which keys have been
//! written and `string_list_values` holds their ordered entries. A key with
//! no value rows is a stored empty list; a key with no `string_lists` row
//! was never written.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use ecotour_core::KeyValueStore;
use log::debug;
use rusqlite::{Connection, Error as SqliteError, OptionalExtension, Transaction};
use thiserror::Error;

/// Errors raised by [`SqliteKeyValueStore`].
#[derive(Debug, Error)]
pub enum SqliteKeyValueStoreError {
    /// Failed to create the parent directory for the database file.
    #[error("failed to create parent directory {path:?}")]
    CreateDirectory {
        /// Path of the directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Opening or initialising the database failed.
    #[error("failed to open SQLite database at {path:?}")]
    Open {
        /// Database path, or `:memory:`.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
    /// A read or write failed.
    #[error("SQLite key-value operation failed")]
    Database {
        /// Source error returned by `rusqlite`.
        #[source]
        source: SqliteError,
    },
}

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS string_lists (
        key TEXT PRIMARY KEY
    );
    CREATE TABLE IF NOT EXISTS string_list_values (
        key TEXT NOT NULL REFERENCES string_lists (key) ON DELETE CASCADE,
        position INTEGER NOT NULL,
        value TEXT NOT NULL,
        PRIMARY KEY (key, position)
    );
";

/// A [`KeyValueStore`] persisted in a SQLite database.
///
/// # Examples
/// ```
/// use ecotour_core::KeyValueStore;
/// use ecotour_data::SqliteKeyValueStore;
///
/// # fn main() -> Result<(), ecotour_data::SqliteKeyValueStoreError> {
/// let mut store = SqliteKeyValueStore::open_in_memory()?;
/// assert_eq!(store.get_string_list("SelectedPOI")?, None);
/// store.put_string_list("SelectedPOI", &["nest".to_owned()])?;
/// assert_eq!(store.get_string_list("SelectedPOI")?, Some(vec!["nest".to_owned()]));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SqliteKeyValueStore {
    connection: Connection,
}

impl SqliteKeyValueStore {
    /// Open or create the database at `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory or database cannot be created.
    pub fn open(path: &Utf8Path) -> Result<Self, SqliteKeyValueStoreError> {
        ensure_parent_dir(path)?;
        let connection = Connection::open(path.as_std_path()).map_err(|source| {
            SqliteKeyValueStoreError::Open {
                path: path.to_path_buf(),
                source,
            }
        })?;
        debug!("opened selection store at {path}");
        Self::initialise(connection, path)
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns an error when SQLite cannot allocate the database.
    pub fn open_in_memory() -> Result<Self, SqliteKeyValueStoreError> {
        let path = Utf8Path::new(":memory:");
        let connection =
            Connection::open_in_memory().map_err(|source| SqliteKeyValueStoreError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Self::initialise(connection, path)
    }

    fn initialise(connection: Connection, path: &Utf8Path) -> Result<Self, SqliteKeyValueStoreError> {
        let open_error = |source| SqliteKeyValueStoreError::Open {
            path: path.to_path_buf(),
            source,
        };
        connection
            .pragma_update(None, "foreign_keys", true)
            .map_err(open_error)?;
        connection.execute_batch(SCHEMA).map_err(open_error)?;
        Ok(Self { connection })
    }

    fn write_in(
        transaction: &Transaction<'_>,
        key: &str,
        values: &[String],
    ) -> Result<(), SqliteError> {
        transaction.execute("DELETE FROM string_lists WHERE key = ?1", [key])?;
        transaction.execute("INSERT INTO string_lists (key) VALUES (?1)", [key])?;
        let mut statement = transaction.prepare(
            "INSERT INTO string_list_values (key, position, value) VALUES (?1, ?2, ?3)",
        )?;
        for (position, value) in (0_i64..).zip(values) {
            statement.execute((key, position, value))?;
        }
        Ok(())
    }
}

impl KeyValueStore for SqliteKeyValueStore {
    type Error = SqliteKeyValueStoreError;

    fn put_string_list(&mut self, key: &str, values: &[String]) -> Result<(), Self::Error> {
        self.put_string_lists(&[(key, values)])
    }

    fn get_string_list(&self, key: &str) -> Result<Option<Vec<String>>, Self::Error> {
        let database = |source| SqliteKeyValueStoreError::Database { source };
        let written = self
            .connection
            .query_row("SELECT 1 FROM string_lists WHERE key = ?1", [key], |_| Ok(()))
            .optional()
            .map_err(database)?;
        if written.is_none() {
            return Ok(None);
        }
        let mut statement = self
            .connection
            .prepare("SELECT value FROM string_list_values WHERE key = ?1 ORDER BY position")
            .map_err(database)?;
        let values = statement
            .query_map([key], |row| row.get::<_, String>(0))
            .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
            .map_err(database)?;
        Ok(Some(values))
    }

    fn put_string_lists(&mut self, entries: &[(&str, &[String])]) -> Result<(), Self::Error> {
        let database = |source| SqliteKeyValueStoreError::Database { source };
        let transaction = self.connection.transaction().map_err(database)?;
        for (key, values) in entries {
            Self::write_in(&transaction, key, values).map_err(database)?;
        }
        transaction.commit().map_err(database)
    }
}

/// Create the missing tail of `path`'s parent directory.
///
/// The nearest existing ancestor is opened with ambient authority and the
/// remaining components are created beneath it, so parents reached through
/// `..` work as long as they exist.
fn ensure_parent_dir(path: &Utf8Path) -> Result<(), SqliteKeyValueStoreError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    for ancestor in parent.ancestors() {
        let base = if ancestor.as_str().is_empty() {
            Utf8Path::new(".")
        } else {
            ancestor
        };
        let Ok(dir) = fs_utf8::Dir::open_ambient_dir(base, ambient_authority()) else {
            continue;
        };
        let Ok(missing) = parent.strip_prefix(ancestor) else {
            continue;
        };
        if missing.as_str().is_empty() {
            return Ok(());
        }
        return dir
            .create_dir_all(missing)
            .map_err(|source| SqliteKeyValueStoreError::CreateDirectory {
                path: parent.to_path_buf(),
                source,
            });
    }
    Ok(())
}

#[cfg(test)]
mod tests;
