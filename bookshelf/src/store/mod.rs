use crate::error::{Result, StoreError};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OpenFlags, OptionalExtension, Row};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

/// A table-backed entity that the store can read.
pub trait Record: Sized {
    const TABLE: &'static str;
    /// Every column of the table, `id` first.
    const COLUMNS: &'static [&'static str];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

/// The insertable part of a [`Record`]; the store assigns `id`.
pub trait NewRecord {
    type Record: Record;
    const COLUMNS: &'static [&'static str];

    /// Values in the same order as [`NewRecord::COLUMNS`].
    fn values(&self) -> Vec<Value>;
}

/// An equality filter on a single column.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    column: &'static str,
    value: Value,
}

impl Filter {
    pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {
        Filter {
            column,
            value: value.into(),
        }
    }

    pub fn column(&self) -> &str {
        self.column
    }

    fn check<T: Record>(&self) -> Result<()> {
        if T::COLUMNS.contains(&self.column) {
            Ok(())
        } else {
            Err(StoreError::UnknownColumn {
                table: T::TABLE.to_string(),
                column: self.column.to_string(),
            })
        }
    }
}

/// SQLite-backed record store for authors and books.
///
/// One connection is shared by all callers; each operation holds the lock
/// only for its own statements.
pub struct Store {
    path: Option<PathBuf>,
    conn: Mutex<Connection>,
}

impl Store {
    /// Open or create the database file at the given path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        log::info!("Opened bookshelf store at {}", path.display());
        Self::with_connection(conn, Some(path.to_path_buf()))
    }

    /// Open an existing database file without write access.
    /// Every write through this store fails as unavailable.
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        log::info!("Opened bookshelf store at {} (read-only)", path.display());
        Ok(Store {
            path: Some(path.to_path_buf()),
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn, None)
    }

    fn with_connection(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_tables(&conn)?;
        Ok(Store {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Path of the database file, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("connection lock poisoned".into()))
    }

    /// Look up a single record by primary key.
    pub fn find_unique<T: Record>(&self, id: i32) -> Result<Option<T>> {
        log::debug!("find_unique {} id={id}", T::TABLE);
        let conn = self.conn()?;
        select_by_id(&conn, i64::from(id))
    }

    /// List records in insertion order, optionally filtered on one column.
    pub fn find_many<T: Record>(&self, filter: Option<&Filter>) -> Result<Vec<T>> {
        log::debug!("find_many {} filter={filter:?}", T::TABLE);
        let mut sql = select_clause::<T>();
        let mut values = Vec::new();
        if let Some(filter) = filter {
            filter.check::<T>()?;
            sql.push_str(&format!(" WHERE {} = ?1", filter.column));
            values.push(filter.value.clone());
        }
        sql.push_str(" ORDER BY id");

        let conn = self.conn()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), |row| T::from_row(row))?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Look up the single record matching `filter`.
    /// More than one match means the data broke an invariant and is an error.
    pub fn find_one<T: Record>(&self, filter: &Filter) -> Result<Option<T>> {
        let mut records = self.find_many::<T>(Some(filter))?;
        match records.len() {
            0 | 1 => Ok(records.pop()),
            n => Err(StoreError::DataIntegrity(format!(
                "expected at most one row in {} where {} = {:?}, found {n}",
                T::TABLE,
                filter.column,
                filter.value
            ))),
        }
    }

    /// Insert a record and return the persisted row, including its new `id`.
    pub fn create<N: NewRecord>(&self, data: &N) -> Result<N::Record> {
        let table = <N::Record as Record>::TABLE;
        log::debug!("create {table}");

        let placeholders = (1..=N::COLUMNS.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {table} ({}) VALUES ({placeholders})",
            N::COLUMNS.join(", ")
        );

        let conn = self.conn()?;
        conn.execute(&sql, params_from_iter(data.values()))?;
        let id = conn.last_insert_rowid();
        select_by_id(&conn, id)?.ok_or_else(|| {
            StoreError::DataIntegrity(format!("row {table}/{id} missing right after insert"))
        })
    }

    /// Number of rows in a record's table.
    pub fn count<T: Record>(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(&format!("SELECT COUNT(*) FROM {}", T::TABLE), [], |row| {
            row.get(0)
        })?;
        Ok(count)
    }

    /// Summary of the store: database location and row counts.
    pub fn status(&self) -> Result<serde_json::Value> {
        use crate::model::{Author, Book};

        let path = self
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| ":memory:".to_string());
        Ok(serde_json::json!({
            "path": path,
            "authors": self.count::<Author>()?,
            "books": self.count::<Book>()?,
        }))
    }
}

fn initialize_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS authors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL CHECK (name <> ''),
            date_of_birth DATE NOT NULL,
            country TEXT NOT NULL CHECK (country <> '')
        );

        CREATE TABLE IF NOT EXISTS books (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL CHECK (title <> ''),
            genre TEXT NOT NULL CHECK (genre <> ''),
            author_id INTEGER NOT NULL REFERENCES authors(id)
        );

        CREATE INDEX IF NOT EXISTS idx_books_author_id ON books(author_id);
        ",
    )?;
    Ok(())
}

fn select_clause<T: Record>() -> String {
    format!("SELECT {} FROM {}", T::COLUMNS.join(", "), T::TABLE)
}

fn select_by_id<T: Record>(conn: &Connection, id: i64) -> Result<Option<T>> {
    let sql = format!("{} WHERE id = ?1", select_clause::<T>());
    let record = conn
        .query_row(&sql, params![id], |row| T::from_row(row))
        .optional()?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Author, Book, NewAuthor, NewBook};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn jane() -> NewAuthor {
        NewAuthor {
            name: "Jane Doe".into(),
            date_of_birth: NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
            country: "UK".into(),
        }
    }

    fn book(title: &str, author_id: i32) -> NewBook {
        NewBook {
            title: title.into(),
            genre: "Fiction".into(),
            author_id,
        }
    }

    #[test]
    fn test_create_and_find_author() {
        let store = Store::open_in_memory().unwrap();

        let author = store.create(&jane()).unwrap();
        assert_eq!(author.id, 1);
        assert_eq!(author.name, "Jane Doe");

        let found: Author = store.find_unique(author.id).unwrap().unwrap();
        assert_eq!(found, author);
    }

    #[test]
    fn test_find_unique_missing_is_none() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.find_unique::<Book>(42).unwrap().is_none());
    }

    #[test]
    fn test_find_many_in_insertion_order() {
        let store = Store::open_in_memory().unwrap();
        let author = store.create(&jane()).unwrap();
        store.create(&book("First", author.id)).unwrap();
        store.create(&book("Second", author.id)).unwrap();

        let titles: Vec<String> = store
            .find_many::<Book>(None)
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["First", "Second"]);
    }

    #[test]
    fn test_find_many_with_filter() {
        let store = Store::open_in_memory().unwrap();
        let her = store.create(&jane()).unwrap();
        let him = store
            .create(&NewAuthor {
                name: "John Roe".into(),
                ..jane()
            })
            .unwrap();
        store.create(&book("Hers", her.id)).unwrap();
        store.create(&book("His", him.id)).unwrap();

        let books = store
            .find_many::<Book>(Some(&Filter::eq("author_id", her.id)))
            .unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Hers");
    }

    #[test]
    fn test_find_many_rejects_unknown_column() {
        let store = Store::open_in_memory().unwrap();
        let err = store
            .find_many::<Book>(Some(&Filter::eq("author", 1)))
            .unwrap_err();
        assert!(matches!(err, StoreError::UnknownColumn { ref column, .. } if column == "author"));
    }

    #[test]
    fn test_find_one_single_match() {
        let store = Store::open_in_memory().unwrap();
        let author = store.create(&jane()).unwrap();

        let found: Option<Author> = store.find_one(&Filter::eq("id", author.id)).unwrap();
        assert_eq!(found, Some(author));

        let missing: Option<Author> = store.find_one(&Filter::eq("id", 99)).unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_find_one_multiple_matches_is_integrity_error() {
        let store = Store::open_in_memory().unwrap();
        let author = store.create(&jane()).unwrap();
        store.create(&book("One", author.id)).unwrap();
        store.create(&book("Two", author.id)).unwrap();

        let err = store
            .find_one::<Book>(&Filter::eq("author_id", author.id))
            .unwrap_err();
        assert!(matches!(err, StoreError::DataIntegrity(ref m) if m.contains("found 2")));
    }

    #[test]
    fn test_create_book_with_unknown_author_fails() {
        let store = Store::open_in_memory().unwrap();

        let err = store.create(&book("Orphan", 7)).unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation(_)));
        assert_eq!(store.count::<Book>().unwrap(), 0);
    }

    #[test]
    fn test_create_rejects_empty_strings() {
        let store = Store::open_in_memory().unwrap();
        let author = store.create(&jane()).unwrap();

        let err = store.create(&book("", author.id)).unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation(_)));
    }

    #[test]
    fn test_null_required_column_is_reported() {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("lax.db");
        {
            let conn = Connection::open(&db_path).unwrap();
            conn.execute_batch(
                "
                CREATE TABLE authors (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT, date_of_birth DATE, country TEXT);
                CREATE TABLE books (id INTEGER PRIMARY KEY AUTOINCREMENT, title TEXT, genre TEXT, author_id INTEGER);
                INSERT INTO books (title, genre, author_id) VALUES (NULL, 'Fiction', 1);
                ",
            )
            .unwrap();
        }

        let store = Store::open(&db_path).unwrap();
        let err = store.find_unique::<Book>(1).unwrap_err();
        assert!(matches!(err, StoreError::DataIntegrity(ref m) if m.contains("title")));
    }

    #[test]
    fn test_records_persist_across_reopen() {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("bookshelf.db");

        let author = {
            let store = Store::open(&db_path).unwrap();
            store.create(&jane()).unwrap()
        };

        let store = Store::open(&db_path).unwrap();
        assert_eq!(store.find_unique::<Author>(author.id).unwrap(), Some(author));
        assert_eq!(store.path(), Some(db_path.as_path()));
    }

    #[test]
    fn test_open_in_missing_directory_is_unavailable() {
        let tmp = TempDir::new().unwrap();
        let err = Store::open(tmp.path().join("no/such/dir/bookshelf.db"))
            .err()
            .unwrap();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn test_read_only_store_rejects_writes() {
        let tmp = TempDir::new().unwrap();
        let db_path = tmp.path().join("bookshelf.db");
        let author = Store::open(&db_path).unwrap().create(&jane()).unwrap();

        let store = Store::open_read_only(&db_path).unwrap();
        assert_eq!(store.find_unique::<Author>(author.id).unwrap(), Some(author));

        let err = store.create(&jane()).unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
        assert_eq!(store.count::<Author>().unwrap(), 1);
    }

    #[test]
    fn test_read_only_missing_file_is_unavailable() {
        let tmp = TempDir::new().unwrap();
        let err = Store::open_read_only(tmp.path().join("missing.db"))
            .err()
            .unwrap();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn test_status() {
        let store = Store::open_in_memory().unwrap();
        let author = store.create(&jane()).unwrap();
        store.create(&book("One", author.id)).unwrap();

        let status = store.status().unwrap();
        assert_eq!(
            status,
            serde_json::json!({ "path": ":memory:", "authors": 1, "books": 1 })
        );
    }
}
