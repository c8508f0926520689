use crate::store::{NewRecord, Record};
use rusqlite::types::Value;
use rusqlite::Row;

/// A persisted book row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub genre: String,
    pub author_id: i32,
}

impl Record for Book {
    const TABLE: &'static str = "books";
    const COLUMNS: &'static [&'static str] = &["id", "title", "genre", "author_id"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Book {
            id: row.get("id")?,
            title: row.get("title")?,
            genre: row.get("genre")?,
            author_id: row.get("author_id")?,
        })
    }
}

/// Fields submitted when adding a book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewBook {
    pub title: String,
    pub genre: String,
    pub author_id: i32,
}

impl NewRecord for NewBook {
    type Record = Book;
    const COLUMNS: &'static [&'static str] = &["title", "genre", "author_id"];

    fn values(&self) -> Vec<Value> {
        vec![
            Value::from(self.title.clone()),
            Value::from(self.genre.clone()),
            Value::from(self.author_id),
        ]
    }
}
