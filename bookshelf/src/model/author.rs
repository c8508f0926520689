use crate::error::{Result, StoreError};
use crate::store::{NewRecord, Record};
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Value;
use rusqlite::Row;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A persisted author row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: i32,
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub country: String,
}

impl Author {
    /// `date_of_birth` rendered as `YYYY-MM-DD`.
    pub fn date_of_birth_string(&self) -> String {
        self.date_of_birth.format(DATE_FORMAT).to_string()
    }
}

impl Record for Author {
    const TABLE: &'static str = "authors";
    const COLUMNS: &'static [&'static str] = &["id", "name", "date_of_birth", "country"];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Author {
            id: row.get("id")?,
            name: row.get("name")?,
            date_of_birth: row.get("date_of_birth")?,
            country: row.get("country")?,
        })
    }
}

/// Fields submitted when adding an author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuthor {
    pub name: String,
    pub date_of_birth: NaiveDate,
    pub country: String,
}

impl NewAuthor {
    /// Build from raw mutation arguments, parsing `date_of_birth`.
    pub fn parse(name: String, date_of_birth: &str, country: String) -> Result<Self> {
        Ok(NewAuthor {
            name,
            date_of_birth: parse_date_of_birth(date_of_birth)?,
            country,
        })
    }
}

impl NewRecord for NewAuthor {
    type Record = Author;
    const COLUMNS: &'static [&'static str] = &["name", "date_of_birth", "country"];

    fn values(&self) -> Vec<Value> {
        vec![
            Value::from(self.name.clone()),
            Value::Text(self.date_of_birth.format(DATE_FORMAT).to_string()),
            Value::from(self.country.clone()),
        ]
    }
}

/// Parse a date of birth given either as `YYYY-MM-DD` or as an RFC 3339
/// timestamp. Timestamps keep their UTC calendar date.
pub fn parse_date_of_birth(input: &str) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(input, DATE_FORMAT) {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(input)
        .map(|ts| ts.with_timezone(&Utc).date_naive())
        .map_err(|_| {
            StoreError::InvalidInput(format!(
                "date_of_birth '{input}' is not a YYYY-MM-DD date or RFC 3339 timestamp"
            ))
        })
}
