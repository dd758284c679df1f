//! SQLite-backed record store
//!
//! One table per record class:
//!
//! ```text
//! template (wiki_id, title)
//! redirect (wiki_id, title, redirect)
//! articles (key PRIMARY KEY, wiki_id, title, text)
//! ```
//!
//! SQL text is fixed at compile time and every value travels as a bound
//! parameter, so titles and bodies containing quotes or SQL fragments are
//! stored verbatim. The connection runs in autocommit mode; each insert is
//! durable on its own.

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use thiserror::Error;

/// Errors from the record store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS template (
    wiki_id INTEGER,
    title TEXT
);
CREATE TABLE IF NOT EXISTS redirect (
    wiki_id INTEGER,
    title TEXT,
    redirect TEXT
);
CREATE TABLE IF NOT EXISTS articles (
    key INTEGER PRIMARY KEY,
    wiki_id INTEGER,
    title TEXT,
    text TEXT
);
"#;

/// The three record tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    Template,
    Redirect,
    Article,
}

impl TableKind {
    pub fn name(&self) -> &'static str {
        match self {
            TableKind::Template => "template",
            TableKind::Redirect => "redirect",
            TableKind::Article => "articles",
        }
    }
}

/// One row ready for insertion
///
/// A closed set of shapes keeps the SQL literal per variant; there is no
/// string building from caller data anywhere.
#[derive(Debug)]
pub enum RecordRow<'a> {
    Template {
        wiki_id: i64,
        title: &'a str,
    },
    Redirect {
        wiki_id: i64,
        title: &'a str,
        target: &'a str,
    },
    Article {
        key: i64,
        wiki_id: i64,
        title: &'a str,
        text: &'a str,
    },
}

/// Handle to the record database
pub struct RecordStore {
    conn: Connection,
}

impl RecordStore {
    /// Open (creating if missing) the database at `path` and ensure the
    /// schema exists
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self { conn })
    }

    /// Insert one row into its table
    pub fn insert(&self, row: &RecordRow<'_>) -> Result<(), StoreError> {
        match row {
            RecordRow::Template { wiki_id, title } => {
                self.conn.execute(
                    "INSERT INTO template (wiki_id, title) VALUES (?1, ?2)",
                    params![wiki_id, title],
                )?;
            }
            RecordRow::Redirect {
                wiki_id,
                title,
                target,
            } => {
                self.conn.execute(
                    "INSERT INTO redirect (wiki_id, title, redirect) VALUES (?1, ?2, ?3)",
                    params![wiki_id, title, target],
                )?;
            }
            RecordRow::Article {
                key,
                wiki_id,
                title,
                text,
            } => {
                self.conn.execute(
                    "INSERT INTO articles (key, wiki_id, title, text) VALUES (?1, ?2, ?3, ?4)",
                    params![key, wiki_id, title, text],
                )?;
            }
        }
        Ok(())
    }

    /// Number of rows in a table
    pub fn count(&self, table: TableKind) -> Result<usize, StoreError> {
        let sql = match table {
            TableKind::Template => "SELECT COUNT(*) FROM template",
            TableKind::Redirect => "SELECT COUNT(*) FROM redirect",
            TableKind::Article => "SELECT COUNT(*) FROM articles",
        };
        let n: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(n as usize)
    }

    /// Normalized text of the article stored under `key`, if any
    pub fn article_text(&self, key: i64) -> Result<Option<String>, StoreError> {
        let text = self
            .conn
            .query_row(
                "SELECT text FROM articles WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(text)
    }
}
