//! Ordered store interface
//!
//! The engine reads through these traits only. A transaction is acquired and
//! released by the caller; the engine opens cursors inside it.

use std::fmt;

use serde_json::Value;

use super::errors::StoreResult;
use crate::index::{Direction, Key, KeyRange, PrimaryKey};

/// Names the index a query scans
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexRef {
    /// Table name
    pub table: String,
    /// Indexed field name
    pub index: String,
}

impl IndexRef {
    pub fn new(table: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            index: index.into(),
        }
    }
}

impl fmt::Display for IndexRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.index)
    }
}

/// An index entry with its full record
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Primary key
    pub primary_key: PrimaryKey,
    /// Index key the entry was found under
    pub key: Key,
    /// Record body
    pub value: Value,
}

impl Record {
    pub fn new(primary_key: PrimaryKey, key: Key, value: Value) -> Self {
        Self {
            primary_key,
            key,
            value,
        }
    }

    /// Returns a top-level field of the body
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.value.get(name)
    }

    /// Returns the index key as text, if it is a text key
    pub fn key_text(&self) -> Option<&str> {
        self.key.as_text()
    }
}

/// Ordered cursor over one key range
pub trait IndexCursor {
    /// Fetches the next entry, or `None` once the range is exhausted
    fn next_entry(&mut self) -> StoreResult<Option<Record>>;
}

/// Read transaction scope with isolated visibility
pub trait ReadTransaction {
    /// Cursor type borrowing the transaction
    type Cursor<'t>: IndexCursor
    where
        Self: 't;

    /// Opens a cursor over `range` of `index`, ordered by `direction`.
    fn open_cursor(
        &self,
        index: &IndexRef,
        range: &KeyRange,
        direction: Direction,
    ) -> StoreResult<Self::Cursor<'_>>;
}
