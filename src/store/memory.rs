//! In-memory ordered store
//!
//! Tables hold JSON records keyed by an auto-incremented primary key, plus
//! one `IndexTree` per declared index. A read transaction holds the shared
//! lock for its whole lifetime, so every cursor opened inside it sees the
//! same snapshot. Writers wait until open transactions are dropped; do not
//! write from a thread that holds a read transaction.

use std::collections::{BTreeMap, HashMap};

use parking_lot::{RwLock, RwLockReadGuard};
use serde_json::Value;

use super::errors::{StoreError, StoreResult};
use super::traits::{IndexCursor, IndexRef, ReadTransaction, Record};
use crate::index::{Direction, IndexEntries, IndexTree, Key, KeyRange, PrimaryKey};

/// Field holding the primary key inside every record body
pub const PRIMARY_KEY_FIELD: &str = "id";

/// Declares an index on a top-level field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    /// Indexed field name
    pub field: String,
    /// Whether the index rejects duplicate keys
    pub unique: bool,
}

impl IndexSpec {
    /// A non-unique index
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            unique: false,
        }
    }

    /// A unique index
    pub fn unique(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            unique: true,
        }
    }
}

#[derive(Debug)]
struct Table {
    next_pk: PrimaryKey,
    records: BTreeMap<PrimaryKey, Value>,
    indexes: BTreeMap<String, IndexTree>,
}

impl Table {
    fn new(specs: impl IntoIterator<Item = IndexSpec>) -> Self {
        let indexes = specs
            .into_iter()
            .map(|spec| {
                let tree = if spec.unique {
                    IndexTree::unique()
                } else {
                    IndexTree::new()
                };
                (spec.field, tree)
            })
            .collect();
        Self {
            next_pk: 1,
            records: BTreeMap::new(),
            indexes,
        }
    }

    /// Index keys of `body`, one per index that can index it
    fn index_keys(&self, body: &Value) -> Vec<(String, Key)> {
        self.indexes
            .keys()
            .filter_map(|field| {
                body.get(field)
                    .and_then(Key::from_json)
                    .map(|key| (field.clone(), key))
            })
            .collect()
    }

    fn insert(&mut self, mut body: Value) -> StoreResult<PrimaryKey> {
        let object = body
            .as_object_mut()
            .ok_or_else(|| StoreError::constraint("Record body must be a JSON object"))?;

        let pk = self.next_pk;
        object.insert(PRIMARY_KEY_FIELD.to_string(), Value::from(pk));

        let keys = self.index_keys(&body);
        for (field, key) in &keys {
            if self.indexes.get(field).is_some_and(|tree| tree.conflicts(key, pk)) {
                return Err(StoreError::constraint(format!(
                    "Unique index '{}' already holds key {}",
                    field, key
                )));
            }
        }

        for (field, key) in keys {
            if let Some(tree) = self.indexes.get_mut(&field) {
                tree.insert(key, pk);
            }
        }
        self.records.insert(pk, body);
        self.next_pk += 1;
        Ok(pk)
    }

    fn remove(&mut self, pk: PrimaryKey) -> bool {
        let Some(body) = self.records.remove(&pk) else {
            return false;
        };
        for (field, key) in self.index_keys(&body) {
            if let Some(tree) = self.indexes.get_mut(&field) {
                tree.remove(&key, pk);
            }
        }
        true
    }

    fn clear(&mut self) {
        self.records.clear();
        for tree in self.indexes.values_mut() {
            tree.clear();
        }
    }
}

/// Thread-safe in-memory store
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Table>>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table with the given indexes.
    pub fn create_table(
        &self,
        name: impl Into<String>,
        indexes: impl IntoIterator<Item = IndexSpec>,
    ) -> StoreResult<()> {
        let name = name.into();
        let mut tables = self.tables.write();
        if tables.contains_key(&name) {
            return Err(StoreError::constraint(format!("Table '{}' already exists", name)));
        }
        tables.insert(name, Table::new(indexes));
        Ok(())
    }

    /// Inserts a record, returning its primary key.
    ///
    /// The primary key is written into the body's `id` field. Records missing
    /// an indexed field, or holding an unindexable value there, are simply
    /// absent from that index.
    pub fn insert(&self, table: &str, body: Value) -> StoreResult<PrimaryKey> {
        let mut tables = self.tables.write();
        let table_ref = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::unknown_table(table))?;
        table_ref.insert(body)
    }

    /// Inserts records atomically: on the first failure every record of the
    /// batch is rolled back.
    pub fn insert_all(
        &self,
        table: &str,
        bodies: impl IntoIterator<Item = Value>,
    ) -> StoreResult<Vec<PrimaryKey>> {
        let mut tables = self.tables.write();
        let table_ref = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::unknown_table(table))?;

        let mut inserted = Vec::new();
        for body in bodies {
            match table_ref.insert(body) {
                Ok(pk) => inserted.push(pk),
                Err(e) => {
                    for pk in inserted {
                        table_ref.remove(pk);
                    }
                    return Err(e);
                }
            }
        }
        Ok(inserted)
    }

    /// Deletes a record. Returns false if it did not exist.
    pub fn delete(&self, table: &str, pk: PrimaryKey) -> StoreResult<bool> {
        let mut tables = self.tables.write();
        let table_ref = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::unknown_table(table))?;
        Ok(table_ref.remove(pk))
    }

    /// Removes every record of a table
    pub fn clear(&self, table: &str) -> StoreResult<()> {
        let mut tables = self.tables.write();
        let table_ref = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::unknown_table(table))?;
        table_ref.clear();
        Ok(())
    }

    /// Number of records in a table
    pub fn len(&self, table: &str) -> StoreResult<usize> {
        self.read().len(table)
    }

    /// Fetches one record body by primary key
    pub fn get(&self, table: &str, pk: PrimaryKey) -> StoreResult<Option<Value>> {
        Ok(self.read().get(table, pk)?.cloned())
    }

    /// Opens a read transaction
    pub fn read(&self) -> MemoryReadTxn<'_> {
        MemoryReadTxn {
            tables: self.tables.read(),
        }
    }
}

/// Read transaction over a `MemoryStore` snapshot
pub struct MemoryReadTxn<'s> {
    tables: RwLockReadGuard<'s, HashMap<String, Table>>,
}

impl MemoryReadTxn<'_> {
    fn table(&self, name: &str) -> StoreResult<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| StoreError::unknown_table(name))
    }

    /// Fetches one record body by primary key
    pub fn get(&self, table: &str, pk: PrimaryKey) -> StoreResult<Option<&Value>> {
        Ok(self.table(table)?.records.get(&pk))
    }

    /// Number of records in a table
    pub fn len(&self, table: &str) -> StoreResult<usize> {
        Ok(self.table(table)?.records.len())
    }
}

impl ReadTransaction for MemoryReadTxn<'_> {
    type Cursor<'t> = MemoryCursor<'t> where Self: 't;

    fn open_cursor(
        &self,
        index: &IndexRef,
        range: &KeyRange,
        direction: Direction,
    ) -> StoreResult<MemoryCursor<'_>> {
        let table = self.table(&index.table)?;
        let tree = table
            .indexes
            .get(&index.index)
            .ok_or_else(|| StoreError::unknown_index(&index.table, &index.index))?;
        Ok(MemoryCursor {
            entries: tree.entries(range, direction),
            records: &table.records,
        })
    }
}

/// Cursor over one index range of a `MemoryReadTxn`
pub struct MemoryCursor<'t> {
    entries: IndexEntries<'t>,
    records: &'t BTreeMap<PrimaryKey, Value>,
}

impl IndexCursor for MemoryCursor<'_> {
    fn next_entry(&mut self) -> StoreResult<Option<Record>> {
        let Some((key, pk)) = self.entries.next() else {
            return Ok(None);
        };
        let value = self
            .records
            .get(&pk)
            .ok_or_else(|| StoreError::io(format!("Index entry {} points at missing record {}", key, pk)))?;
        Ok(Some(Record::new(pk, key.clone(), value.clone())))
    }
}
