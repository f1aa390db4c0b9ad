//! foldscan - Case-folding predicate range compiler and range-scan executor
//!
//! Resolves case-insensitive and multi-value predicates over an ordered
//! index that only supports exact and range lookups in code-point order.
//!
//! ```ignore
//! use foldscan::executor::Resolver;
//! use foldscan::planner::{Predicate, Query};
//! use foldscan::store::{IndexRef, IndexSpec, MemoryStore};
//!
//! let store = MemoryStore::new();
//! store.create_table("files", vec![IndexSpec::new("filename")])?;
//! store.insert("files", serde_json::json!({"filename": "Hello"}))?;
//!
//! let resolver = Resolver::default();
//! let txn = store.read();
//! let query = Query::new(IndexRef::new("files", "filename"), Predicate::equals_ignore_case("hello"));
//! let records = resolver.resolve(&txn, query)?.to_vec()?;
//! ```

pub mod config;
pub mod executor;
pub mod fold;
pub mod index;
pub mod observability;
pub mod planner;
pub mod store;
