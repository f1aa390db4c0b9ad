//! Ordered key-value store interface for foldscan
//!
//! The engine consumes a store through `ReadTransaction` and `IndexCursor`:
//! exact and half-open range lookups in natural key order, ascending or
//! descending. `MemoryStore` is the bundled implementation.
//!
//! # Invariants
//!
//! - Cursors yield entries inside the requested range in the requested order
//! - All cursors of one transaction observe the same snapshot
//! - Transactions are acquired and released by the caller

mod errors;
mod memory;
mod traits;

pub use errors::{Severity, StoreError, StoreErrorCode, StoreResult};
pub use memory::{IndexSpec, MemoryCursor, MemoryReadTxn, MemoryStore, PRIMARY_KEY_FIELD};
pub use traits::{IndexCursor, IndexRef, ReadTransaction, Record};
