//! Index primitives for foldscan
//!
//! Keys, key ranges, and the ordered index tree that backs the in-memory
//! store.
//!
//! # Invariants
//!
//! - Key order is raw code-point order for text, never locale collation
//! - A `KeyRange` is never empty
//! - A `RangeSet` is sorted by lower bound and pairwise non-overlapping

mod btree;
mod key;
mod range;

pub use btree::{IndexEntries, IndexTree, PrimaryKey};
pub use key::{char_successor, first_char_end, prefix_end, Key};
pub use range::{Direction, KeyRange, RangeSet};
