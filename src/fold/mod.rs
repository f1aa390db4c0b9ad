//! Case folding for foldscan
//!
//! Provides the equivalence used by every case-insensitive predicate.
//!
//! # Folding standard
//!
//! - `Simple`: Unicode simple case folding, single code point mappings only.
//!   `ß` and `ẞ` are equivalent; `ß` never equals `ss`. The Turkic dotted and
//!   dotless I fold only to themselves.
//! - `Ascii`: `A-Z` and `a-z` only.
//!
//! A code point may have more than two variants (`k`, `K`, KELVIN SIGN).

mod folder;
mod table;

pub use folder::{CaseFolder, FoldingMode};
