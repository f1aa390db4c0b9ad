//! Query executor for foldscan
//!
//! Execution flow (strict order):
//! 1. Compile the predicate into a coalesced range set
//! 2. Open one cursor per range, in direction order, inside the caller's
//!    read transaction
//! 3. Drop entries outside the range bounds
//! 4. Re-check the exact predicate, then the auxiliary filter
//! 5. Stream accepted records until exhaustion, limit, error or drop
//!
//! # Failure semantics
//!
//! - Malformed predicates are rejected before any cursor is opened
//! - A store or auxiliary filter failure ends the stream with one `Err` item
//! - Nothing is retried; partial results are not a distinct state

mod errors;
mod filters;
mod resolver;
mod result;
mod scan;

pub use errors::{QueryError, QueryResult};
pub use filters::PostFilter;
pub use resolver::Resolver;
pub use result::Matches;
pub use scan::{RangeScan, ScanStats};
