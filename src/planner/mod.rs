//! Query planner subsystem for foldscan
//!
//! Compiles predicates into range sets the executor can scan.
//!
//! # Design Principles
//!
//! - Superset: every key a predicate accepts lies inside a compiled range
//! - Coalesced: compiled ranges are sorted and pairwise non-overlapping
//! - Deterministic: same predicate and folder → same range set
//! - Fail early: malformed predicates are rejected before any scan
//!
//! # Range construction
//!
//! | predicate              | ranges                                   |
//! |------------------------|------------------------------------------|
//! | `Equals(v)`            | `[v, v]`                                 |
//! | `EqualsIgnoreCase(s)`  | `[c, succ(c))` per variant of `s[0]`     |
//! | `StartsWithIgnoreCase` | `[c, succ(c))` per variant of `p[0]`     |
//! | `EqualsAnyOf(vs)`      | one point per distinct value             |
//! | `AnyOfIgnoreCase(vs)`  | union of the `EqualsIgnoreCase` ranges   |
//! | `StartsWith(p)`        | `[p, succ(p))`                           |
//! | `Between(l, u)`        | the range itself                         |

mod ast;
mod compiler;
mod errors;
mod explain;

pub use ast::{AuxiliaryFilter, FilterError, Predicate, Query};
pub use compiler::{RangeSetCompiler, DEFAULT_MAX_RANGES};
pub use errors::{PlannerError, PlannerErrorCode, PlannerResult, Severity};
pub use explain::ExplainPlan;
