//! Predicate range compiler
//!
//! Turns a predicate into a `RangeSet` that contains every key the predicate
//! accepts. Case-insensitive predicates constrain only the first character's
//! fold class; the post-filter removes the remaining false positives.
//!
//! The compiler is pure and deterministic: the same predicate and folder
//! always produce the same range set.

use std::ops::Bound;

use super::ast::Predicate;
use super::errors::{PlannerError, PlannerResult};
use crate::fold::CaseFolder;
use crate::index::{first_char_end, prefix_end, Key, KeyRange, RangeSet};

/// Default maximum number of ranges one predicate may compile to
pub const DEFAULT_MAX_RANGES: usize = 4096;

/// Compiles predicates into coalesced range sets
#[derive(Debug, Clone, Copy)]
pub struct RangeSetCompiler {
    folder: CaseFolder,
    max_ranges: usize,
}

impl RangeSetCompiler {
    pub fn new(folder: CaseFolder) -> Self {
        Self {
            folder,
            max_ranges: DEFAULT_MAX_RANGES,
        }
    }

    pub fn with_max_ranges(mut self, max_ranges: usize) -> Self {
        self.max_ranges = max_ranges;
        self
    }

    /// Returns the folder shared with the post-filter
    pub fn folder(&self) -> CaseFolder {
        self.folder
    }

    /// Compiles `predicate` into a sorted, non-overlapping range set.
    pub fn compile(&self, predicate: &Predicate) -> PlannerResult<RangeSet> {
        let ranges = match predicate {
            Predicate::Equals(value) => vec![KeyRange::point(value.clone())],
            Predicate::EqualsIgnoreCase(needle) => self.equals_ignore_case(needle),
            Predicate::StartsWithIgnoreCase(prefix) => self.starts_with_ignore_case(prefix),
            Predicate::EqualsAnyOf(values) => {
                if values.is_empty() {
                    return Err(PlannerError::malformed(
                        predicate.kind(),
                        "value list is empty",
                    ));
                }
                values.iter().cloned().map(KeyRange::point).collect()
            }
            Predicate::AnyOfIgnoreCase(values) => {
                if values.is_empty() {
                    return Err(PlannerError::malformed(
                        predicate.kind(),
                        "value list is empty",
                    ));
                }
                values
                    .iter()
                    .flat_map(|needle| self.equals_ignore_case(needle))
                    .collect()
            }
            Predicate::StartsWith(prefix) => vec![Self::starts_with(prefix)],
            Predicate::Between { lower, upper } => {
                match KeyRange::new(lower.clone(), upper.clone()) {
                    Some(range) => vec![range],
                    None => {
                        return Err(PlannerError::malformed(
                            predicate.kind(),
                            "lower bound is above upper bound",
                        ))
                    }
                }
            }
        };

        let set = RangeSet::from_ranges(ranges);
        if set.len() > self.max_ranges {
            return Err(PlannerError::too_many_ranges(
                predicate.kind(),
                set.len(),
                self.max_ranges,
            ));
        }
        Ok(set)
    }

    fn equals_ignore_case(&self, needle: &str) -> Vec<KeyRange> {
        let mut chars = needle.chars();
        let first = match chars.next() {
            Some(c) => c,
            None => return vec![KeyRange::point(Key::text(""))],
        };
        let single = chars.next().is_none();

        self.folder
            .variants(first)
            .into_iter()
            .filter_map(|v| {
                if single {
                    Some(KeyRange::point(Key::Text(v.to_string())))
                } else {
                    first_char_range(v)
                }
            })
            .collect()
    }

    fn starts_with_ignore_case(&self, prefix: &str) -> Vec<KeyRange> {
        match prefix.chars().next() {
            Some(first) => self
                .folder
                .variants(first)
                .into_iter()
                .filter_map(first_char_range)
                .collect(),
            None => vec![KeyRange::all_text()],
        }
    }

    fn starts_with(prefix: &str) -> KeyRange {
        if prefix.is_empty() {
            return KeyRange::all_text();
        }
        KeyRange::new(Bound::Included(Key::text(prefix)), prefix_end(prefix))
            .unwrap_or_else(KeyRange::all_text)
    }
}

impl Default for RangeSetCompiler {
    fn default() -> Self {
        Self::new(CaseFolder::default())
    }
}

/// Every text key whose first char is `c`: `[c, succ(c))`
fn first_char_range(c: char) -> Option<KeyRange> {
    KeyRange::new(Bound::Included(Key::Text(c.to_string())), first_char_end(c))
}
