//! Post-filter for range-scan candidates
//!
//! Compiled ranges are a superset of the true matches. The post-filter
//! re-applies the exact predicate to each candidate's full key, using the
//! same `CaseFolder` the compiler used, then the auxiliary filter (AND).
//!
//! Non-text keys never satisfy a text predicate.

use std::collections::HashSet;

use crate::fold::CaseFolder;
use crate::index::{Key, KeyRange};
use crate::planner::{AuxiliaryFilter, Predicate};
use crate::store::Record;

use super::errors::{QueryError, QueryResult};

/// Predicate prepared for repeated evaluation
#[derive(Debug)]
enum KeyMatcher {
    Equals(Key),
    EqualsIgnoreCase(String),
    StartsWithIgnoreCase(String),
    /// Sorted, deduplicated
    AnyOf(Vec<Key>),
    /// Folded needles
    AnyOfIgnoreCase(HashSet<String>),
    StartsWith(String),
    /// `None` when the bounds denote no keys
    Between(Option<KeyRange>),
}

/// Evaluates the exact predicate and the auxiliary filter
#[derive(Debug)]
pub struct PostFilter<'q> {
    folder: CaseFolder,
    matcher: KeyMatcher,
    auxiliary: Option<AuxiliaryFilter<'q>>,
}

impl<'q> PostFilter<'q> {
    pub fn new(folder: CaseFolder, predicate: Predicate, auxiliary: Option<AuxiliaryFilter<'q>>) -> Self {
        let matcher = match predicate {
            Predicate::Equals(key) => KeyMatcher::Equals(key),
            Predicate::EqualsIgnoreCase(needle) => KeyMatcher::EqualsIgnoreCase(needle),
            Predicate::StartsWithIgnoreCase(prefix) => KeyMatcher::StartsWithIgnoreCase(prefix),
            Predicate::EqualsAnyOf(mut keys) => {
                keys.sort();
                keys.dedup();
                KeyMatcher::AnyOf(keys)
            }
            Predicate::AnyOfIgnoreCase(needles) => KeyMatcher::AnyOfIgnoreCase(
                needles.iter().map(|n| folder.fold_str(n)).collect(),
            ),
            Predicate::StartsWith(prefix) => KeyMatcher::StartsWith(prefix),
            Predicate::Between { lower, upper } => KeyMatcher::Between(KeyRange::new(lower, upper)),
        };

        Self {
            folder,
            matcher,
            auxiliary,
        }
    }

    /// Checks the predicate against a key only
    pub fn matches_key(&self, key: &Key) -> bool {
        match &self.matcher {
            KeyMatcher::Equals(expected) => key == expected,
            KeyMatcher::AnyOf(keys) => keys.binary_search(key).is_ok(),
            KeyMatcher::Between(range) => range.as_ref().is_some_and(|r| r.contains(key)),
            KeyMatcher::EqualsIgnoreCase(needle) => key
                .as_text()
                .is_some_and(|text| self.folder.eq_ignore_case(text, needle)),
            KeyMatcher::StartsWithIgnoreCase(prefix) => key
                .as_text()
                .is_some_and(|text| self.folder.starts_with_ignore_case(text, prefix)),
            KeyMatcher::AnyOfIgnoreCase(folded) => key
                .as_text()
                .is_some_and(|text| folded.contains(&self.folder.fold_str(text))),
            KeyMatcher::StartsWith(prefix) => key
                .as_text()
                .is_some_and(|text| text.starts_with(prefix.as_str())),
        }
    }

    /// Accepts or rejects a candidate record.
    ///
    /// The auxiliary filter runs only for records whose key matches. Its
    /// failure is returned as `AuxiliaryFilterFailure`, never as a non-match.
    pub fn accept(&self, record: &Record) -> QueryResult<bool> {
        if !self.matches_key(&record.key) {
            return Ok(false);
        }
        match &self.auxiliary {
            None => Ok(true),
            Some(filter) => filter
                .evaluate(record)
                .map_err(|source| QueryError::AuxiliaryFilterFailure {
                    primary_key: record.primary_key,
                    source,
                }),
        }
    }

    /// Returns true if an auxiliary filter is attached
    pub fn has_auxiliary(&self) -> bool {
        self.auxiliary.is_some()
    }
}
