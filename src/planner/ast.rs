//! Query AST structures
//!
//! A `Query` names one index, one predicate over that index's key, an
//! optional auxiliary filter over the full record, a direction and an
//! optional limit. Queries are built per invocation and never mutated
//! once handed to the resolver.

use std::error::Error;
use std::fmt;
use std::ops::Bound;

use crate::index::{Direction, Key};
use crate::store::{IndexRef, Record};

/// Boxed error raised by a fallible auxiliary filter
pub type FilterError = Box<dyn Error + Send + Sync>;

/// Predicate over the index key
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// key == value
    Equals(Key),
    /// key equals needle under case folding
    EqualsIgnoreCase(String),
    /// key starts with prefix under case folding
    StartsWithIgnoreCase(String),
    /// key is one of values
    EqualsAnyOf(Vec<Key>),
    /// key equals one of values under case folding
    AnyOfIgnoreCase(Vec<String>),
    /// key starts with prefix (code point comparison)
    StartsWith(String),
    /// key lies between the bounds
    Between { lower: Bound<Key>, upper: Bound<Key> },
}

impl Predicate {
    pub fn equals(value: impl Into<Key>) -> Self {
        Predicate::Equals(value.into())
    }

    pub fn equals_ignore_case(needle: impl Into<String>) -> Self {
        Predicate::EqualsIgnoreCase(needle.into())
    }

    pub fn starts_with_ignore_case(prefix: impl Into<String>) -> Self {
        Predicate::StartsWithIgnoreCase(prefix.into())
    }

    pub fn equals_any_of<K: Into<Key>>(values: impl IntoIterator<Item = K>) -> Self {
        Predicate::EqualsAnyOf(values.into_iter().map(Into::into).collect())
    }

    pub fn any_of_ignore_case<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Predicate::AnyOfIgnoreCase(values.into_iter().map(Into::into).collect())
    }

    pub fn starts_with(prefix: impl Into<String>) -> Self {
        Predicate::StartsWith(prefix.into())
    }

    /// Inclusive range `[lower, upper]`
    pub fn between(lower: impl Into<Key>, upper: impl Into<Key>) -> Self {
        Predicate::Between {
            lower: Bound::Included(lower.into()),
            upper: Bound::Included(upper.into()),
        }
    }

    /// Range with explicit bounds
    pub fn between_bounds(lower: Bound<Key>, upper: Bound<Key>) -> Self {
        Predicate::Between { lower, upper }
    }

    /// Returns the predicate name for errors and explain output
    pub fn kind(&self) -> &'static str {
        match self {
            Predicate::Equals(_) => "equals",
            Predicate::EqualsIgnoreCase(_) => "equalsIgnoreCase",
            Predicate::StartsWithIgnoreCase(_) => "startsWithIgnoreCase",
            Predicate::EqualsAnyOf(_) => "equalsAnyOf",
            Predicate::AnyOfIgnoreCase(_) => "anyOfIgnoreCase",
            Predicate::StartsWith(_) => "startsWith",
            Predicate::Between { .. } => "between",
        }
    }

    /// Returns true if the predicate depends on case folding
    pub fn is_case_insensitive(&self) -> bool {
        matches!(
            self,
            Predicate::EqualsIgnoreCase(_)
                | Predicate::StartsWithIgnoreCase(_)
                | Predicate::AnyOfIgnoreCase(_)
        )
    }
}

fn write_bound(f: &mut fmt::Formatter<'_>, bound: &Bound<Key>, lower: bool) -> fmt::Result {
    match (bound, lower) {
        (Bound::Included(k), true) => write!(f, "[{}", k),
        (Bound::Excluded(k), true) => write!(f, "({}", k),
        (Bound::Unbounded, true) => write!(f, "(-inf"),
        (Bound::Included(k), false) => write!(f, "{}]", k),
        (Bound::Excluded(k), false) => write!(f, "{})", k),
        (Bound::Unbounded, false) => write!(f, "+inf)"),
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.kind())?;
        match self {
            Predicate::Equals(key) => write!(f, "{}", key)?,
            Predicate::EqualsIgnoreCase(s)
            | Predicate::StartsWithIgnoreCase(s)
            | Predicate::StartsWith(s) => write!(f, "{:?}", s)?,
            Predicate::EqualsAnyOf(keys) => {
                for (i, key) in keys.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", key)?;
                }
            }
            Predicate::AnyOfIgnoreCase(values) => {
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}", value)?;
                }
            }
            Predicate::Between { lower, upper } => {
                write_bound(f, lower, true)?;
                write!(f, ", ")?;
                write_bound(f, upper, false)?;
            }
        }
        write!(f, ")")
    }
}

type FilterFn<'q> = dyn Fn(&Record) -> Result<bool, FilterError> + 'q;

/// Caller-supplied filter over the full record, ANDed with the predicate
pub struct AuxiliaryFilter<'q> {
    func: Box<FilterFn<'q>>,
}

impl<'q> AuxiliaryFilter<'q> {
    /// Wraps an infallible filter
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Record) -> bool + 'q,
    {
        Self {
            func: Box::new(move |record| Ok(f(record))),
        }
    }

    /// Wraps a filter that may fail; a failure aborts the query
    pub fn fallible<F, E>(f: F) -> Self
    where
        F: Fn(&Record) -> Result<bool, E> + 'q,
        E: Into<FilterError>,
    {
        Self {
            func: Box::new(move |record| f(record).map_err(Into::into)),
        }
    }

    pub fn evaluate(&self, record: &Record) -> Result<bool, FilterError> {
        (self.func)(record)
    }
}

impl fmt::Debug for AuxiliaryFilter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuxiliaryFilter(..)")
    }
}

/// Full query
#[derive(Debug)]
pub struct Query<'q> {
    /// Index being scanned
    pub index: IndexRef,
    /// Predicate over the index key
    pub predicate: Predicate,
    /// Optional auxiliary filter
    pub filter: Option<AuxiliaryFilter<'q>>,
    /// Result order
    pub direction: Direction,
    /// Maximum number of records returned
    pub limit: Option<usize>,
}

impl<'q> Query<'q> {
    /// Creates an ascending, unlimited query
    pub fn new(index: IndexRef, predicate: Predicate) -> Self {
        Self {
            index,
            predicate,
            filter: None,
            direction: Direction::Ascending,
            limit: None,
        }
    }

    /// Adds an infallible auxiliary filter
    pub fn with_filter<F>(mut self, f: F) -> Self
    where
        F: Fn(&Record) -> bool + 'q,
    {
        self.filter = Some(AuxiliaryFilter::new(f));
        self
    }

    /// Adds a fallible auxiliary filter
    pub fn with_fallible_filter<F, E>(mut self, f: F) -> Self
    where
        F: Fn(&Record) -> Result<bool, E> + 'q,
        E: Into<FilterError>,
    {
        self.filter = Some(AuxiliaryFilter::fallible(f));
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Reverses the result order
    pub fn desc(self) -> Self {
        self.with_direction(Direction::Descending)
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}
