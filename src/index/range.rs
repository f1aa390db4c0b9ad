//! Key ranges and range sets
//!
//! A `KeyRange` is a non-empty interval over the natural key order.
//! A `RangeSet` is sorted by lower bound and pairwise non-overlapping; every
//! constructor runs the coalescing pass.

use std::cmp::Ordering;
use std::fmt;
use std::ops::Bound;

use super::key::Key;

/// Contiguous, non-empty interval of keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRange {
    lower: Bound<Key>,
    upper: Bound<Key>,
}

impl KeyRange {
    /// Create a range, returning `None` if it denotes no keys.
    pub fn new(lower: Bound<Key>, upper: Bound<Key>) -> Option<Self> {
        let empty = match (&lower, &upper) {
            (Bound::Included(l), Bound::Included(u)) => l > u,
            (Bound::Included(l), Bound::Excluded(u))
            | (Bound::Excluded(l), Bound::Included(u))
            | (Bound::Excluded(l), Bound::Excluded(u)) => l >= u,
            _ => false,
        };
        if empty {
            None
        } else {
            Some(Self { lower, upper })
        }
    }

    /// Exactly one key: `[key, key]`
    pub fn point(key: Key) -> Self {
        Self {
            lower: Bound::Included(key.clone()),
            upper: Bound::Included(key),
        }
    }

    /// Every key in the store
    pub fn full() -> Self {
        Self {
            lower: Bound::Unbounded,
            upper: Bound::Unbounded,
        }
    }

    /// Every text key
    pub fn all_text() -> Self {
        Self {
            lower: Key::text_start(),
            upper: Key::text_end(),
        }
    }

    /// Lower bound
    pub fn lower(&self) -> &Bound<Key> {
        &self.lower
    }

    /// Upper bound
    pub fn upper(&self) -> &Bound<Key> {
        &self.upper
    }

    /// Both bounds as a tuple, suitable for `BTreeMap::range`
    pub fn bounds(&self) -> (Bound<&Key>, Bound<&Key>) {
        (self.lower.as_ref(), self.upper.as_ref())
    }

    /// Returns true if this range is a single inclusive point
    pub fn is_point(&self) -> bool {
        matches!((&self.lower, &self.upper), (Bound::Included(l), Bound::Included(u)) if l == u)
    }

    /// Checks whether `key` satisfies both bounds
    pub fn contains(&self, key: &Key) -> bool {
        let above = match &self.lower {
            Bound::Included(l) => key >= l,
            Bound::Excluded(l) => key > l,
            Bound::Unbounded => true,
        };
        let below = match &self.upper {
            Bound::Included(u) => key <= u,
            Bound::Excluded(u) => key < u,
            Bound::Unbounded => true,
        };
        above && below
    }
}

impl fmt::Display for KeyRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.lower {
            Bound::Included(k) => write!(f, "[{}", k)?,
            Bound::Excluded(k) => write!(f, "({}", k)?,
            Bound::Unbounded => write!(f, "(-inf")?,
        }
        write!(f, ", ")?;
        match &self.upper {
            Bound::Included(k) => write!(f, "{}]", k),
            Bound::Excluded(k) => write!(f, "{})", k),
            Bound::Unbounded => write!(f, "+inf)"),
        }
    }
}

/// Scan direction over the natural key order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum Direction {
    /// Smallest key first
    #[default]
    Ascending,
    /// Largest key first
    Descending,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        }
    }

    pub fn is_descending(&self) -> bool {
        matches!(self, Direction::Descending)
    }

    /// Returns the opposite direction
    pub fn reverse(self) -> Self {
        match self {
            Direction::Ascending => Direction::Descending,
            Direction::Descending => Direction::Ascending,
        }
    }
}

/// Orders lower bounds: the bound admitting smaller keys sorts first.
fn cmp_lower(a: &Bound<Key>, b: &Bound<Key>) -> Ordering {
    match (a, b) {
        (Bound::Unbounded, Bound::Unbounded) => Ordering::Equal,
        (Bound::Unbounded, _) => Ordering::Less,
        (_, Bound::Unbounded) => Ordering::Greater,
        (Bound::Included(x), Bound::Included(y)) | (Bound::Excluded(x), Bound::Excluded(y)) => {
            x.cmp(y)
        }
        (Bound::Included(x), Bound::Excluded(y)) => x.cmp(y).then(Ordering::Less),
        (Bound::Excluded(x), Bound::Included(y)) => x.cmp(y).then(Ordering::Greater),
    }
}

/// Orders upper bounds: the bound admitting larger keys sorts last.
fn cmp_upper(a: &Bound<Key>, b: &Bound<Key>) -> Ordering {
    match (a, b) {
        (Bound::Unbounded, Bound::Unbounded) => Ordering::Equal,
        (Bound::Unbounded, _) => Ordering::Greater,
        (_, Bound::Unbounded) => Ordering::Less,
        (Bound::Included(x), Bound::Included(y)) | (Bound::Excluded(x), Bound::Excluded(y)) => {
            x.cmp(y)
        }
        (Bound::Included(x), Bound::Excluded(y)) => x.cmp(y).then(Ordering::Greater),
        (Bound::Excluded(x), Bound::Included(y)) => x.cmp(y).then(Ordering::Less),
    }
}

/// Whether a range ending at `upper` and one starting at `lower` overlap or
/// touch, so their union is a single contiguous range.
fn touches(upper: &Bound<Key>, lower: &Bound<Key>) -> bool {
    match (upper, lower) {
        (Bound::Unbounded, _) | (_, Bound::Unbounded) => true,
        (Bound::Excluded(u), Bound::Excluded(l)) => u > l,
        (Bound::Included(u), Bound::Included(l))
        | (Bound::Included(u), Bound::Excluded(l))
        | (Bound::Excluded(u), Bound::Included(l)) => u >= l,
    }
}

/// Sorted, non-overlapping sequence of key ranges
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RangeSet {
    ranges: Vec<KeyRange>,
}

impl RangeSet {
    /// Creates an empty range set
    pub fn empty() -> Self {
        Self { ranges: Vec::new() }
    }

    /// Builds a range set from arbitrary ranges, coalescing overlaps and
    /// adjacencies.
    pub fn from_ranges(ranges: impl IntoIterator<Item = KeyRange>) -> Self {
        let mut ranges: Vec<KeyRange> = ranges.into_iter().collect();
        ranges.sort_by(|a, b| cmp_lower(&a.lower, &b.lower).then_with(|| cmp_upper(&a.upper, &b.upper)));

        let mut merged: Vec<KeyRange> = Vec::with_capacity(ranges.len());
        for range in ranges {
            match merged.last_mut() {
                Some(last) if touches(&last.upper, &range.lower) => {
                    if cmp_upper(&range.upper, &last.upper) == Ordering::Greater {
                        last.upper = range.upper;
                    }
                }
                _ => merged.push(range),
            }
        }

        Self { ranges: merged }
    }

    /// Number of ranges
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Returns true if the set holds no ranges
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Ranges in ascending order
    pub fn ranges(&self) -> &[KeyRange] {
        &self.ranges
    }

    /// Iterates ranges in ascending order
    pub fn iter(&self) -> std::slice::Iter<'_, KeyRange> {
        self.ranges.iter()
    }

    /// Checks whether any range contains `key`
    pub fn contains(&self, key: &Key) -> bool {
        self.ranges.iter().any(|r| r.contains(key))
    }

    /// Consumes the set, returning the ranges in ascending order
    pub fn into_ranges(self) -> Vec<KeyRange> {
        self.ranges
    }
}

impl IntoIterator for RangeSet {
    type Item = KeyRange;
    type IntoIter = std::vec::IntoIter<KeyRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.into_iter()
    }
}

impl<'a> IntoIterator for &'a RangeSet {
    type Item = &'a KeyRange;
    type IntoIter = std::slice::Iter<'a, KeyRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}

impl fmt::Display for RangeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, range) in self.ranges.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", range)?;
        }
        write!(f, "}}")
    }
}
