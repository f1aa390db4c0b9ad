//! Index key values
//!
//! Keys are ordered by their natural order: variant first, then value.
//! Text keys compare by raw code point, never by locale collation.

use std::fmt;
use std::ops::Bound;

/// Index key representing a serialized field value.
///
/// Ordering is deterministic: Bool < Int < Float < Text < Array.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    /// Boolean value (false < true)
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Float value (stored as bits for total ordering)
    Float(u64),
    /// Text value, ordered by code point
    Text(String),
    /// Composite key, ordered element by element
    Array(Vec<Key>),
}

impl Key {
    /// Create a key from a float
    ///
    /// Uses bit representation for total ordering.
    pub fn from_float(v: f64) -> Self {
        let bits = v.to_bits();
        let ordered = if (bits >> 63) == 1 {
            !bits
        } else {
            bits ^ (1 << 63)
        };
        Key::Float(ordered)
    }

    /// Recover the float value of a `Float` key
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Key::Float(ordered) => {
                let bits = if (ordered >> 63) == 1 {
                    ordered ^ (1 << 63)
                } else {
                    !ordered
                };
                Some(f64::from_bits(bits))
            }
            _ => None,
        }
    }

    /// Create a text key
    pub fn text(v: impl Into<String>) -> Self {
        Key::Text(v.into())
    }

    /// Returns the text if this is a `Text` key
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Key::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Create a key from a JSON value
    ///
    /// Objects and null are not indexable. Arrays are indexable when every
    /// element is.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(Key::Bool(*b)),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Some(Key::Int(i))
                } else {
                    n.as_f64().map(Key::from_float)
                }
            }
            serde_json::Value::String(s) => Some(Key::Text(s.clone())),
            serde_json::Value::Array(items) => items
                .iter()
                .map(Key::from_json)
                .collect::<Option<Vec<_>>>()
                .map(Key::Array),
            _ => None,
        }
    }

    /// Lower bound of the text key space: every text key is `>=` this
    pub fn text_start() -> Bound<Key> {
        Bound::Included(Key::Text(String::new()))
    }

    /// Upper bound of the text key space: every text key is `<` this
    ///
    /// The empty array is the smallest key that sorts after all text.
    pub fn text_end() -> Bound<Key> {
        Bound::Excluded(Key::Array(Vec::new()))
    }
}

impl From<&str> for Key {
    fn from(v: &str) -> Self {
        Key::Text(v.to_string())
    }
}

impl From<String> for Key {
    fn from(v: String) -> Self {
        Key::Text(v)
    }
}

impl From<i64> for Key {
    fn from(v: i64) -> Self {
        Key::Int(v)
    }
}

impl From<bool> for Key {
    fn from(v: bool) -> Self {
        Key::Bool(v)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Bool(b) => write!(f, "{}", b),
            Key::Int(i) => write!(f, "{}", i),
            Key::Float(_) => write!(f, "{}", self.as_float().unwrap_or(f64::NAN)),
            Key::Text(s) => write!(f, "{:?}", s),
            Key::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Next code point after `c`, skipping the surrogate gap.
///
/// Returns `None` for `char::MAX`.
pub fn char_successor(c: char) -> Option<char> {
    match c {
        '\u{D7FF}' => Some('\u{E000}'),
        char::MAX => None,
        c => char::from_u32(c as u32 + 1),
    }
}

/// Exclusive upper bound for every text key whose first char is `c`.
pub fn first_char_end(c: char) -> Bound<Key> {
    match char_successor(c) {
        Some(next) => Bound::Excluded(Key::Text(next.to_string())),
        None => Key::text_end(),
    }
}

/// Exclusive upper bound for every text key starting with `prefix`.
///
/// The last char that has a successor is incremented and the tail dropped.
pub fn prefix_end(prefix: &str) -> Bound<Key> {
    let mut chars: Vec<char> = prefix.chars().collect();
    while let Some(last) = chars.pop() {
        if let Some(next) = char_successor(last) {
            chars.push(next);
            return Bound::Excluded(Key::Text(chars.into_iter().collect()));
        }
    }
    Key::text_end()
}
