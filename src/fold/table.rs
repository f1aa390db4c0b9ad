//! Simple case-folding table
//!
//! Maps a code point to its canonical folded form using single code point
//! case mappings only, and keeps the inverse (canonical form to members)
//! for every equivalence class with more than one member.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Every cased code point lives below this bound.
const CASED_LIMIT: u32 = 0x2_0000;

static SIMPLE: OnceLock<FoldTable> = OnceLock::new();

/// Returns the single code point an iterator yields, or `None` if it yields
/// zero or several.
fn single(mut chars: impl Iterator<Item = char>) -> Option<char> {
    let first = chars.next()?;
    match chars.next() {
        None => Some(first),
        Some(_) => None,
    }
}

/// Canonical simple fold of `c`.
///
/// `lower(upper(c))` when both mappings are single code points, otherwise the
/// single code point lowercase mapping, otherwise `c`. The Turkic dotted and
/// dotless I fold to themselves.
pub(crate) fn simple_fold(c: char) -> char {
    if c.is_ascii() {
        return c.to_ascii_lowercase();
    }
    if c == '\u{130}' || c == '\u{131}' {
        return c;
    }
    if let Some(folded) = single(c.to_uppercase()).and_then(|u| single(u.to_lowercase())) {
        return folded;
    }
    single(c.to_lowercase()).unwrap_or(c)
}

/// Inverse folding table for classes with more than one member
pub(crate) struct FoldTable {
    classes: HashMap<char, Vec<char>>,
}

impl FoldTable {
    /// Shared table for simple folding, built on first use
    pub(crate) fn simple() -> &'static FoldTable {
        SIMPLE.get_or_init(FoldTable::build)
    }

    fn build() -> Self {
        let mut classes: HashMap<char, Vec<char>> = HashMap::new();
        for c in (0..CASED_LIMIT).filter_map(char::from_u32) {
            let folded = simple_fold(c);
            if folded != c {
                classes.entry(folded).or_default().push(c);
            }
        }
        for (canonical, members) in classes.iter_mut() {
            if simple_fold(*canonical) == *canonical {
                members.push(*canonical);
            }
            members.sort_unstable();
            members.dedup();
        }
        Self { classes }
    }

    /// Members of the class `c` belongs to, sorted ascending
    pub(crate) fn class_of(&self, c: char) -> Vec<char> {
        match self.classes.get(&simple_fold(c)) {
            Some(members) => members.clone(),
            None => vec![c],
        }
    }

    /// Number of multi-member classes
    pub(crate) fn class_count(&self) -> usize {
        self.classes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_fold_latin() {
        assert_eq!(simple_fold('A'), 'a');
        assert_eq!(simple_fold('a'), 'a');
        assert_eq!(simple_fold('Ö'), 'ö');
        assert_eq!(simple_fold('-'), '-');
    }

    #[test]
    fn test_simple_fold_special_cases() {
        assert_eq!(simple_fold('\u{212A}'), 'k'); // KELVIN SIGN
        assert_eq!(simple_fold('\u{17F}'), 's'); // LONG S
        assert_eq!(simple_fold('ς'), 'σ');
        assert_eq!(simple_fold('\u{1E9E}'), 'ß'); // CAPITAL SHARP S
        assert_eq!(simple_fold('ß'), 'ß');
        assert_eq!(simple_fold('ǅ'), 'ǆ');
    }

    #[test]
    fn test_turkic_i_folds_to_itself() {
        assert_eq!(simple_fold('\u{130}'), '\u{130}');
        assert_eq!(simple_fold('\u{131}'), '\u{131}');
        assert_eq!(simple_fold('I'), 'i');
    }

    #[test]
    fn test_classes() {
        let table = FoldTable::simple();
        assert_eq!(table.class_of('a'), vec!['A', 'a']);
        assert_eq!(table.class_of('K'), vec!['K', 'k', '\u{212A}']);
        assert_eq!(table.class_of('σ'), vec!['Σ', 'ς', 'σ']);
        assert_eq!(table.class_of('ǅ'), vec!['Ǆ', 'ǅ', 'ǆ']);
        assert_eq!(table.class_of('/'), vec!['/']);
        assert_eq!(table.class_of('\u{131}'), vec!['\u{131}']);
        assert!(table.class_count() > 1000);
    }
}
