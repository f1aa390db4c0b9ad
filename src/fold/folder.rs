//! CaseFolder
//!
//! The single folding definition shared by the range compiler and the post
//! filter. Both must receive the same instance: the compiler bounds a scan by
//! the first char's variants, and the filter must never reject a candidate
//! because it folded that char differently.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::table::{simple_fold, FoldTable};

/// Folding standard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoldingMode {
    /// Unicode simple case folding (single code point mappings)
    #[default]
    Simple,
    /// ASCII letters only
    Ascii,
}

impl FoldingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FoldingMode::Simple => "simple",
            FoldingMode::Ascii => "ascii",
        }
    }
}

/// Maps code points to their case-equivalent variants
#[derive(Clone, Copy)]
pub struct CaseFolder {
    mode: FoldingMode,
    table: Option<&'static FoldTable>,
}

impl CaseFolder {
    /// Creates a folder for the given mode
    pub fn new(mode: FoldingMode) -> Self {
        let table = match mode {
            FoldingMode::Simple => Some(FoldTable::simple()),
            FoldingMode::Ascii => None,
        };
        Self { mode, table }
    }

    /// Unicode simple case folding
    pub fn simple() -> Self {
        Self::new(FoldingMode::Simple)
    }

    /// ASCII-only case folding
    pub fn ascii() -> Self {
        Self::new(FoldingMode::Ascii)
    }

    /// Returns the folding mode
    pub fn mode(&self) -> FoldingMode {
        self.mode
    }

    /// Canonical folded form of `c`
    pub fn fold_char(&self, c: char) -> char {
        match self.mode {
            FoldingMode::Simple => simple_fold(c),
            FoldingMode::Ascii => c.to_ascii_lowercase(),
        }
    }

    /// Every code point folding to the same form as `c`, including `c`,
    /// sorted ascending.
    pub fn variants(&self, c: char) -> Vec<char> {
        match self.table {
            Some(table) => table.class_of(c),
            None if c.is_ascii_alphabetic() => {
                vec![c.to_ascii_uppercase(), c.to_ascii_lowercase()]
            }
            None => vec![c],
        }
    }

    /// Folds every char of `s`
    pub fn fold_str(&self, s: &str) -> String {
        s.chars().map(|c| self.fold_char(c)).collect()
    }

    /// Case-insensitive full-string equality
    pub fn eq_ignore_case(&self, a: &str, b: &str) -> bool {
        let mut left = a.chars();
        let mut right = b.chars();
        loop {
            match (left.next(), right.next()) {
                (None, None) => return true,
                (Some(x), Some(y)) if x == y || self.fold_char(x) == self.fold_char(y) => {}
                _ => return false,
            }
        }
    }

    /// Case-insensitive prefix test
    pub fn starts_with_ignore_case(&self, s: &str, prefix: &str) -> bool {
        let mut chars = s.chars();
        prefix.chars().all(|p| match chars.next() {
            Some(c) => c == p || self.fold_char(c) == self.fold_char(p),
            None => false,
        })
    }
}

impl Default for CaseFolder {
    fn default() -> Self {
        Self::simple()
    }
}

impl fmt::Debug for CaseFolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaseFolder").field("mode", &self.mode).finish()
    }
}
