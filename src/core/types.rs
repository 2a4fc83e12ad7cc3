// src/core/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a canonical name inside one category's name table.
pub type NameId = usize;

/// Index of a normalized variant entry inside one category's lexicon.
pub type VariantId = usize;

/// The three administrative levels an address resolves into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Ward,
    District,
    Province,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Ward, Category::District, Category::Province];

    /// Bit used by the selector to record which levels are already assigned.
    pub fn bit(self) -> u8 {
        match self {
            Category::Ward => 0b001,
            Category::District => 0b010,
            Category::Province => 0b100,
        }
    }

    pub fn slot(self) -> usize {
        match self {
            Category::Ward => 0,
            Category::District => 1,
            Category::Province => 2,
        }
    }

    /// Short and long administrative prefixes put in front of numeric names,
    /// e.g. "p3" / "phường 3" for ward "3". Accented; fold before use.
    pub fn numeric_prefixes(self) -> &'static [&'static str] {
        match self {
            Category::Ward => &["p", "phường"],
            Category::District => &["q", "quận"],
            Category::Province => &[],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Ward => "ward",
            Category::District => "district",
            Category::Province => "province",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Half-open character interval `[start, end)` in the normalized input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start < end, "empty or inverted span {start}..{end}");
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Conservative overlap test: spans that merely touch also conflict.
    pub fn conflicts_with(&self, other: &Span) -> bool {
        let (first, second) = if self.start <= other.start { (self, other) } else { (other, self) };
        first.end >= second.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NgramKind {
    Word,
    Char,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchKind {
    Exact,
    Fuzzy,
}

/// A typed, positioned match of input text against one category's lexicon.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub category: Category,
    pub span: Span,
    pub name_id: NameId,
    pub canonical: String,
    pub matched_text: String,
    pub ngram: NgramKind,
    pub match_kind: MatchKind,
    /// 1.0 for exact matches, the cosine score for fuzzy ones.
    pub similarity: f64,
}

impl Candidate {
    pub fn is_exact(&self) -> bool {
        self.match_kind == MatchKind::Exact
    }
}

/// Resolved hierarchy; `None` means the level could not be determined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolutionResult {
    pub province: Option<String>,
    pub district: Option<String>,
    pub ward: Option<String>,
}

impl ResolutionResult {
    pub fn get(&self, category: Category) -> Option<&str> {
        match category {
            Category::Ward => self.ward.as_deref(),
            Category::District => self.district.as_deref(),
            Category::Province => self.province.as_deref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.province.is_none() && self.district.is_none() && self.ward.is_none()
    }

    pub fn to_record(&self) -> AddressRecord {
        AddressRecord::from(self)
    }
}

/// The externally visible record: empty string means "undetermined".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub province: String,
    pub district: String,
    pub ward: String,
}

impl From<&ResolutionResult> for AddressRecord {
    fn from(result: &ResolutionResult) -> Self {
        Self {
            province: result.province.clone().unwrap_or_default(),
            district: result.district.clone().unwrap_or_default(),
            ward: result.ward.clone().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_spans_conflict() {
        let a = Span::new(0, 4);
        assert!(a.conflicts_with(&Span::new(4, 8)));
        assert!(Span::new(4, 8).conflicts_with(&a));
        assert!(!a.conflicts_with(&Span::new(5, 8)));
    }

    #[test]
    fn nested_spans_conflict() {
        assert!(Span::new(0, 10).conflicts_with(&Span::new(2, 3)));
    }

    #[test]
    fn record_uses_empty_strings_for_missing_levels() {
        let result = ResolutionResult {
            province: Some("Nghệ An".to_string()),
            district: None,
            ward: None,
        };
        let record = result.to_record();
        assert_eq!(record.province, "Nghệ An");
        assert_eq!(record.district, "");
        assert_eq!(record.ward, "");
    }

    #[test]
    fn category_bits_are_distinct() {
        let mask = Category::ALL.iter().fold(0u8, |m, c| m | c.bit());
        assert_eq!(mask, 0b111);
    }
}
