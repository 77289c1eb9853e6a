//! Normalized coverage model, independent of the Istanbul report layout.
//!
//! All coordinates exposed from this crate are 0-based in both line and
//! column. The report's 1-based lines are adjusted once, when a raw
//! position is converted (see `istanbul::RawPosition::to_position`).

use serde::Serialize;

/// Compute a coverage rate, returning 0.0 when the total is zero.
#[must_use]
pub fn rate(covered: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        covered as f64 / total as f64
    }
}

/// A point in a file, 0-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// A span between two positions, with the report's own end semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// A zero-length range at `pos`.
    pub fn point(pos: Position) -> Self {
        Self { start: pos, end: pos }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A resolved range inside a specific file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    pub uri: String,
    pub range: Range,
}

impl SourceLocation {
    pub fn new(uri: impl Into<String>, range: Range) -> Self {
        Self {
            uri: uri.into(),
            range,
        }
    }
}

/// Covered/total pair for one coverage category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SummaryCount {
    pub covered: u64,
    pub total: u64,
}

impl SummaryCount {
    pub fn new(covered: u64, total: u64) -> Self {
        Self { covered, total }
    }

    #[must_use]
    pub fn rate(&self) -> f64 {
        rate(self.covered, self.total)
    }
}

/// How hit counts are reported on detail records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CountMode {
    /// Pass execution counts through unchanged.
    #[default]
    Raw,
    /// Collapse every count to covered / not covered.
    Boolean,
}

impl CountMode {
    pub fn from_boolean_counts(boolean_counts: bool) -> Self {
        if boolean_counts {
            CountMode::Boolean
        } else {
            CountMode::Raw
        }
    }

    pub fn hits(self, count: u64) -> Hits {
        match self {
            CountMode::Raw => Hits::Count(count),
            CountMode::Boolean => Hits::Covered(count > 0),
        }
    }
}

/// Hit status of one detail record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Hits {
    Count(u64),
    Covered(bool),
}

impl Hits {
    pub fn is_covered(&self) -> bool {
        match *self {
            Hits::Count(n) => n > 0,
            Hits::Covered(b) => b,
        }
    }
}

impl std::fmt::Display for Hits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Hits::Count(n) => write!(f, "{n}"),
            Hits::Covered(b) => write!(f, "{b}"),
        }
    }
}

/// Label of an outcome belonging to an `if` branch group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchLabel {
    If,
    Else,
}

impl BranchLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            BranchLabel::If => "if",
            BranchLabel::Else => "else",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchDetail {
    pub location: SourceLocation,
    pub hits: Hits,
    pub label: Option<BranchLabel>,
}

/// A statement, or the statement standing for a branch group when
/// `branches` is non-empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementDetail {
    pub location: SourceLocation,
    pub hits: Hits,
    pub branches: Vec<BranchDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FunctionDetail {
    pub name: String,
    pub location: SourceLocation,
    pub hits: Hits,
}

/// One fine-grained coverage entry with a resolved location.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DetailRecord {
    Statement(StatementDetail),
    Function(FunctionDetail),
}

impl DetailRecord {
    pub fn location(&self) -> &SourceLocation {
        match self {
            DetailRecord::Statement(s) => &s.location,
            DetailRecord::Function(f) => &f.location,
        }
    }

    pub fn hits(&self) -> Hits {
        match self {
            DetailRecord::Statement(s) => s.hits,
            DetailRecord::Function(f) => f.hits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_zero_total() {
        assert_eq!(rate(0, 0), 0.0);
        assert_eq!(SummaryCount::new(1, 4).rate(), 0.25);
    }

    #[test]
    fn test_count_mode_hits() {
        assert_eq!(CountMode::Raw.hits(5), Hits::Count(5));
        assert_eq!(CountMode::Boolean.hits(5), Hits::Covered(true));
        assert_eq!(CountMode::Boolean.hits(0), Hits::Covered(false));
        assert!(!CountMode::Raw.hits(0).is_covered());
    }

    #[test]
    fn test_hits_serialize_untagged() {
        assert_eq!(serde_json::to_string(&Hits::Count(3)).unwrap(), "3");
        assert_eq!(serde_json::to_string(&Hits::Covered(true)).unwrap(), "true");
    }
}
