//! Serde model and parser for the Istanbul / NYC `coverage-final.json` format.
//!
//! Reference: https://github.com/istanbuljs/istanbuljs
//!
//! The format is a JSON object keyed by file path. Each value contains:
//!   - `statementMap`: `{ "0": { "start": { "line": 1, "column": 0 }, "end": { "line": 1, "column": 30 } }, ... }`
//!   - `s`:            `{ "0": 5, "1": 0, ... }` — hit counts per statement
//!   - `branchMap`:    `{ "0": { "loc": ..., "type": "if", "locations": [...] }, ... }`
//!   - `b`:            `{ "0": [5, 0], ... }` — hit counts per branch arm
//!   - `fnMap`:        `{ "0": { "name": "foo", "decl": ..., "loc": ... }, ... }`
//!   - `f`:            `{ "0": 3, ... }` — hit counts per function
//!
//! Lines are 1-based and columns 0-based. An implicit branch arm (an `if`
//! without `else`) has a location without a `start.line`.

use indexmap::IndexMap;
use serde::Deserialize;

use crate::model::{Position, Range};

/// A position exactly as stored in the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RawPosition {
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub column: Option<u32>,
}

impl RawPosition {
    pub fn new(line: u32, column: u32) -> Self {
        Self {
            line: Some(line),
            column: Some(column),
        }
    }

    /// Convert to a 0-based `Position`. A missing column counts as 0.
    pub fn to_position(&self) -> Option<Position> {
        let line = self.line?;
        Some(Position::new(
            line.saturating_sub(1),
            self.column.unwrap_or(0),
        ))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RawRange {
    #[serde(default)]
    pub start: RawPosition,
    #[serde(default)]
    pub end: RawPosition,
}

impl RawRange {
    pub fn new(start: RawPosition, end: RawPosition) -> Self {
        Self { start, end }
    }

    /// True for branch arms Istanbul gives no coordinates for.
    pub fn is_implicit(&self) -> bool {
        self.start.line.is_none()
    }

    /// Convert to a 0-based `Range`. An end without a line collapses onto
    /// the start.
    pub fn to_range(&self) -> Option<Range> {
        let start = self.start.to_position()?;
        let end = self.end.to_position().unwrap_or(start);
        Some(Range::new(start, end))
    }
}

/// One decision construct and its measured outcomes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BranchGroup {
    #[serde(default)]
    pub loc: RawRange,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub locations: Vec<RawRange>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FunctionEntry {
    #[serde(default = "anonymous")]
    pub name: String,
    #[serde(default)]
    pub decl: Option<RawRange>,
    #[serde(default)]
    pub loc: RawRange,
}

fn anonymous() -> String {
    "(anonymous)".to_string()
}

/// Coverage data for one file entry, as stored in the report.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawFileCoverage {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(rename = "statementMap", default)]
    pub statement_map: IndexMap<String, RawRange>,
    #[serde(default)]
    pub s: IndexMap<String, u64>,
    #[serde(rename = "branchMap", default)]
    pub branch_map: IndexMap<String, BranchGroup>,
    #[serde(default)]
    pub b: IndexMap<String, Vec<u64>>,
    #[serde(rename = "fnMap", default)]
    pub fn_map: IndexMap<String, FunctionEntry>,
    #[serde(default)]
    pub f: IndexMap<String, u64>,
}

/// A file entry together with the key it was stored under.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub key: String,
    pub coverage: RawFileCoverage,
}

impl ReportEntry {
    /// The entry's own `path`, falling back to its key.
    pub fn path(&self) -> &str {
        self.coverage.path.as_deref().unwrap_or(&self.key)
    }
}

/// Parse Istanbul JSON from raw bytes.
pub fn parse(input: &[u8]) -> serde_json::Result<Vec<ReportEntry>> {
    let mut entries = Vec::new();
    parse_streaming(input, &mut |entry| entries.push(entry))?;
    Ok(entries)
}

/// Streaming parser — deserializes the top-level JSON object entry by
/// entry using a serde `MapAccess` visitor so only one file entry is
/// materialized at a time. JSON errors are returned as-is.
pub fn parse_streaming(
    input: &[u8],
    emit: &mut dyn FnMut(ReportEntry),
) -> serde_json::Result<()> {
    if input.iter().all(|b| b.is_ascii_whitespace()) {
        return Ok(());
    }

    let mut deser = serde_json::Deserializer::from_slice(input);
    serde::Deserializer::deserialize_map(&mut deser, IstanbulVisitor { emit })?;
    deser.end()
}

/// Serde visitor that iterates over the top-level `{ path: entry }` map.
struct IstanbulVisitor<'a> {
    emit: &'a mut dyn FnMut(ReportEntry),
}

impl<'de, 'a> serde::de::Visitor<'de> for IstanbulVisitor<'a> {
    type Value = ();

    fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("an Istanbul JSON object")
    }

    fn visit_map<A>(self, mut map: A) -> std::result::Result<(), A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        while let Some(key) = map.next_key::<String>()? {
            let coverage: RawFileCoverage = map.next_value()?;
            (self.emit)(ReportEntry { key, coverage });
        }
        Ok(())
    }
}
