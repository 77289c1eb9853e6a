//! Detail extraction: turns one file's statement, branch and function maps
//! into resolved `DetailRecord`s.
//!
//! Every lookup for the file is polled concurrently from the calling task.
//! Entries whose locations cannot be resolved are dropped; they still count
//! towards the file's summaries, which never depend on mapping.

use futures::future::join_all;

use crate::istanbul::{BranchGroup, FunctionEntry, RawFileCoverage, RawRange};
use crate::mapper::LocationMapper;
use crate::model::{
    BranchDetail, BranchLabel, CountMode, DetailRecord, FunctionDetail, Range, StatementDetail,
};
use crate::resolve::resolve_range;

/// Resolve every statement, branch group and function of `raw`.
///
/// `uri` is the compiled file the raw coordinates belong to. Records are
/// ordered statements, then branch groups, then functions, each in report
/// order.
pub async fn extract_details(
    raw: &RawFileCoverage,
    uri: &str,
    mapper: &dyn LocationMapper,
    mode: CountMode,
) -> Vec<DetailRecord> {
    let statements = join_all(raw.statement_map.iter().map(|(key, loc)| {
        let count = raw.s.get(key).copied().unwrap_or(0);
        statement_detail(mapper, uri, loc, count, mode)
    }));

    let branches = join_all(raw.branch_map.iter().map(|(key, group)| {
        let counts = raw.b.get(key).map(Vec::as_slice).unwrap_or(&[]);
        branch_detail(mapper, uri, group, counts, mode)
    }));

    let functions = join_all(raw.fn_map.iter().map(|(key, entry)| {
        let count = raw.f.get(key).copied().unwrap_or(0);
        function_detail(mapper, uri, entry, count, mode)
    }));

    let (statements, branches, functions) = futures::join!(statements, branches, functions);

    let mut details = Vec::new();
    details.extend(statements.into_iter().flatten().map(DetailRecord::Statement));
    details.extend(branches.into_iter().flatten().map(DetailRecord::Statement));
    details.extend(functions.into_iter().flatten().map(DetailRecord::Function));

    details
}

async fn statement_detail(
    mapper: &dyn LocationMapper,
    uri: &str,
    loc: &RawRange,
    count: u64,
    mode: CountMode,
) -> Option<StatementDetail> {
    let location = resolve_range(mapper, uri, loc.to_range()?).await?;
    Some(StatementDetail {
        location,
        hits: mode.hits(count),
        branches: Vec::new(),
    })
}

/// A branch group becomes one statement carrying a branch per outcome.
/// The group is dropped whole if its own range or any outcome fails to
/// resolve.
async fn branch_detail(
    mapper: &dyn LocationMapper,
    uri: &str,
    group: &BranchGroup,
    counts: &[u64],
    mode: CountMode,
) -> Option<StatementDetail> {
    let group_range = group.loc.to_range()?;

    // Implicit outcomes (an `if` with no `else`) sit as a zero-length
    // range at the end of the group.
    let implicit = Range::point(group_range.end);
    let outcome_ranges = group
        .locations
        .iter()
        .map(|loc| {
            if loc.is_implicit() {
                Some(implicit)
            } else {
                loc.to_range()
            }
        })
        .collect::<Option<Vec<Range>>>()?;

    let (location, outcomes) = futures::join!(
        resolve_range(mapper, uri, group_range),
        join_all(
            outcome_ranges
                .iter()
                .map(|&range| resolve_range(mapper, uri, range))
        ),
    );
    let location = location?;

    let labelled = group.kind == "if";
    let mut hits = 0u64;
    let mut branches = Vec::with_capacity(outcomes.len());
    for (index, outcome) in outcomes.into_iter().enumerate() {
        let count = counts.get(index).copied().unwrap_or(0);
        hits = hits.saturating_add(count);
        let label = match index {
            0 if labelled => Some(BranchLabel::If),
            1 if labelled => Some(BranchLabel::Else),
            _ => None,
        };
        branches.push(BranchDetail {
            location: outcome?,
            hits: mode.hits(count),
            label,
        });
    }

    Some(StatementDetail {
        location,
        hits: mode.hits(hits),
        branches,
    })
}

async fn function_detail(
    mapper: &dyn LocationMapper,
    uri: &str,
    entry: &FunctionEntry,
    count: u64,
    mode: CountMode,
) -> Option<FunctionDetail> {
    let location = resolve_range(mapper, uri, entry.loc.to_range()?).await?;
    Some(FunctionDetail {
        name: entry.name.clone(),
        location,
        hits: mode.hits(count),
    })
}
