//! Resolution of a source range through a `LocationMapper`.

use crate::mapper::LocationMapper;
use crate::model::{Range, SourceLocation};

/// Map both endpoints of `range` and rebuild a range from them.
///
/// The two lookups are issued together. When only one endpoint maps, its
/// own location stands in for the whole span; when neither does, the
/// result is `None` and the caller drops the entry.
pub async fn resolve_range(
    mapper: &dyn LocationMapper,
    uri: &str,
    range: Range,
) -> Option<SourceLocation> {
    let (start, end) = futures::join!(mapper.map(uri, range.start), mapper.map(uri, range.end));

    match (start, end) {
        (Some(start), Some(end)) => Some(SourceLocation::new(
            start.uri,
            Range::new(start.range.start, end.range.end),
        )),
        (Some(start), None) => Some(start),
        (None, Some(end)) => Some(end),
        (None, None) => None,
    }
}
