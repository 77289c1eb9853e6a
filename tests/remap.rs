mod common;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use covremap::cli::LocalRun;
use covremap::coverage::CoverageContext;
use covremap::mapper::{FileUriFn, LocationFn, LocationMapper};
use covremap::model::{Position, Range, SourceLocation, SummaryCount};
use covremap::options::OptionsOverride;

/// A stand-in for a source map: compiled line → original line in
/// `/project/src/lib.ts`. Lines missing from the table do not map.
fn line_table(table: &[(u32, u32)]) -> Arc<dyn LocationMapper> {
    let table: Arc<HashMap<u32, u32>> = Arc::new(table.iter().copied().collect());
    Arc::new(LocationFn::new(move |_uri: &str, pos: Position| {
        let table = table.clone();
        async move {
            tokio::task::yield_now().await;
            let line = *table.get(&pos.line)?;
            let pos = Position::new(line, pos.column);
            Some(SourceLocation::new("/project/src/lib.ts", Range::point(pos)))
        }
    }))
}

fn ts_uris() -> OptionsOverride {
    OptionsOverride::new()
        .remove_data_at_end_of_run(false)
        .map_file_uri(Arc::new(FileUriFn::new(|uri: &str| {
            let uri = uri.replace("/dist/", "/src/").replace(".js", ".ts");
            async move { Some(uri) }
        })))
}

#[tokio::test]
async fn remapped_details_and_uris() {
    let (_parent, dir) = common::report_dir(common::SAMPLE);
    let mut run = LocalRun::new();
    let context = CoverageContext::default();

    // Every compiled line of lib.js maps 10 lines down.
    let table: Vec<(u32, u32)> = (0..10).map(|l| (l, l + 10)).collect();
    let overrides = ts_uris().map_location(line_table(&table));
    context.apply(&mut run, &dir, &overrides).await.unwrap();

    let lib = run.find("/project/src/lib.ts").unwrap();
    assert_eq!(lib.compiled_uri(), "/project/dist/lib.js");

    let details = context.request_detail(lib).await;
    assert_eq!(details.len(), 9);
    assert!(details.iter().all(|d| d.location().uri == "/project/src/lib.ts"));
    assert_eq!(
        details[0].location().range,
        Range::new(Position::new(10, 0), Position::new(16, 1))
    );
}

#[tokio::test]
async fn unmapped_entries_drop_from_details_only() {
    let (_parent, dir) = common::report_dir(common::SAMPLE);
    let mut run = LocalRun::new();
    let context = CoverageContext::default();

    // Only compiled lines 0..=3 map. Statements 3 (line 4) and 4 (line 8),
    // the binary-expr group (line 4) and function `unused` (line 7) are
    // lost.
    let table: Vec<(u32, u32)> = (0..4).map(|l| (l, l)).collect();
    let overrides = ts_uris().map_location(line_table(&table));
    context.apply(&mut run, &dir, &overrides).await.unwrap();

    let lib = run.find("/project/src/lib.ts").unwrap();
    let details = context.request_detail(lib).await;
    assert_eq!(details.len(), 5);

    // Statement 0 spans lines 0..6 and keeps only its start.
    assert_eq!(
        details[0].location().range,
        Range::point(Position::new(0, 0))
    );

    // Summaries never depend on mapping.
    assert_eq!(lib.statement_coverage(), SummaryCount::new(4, 5));
    assert_eq!(lib.branch_coverage(), SummaryCount::new(3, 4));
    assert_eq!(lib.function_coverage(), SummaryCount::new(1, 2));
}

#[tokio::test]
async fn all_lookups_for_a_file_are_in_flight_together() {
    let (_parent, dir) = common::report_dir(common::SAMPLE);
    let mut run = LocalRun::new();
    let context = CoverageContext::default();

    // util.js has two statements: four endpoint lookups. Each lookup only
    // completes once all four have been issued.
    let issued = Arc::new(AtomicUsize::new(0));
    let mapper = {
        let issued = issued.clone();
        LocationFn::new(move |uri: &str, pos: Position| {
            issued.fetch_add(1, Ordering::SeqCst);
            let issued = issued.clone();
            let uri = uri.to_string();
            async move {
                while issued.load(Ordering::SeqCst) < 4 {
                    tokio::task::yield_now().await;
                }
                Some(SourceLocation::new(uri, Range::point(pos)))
            }
        })
    };
    let overrides = OptionsOverride::new()
        .remove_data_at_end_of_run(false)
        .map_location(Arc::new(mapper));
    context.apply(&mut run, &dir, &overrides).await.unwrap();

    let util = run.find("/project/dist/util.js").unwrap();
    let details = tokio::time::timeout(Duration::from_secs(5), context.request_detail(util))
        .await
        .expect("lookups were not issued concurrently");
    assert_eq!(details.len(), 2);
    assert_eq!(issued.load(Ordering::SeqCst), 4);
}
