use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info};

use super::FeedPipeline;
use crate::store::SnapshotKind;

/// Drive `pipeline` forever: one pass, then sleep `interval`, then again.
///
/// A failed pass is logged and the loop carries on; the next pass is the only
/// retry. Returns once `shutdown` flips to `true` (or its sender is dropped),
/// including in the middle of a pass or a sleep.
pub async fn run_pipeline(
    pipeline: FeedPipeline,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let kind = pipeline.kind();
    info!("{} pipeline started (interval={:?})", kind, interval);

    loop {
        if *shutdown.borrow() {
            break;
        }

        tokio::select! {
            res = pipeline.run_cycle() => {
                if let Err(e) = res {
                    error!("{} pass failed: {:#}", kind, e);
                }
            }
            _ = shutdown.changed() => break,
        }

        debug!("{} pipeline sleeping {:?}", kind, interval);
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.changed() => break,
        }
    }

    info!("{} pipeline stopped", kind);
}

/// Run a single pass of every pipeline. Schedule passes complete first so
/// enrichers reading the schedule snapshot see this run's match set; the
/// remaining passes run concurrently. Returns how many passes failed.
pub async fn run_once(pipelines: &[FeedPipeline]) -> usize {
    let (schedule, enrichers): (Vec<&FeedPipeline>, Vec<&FeedPipeline>) = pipelines
        .iter()
        .partition(|p| p.kind() == SnapshotKind::Schedule);

    let mut failed = 0;
    for p in schedule {
        if !report(p.kind(), &p.run_cycle().await) {
            failed += 1;
        }
    }

    let passes = enrichers
        .into_iter()
        .map(|p| async move { (p.kind(), p.run_cycle().await) });
    let results = futures_util::future::join_all(passes).await;
    failed
        + results
            .into_iter()
            .filter(|(kind, res)| !report(*kind, res))
            .count()
}

fn report(kind: SnapshotKind, res: &anyhow::Result<usize>) -> bool {
    match res {
        Ok(n) => {
            info!("{} pass done ({} entries)", kind, n);
            true
        }
        Err(e) => {
            error!("{} pass failed: {:#}", kind, e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{FeedContext, MatchSource};
    use crate::sofascore::stub::StubApi;
    use crate::store::SnapshotStore;
    use serde_json::json;
    use std::sync::Arc;

    fn pipeline(api: StubApi, dir: &std::path::Path, kind: SnapshotKind) -> FeedPipeline {
        let ctx = Arc::new(FeedContext {
            api: Arc::new(api),
            store: SnapshotStore::new(dir),
            source: MatchSource::Upstream,
            max_concurrent: 2,
        });
        FeedPipeline::new(kind, ctx)
    }

    #[tokio::test]
    async fn test_run_once_publishes_schedule_before_snapshot_enrichers() {
        let dir = tempfile::tempdir().unwrap();
        let api = StubApi::with_events(vec![json!({
            "id": 5,
            "homeTeam": {"name": "Lens"},
            "awayTeam": {"name": "Brest"},
            "status": {"type": "notstarted"}
        })])
        .resource(
            5,
            "odds/1/featured",
            json!({"featured": {"default": {"choices": [{"name": "1", "fractionalValue": "1/1"}]}}}),
        );
        let ctx = Arc::new(FeedContext {
            api: Arc::new(api),
            store: SnapshotStore::new(dir.path()),
            source: MatchSource::Snapshot,
            max_concurrent: 2,
        });
        // Enrichers listed first: ordering must not depend on the slice order.
        let pipelines: Vec<FeedPipeline> = [
            SnapshotKind::Odds,
            SnapshotKind::Lineups,
            SnapshotKind::Incidents,
            SnapshotKind::Schedule,
        ]
        .into_iter()
        .map(|kind| FeedPipeline::new(kind, ctx.clone()))
        .collect();

        assert_eq!(run_once(&pipelines).await, 0);
        let odds = ctx.store.read(SnapshotKind::Odds).await.unwrap().unwrap();
        assert_eq!(odds["notstarted"][0]["id"], 5);
        assert_eq!(odds["notstarted"][0]["odds"]["1"], 2.0);
    }

    #[tokio::test]
    async fn test_loop_keeps_running_after_failed_pass_and_stops_on_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let failing = pipeline(StubApi::default(), dir.path(), SnapshotKind::Schedule);
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(run_pipeline(failing, Duration::from_millis(10), rx));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!handle.is_finished());

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("pipeline did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_long_sleep() {
        let dir = tempfile::tempdir().unwrap();
        let p = pipeline(StubApi::with_events(vec![]), dir.path(), SnapshotKind::Schedule);
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(run_pipeline(p, Duration::from_secs(3600), rx));
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sleep was not cancelled")
            .unwrap();
        assert!(dir.path().join("foot.json").exists());
    }

    #[tokio::test]
    async fn test_run_once_counts_failures() {
        let dir = tempfile::tempdir().unwrap();
        let api = || StubApi::with_events(vec![json!({"id": 1, "status": {"type": "inprogress"}})]);
        let pipelines = vec![
            pipeline(api(), dir.path(), SnapshotKind::Schedule),
            pipeline(api(), dir.path(), SnapshotKind::Incidents),
            pipeline(StubApi::default(), dir.path(), SnapshotKind::Odds),
        ];
        assert_eq!(run_once(&pipelines).await, 1);
        assert!(dir.path().join("foot.json").exists());
        assert!(dir.path().join("evenements.json").exists());
        assert!(!dir.path().join("scores.json").exists());
    }
}
