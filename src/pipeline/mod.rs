pub mod enrich;
pub mod incidents;
pub mod lineups;
pub mod odds;
pub mod scheduler;
pub mod text;
pub mod transform;

pub use scheduler::{run_once, run_pipeline};

use anyhow::{Context, Result};
use chrono::Local;
use std::sync::Arc;
use tracing::{info, warn};

use crate::sofascore::SportsApi;
use crate::store::models::MatchBuckets;
use crate::store::{SnapshotKind, SnapshotStore};
use enrich::enrich;
use incidents::IncidentEnrichment;
use lineups::LineupEnrichment;
use odds::OddsEnrichment;

/// Where the enrichment pipelines get their match set from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MatchSource {
    /// Fetch and transform today's schedule on every pass
    Upstream,
    /// Read the last published schedule snapshot
    Snapshot,
}

/// Everything a pipeline pass needs, shared by all pipelines.
pub struct FeedContext {
    pub api: Arc<dyn SportsApi>,
    pub store: SnapshotStore,
    pub source: MatchSource,
    pub max_concurrent: usize,
}

impl FeedContext {
    /// Today's scheduled matches, bucketed.
    async fn fetch_schedule(&self) -> Result<MatchBuckets> {
        let today = Local::now().date_naive();
        let events = self
            .api
            .scheduled_events(today)
            .await
            .with_context(|| format!("{} schedule for {} unavailable", self.api.name(), today))?;
        Ok(transform::build_schedule(&events))
    }

    async fn load_matches(&self) -> Result<MatchBuckets> {
        match self.source {
            MatchSource::Upstream => self.fetch_schedule().await,
            MatchSource::Snapshot => {
                let raw = self
                    .store
                    .read(SnapshotKind::Schedule)
                    .await?
                    .context("Schedule snapshot not published yet")?;
                let buckets: MatchBuckets =
                    serde_json::from_value(raw).context("Unreadable schedule snapshot")?;
                if buckets.is_empty() {
                    warn!("Schedule snapshot holds no matches");
                }
                Ok(buckets)
            }
        }
    }
}

/// One pipeline variant bound to its context. A pass is
/// fetch → transform → enrich → publish; nothing carries over between passes.
#[derive(Clone)]
pub struct FeedPipeline {
    kind: SnapshotKind,
    ctx: Arc<FeedContext>,
}

impl FeedPipeline {
    pub fn new(kind: SnapshotKind, ctx: Arc<FeedContext>) -> Self {
        FeedPipeline { kind, ctx }
    }

    pub fn kind(&self) -> SnapshotKind {
        self.kind
    }

    /// Run one pass and publish its snapshot. Returns the number of entries
    /// published. When the match set cannot be obtained nothing is published
    /// and the previous snapshot stays in place.
    pub async fn run_cycle(&self) -> Result<usize> {
        let ctx = &self.ctx;
        let api = ctx.api.as_ref();

        let published = match self.kind {
            SnapshotKind::Schedule => {
                let buckets = ctx.fetch_schedule().await?;
                ctx.store.publish(self.kind, &buckets).await?;
                info!(
                    "Schedule published: {} finished, {} ongoing, {} upcoming",
                    buckets.finished.len(),
                    buckets.ongoing.len(),
                    buckets.upcoming.len()
                );
                buckets.len()
            }
            SnapshotKind::Lineups => {
                let mut buckets = ctx.load_matches().await?;
                let fetched = enrich::<LineupEnrichment>(api, &buckets, ctx.max_concurrent).await;
                let found = fetched.len();
                lineups::attach_lineups(&mut buckets, fetched);
                ctx.store.publish(self.kind, &buckets).await?;
                info!("Lineups published for {} matches", found);
                found
            }
            SnapshotKind::Incidents => {
                let buckets = ctx.load_matches().await?;
                let fetched = enrich::<IncidentEnrichment>(api, &buckets, ctx.max_concurrent).await;
                let live = incidents::live_matches(&buckets, fetched);
                ctx.store.publish(self.kind, &live).await?;
                info!("Live incidents published for {} matches", live.len());
                live.len()
            }
            SnapshotKind::Odds => {
                let buckets = ctx.load_matches().await?;
                let fetched = enrich::<OddsEnrichment>(api, &buckets, ctx.max_concurrent).await;
                let board = odds::odds_board(&buckets, fetched);
                ctx.store.publish(self.kind, &board).await?;
                info!(
                    "Odds published: {} in progress, {} not started",
                    board.inprogress.len(),
                    board.notstarted.len()
                );
                board.inprogress.len() + board.notstarted.len()
            }
        };

        Ok(published)
    }
}
