use anyhow::Result;
use futures_util::stream::{self, StreamExt};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::future::Future;
use tracing::{debug, warn};

use crate::sofascore::SportsApi;
use crate::store::models::{MatchBuckets, MatchStatus};

/// One kind of per-match detail: which matches it applies to, where it lives
/// upstream and how to read it.
pub trait Enrichment {
    type Detail: Send;

    /// Name used in logs
    const LABEL: &'static str;
    /// Sub-resource path under `/event/{id}/`
    const RESOURCE: &'static str;
    /// Buckets whose matches get enriched
    const STATUSES: &'static [MatchStatus];

    /// Build the detail from a successful response. An `Err` marks the
    /// response as unusable for this match only.
    fn parse(match_id: u64, body: Value) -> Result<Self::Detail>;
}

/// Ids of the matches in `statuses` buckets, in bucket order. Matches without
/// a known upstream id cannot be addressed and are skipped.
pub fn select_ids(buckets: &MatchBuckets, statuses: &[MatchStatus]) -> Vec<u64> {
    statuses
        .iter()
        .flat_map(|&s| buckets.bucket(s))
        .filter_map(|m| m.id.known())
        .collect()
}

/// Run `fetch` once per distinct id with at most `limit` requests in flight
/// and wait for all of them. Failures are logged and left out of the result;
/// they never cancel the other requests.
pub async fn fan_out<T, F, Fut>(
    label: &str,
    ids: impl IntoIterator<Item = u64>,
    limit: usize,
    fetch: F,
) -> HashMap<u64, T>
where
    F: Fn(u64) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut seen = HashSet::new();
    let unique: Vec<u64> = ids.into_iter().filter(|id| seen.insert(*id)).collect();
    let requested = unique.len();

    let results: Vec<(u64, Result<T>)> = stream::iter(unique)
        .map(|id| {
            let fut = fetch(id);
            async move { (id, fut.await) }
        })
        .buffer_unordered(limit.max(1))
        .collect()
        .await;

    let details: HashMap<u64, T> = results
        .into_iter()
        .filter_map(|(id, res)| match res {
            Ok(detail) => Some((id, detail)),
            Err(e) => {
                warn!("No {} for match {}: {:#}", label, id, e);
                None
            }
        })
        .collect();

    debug!("{}: {}/{} matches enriched", label, details.len(), requested);
    details
}

/// Fetch and parse `E` for every eligible match in `buckets`.
pub async fn enrich<E: Enrichment>(
    api: &dyn SportsApi,
    buckets: &MatchBuckets,
    limit: usize,
) -> HashMap<u64, E::Detail> {
    let ids = select_ids(buckets, E::STATUSES);
    fan_out(E::LABEL, ids, limit, |id| async move {
        let body = api.event_resource(id, E::RESOURCE).await?;
        E::parse(id, body)
    })
    .await
}
