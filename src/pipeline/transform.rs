use chrono::{Local, TimeZone};
use serde_json::Value;
use std::collections::HashSet;
use tracing::debug;

use crate::store::models::{Match, MatchBuckets, MatchStatus, UpstreamId, UNKNOWN};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Render upstream epoch seconds as a local wall-clock string.
///
/// Absent, zero and out-of-range timestamps all render as `"Unknown"`.
pub fn format_timestamp(ts: Option<i64>) -> String {
    ts.filter(|&t| t != 0)
        .and_then(|t| Local.timestamp_opt(t, 0).single())
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

fn str_or_unknown(v: &Value) -> String {
    v.as_str().unwrap_or(UNKNOWN).to_string()
}

/// Reshape one raw scheduled event. Never fails: every missing or mistyped
/// field falls back to its sentinel.
pub fn transform_event(ev: &Value) -> Match {
    let status = str_or_unknown(&ev["status"]["type"]);
    let last_updated = || format_timestamp(ev["lastUpdatedTimestamp"].as_i64());

    let (end_time, current_time) = match MatchStatus::parse(&status) {
        Some(MatchStatus::Finished) => (Some(last_updated()), None),
        Some(MatchStatus::InProgress) => (None, Some(last_updated())),
        _ => (None, None),
    };

    Match {
        id: UpstreamId::from_value(&ev["id"]),
        home_team: str_or_unknown(&ev["homeTeam"]["name"]),
        away_team: str_or_unknown(&ev["awayTeam"]["name"]),
        start_time: format_timestamp(ev["startTimestamp"].as_i64()),
        status,
        tournament: str_or_unknown(&ev["tournament"]["name"]),
        season_id: UpstreamId::from_value(&ev["season"]["id"]),
        home_score: ev["homeScore"]["display"].as_i64().unwrap_or(0),
        away_score: ev["awayScore"]["display"].as_i64().unwrap_or(0),
        end_time,
        current_time,
        lineup: None,
    }
}

/// Route matches into their status bucket, preserving input order.
///
/// Unknown statuses are dropped. A known id already present in its bucket is
/// skipped so ids stay unique per bucket; `"Unknown"` ids are never compared
/// and all kept.
pub fn bucket_matches(matches: impl IntoIterator<Item = Match>) -> MatchBuckets {
    let mut buckets = MatchBuckets::default();
    let mut seen: HashSet<(MatchStatus, u64)> = HashSet::new();

    for m in matches {
        let Some(status) = m.match_status() else {
            debug!("Dropping match {:?} with status '{}'", m.id, m.status);
            continue;
        };
        if let Some(id) = m.id.known() {
            if !seen.insert((status, id)) {
                debug!("Dropping duplicate match {} in {}", id, status.as_str());
                continue;
            }
        }
        buckets.bucket_mut(status).push(m);
    }

    buckets
}

/// Full schedule transform: raw upstream events → bucketed matches.
pub fn build_schedule(events: &[Value]) -> MatchBuckets {
    bucket_matches(events.iter().map(transform_event))
}
