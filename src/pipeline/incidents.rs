use anyhow::Result;
use serde_json::Value;
use std::collections::HashMap;

use super::enrich::Enrichment;
use super::text::display_name;
use crate::store::models::{
    Incident, IncidentDetail, IncidentKind, LiveMatch, MatchBuckets, MatchStatus, ScoreLine, Team,
};

/// `/event/{id}/incidents` for in-progress matches, live incidents only.
pub struct IncidentEnrichment;

impl Enrichment for IncidentEnrichment {
    type Detail = Vec<Incident>;

    const LABEL: &'static str = "incidents";
    const RESOURCE: &'static str = "incidents";
    const STATUSES: &'static [MatchStatus] = &[MatchStatus::InProgress];

    fn parse(match_id: u64, body: Value) -> Result<Vec<Incident>> {
        let incidents = body["incidents"]
            .as_array()
            .map(|list| {
                list.iter()
                    .filter(|raw| raw["isLive"].as_bool().unwrap_or(false))
                    .map(|raw| parse_incident(match_id, raw))
                    .collect()
            })
            .unwrap_or_default();
        Ok(incidents)
    }
}

fn parse_incident(match_id: u64, raw: &Value) -> Incident {
    let kind = raw["incidentType"].as_str().map(IncidentKind::parse);
    let detail = match &kind {
        Some(kind) => incident_detail(kind, raw),
        None => IncidentDetail::Bare {},
    };
    Incident {
        incident_id: raw["id"].as_u64(),
        match_id,
        incident_type: kind,
        time: raw["time"].as_i64(),
        team: if raw["isHome"].as_bool().unwrap_or(false) {
            Team::Home
        } else {
            Team::Away
        },
        detail,
    }
}

fn incident_detail(kind: &IncidentKind, raw: &Value) -> IncidentDetail {
    let player = || raw["player"]["name"].as_str().map(str::to_string);
    let player_id = || raw["player"]["id"].as_u64();
    let text = |key: &str| raw[key].as_str().map(str::to_string);
    let score = || ScoreLine {
        home: raw["homeScore"].as_i64(),
        away: raw["awayScore"].as_i64(),
    };

    match kind {
        IncidentKind::Goal => IncidentDetail::Goal {
            player: player(),
            player_id: player_id(),
            score: score(),
        },
        IncidentKind::Card => IncidentDetail::Card {
            player: player(),
            player_id: player_id(),
            card_type: text("cardType"),
            rescinded: raw["rescinded"].as_bool().unwrap_or(false),
        },
        IncidentKind::Substitution => IncidentDetail::Substitution {
            player_in: raw["playerIn"]["name"].as_str().map(str::to_string),
            player_out: raw["playerOut"]["name"].as_str().map(str::to_string),
            injury: raw["injury"].as_bool().unwrap_or(false),
        },
        IncidentKind::Penalty => IncidentDetail::Penalty {
            player: player(),
            player_id: player_id(),
            outcome: text("outcome"),
        },
        IncidentKind::Injury | IncidentKind::Offside | IncidentKind::Foul => {
            IncidentDetail::Player {
                player: player(),
                player_id: player_id(),
            }
        }
        IncidentKind::Var => IncidentDetail::Var {
            decision: text("decision"),
        },
        IncidentKind::KickOff | IncidentKind::HalfTime | IncidentKind::FullTime => {
            IncidentDetail::Score { score: score() }
        }
        IncidentKind::Corner | IncidentKind::FreeKick | IncidentKind::Unrecognized(_) => {
            IncidentDetail::Bare {}
        }
    }
}

/// Incident snapshot: one entry per in-progress match whose incidents were
/// fetched, in bucket order.
pub fn live_matches(buckets: &MatchBuckets, mut incidents: HashMap<u64, Vec<Incident>>) -> Vec<LiveMatch> {
    buckets
        .ongoing
        .iter()
        .filter_map(|m| {
            let id = m.id.known()?;
            let incidents = incidents.remove(&id)?;
            Some(LiveMatch {
                home_team: display_name(&m.home_team),
                away_team: display_name(&m.away_team),
                id,
                incidents,
            })
        })
        .collect()
}
