use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::enrich::Enrichment;
use crate::store::models::{Lineup, MatchBuckets, MatchStatus, PlayerEntry};

/// `/event/{id}/lineups` for started and finished matches.
pub struct LineupEnrichment;

impl Enrichment for LineupEnrichment {
    type Detail = Lineup;

    const LABEL: &'static str = "lineup";
    const RESOURCE: &'static str = "lineups";
    const STATUSES: &'static [MatchStatus] = &[MatchStatus::InProgress, MatchStatus::Finished];

    fn parse(match_id: u64, body: Value) -> Result<Lineup> {
        let raw: RawLineups =
            serde_json::from_value(body).context("Unexpected lineups payload")?;
        Ok(Lineup {
            match_id,
            confirmed: raw.confirmed.unwrap_or(false),
            home_team: raw.home.players.into_iter().map(PlayerEntry::from).collect(),
            away_team: raw.away.players.into_iter().map(PlayerEntry::from).collect(),
        })
    }
}

#[derive(Deserialize)]
struct RawLineups {
    confirmed: Option<bool>,
    home: RawSide,
    away: RawSide,
}

#[derive(Deserialize)]
struct RawSide {
    players: Vec<RawPlayerSlot>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlayerSlot {
    player: RawPlayer,
    position: String,
    jersey_number: Value,
    substitute: Option<bool>,
    statistics: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlayer {
    name: String,
    short_name: String,
    height: Option<u32>,
    country: RawCountry,
    market_value_currency: Option<String>,
    date_of_birth_timestamp: Option<i64>,
}

#[derive(Deserialize)]
struct RawCountry {
    name: String,
}

impl From<RawPlayerSlot> for PlayerEntry {
    fn from(slot: RawPlayerSlot) -> Self {
        PlayerEntry {
            name: slot.player.name,
            short_name: slot.player.short_name,
            position: slot.position,
            jersey_number: slot.jersey_number,
            height: slot.player.height,
            nationality: slot.player.country.name,
            market_value_currency: slot.player.market_value_currency,
            date_of_birth: slot.player.date_of_birth_timestamp,
            is_substitute: slot.substitute.unwrap_or(false),
            statistics: slot.statistics.unwrap_or_default(),
        }
    }
}

/// Attach fetched lineups to their matches. Each lineup is consumed by the
/// first match carrying its id, so none is attached twice; lineups for ids
/// outside the match set are discarded.
pub fn attach_lineups(buckets: &mut MatchBuckets, mut lineups: HashMap<u64, Lineup>) {
    for status in LineupEnrichment::STATUSES {
        for m in buckets.bucket_mut(*status) {
            m.lineup = m.id.known().and_then(|id| lineups.remove(&id));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::transform::build_schedule;
    use serde_json::json;

    fn slot(name: &str, substitute: Option<bool>) -> Value {
        let mut s = json!({
            "player": {
                "name": name,
                "shortName": "B. Saka",
                "height": 178,
                "country": {"name": "England"},
                "marketValueCurrency": "EUR",
                "dateOfBirthTimestamp": 1004659200
            },
            "position": "F",
            "jerseyNumber": "7",
            "statistics": {"rating": 8.1, "goals": 1}
        });
        if let Some(sub) = substitute {
            s["substitute"] = json!(sub);
        }
        s
    }

    #[test]
    fn test_parse_lineups() {
        let body = json!({
            "confirmed": true,
            "home": {"players": [slot("Bukayo Saka", None), slot("Emile Smith Rowe", Some(true))]},
            "away": {"players": [slot("Cole Palmer", Some(false))]}
        });
        let lineup = LineupEnrichment::parse(42, body).unwrap();
        assert_eq!(lineup.match_id, 42);
        assert!(lineup.confirmed);
        assert_eq!(lineup.home_team.len(), 2);
        assert_eq!(lineup.away_team.len(), 1);

        let saka = &lineup.home_team[0];
        assert_eq!(saka.name, "Bukayo Saka");
        assert_eq!(saka.short_name, "B. Saka");
        assert_eq!(saka.position, "F");
        assert_eq!(saka.jersey_number, json!("7"));
        assert_eq!(saka.height, Some(178));
        assert_eq!(saka.nationality, "England");
        assert_eq!(saka.market_value_currency.as_deref(), Some("EUR"));
        assert_eq!(saka.date_of_birth, Some(1004659200));
        assert!(!saka.is_substitute);
        assert_eq!(saka.statistics["goals"], json!(1));
        assert!(lineup.home_team[1].is_substitute);
    }

    #[test]
    fn test_parse_lineups_optional_fields_default() {
        let body = json!({
            "home": {"players": [{
                "player": {"name": "A", "shortName": "A", "country": {"name": "Brazil"}},
                "position": "G",
                "jerseyNumber": 1
            }]},
            "away": {"players": []}
        });
        let lineup = LineupEnrichment::parse(1, body).unwrap();
        assert!(!lineup.confirmed);
        let p = &lineup.home_team[0];
        assert_eq!(p.height, None);
        assert_eq!(p.market_value_currency, None);
        assert_eq!(p.date_of_birth, None);
        assert!(p.statistics.is_empty());
    }

    #[test]
    fn test_parse_lineups_missing_structure_is_error() {
        assert!(LineupEnrichment::parse(1, json!({"confirmed": true})).is_err());
        assert!(LineupEnrichment::parse(1, json!({"home": {}, "away": {"players": []}})).is_err());
        let no_country = json!({
            "home": {"players": [{"player": {"name": "A", "shortName": "A"}, "position": "G", "jerseyNumber": "1"}]},
            "away": {"players": []}
        });
        assert!(LineupEnrichment::parse(1, no_country).is_err());
    }

    #[test]
    fn test_player_entry_serializes_camel_case() {
        let body = json!({"home": {"players": [slot("X", Some(true))]}, "away": {"players": []}});
        let v = serde_json::to_value(LineupEnrichment::parse(9, body).unwrap()).unwrap();
        assert_eq!(v["matchId"], 9);
        assert_eq!(v["homeTeam"][0]["isSubstitute"], true);
        assert_eq!(v["homeTeam"][0]["shortName"], "B. Saka");
        assert_eq!(v["homeTeam"][0]["dateOfBirth"], 1004659200);
    }

    #[test]
    fn test_attach_lineups_by_id_only() {
        let mut buckets = build_schedule(&[
            json!({"id": 1, "status": {"type": "inprogress"}}),
            json!({"id": 2, "status": {"type": "finished"}}),
            json!({"id": 3, "status": {"type": "notstarted"}}),
        ]);
        let lineup = |id| Lineup {
            match_id: id,
            confirmed: true,
            home_team: vec![],
            away_team: vec![],
        };
        let fetched: HashMap<u64, Lineup> =
            [(1, lineup(1)), (3, lineup(3)), (99, lineup(99))].into_iter().collect();

        attach_lineups(&mut buckets, fetched);

        assert_eq!(buckets.ongoing[0].lineup.as_ref().map(|l| l.match_id), Some(1));
        assert!(buckets.finished[0].lineup.is_none());
        assert!(buckets.upcoming[0].lineup.is_none());
    }
}
