use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

use super::enrich::Enrichment;
use super::text::display_name;
use crate::store::models::{MatchBuckets, MatchStatus, OddsBoard, OddsEntry, OddsSet};

/// `/event/{id}/odds/1/featured` for in-progress and not-started matches.
pub struct OddsEnrichment;

impl Enrichment for OddsEnrichment {
    type Detail = OddsSet;

    const LABEL: &'static str = "odds";
    const RESOURCE: &'static str = "odds/1/featured";
    const STATUSES: &'static [MatchStatus] = &[MatchStatus::InProgress, MatchStatus::NotStarted];

    fn parse(_match_id: u64, body: Value) -> Result<OddsSet> {
        let choices = body["featured"]["default"]["choices"]
            .as_array()
            .context("No featured default market")?;

        let mut odds = OddsSet::default();
        for choice in choices {
            let slot = match choice["name"].as_str() {
                Some("1") => &mut odds.home,
                Some("X") => &mut odds.draw,
                Some("2") => &mut odds.away,
                _ => continue,
            };
            let raw = choice["fractionalValue"].as_str().unwrap_or_default();
            *slot = fractional_to_decimal(raw);
            if slot.is_none() {
                warn!("Unparsable fractional odd '{}'", raw);
            }
        }
        Ok(odds)
    }
}

/// Convert UK fractional odds ("5/2") to decimal odds (3.5).
///
/// Returns `None` for anything that is not `<int>/<non-zero int>` with a
/// non-negative ratio.
pub fn fractional_to_decimal(fractional: &str) -> Option<f64> {
    let (num, den) = fractional.trim().split_once('/')?;
    let num: i64 = num.trim().parse().ok()?;
    let den: i64 = den.trim().parse().ok()?;
    if den == 0 {
        return None;
    }
    let ratio = num as f64 / den as f64;
    if ratio < 0.0 {
        return None;
    }
    Some(ratio + 1.0)
}

/// Odds snapshot: matches with a usable featured market, split by status.
pub fn odds_board(buckets: &MatchBuckets, mut odds: HashMap<u64, OddsSet>) -> OddsBoard {
    let mut entries = |status: MatchStatus| -> Vec<OddsEntry> {
        buckets
            .bucket(status)
            .iter()
            .filter_map(|m| {
                let id = m.id.known()?;
                let odds = odds.remove(&id)?;
                Some(OddsEntry {
                    home_team: display_name(&m.home_team),
                    away_team: display_name(&m.away_team),
                    id,
                    odds,
                })
            })
            .collect()
    };

    OddsBoard {
        inprogress: entries(MatchStatus::InProgress),
        notstarted: entries(MatchStatus::NotStarted),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::transform::build_schedule;
    use approx::assert_relative_eq;
    use serde_json::json;

    #[test]
    fn test_fractional_to_decimal() {
        assert_relative_eq!(fractional_to_decimal("1/2").unwrap(), 1.5, epsilon = 1e-9);
        assert_relative_eq!(fractional_to_decimal("0/1").unwrap(), 1.0, epsilon = 1e-9);
        assert_relative_eq!(fractional_to_decimal("5/2").unwrap(), 3.5, epsilon = 1e-9);
        assert_relative_eq!(fractional_to_decimal("11/10").unwrap(), 2.1, epsilon = 1e-9);
    }

    #[test]
    fn test_fractional_to_decimal_malformed() {
        assert_eq!(fractional_to_decimal("abc"), None);
        assert_eq!(fractional_to_decimal("1/0"), None);
        assert_eq!(fractional_to_decimal(""), None);
        assert_eq!(fractional_to_decimal("3"), None);
        assert_eq!(fractional_to_decimal("1/2/3"), None);
        assert_eq!(fractional_to_decimal("1.5/2"), None);
        assert_eq!(fractional_to_decimal("-3/1"), None);
    }

    fn featured(choices: Value) -> Value {
        json!({"featured": {"default": {"marketName": "Full time", "choices": choices}}})
    }

    #[test]
    fn test_parse_featured_market() {
        let body = featured(json!([
            {"name": "1", "fractionalValue": "6/5"},
            {"name": "X", "fractionalValue": "12/5"},
            {"name": "2", "fractionalValue": "9/4"}
        ]));
        let odds = OddsEnrichment::parse(1, body).unwrap();
        assert_relative_eq!(odds.home.unwrap(), 2.2, epsilon = 1e-9);
        assert_relative_eq!(odds.draw.unwrap(), 3.4, epsilon = 1e-9);
        assert_relative_eq!(odds.away.unwrap(), 3.25, epsilon = 1e-9);
    }

    #[test]
    fn test_malformed_choice_is_null_not_fatal() {
        let body = featured(json!([
            {"name": "1", "fractionalValue": "abc"},
            {"name": "X"},
            {"name": "2", "fractionalValue": "1/1"}
        ]));
        let odds = OddsEnrichment::parse(1, body).unwrap();
        assert_eq!(odds.home, None);
        assert_eq!(odds.draw, None);
        assert_relative_eq!(odds.away.unwrap(), 2.0, epsilon = 1e-9);

        let v = serde_json::to_value(odds).unwrap();
        assert_eq!(v, json!({"1": null, "X": null, "2": 2.0}));
    }

    #[test]
    fn test_missing_featured_market_is_error() {
        assert!(OddsEnrichment::parse(1, json!({"featured": {}})).is_err());
        assert!(OddsEnrichment::parse(1, json!({})).is_err());
    }

    #[test]
    fn test_odds_values_are_null_or_at_least_one() {
        for raw in ["0/1", "1/3", "100/1", "7/0", "x/y", "2/-1"] {
            if let Some(v) = fractional_to_decimal(raw) {
                assert!(v >= 1.0, "{raw} -> {v}");
            }
        }
    }

    #[test]
    fn test_odds_board_splits_by_status() {
        let buckets = build_schedule(&[
            json!({"id": 1, "status": {"type": "inprogress"}, "homeTeam": {"name": "A"}, "awayTeam": {"name": "B"}}),
            json!({"id": 2, "status": {"type": "notstarted"}}),
            json!({"id": 3, "status": {"type": "notstarted"}}),
            json!({"id": 4, "status": {"type": "finished"}}),
        ]);
        let set = OddsSet {
            home: Some(2.0),
            draw: Some(3.0),
            away: Some(4.0),
        };
        let fetched: HashMap<u64, OddsSet> =
            [(1, set), (3, set), (4, set), (77, set)].into_iter().collect();

        let board = odds_board(&buckets, fetched);

        assert_eq!(board.inprogress.len(), 1);
        assert_eq!(board.inprogress[0].home_team, "A");
        assert_eq!(board.notstarted.len(), 1);
        assert_eq!(board.notstarted[0].id, 3);

        let v = serde_json::to_value(&board).unwrap();
        assert_eq!(v["inprogress"][0]["odds"]["X"], 3.0);
    }
}
