use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// Placeholder published for any field the upstream event did not carry.
pub const UNKNOWN: &str = "Unknown";

/// Upstream numeric identifier (event id, season id).
///
/// Serialized as a JSON number when known and as the `"Unknown"` string
/// sentinel when the upstream payload omitted it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamId {
    Known(u64),
    Unknown,
}

impl UpstreamId {
    pub fn from_value(value: &Value) -> Self {
        value.as_u64().map(UpstreamId::Known).unwrap_or(UpstreamId::Unknown)
    }

    pub fn known(self) -> Option<u64> {
        match self {
            UpstreamId::Known(id) => Some(id),
            UpstreamId::Unknown => None,
        }
    }
}

impl Serialize for UpstreamId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            UpstreamId::Known(id) => serializer.serialize_u64(*id),
            UpstreamId::Unknown => serializer.serialize_str(UNKNOWN),
        }
    }
}

impl<'de> Deserialize<'de> for UpstreamId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(UpstreamId::from_value(&value))
    }
}

/// Lifecycle status of a match, as far as bucketing is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchStatus {
    NotStarted,
    InProgress,
    Finished,
}

impl MatchStatus {
    /// Map the upstream `status.type` string. Anything else is not bucketed.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "notstarted" => Some(MatchStatus::NotStarted),
            "inprogress" => Some(MatchStatus::InProgress),
            "finished" => Some(MatchStatus::Finished),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::NotStarted => "notstarted",
            MatchStatus::InProgress => "inprogress",
            MatchStatus::Finished => "finished",
        }
    }
}

/// A scheduled football match, rebuilt from scratch on every cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: UpstreamId,
    pub home_team: String,
    pub away_team: String,
    pub start_time: String,
    /// Raw upstream `status.type` ("inprogress", "finished", ...)
    pub status: String,
    pub tournament: String,
    pub season_id: UpstreamId,
    pub home_score: i64,
    pub away_score: i64,
    /// Set for finished matches only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    /// Set for in-progress matches only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lineup: Option<Lineup>,
}

impl Match {
    pub fn match_status(&self) -> Option<MatchStatus> {
        MatchStatus::parse(&self.status)
    }
}

/// Matches grouped by lifecycle status. Also the schedule snapshot shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchBuckets {
    #[serde(default)]
    pub finished: Vec<Match>,
    #[serde(default)]
    pub ongoing: Vec<Match>,
    #[serde(default)]
    pub upcoming: Vec<Match>,
}

impl MatchBuckets {
    pub fn bucket(&self, status: MatchStatus) -> &[Match] {
        match status {
            MatchStatus::Finished => &self.finished,
            MatchStatus::InProgress => &self.ongoing,
            MatchStatus::NotStarted => &self.upcoming,
        }
    }

    pub fn bucket_mut(&mut self, status: MatchStatus) -> &mut Vec<Match> {
        match status {
            MatchStatus::Finished => &mut self.finished,
            MatchStatus::InProgress => &mut self.ongoing,
            MatchStatus::NotStarted => &mut self.upcoming,
        }
    }

    pub fn len(&self) -> usize {
        self.finished.len() + self.ongoing.len() + self.upcoming.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Starting eleven and bench for both sides of a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lineup {
    pub match_id: u64,
    pub confirmed: bool,
    pub home_team: Vec<PlayerEntry>,
    pub away_team: Vec<PlayerEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerEntry {
    pub name: String,
    pub short_name: String,
    pub position: String,
    pub jersey_number: Value,
    pub height: Option<u32>,
    pub nationality: String,
    pub market_value_currency: Option<String>,
    /// Epoch seconds, as published upstream
    pub date_of_birth: Option<i64>,
    pub is_substitute: bool,
    pub statistics: Map<String, Value>,
}

/// Side of the pitch an incident is credited to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Home,
    Away,
}

/// Closed set of incident types the feed knows how to describe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncidentKind {
    Goal,
    Card,
    Substitution,
    Penalty,
    Injury,
    Offside,
    Var,
    Corner,
    Foul,
    FreeKick,
    KickOff,
    HalfTime,
    FullTime,
    /// Upstream type string we have no payload mapping for
    Unrecognized(String),
}

impl IncidentKind {
    pub fn parse(s: &str) -> Self {
        match s {
            "goal" => IncidentKind::Goal,
            "card" => IncidentKind::Card,
            "substitution" => IncidentKind::Substitution,
            "penalty" => IncidentKind::Penalty,
            "injury" => IncidentKind::Injury,
            "offside" => IncidentKind::Offside,
            "var" => IncidentKind::Var,
            "corner" => IncidentKind::Corner,
            "foul" => IncidentKind::Foul,
            "freeKick" => IncidentKind::FreeKick,
            "kickOff" => IncidentKind::KickOff,
            "halfTime" => IncidentKind::HalfTime,
            "fullTime" => IncidentKind::FullTime,
            other => IncidentKind::Unrecognized(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            IncidentKind::Goal => "goal",
            IncidentKind::Card => "card",
            IncidentKind::Substitution => "substitution",
            IncidentKind::Penalty => "penalty",
            IncidentKind::Injury => "injury",
            IncidentKind::Offside => "offside",
            IncidentKind::Var => "var",
            IncidentKind::Corner => "corner",
            IncidentKind::Foul => "foul",
            IncidentKind::FreeKick => "freeKick",
            IncidentKind::KickOff => "kickOff",
            IncidentKind::HalfTime => "halfTime",
            IncidentKind::FullTime => "fullTime",
            IncidentKind::Unrecognized(raw) => raw,
        }
    }
}

impl Serialize for IncidentKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreLine {
    pub home: Option<i64>,
    pub away: Option<i64>,
}

/// Type-specific incident fields, flattened next to the common ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged, rename_all_fields = "camelCase")]
pub enum IncidentDetail {
    Goal {
        player: Option<String>,
        player_id: Option<u64>,
        score: ScoreLine,
    },
    Card {
        player: Option<String>,
        player_id: Option<u64>,
        card_type: Option<String>,
        rescinded: bool,
    },
    Substitution {
        player_in: Option<String>,
        player_out: Option<String>,
        injury: bool,
    },
    Penalty {
        player: Option<String>,
        player_id: Option<u64>,
        outcome: Option<String>,
    },
    Player {
        player: Option<String>,
        player_id: Option<u64>,
    },
    Var {
        decision: Option<String>,
    },
    Score {
        score: ScoreLine,
    },
    Bare {},
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub incident_id: Option<u64>,
    pub match_id: u64,
    /// `None` when upstream sent no type; published as `null`.
    pub incident_type: Option<IncidentKind>,
    pub time: Option<i64>,
    pub team: Team,
    #[serde(flatten)]
    pub detail: IncidentDetail,
}

/// Entry of the live-incident snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveMatch {
    pub home_team: String,
    pub away_team: String,
    pub id: u64,
    pub incidents: Vec<Incident>,
}

/// Decimal 1X2 odds. Every outcome key is always present, `null` when unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct OddsSet {
    #[serde(rename = "1")]
    pub home: Option<f64>,
    #[serde(rename = "X")]
    pub draw: Option<f64>,
    #[serde(rename = "2")]
    pub away: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OddsEntry {
    pub home_team: String,
    pub away_team: String,
    pub id: u64,
    pub odds: OddsSet,
}

/// Odds snapshot shape, keyed by upstream status string.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OddsBoard {
    pub inprogress: Vec<OddsEntry>,
    pub notstarted: Vec<OddsEntry>,
}
