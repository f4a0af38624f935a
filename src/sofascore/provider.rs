use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use thiserror::Error;

/// Why a single upstream resource could not be obtained.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("undecodable body from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Read-only view of the sports-data API used by every pipeline.
#[async_trait]
pub trait SportsApi: Send + Sync {
    /// Raw football events scheduled on `date` (the upstream `events` array).
    async fn scheduled_events(&self, date: NaiveDate) -> Result<Vec<Value>, FetchError>;

    /// Raw JSON of a per-event sub-resource, e.g. `lineups` or `odds/1/featured`.
    async fn event_resource(&self, event_id: u64, resource: &str) -> Result<Value, FetchError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
