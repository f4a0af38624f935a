use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, PRAGMA};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use super::provider::{FetchError, SportsApi};

/// Client for the public Sofascore JSON API.
///
/// The API rejects requests without a browser-looking header set, so every
/// request carries the same fixed headers and user agent.
#[derive(Clone)]
pub struct SofascoreClient {
    http: Client,
    base_url: String,
}

impl SofascoreClient {
    pub fn new(base_url: &str, user_agent: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let http = Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(SofascoreClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn scheduled_events_url(&self, date: NaiveDate) -> String {
        format!(
            "{}/sport/football/scheduled-events/{}",
            self.base_url,
            date.format("%Y-%m-%d")
        )
    }

    fn event_resource_url(&self, event_id: u64, resource: &str) -> String {
        format!("{}/event/{}/{}", self.base_url, event_id, resource)
    }

    async fn get_json(&self, url: String) -> Result<Value, FetchError> {
        debug!("GET {}", url);
        let resp = match self.http.get(&url).send().await {
            Ok(r) => r,
            Err(source) => return Err(FetchError::Transport { url, source }),
        };

        if !resp.status().is_success() {
            return Err(FetchError::Status {
                status: resp.status().as_u16(),
                url,
            });
        }

        match resp.json::<Value>().await {
            Ok(v) => Ok(v),
            Err(source) => Err(FetchError::Decode { url, source }),
        }
    }
}

#[async_trait]
impl SportsApi for SofascoreClient {
    fn name(&self) -> &str {
        "Sofascore"
    }

    async fn scheduled_events(&self, date: NaiveDate) -> Result<Vec<Value>, FetchError> {
        let raw = self.get_json(self.scheduled_events_url(date)).await?;
        Ok(extract_events(raw))
    }

    async fn event_resource(&self, event_id: u64, resource: &str) -> Result<Value, FetchError> {
        self.get_json(self.event_resource_url(event_id, resource))
            .await
    }
}

/// Pull the `events` array out of a scheduled-events body; anything else is
/// treated as an empty schedule.
fn extract_events(mut raw: Value) -> Vec<Value> {
    match raw.get_mut("events").map(Value::take) {
        Some(Value::Array(events)) => events,
        _ => vec![],
    }
}
