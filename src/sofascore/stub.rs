//! In-memory `SportsApi` used by pipeline tests.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use super::provider::{FetchError, SportsApi};

#[derive(Default)]
pub struct StubApi {
    /// `None` makes the schedule request fail with HTTP 503.
    pub events: Option<Vec<Value>>,
    /// (event id, resource) → body. Missing entries answer HTTP 404.
    pub resources: HashMap<(u64, String), Value>,
    pub calls: Mutex<Vec<(u64, String)>>,
}

impl StubApi {
    pub fn with_events(events: Vec<Value>) -> Self {
        StubApi {
            events: Some(events),
            ..Default::default()
        }
    }

    pub fn resource(mut self, event_id: u64, resource: &str, body: Value) -> Self {
        self.resources.insert((event_id, resource.to_string()), body);
        self
    }

    pub fn calls_for(&self, resource: &str) -> Vec<u64> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, r)| r == resource)
            .map(|(id, _)| *id)
            .collect()
    }
}

#[async_trait]
impl SportsApi for StubApi {
    fn name(&self) -> &str {
        "stub"
    }

    async fn scheduled_events(&self, _date: NaiveDate) -> Result<Vec<Value>, FetchError> {
        self.events.clone().ok_or(FetchError::Status {
            status: 503,
            url: "stub://scheduled-events".into(),
        })
    }

    async fn event_resource(&self, event_id: u64, resource: &str) -> Result<Value, FetchError> {
        self.calls
            .lock()
            .unwrap()
            .push((event_id, resource.to_string()));
        self.resources
            .get(&(event_id, resource.to_string()))
            .cloned()
            .ok_or(FetchError::Status {
                status: 404,
                url: format!("stub://event/{}/{}", event_id, resource),
            })
    }
}
