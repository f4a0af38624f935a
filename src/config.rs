use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::pipeline::MatchSource;
use crate::store::SnapshotKind;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (iPad; CPU OS 16_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.6 Mobile/15E148 Safari/604.1";

/// Football live-data poller publishing JSON snapshots
#[derive(Parser, Debug, Clone)]
#[command(name = "sofascore-feed", version, about)]
pub struct Config {
    /// Sofascore API base URL
    #[arg(
        long,
        env = "API_BASE_URL",
        default_value = "https://www.sofascore.com/api/v1"
    )]
    pub api_base_url: String,

    /// User agent sent upstream (the API rejects non-browser agents)
    #[arg(long, env = "USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Query server listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:10000")]
    pub listen_addr: String,

    /// Directory the snapshot files are written to
    #[arg(long, env = "OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Pipelines to run (comma separated)
    #[arg(
        long,
        env = "PIPELINES",
        value_enum,
        value_delimiter = ',',
        default_values_t = SnapshotKind::ALL.to_vec()
    )]
    pub pipelines: Vec<SnapshotKind>,

    /// Match set used by the lineup, incident and odds pipelines
    #[arg(long, env = "MATCH_SOURCE", value_enum, default_value_t = MatchSource::Upstream)]
    pub match_source: MatchSource,

    /// Seconds between schedule passes
    #[arg(long, env = "SCHEDULE_INTERVAL_SECS", default_value = "2")]
    pub schedule_interval_secs: u64,

    /// Seconds between lineup passes
    #[arg(long, env = "LINEUP_INTERVAL_SECS", default_value = "3")]
    pub lineup_interval_secs: u64,

    /// Seconds between live-incident passes
    #[arg(long, env = "INCIDENT_INTERVAL_SECS", default_value = "1")]
    pub incident_interval_secs: u64,

    /// Seconds between odds passes
    #[arg(long, env = "ODDS_INTERVAL_SECS", default_value = "1")]
    pub odds_interval_secs: u64,

    /// Per-request upstream timeout in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "10")]
    pub request_timeout_secs: u64,

    /// Maximum per-match requests in flight during one enrichment pass
    #[arg(long, env = "MAX_CONCURRENT_REQUESTS", default_value = "8")]
    pub max_concurrent_requests: usize,

    /// Do not start the query server
    #[arg(long, env = "NO_SERVER", default_value = "false")]
    pub no_server: bool,

    /// Run one pass of each pipeline and exit
    #[arg(long)]
    pub once: bool,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        let base = url::Url::parse(&self.api_base_url)
            .map_err(|e| anyhow::anyhow!("api_base_url '{}' is invalid: {}", self.api_base_url, e))?;
        if !matches!(base.scheme(), "http" | "https") {
            anyhow::bail!("api_base_url must be http(s), got '{}'", base.scheme());
        }
        if !self.no_server && !self.once {
            self.listen_addr.parse::<SocketAddr>().map_err(|e| {
                anyhow::anyhow!("listen_addr '{}' is invalid: {}", self.listen_addr, e)
            })?;
        }
        if self.pipelines.is_empty() {
            anyhow::bail!("at least one pipeline must be enabled");
        }
        if self.pipelines.iter().any(|k| self.interval(*k).is_zero()) {
            anyhow::bail!("pipeline intervals must be at least 1 second");
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be positive");
        }
        if self.max_concurrent_requests == 0 {
            anyhow::bail!("max_concurrent_requests must be positive");
        }
        Ok(())
    }

    /// Sleep between two passes of `kind`.
    pub fn interval(&self, kind: SnapshotKind) -> Duration {
        let secs = match kind {
            SnapshotKind::Schedule => self.schedule_interval_secs,
            SnapshotKind::Lineups => self.lineup_interval_secs,
            SnapshotKind::Incidents => self.incident_interval_secs,
            SnapshotKind::Odds => self.odds_interval_secs,
        };
        Duration::from_secs(secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
