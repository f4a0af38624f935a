use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod models;

/// The four published artifacts, one per pipeline variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum SnapshotKind {
    /// Bucketed scheduled matches
    Schedule,
    /// Bucketed matches with lineups attached
    Lineups,
    /// In-progress matches with their live incidents
    Incidents,
    /// 1X2 odds for in-progress and not-started matches
    Odds,
}

impl SnapshotKind {
    pub const ALL: [SnapshotKind; 4] = [
        SnapshotKind::Schedule,
        SnapshotKind::Lineups,
        SnapshotKind::Incidents,
        SnapshotKind::Odds,
    ];

    /// File name inside the output directory.
    pub fn file_name(self) -> &'static str {
        match self {
            SnapshotKind::Schedule => "foot.json",
            SnapshotKind::Lineups => "classements.json",
            SnapshotKind::Incidents => "evenements.json",
            SnapshotKind::Odds => "scores.json",
        }
    }
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SnapshotKind::Schedule => "schedule",
            SnapshotKind::Lineups => "lineups",
            SnapshotKind::Incidents => "incidents",
            SnapshotKind::Odds => "odds",
        };
        f.write_str(name)
    }
}

/// File-backed snapshot store shared by the pipelines (writers) and the
/// query server (reader). Cheap to clone.
#[derive(Clone)]
pub struct SnapshotStore {
    dir: Arc<PathBuf>,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        SnapshotStore {
            dir: Arc::new(dir.into()),
        }
    }

    pub fn path(&self, kind: SnapshotKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    /// Replace the snapshot of `kind` with `value`.
    ///
    /// The body is written to a sibling temp file first and renamed over the
    /// target, so readers only ever see a complete document.
    pub async fn publish<T: Serialize>(&self, kind: SnapshotKind, value: &T) -> Result<()> {
        tokio::fs::create_dir_all(self.dir.as_path())
            .await
            .with_context(|| format!("Failed to create output dir {}", self.dir.display()))?;

        let body = serde_json::to_string_pretty(value)
            .with_context(|| format!("Failed to serialize {} snapshot", kind))?;

        let path = self.path(kind);
        let tmp = tmp_path(&path);
        tokio::fs::write(&tmp, body)
            .await
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("Failed to replace {}", path.display()))?;
        Ok(())
    }

    /// Read back the last published snapshot. `Ok(None)` when nothing has
    /// been published yet.
    pub async fn read(&self, kind: SnapshotKind) -> Result<Option<Value>> {
        let path = self.path(kind);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };
        let value = serde_json::from_str(&raw)
            .with_context(|| format!("Corrupt snapshot {}", path.display()))?;
        Ok(Some(value))
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    path.with_extension("json.tmp")
}
