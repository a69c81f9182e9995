//! Snapshot persistence for detector state
//!
//! Serializes baselines and window history to a JSON document so a
//! restarted engine resumes with warm statistics. The document shape is
//! stable: external baseline-seeding tools produce the same format.
//! Persistence failures are always recoverable; the engine keeps running
//! from cold or unchanged in-memory state.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::models::BaselineStat;

/// Engine parameters recorded alongside the persisted state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub window_size: usize,
    pub threshold: f64,
    pub ewma_alpha: f64,
}

/// Persisted detector state.
///
/// `history` holds each metric's window contents most-recent-last; on
/// load, windows are rebuilt from at most the last `window_size` values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub baseline: BTreeMap<String, BaselineStat>,
    pub history: BTreeMap<String, Vec<f64>>,
    pub updated_at: DateTime<Utc>,
    pub metadata: SnapshotMetadata,
}

/// Write a snapshot to disk, creating missing parent directories.
pub fn save_snapshot(snapshot: &Snapshot, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating snapshot directory {}", parent.display()))?;
        }
    }

    let json = serde_json::to_string_pretty(snapshot).context("serializing snapshot")?;
    fs::write(path, json)
        .with_context(|| format!("writing snapshot to {}", path.display()))?;

    debug!(path = %path.display(), metrics = snapshot.baseline.len(), "saved snapshot");
    Ok(())
}

/// Read a snapshot from disk.
///
/// A missing file is a normal cold start, not an error. Malformed content
/// is logged and treated as cold so a corrupt file never takes the engine
/// down.
pub fn load_snapshot(path: &Path) -> Option<Snapshot> {
    if !path.exists() {
        info!(path = %path.display(), "no snapshot found, building baseline from incoming data");
        return None;
    }

    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read snapshot, starting cold");
            return None;
        }
    };

    match serde_json::from_str::<Snapshot>(&contents) {
        Ok(snapshot) => {
            info!(
                path = %path.display(),
                metrics = snapshot.baseline.len(),
                "loaded baseline snapshot"
            );
            Some(snapshot)
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "malformed snapshot, starting cold");
            None
        }
    }
}
