//! /health Endpoint
//!
//! Reports:
//! - Build info
//! - Board size (days tracked, positions, slots per new day)
//! - Storage health (data file present, data directory writable)
//! - Overall verdict

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::AppState;

// ============================================================================
// Health Response Types
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthVerdict,
    pub service: String,
    pub version: String,
    pub days_tracked: usize,
    pub positions: usize,
    /// Slots a day created now would get
    pub slots_per_day: usize,
    pub storage: StorageHealth,
    pub uptime_seconds: i64,
    pub checked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageHealth {
    pub data_file: String,
    pub data_file_exists: bool,
    pub writable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthVerdict {
    Ok,
    /// Serving, but mutations will fail to persist
    Degraded,
}

// ============================================================================
// Checks
// ============================================================================

pub async fn check_health(state: &AppState) -> HealthResponse {
    let (days_tracked, positions, slots_per_day) = {
        let board = state.board.read().await;
        (
            board.day_count(),
            board.catalog().len(),
            board.catalog().slot_total(),
        )
    };

    let data_dir = state
        .store
        .path()
        .parent()
        .unwrap_or_else(|| Path::new("."));
    let storage = check_storage_health(data_dir, state.store.path());

    let status = if storage.writable {
        HealthVerdict::Ok
    } else {
        HealthVerdict::Degraded
    };

    let now = Utc::now();
    HealthResponse {
        status,
        service: "Pack Labor Board".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        days_tracked,
        positions,
        slots_per_day,
        storage,
        uptime_seconds: (now - state.start_time).num_seconds(),
        checked_at: now,
    }
}

/// Probe the data directory by writing and removing a small file.
pub fn check_storage_health(data_dir: &Path, data_file: &Path) -> StorageHealth {
    let test_file = data_dir.join(".health_check_probe");
    let (writable, error) = match fs::write(&test_file, b"probe") {
        Ok(_) => {
            let _ = fs::remove_file(&test_file);
            (true, None)
        }
        Err(e) => (false, Some(format!("Data directory not writable: {}", e))),
    };

    StorageHealth {
        data_file: data_file.display().to_string(),
        data_file_exists: data_file.exists(),
        writable,
        error,
    }
}
