//! Pack Labor Board Server Library
//!
//! Exposes the router, shared state and ingestion helpers for in-process
//! testing. The `labor-board` binary wires these to a TCP listener.

pub mod api;
pub mod config;
pub mod health;
pub mod ingest;
pub mod view;

use chrono::{DateTime, Utc};
use labor_board_core::{BoardStore, LaborBoard};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

pub use api::{build_router, Status, StatusMessage, MAX_UPLOAD_BYTES};
pub use config::ServerConfig;
pub use health::{check_health, HealthResponse, HealthVerdict, StorageHealth};
pub use ingest::{parse_roster, read_roster, IngestError, RosterFormat, UploadArtifact};
pub use view::{render_board, BoardPage};

// ============================================================================
// Application State
// ============================================================================

/// Shared server state.
///
/// The board sits behind a single async RwLock. Every mutation takes the
/// write lock, changes the board and saves it before releasing, so
/// concurrent requests cannot interleave their writes to the store file.
pub struct AppState {
    pub board: RwLock<LaborBoard>,
    pub store: BoardStore,
    pub upload_dir: PathBuf,
    pub start_time: DateTime<Utc>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(board: LaborBoard, store: BoardStore, upload_dir: PathBuf) -> Self {
        Self {
            board: RwLock::new(board),
            store,
            upload_dir,
            start_time: Utc::now(),
        }
    }

    /// Create the data directories and load the persisted board.
    pub fn open(config: &ServerConfig) -> std::io::Result<SharedState> {
        std::fs::create_dir_all(&config.data_dir)?;
        let upload_dir = config.upload_dir();
        std::fs::create_dir_all(&upload_dir)?;

        let store = BoardStore::new(config.store_path());
        let board = store.load();
        Ok(Arc::new(Self::new(board, store, upload_dir)))
    }
}
