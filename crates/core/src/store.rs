// core/store.rs
// Board persistence - one JSON document, rewritten whole with an atomic rename

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::board::LaborBoard;
use crate::catalog::PositionCatalog;
use crate::day::DayRecord;
use crate::error::StoreError;

pub const STORE_VERSION: u32 = 1;

/// On-disk shape of the board.
#[derive(Debug, Deserialize)]
struct BoardDocument {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    catalog: Option<PositionCatalog>,
    #[serde(default)]
    days: BTreeMap<String, DayRecord>,
}

#[derive(Serialize)]
struct BoardDocumentRef<'a> {
    version: u32,
    catalog: &'a PositionCatalog,
    days: &'a BTreeMap<String, DayRecord>,
}

fn default_version() -> u32 {
    STORE_VERSION
}

/// File-backed home of the labor board.
#[derive(Debug, Clone)]
pub struct BoardStore {
    path: PathBuf,
}

impl BoardStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the board, falling back to a fresh pack board.
    ///
    /// A missing file is a first run. An unreadable or unparsable file is
    /// logged and replaced in memory by an empty board; the bad file stays
    /// on disk until the next save overwrites it.
    pub fn load(&self) -> LaborBoard {
        match self.try_load() {
            Ok(Some(board)) => {
                tracing::info!(
                    "Loaded labor board from {:?} ({} days)",
                    self.path,
                    board.day_count()
                );
                board
            }
            Ok(None) => {
                tracing::info!("No labor board at {:?}, starting blank", self.path);
                LaborBoard::default()
            }
            Err(e) => {
                tracing::warn!(
                    "Labor board file {:?} is corrupted ({}). Starting with a blank board.",
                    self.path,
                    e
                );
                LaborBoard::default()
            }
        }
    }

    /// Strict load: `Ok(None)` when the file does not exist.
    pub fn try_load(&self) -> Result<Option<LaborBoard>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let doc: BoardDocument = serde_json::from_str(&content)?;
        if doc.version > STORE_VERSION {
            tracing::warn!(
                "Labor board file {:?} has version {}, newer than {}",
                self.path,
                doc.version,
                STORE_VERSION
            );
        }
        Ok(Some(LaborBoard {
            catalog: doc.catalog.unwrap_or_default(),
            days: doc.days,
        }))
    }

    /// Write the whole board: temp file first, then rename over the target.
    pub fn save(&self, board: &LaborBoard) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let doc = BoardDocumentRef {
            version: STORE_VERSION,
            catalog: &board.catalog,
            days: &board.days,
        };
        let content = serde_json::to_string_pretty(&doc)?;
        let tmp_file = self.path.with_extension("json.tmp");
        fs::write(&tmp_file, content)?;
        fs::rename(&tmp_file, &self.path)?;
        tracing::debug!("Saved labor board to {:?}", self.path);
        Ok(())
    }
}
