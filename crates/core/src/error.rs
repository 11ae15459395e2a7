/// Error taxonomy for the labor board
/// Lookup failures, catalog bounds, roster validation, store I/O
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("Unknown position: {name}")]
    UnknownPosition { name: String },

    #[error("{name} is already at one slot and cannot be removed")]
    AtMinimum { name: String },

    #[error("{name} is already at the largest slot count")]
    AtMaximum { name: String },

    #[error("Unknown action '{action}'. Use: add, remove")]
    UnknownAction { action: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("No board exists for {date}")]
    DayNotFound { date: String },

    #[error("Slot {slot} does not exist on {date}")]
    SlotNotFound { date: String, slot: String },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl BoardError {
    /// True for every "the thing you referenced is not there" variant.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            BoardError::DayNotFound { .. }
                | BoardError::SlotNotFound { .. }
                | BoardError::Catalog(CatalogError::UnknownPosition { .. })
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterError {
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
