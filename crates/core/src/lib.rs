pub mod board;
pub mod catalog;
pub mod day;
pub mod error;
pub mod recommend;
pub mod roster;
pub mod store;

pub use board::LaborBoard;
pub use catalog::{CountAction, PositionCatalog, PositionEntry};
pub use day::{DayRecord, SlotAssignment, TopPerformer};
pub use error::{BoardError, CatalogError, RosterError, StoreError};
pub use recommend::{recommend, recommend_all};
pub use roster::{normalize_date, RosterBatch, RosterDay, RosterEntry, RosterTable};
pub use store::BoardStore;
