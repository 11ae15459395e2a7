// core/board.rs
// Labor board - the catalog plus every day record, owned by the server state

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::catalog::{CountAction, PositionCatalog};
use crate::day::DayRecord;
use crate::error::BoardError;
use crate::roster::RosterBatch;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaborBoard {
    #[serde(default)]
    pub catalog: PositionCatalog,
    #[serde(default)]
    pub days: BTreeMap<String, DayRecord>,
}

impl LaborBoard {
    pub fn new(catalog: PositionCatalog) -> Self {
        Self {
            catalog,
            days: BTreeMap::new(),
        }
    }

    pub fn catalog(&self) -> &PositionCatalog {
        &self.catalog
    }

    pub fn get(&self, date: &str) -> Option<&DayRecord> {
        self.days.get(date)
    }

    pub fn contains(&self, date: &str) -> bool {
        self.days.contains_key(date)
    }

    pub fn dates(&self) -> impl Iterator<Item = &str> {
        self.days.keys().map(String::as_str)
    }

    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    /// Fetch the record for `date`, creating an empty one when absent.
    ///
    /// Side effect: a new record is inserted with open slots from the
    /// current catalog. The caller decides whether to persist it.
    pub fn get_or_create(&mut self, date: &str) -> &mut DayRecord {
        let catalog = &self.catalog;
        self.days
            .entry(date.to_string())
            .or_insert_with(|| DayRecord::empty(catalog))
    }

    /// Load a parsed roster into the board and return the dates it touched.
    ///
    /// Each date gets its associate list replaced, its top performers
    /// recomputed and its slots reset to open. Existing assignments for
    /// those dates are discarded.
    pub fn apply_roster<R: Rng + ?Sized>(&mut self, batch: &RosterBatch, rng: &mut R) -> Vec<String> {
        let mut touched = Vec::with_capacity(batch.len());
        for roster_day in batch.days() {
            let top_performers = roster_day.top_performers(rng);
            let catalog = &self.catalog;
            let day = self
                .days
                .entry(roster_day.date.clone())
                .or_insert_with(|| DayRecord::empty(catalog));
            day.associates = roster_day.associates();
            day.top_performers = top_performers;
            day.reset_slots(catalog);
            touched.push(roster_day.date.clone());
        }
        touched
    }

    /// Put `associate` in `slot` on `date`. Blank clears the slot.
    ///
    /// The date must already exist; assignment never creates a day.
    pub fn assign(&mut self, date: &str, slot: &str, associate: &str) -> Result<(), BoardError> {
        let day = self
            .days
            .get_mut(date)
            .ok_or_else(|| BoardError::DayNotFound {
                date: date.to_string(),
            })?;
        if !day.assign(slot, associate) {
            return Err(BoardError::SlotNotFound {
                date: date.to_string(),
                slot: slot.to_string(),
            });
        }
        Ok(())
    }

    /// Change a position's count. Existing day records keep their slots.
    pub fn adjust_catalog(&mut self, position: &str, action: CountAction) -> Result<u32, BoardError> {
        Ok(self.catalog.adjust_count(position, action)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CatalogError;
    use crate::roster::RosterTable;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn board() -> LaborBoard {
        LaborBoard::new(PositionCatalog::new([("Packer", 2), ("DropZone", 1)]))
    }

    fn roster(rows: &[(&str, &str, &str)]) -> RosterBatch {
        RosterTable::new(
            vec!["Date".into(), "Associate Name".into(), "Performance".into()],
            rows.iter()
                .map(|(d, a, p)| vec![d.to_string(), a.to_string(), p.to_string()])
                .collect(),
        )
        .into_batch()
        .unwrap()
    }

    #[test]
    fn test_get_or_create_inserts_once() {
        let mut board = board();
        assert!(!board.contains("2024-05-01"));
        board.get_or_create("2024-05-01").assign("DropZone", "Alice");
        assert!(board.contains("2024-05-01"));

        let day = board.get_or_create("2024-05-01");
        assert_eq!(
            day.slot("DropZone").and_then(|s| s.associate.as_deref()),
            Some("Alice")
        );
        assert_eq!(board.day_count(), 1);
    }

    #[test]
    fn test_assign_requires_existing_day() {
        let mut board = board();
        let err = board.assign("2024-05-01", "DropZone", "Alice").unwrap_err();
        assert!(matches!(err, BoardError::DayNotFound { .. }));
        assert!(err.is_not_found());
        assert!(!board.contains("2024-05-01"));
    }

    #[test]
    fn test_assign_requires_existing_slot() {
        let mut board = board();
        board.get_or_create("2024-05-01");
        let err = board.assign("2024-05-01", "Packer 9", "Alice").unwrap_err();
        assert!(matches!(err, BoardError::SlotNotFound { .. }));
    }

    #[test]
    fn test_roster_replaces_day_and_resets_slots() {
        let mut board = board();
        let mut rng = StdRng::seed_from_u64(5);

        board.apply_roster(
            &roster(&[("2024-05-01", "Alice", "High"), ("2024-05-01", "Bob", "")]),
            &mut rng,
        );
        board.assign("2024-05-01", "Packer 1", "Alice").unwrap();

        let touched = board.apply_roster(
            &roster(&[("2024-05-01", "Carol", "Low"), ("2024-05-02", "Dan", "High")]),
            &mut rng,
        );
        assert_eq!(touched, vec!["2024-05-01", "2024-05-02"]);

        let day = board.get("2024-05-01").unwrap();
        assert_eq!(day.associates, vec!["Carol"]);
        assert!(day.top_performers.is_empty());
        assert_eq!(day.open_slot_count(), 3);

        let next = board.get("2024-05-02").unwrap();
        assert_eq!(next.top_performers.len(), 1);
        assert_eq!(next.top_performers[0].name, "Dan");
    }

    #[test]
    fn test_roster_leaves_other_dates_alone() {
        let mut board = board();
        board.get_or_create("2024-04-30").assign("DropZone", "Eve");
        board.apply_roster(
            &roster(&[("2024-05-01", "Alice", "High")]),
            &mut StdRng::seed_from_u64(1),
        );
        assert_eq!(
            board
                .get("2024-04-30")
                .and_then(|d| d.slot("DropZone"))
                .and_then(|s| s.associate.as_deref()),
            Some("Eve")
        );
    }

    #[test]
    fn test_adjust_catalog_does_not_touch_days() {
        let mut board = board();
        board.get_or_create("2024-05-01");
        assert_eq!(board.adjust_catalog("Packer", CountAction::Add), Ok(3));
        assert_eq!(board.get("2024-05-01").unwrap().slots.len(), 3);
        assert_eq!(board.get_or_create("2024-05-02").slots.len(), 4);

        let err = board.adjust_catalog("DropZone", CountAction::Remove).unwrap_err();
        assert_eq!(
            err,
            BoardError::Catalog(CatalogError::AtMinimum {
                name: "DropZone".into()
            })
        );
        assert!(!err.is_not_found());
    }
}
