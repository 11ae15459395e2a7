// core/day.rs
// Day record - slot assignments, known associates, top performers for one date

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::catalog::PositionCatalog;

/// One assignable slot and who holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotAssignment {
    pub slot: String,
    #[serde(default)]
    pub associate: Option<String>,
}

impl SlotAssignment {
    pub fn open(slot: impl Into<String>) -> Self {
        Self {
            slot: slot.into(),
            associate: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.associate.is_none()
    }
}

/// Associate highlighted from the uploaded performance column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopPerformer {
    pub name: String,
    /// Rows rated High for this associate in the upload.
    #[serde(default)]
    pub high_ratings: u32,
}

/// Full labor-board state for one calendar date.
///
/// Slots are fixed when the record is created (or reset by a roster upload).
/// Later catalog edits do not reach existing records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayRecord {
    #[serde(default)]
    pub slots: Vec<SlotAssignment>,
    #[serde(default)]
    pub associates: Vec<String>,
    #[serde(default)]
    pub top_performers: Vec<TopPerformer>,
}

impl DayRecord {
    pub fn empty(catalog: &PositionCatalog) -> Self {
        let mut day = Self::default();
        day.reset_slots(catalog);
        day
    }

    /// Replace every slot with the catalog's current expansion, all open.
    pub fn reset_slots(&mut self, catalog: &PositionCatalog) {
        self.slots = catalog
            .expand()
            .into_iter()
            .map(SlotAssignment::open)
            .collect();
    }

    pub fn slot(&self, slot: &str) -> Option<&SlotAssignment> {
        self.slots.iter().find(|s| s.slot == slot)
    }

    pub fn has_slot(&self, slot: &str) -> bool {
        self.slot(slot).is_some()
    }

    /// Overwrite a slot. A blank associate clears it.
    ///
    /// Returns false when the slot is not part of this day.
    pub fn assign(&mut self, slot: &str, associate: &str) -> bool {
        let Some(target) = self.slots.iter_mut().find(|s| s.slot == slot) else {
            return false;
        };
        let associate = associate.trim();
        target.associate = if associate.is_empty() {
            None
        } else {
            Some(associate.to_string())
        };
        true
    }

    /// Everyone currently holding a slot on this day.
    pub fn assigned_associates(&self) -> HashSet<&str> {
        self.slots
            .iter()
            .filter_map(|s| s.associate.as_deref())
            .collect()
    }

    pub fn open_slot_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_open()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> PositionCatalog {
        PositionCatalog::new([("Packer", 2), ("DropZone", 1)])
    }

    #[test]
    fn test_empty_day_has_open_slots() {
        let day = DayRecord::empty(&catalog());
        let slots: Vec<_> = day.slots.iter().map(|s| s.slot.as_str()).collect();
        assert_eq!(slots, vec!["Packer 1", "Packer 2", "DropZone"]);
        assert_eq!(day.open_slot_count(), 3);
        assert!(day.associates.is_empty());
        assert!(day.top_performers.is_empty());
    }

    #[test]
    fn test_assign_and_clear() {
        let mut day = DayRecord::empty(&catalog());
        assert!(day.assign("Packer 1", "Alice"));
        assert_eq!(
            day.slot("Packer 1").and_then(|s| s.associate.as_deref()),
            Some("Alice")
        );
        assert!(day.assigned_associates().contains("Alice"));

        assert!(day.assign("Packer 1", "  "));
        assert!(day.slot("Packer 1").map(|s| s.is_open()).unwrap_or(false));
        assert!(day.assigned_associates().is_empty());
    }

    #[test]
    fn test_assign_unknown_slot() {
        let mut day = DayRecord::empty(&catalog());
        assert!(!day.assign("Packer 3", "Alice"));
        assert!(day.assigned_associates().is_empty());
    }

    #[test]
    fn test_reset_discards_assignments() {
        let mut day = DayRecord::empty(&catalog());
        day.assign("DropZone", "Bob");
        day.reset_slots(&catalog());
        assert_eq!(day.open_slot_count(), 3);
    }

    #[test]
    fn test_catalog_change_does_not_migrate() {
        let mut catalog = catalog();
        let day = DayRecord::empty(&catalog);
        catalog
            .adjust_count("Packer", crate::catalog::CountAction::Add)
            .unwrap();
        assert!(!day.has_slot("Packer 3"));
        assert_eq!(day.slots.len(), 3);
    }
}
