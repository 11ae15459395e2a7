// core/catalog.rs
// Position catalog - position names, replica counts, slot expansion

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CatalogError;

/// One catalog line: a position and how many slots it has on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionEntry {
    pub name: String,
    pub count: u32,
}

/// Direction of a count adjustment requested from the board UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountAction {
    Add,
    Remove,
}

impl CountAction {
    pub fn parse(s: &str) -> Result<Self, CatalogError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "add" => Ok(CountAction::Add),
            "remove" => Ok(CountAction::Remove),
            other => Err(CatalogError::UnknownAction {
                action: other.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CountAction::Add => "add",
            CountAction::Remove => "remove",
        }
    }
}

impl fmt::Display for CountAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered set of positions and their replica counts.
///
/// Order matters: it drives the slot order on every day record created from
/// this catalog, so the catalog serializes as a list rather than a map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<PositionEntry>", into = "Vec<PositionEntry>")]
pub struct PositionCatalog {
    entries: Vec<PositionEntry>,
}

impl From<Vec<PositionEntry>> for PositionCatalog {
    fn from(entries: Vec<PositionEntry>) -> Self {
        Self::new(entries.into_iter().map(|e| (e.name, e.count)))
    }
}

impl From<PositionCatalog> for Vec<PositionEntry> {
    fn from(catalog: PositionCatalog) -> Self {
        catalog.entries
    }
}

const PACK_POSITIONS: &[(&str, u32)] = &[
    ("Taper", 8),
    ("WaterSpider", 8),
    ("Packer", 9),
    ("Problem Solve", 2),
    ("Process Assistant", 4),
    ("Process Guide", 2),
    ("Kickout", 3),
    ("Jam Clearer", 2),
    ("DropZone", 1),
    ("Cart Runner", 1),
    ("Box On Demand Line 1 - Loader", 1),
    ("Box On Demand Line 1 - Operator", 1),
    ("Box On Demand Line 1 - Assembler", 2),
    ("Box On Demand Line 1 - Slam", 1),
    ("Box On Demand Line 2 - Loader", 1),
    ("Box On Demand Line 2 - Operator", 1),
    ("Box On Demand Line 2 - Assembler", 2),
    ("Box On Demand Line 2 - Slam", 1),
    ("Gift Wrap", 2),
    ("SIOC Slam", 5),
    ("Rebin", 3),
];

impl PositionCatalog {
    /// Build a catalog from `(name, count)` pairs. Counts below 1 are raised
    /// to 1 and repeated names keep their first occurrence.
    pub fn new<I, S>(positions: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut entries: Vec<PositionEntry> = Vec::new();
        for (name, count) in positions {
            let name = name.into();
            if entries.iter().any(|e| e.name == name) {
                continue;
            }
            entries.push(PositionEntry {
                name,
                count: count.max(1),
            });
        }
        Self { entries }
    }

    /// The pack department's standard layout.
    pub fn pack_default() -> Self {
        Self::new(PACK_POSITIONS.iter().copied())
    }

    pub fn entries(&self) -> &[PositionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, name: &str) -> Option<u32> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.count)
    }

    /// Total number of slots the catalog expands to.
    pub fn slot_total(&self) -> usize {
        self.entries.iter().map(|e| e.count as usize).sum()
    }

    /// Flatten the catalog into slot identifiers.
    ///
    /// A position with count 1 yields its bare name; count n > 1 yields
    /// `"<name> 1"` through `"<name> n"`. Ordering follows the catalog.
    pub fn expand(&self) -> Vec<String> {
        let mut slots = Vec::with_capacity(self.slot_total());
        for entry in &self.entries {
            if entry.count == 1 {
                slots.push(entry.name.clone());
            } else {
                for i in 1..=entry.count {
                    slots.push(format!("{} {}", entry.name, i));
                }
            }
        }
        slots
    }

    /// Apply an add/remove to one position and return its new count.
    ///
    /// Add fails only once a count can no longer grow. Remove never takes
    /// a count below 1.
    pub fn adjust_count(&mut self, name: &str, action: CountAction) -> Result<u32, CatalogError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.name == name)
            .ok_or_else(|| CatalogError::UnknownPosition {
                name: name.to_string(),
            })?;

        match action {
            CountAction::Add => {
                entry.count = entry
                    .count
                    .checked_add(1)
                    .ok_or_else(|| CatalogError::AtMaximum {
                        name: name.to_string(),
                    })?;
            }
            CountAction::Remove => {
                if entry.count <= 1 {
                    return Err(CatalogError::AtMinimum {
                        name: name.to_string(),
                    });
                }
                entry.count -= 1;
            }
        }
        Ok(entry.count)
    }
}

impl Default for PositionCatalog {
    fn default() -> Self {
        Self::pack_default()
    }
}
