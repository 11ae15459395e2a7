// core/roster.rs
// Roster uploads - header validation, date grouping, top performer selection
//
// File decoding lives in the server crate. This module only sees a header
// row and string cells.

use chrono::{NaiveDate, NaiveDateTime};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::{BTreeMap, HashMap};

use crate::day::TopPerformer;
use crate::error::RosterError;

pub const DATE_COLUMN: &str = "Date";
pub const ASSOCIATE_COLUMN: &str = "Associate Name";
pub const PERFORMANCE_COLUMN: &str = "Performance";

pub const REQUIRED_COLUMNS: [&str; 3] = [DATE_COLUMN, ASSOCIATE_COLUMN, PERFORMANCE_COLUMN];

/// Performance value that marks a row as a high performer.
pub const HIGH_PERFORMANCE: &str = "High";

/// Maximum number of highlighted associates per day.
pub const TOP_PERFORMER_LIMIT: usize = 3;

/// Date formats accepted from uploads, normalized to `%Y-%m-%d`.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Decoded upload: trimmed headers plus raw string rows.
#[derive(Debug, Clone, Default)]
pub struct RosterTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

/// One roster line for a date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub associate: String,
    pub performance: String,
}

impl RosterEntry {
    pub fn is_high(&self) -> bool {
        self.performance.eq_ignore_ascii_case(HIGH_PERFORMANCE)
    }
}

/// All roster lines that share a date.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterDay {
    pub date: String,
    pub entries: Vec<RosterEntry>,
}

/// Roster rows grouped by normalized date.
#[derive(Debug, Clone, Default)]
pub struct RosterBatch {
    days: BTreeMap<String, RosterDay>,
    skipped_rows: usize,
}

impl RosterTable {
    /// Headers are trimmed; a UTF-8 byte order mark on the first one is dropped.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let headers = headers
            .into_iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Names of required columns absent from the header row.
    pub fn missing_columns(&self) -> Vec<String> {
        REQUIRED_COLUMNS
            .iter()
            .filter(|c| self.column(c).is_none())
            .map(|c| c.to_string())
            .collect()
    }

    /// Validate the header row and group rows by date.
    ///
    /// Rows with a blank date or a blank associate name are skipped and
    /// counted in [`RosterBatch::skipped_rows`].
    pub fn into_batch(self) -> Result<RosterBatch, RosterError> {
        let (Some(date_idx), Some(name_idx), Some(perf_idx)) = (
            self.column(DATE_COLUMN),
            self.column(ASSOCIATE_COLUMN),
            self.column(PERFORMANCE_COLUMN),
        ) else {
            return Err(RosterError::MissingColumns(self.missing_columns()));
        };

        let mut batch = RosterBatch::default();
        for row in &self.rows {
            let cell = |idx: usize| row.get(idx).map(|c| c.trim()).unwrap_or("");

            let associate = cell(name_idx);
            let Some(date) = normalize_date(cell(date_idx)) else {
                batch.skipped_rows += 1;
                continue;
            };
            if associate.is_empty() {
                batch.skipped_rows += 1;
                continue;
            }

            batch
                .days
                .entry(date.clone())
                .or_insert_with(|| RosterDay {
                    date,
                    entries: Vec::new(),
                })
                .entries
                .push(RosterEntry {
                    associate: associate.to_string(),
                    performance: cell(perf_idx).to_string(),
                });
        }
        Ok(batch)
    }
}

impl RosterDay {
    /// Distinct associate names in first-seen order.
    pub fn associates(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for entry in &self.entries {
            if !names.contains(&entry.associate) {
                names.push(entry.associate.clone());
            }
        }
        names
    }

    /// Pick up to three associates rated High, at random.
    ///
    /// Each pick carries the number of High rows it had. The result is a
    /// highlight list and its order carries no meaning.
    pub fn top_performers<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<TopPerformer> {
        let mut order: Vec<&str> = Vec::new();
        let mut counts: HashMap<&str, u32> = HashMap::new();
        for entry in self.entries.iter().filter(|e| e.is_high()) {
            let count = counts.entry(entry.associate.as_str()).or_insert(0);
            if *count == 0 {
                order.push(entry.associate.as_str());
            }
            *count += 1;
        }

        order.shuffle(rng);
        order
            .into_iter()
            .take(TOP_PERFORMER_LIMIT)
            .map(|name| TopPerformer {
                name: name.to_string(),
                high_ratings: counts.get(name).copied().unwrap_or(0),
            })
            .collect()
    }
}

impl RosterBatch {
    pub fn days(&self) -> impl Iterator<Item = &RosterDay> {
        self.days.values()
    }

    pub fn dates(&self) -> Vec<String> {
        self.days.keys().cloned().collect()
    }

    pub fn get(&self, date: &str) -> Option<&RosterDay> {
        self.days.get(date)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }
}

/// Normalize an uploaded date cell to `YYYY-MM-DD`.
///
/// Unrecognized text is kept as-is (trimmed) so it still groups. Blank
/// cells yield `None`.
pub fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(date.format("%Y-%m-%d").to_string());
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date().format("%Y-%m-%d").to_string());
        }
    }
    Some(raw.to_string())
}
