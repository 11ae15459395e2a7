// core/recommend.rs
// Recommendations - unassigned associates for an open slot

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

use crate::day::DayRecord;

/// Associates known for the day who hold no slot yet, in random order.
///
/// The slot does not narrow the list today; every open slot gets the same
/// pool, shuffled independently.
pub fn recommend<R: Rng + ?Sized>(day: &DayRecord, _slot: &str, rng: &mut R) -> Vec<String> {
    let assigned = day.assigned_associates();
    let mut pool: Vec<String> = day
        .associates
        .iter()
        .filter(|name| !assigned.contains(name.as_str()))
        .cloned()
        .collect();
    pool.shuffle(rng);
    pool
}

/// Recommendation list for every slot on the day, keyed by slot identifier.
pub fn recommend_all<R: Rng + ?Sized>(day: &DayRecord, rng: &mut R) -> BTreeMap<String, Vec<String>> {
    day.slots
        .iter()
        .map(|s| (s.slot.clone(), recommend(day, &s.slot, rng)))
        .collect()
}
