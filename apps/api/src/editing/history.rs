//! Per-entry bullet history backing single-step undo of generations.

use crate::models::ExperienceEntry;

/// Depth of the undo history kept per experience entry. Older bullet sets are
/// dropped for good.
pub const MAX_GENERATIONS: usize = 3;

/// Pushes the entry's current bullets onto the front of its history and
/// installs `new_bullets` as the current set.
pub fn record_and_replace(entry: &ExperienceEntry, new_bullets: Vec<String>) -> ExperienceEntry {
    let mut generations = Vec::with_capacity(MAX_GENERATIONS);
    generations.push(entry.bullets.clone());
    generations.extend(
        entry
            .generations
            .iter()
            .take(MAX_GENERATIONS - 1)
            .cloned(),
    );

    ExperienceEntry {
        bullets: new_bullets,
        generations,
        ..entry.clone()
    }
}

/// Restores the most recent bullet set from history. With an empty history the
/// entry comes back unchanged.
pub fn undo(entry: &ExperienceEntry) -> ExperienceEntry {
    match entry.generations.split_first() {
        Some((latest, rest)) => ExperienceEntry {
            bullets: latest.clone(),
            generations: rest.to_vec(),
            ..entry.clone()
        },
        None => entry.clone(),
    }
}

pub fn can_undo(entry: &ExperienceEntry) -> bool {
    !entry.generations.is_empty()
}
