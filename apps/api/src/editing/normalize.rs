//! Document-wide invariants, re-established whenever a whole value is
//! installed from outside: a path edit, an import, or a restore from storage.
//!
//! - each entry's `generations` holds at most `MAX_GENERATIONS` bullet sets;
//! - `skills` has no duplicates;
//! - entry ids are non-empty and unique across the document.

use std::collections::HashSet;

use tracing::warn;

use crate::editing::history::MAX_GENERATIONS;
use crate::editing::path::{EditError, FieldPath, PathSegment};
use crate::editing::skills::merge_skills;
use crate::models::resume::new_entry_id;
use crate::models::ResumeDocument;

const ENTRY_LISTS: [&str; 2] = ["experience", "education"];

pub fn normalize(mut document: ResumeDocument) -> ResumeDocument {
    document.skills = merge_skills(&document.skills, &[]);

    for entry in &mut document.experience {
        entry.generations.truncate(MAX_GENERATIONS);
    }

    let mut seen = HashSet::new();
    let ids = document
        .experience
        .iter_mut()
        .map(|e| &mut e.id)
        .chain(document.education.iter_mut().map(|e| &mut e.id));
    for id in ids {
        if id.is_empty() || !seen.insert(id.clone()) {
            let fresh = new_entry_id();
            warn!(old_id = %id, new_id = %fresh, "Replacing empty or duplicate entry id");
            *id = fresh.clone();
            seen.insert(fresh);
        }
    }

    document
}

/// Entry ids are assigned on creation and never edited. Rejects paths that
/// end at an entry's `id`, e.g. `experience.1.id`.
pub fn reject_entry_id_edit(path: &FieldPath) -> Result<(), EditError> {
    match path.segments() {
        [PathSegment::Field(list), PathSegment::Index(_), PathSegment::Field(field)]
            if ENTRY_LISTS.contains(&list.as_str()) && field == "id" =>
        {
            Err(EditError::malformed(path.as_str(), "entry ids cannot be edited"))
        }
        _ => Ok(()),
    }
}

/// After a whole entry was replaced through `experience.N` or `education.N`,
/// puts the original id back on it.
pub fn keep_entry_id(before: &ResumeDocument, after: &mut ResumeDocument, path: &FieldPath) {
    let [PathSegment::Field(list), PathSegment::Index(i)] = path.segments() else {
        return;
    };
    let i = *i;
    match list.as_str() {
        "experience" => {
            if let (Some(old), Some(new)) = (before.experience.get(i), after.experience.get_mut(i)) {
                new.id = old.id.clone();
            }
        }
        "education" => {
            if let (Some(old), Some(new)) = (before.education.get(i), after.education.get_mut(i)) {
                new.id = old.id.clone();
            }
        }
        _ => {}
    }
}
