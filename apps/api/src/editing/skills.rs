use std::collections::HashSet;

/// Order-preserving union of two skill lists. The first occurrence of a skill
/// wins; comparison is exact.
pub fn merge_skills(existing: &[String], incoming: &[String]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(existing.len() + incoming.len());
    existing
        .iter()
        .chain(incoming)
        .filter(|skill| seen.insert(skill.as_str()))
        .cloned()
        .collect()
}
