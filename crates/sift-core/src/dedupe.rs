use crate::similarity::{DEDUPE_THRESHOLD, is_similar};
use crate::types::TaskCandidate;
use std::collections::HashSet;

/// Drop candidates whose title matches, exactly or approximately, one kept earlier.
///
/// Order-preserving: the first occurrence of each task wins.
pub fn dedupe(candidates: Vec<TaskCandidate>) -> Vec<TaskCandidate> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut registry: Vec<String> = Vec::new();
    let mut kept = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let title = candidate.normalized_title();
        if seen.contains(&title)
            || registry
                .iter()
                .any(|existing| is_similar(&title, existing, DEDUPE_THRESHOLD))
        {
            continue;
        }
        seen.insert(title.clone());
        registry.push(title);
        kept.push(candidate);
    }

    kept
}
