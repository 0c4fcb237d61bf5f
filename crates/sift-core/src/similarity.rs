use std::collections::HashSet;

/// Threshold the deduplicator uses when comparing candidate titles.
pub const DEDUPE_THRESHOLD: f64 = 0.8;

/// Shared words shorter than this many characters do not count as evidence.
const MIN_SHARED_WORD_CHARS: usize = 4;

/// Cheap approximate title match over pre-normalized strings.
///
/// Rejects on relative length difference first, accepts on containment, and
/// otherwise compares the share of distinct words (longer than three
/// characters) that both strings contain against the longer word count.
pub fn is_similar(a: &str, b: &str, threshold: f64) -> bool {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    let longest = len_a.max(len_b);
    if longest == 0 {
        return true;
    }

    let length_gap = len_a.abs_diff(len_b) as f64 / longest as f64;
    if length_gap > 1.0 - threshold {
        return false;
    }

    if a.contains(b) || b.contains(a) {
        return true;
    }

    let words_a: Vec<&str> = a.split_whitespace().collect();
    let words_b: Vec<&str> = b.split_whitespace().collect();
    let word_total = words_a.len().max(words_b.len());
    if word_total == 0 {
        return false;
    }

    let set_a: HashSet<&str> = words_a
        .iter()
        .copied()
        .filter(|word| word.chars().count() >= MIN_SHARED_WORD_CHARS)
        .collect();
    let set_b: HashSet<&str> = words_b.into_iter().collect();
    let shared = set_a.intersection(&set_b).count();

    shared as f64 / word_total as f64 >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_match() {
        assert!(is_similar("review the report", "review the report", DEDUPE_THRESHOLD));
        assert!(is_similar("", "", DEDUPE_THRESHOLD));
    }

    #[test]
    fn length_gap_rejects_before_containment() {
        // "review" is contained, but the length gap is far above 20%.
        assert!(!is_similar("review", "review the quarterly report", DEDUPE_THRESHOLD));
    }

    #[test]
    fn containment_within_length_budget_matches() {
        assert!(is_similar(
            "send the invoice today",
            "send the invoice today!",
            DEDUPE_THRESHOLD
        ));
    }

    #[test]
    fn shared_long_words_count() {
        // 4 of 5 words are shared and long enough: 0.8.
        assert!(is_similar(
            "review quarterly budget report draft",
            "review quarterly budget report final",
            DEDUPE_THRESHOLD
        ));
        // Short words never count, so "the" and "for" do not help.
        assert!(!is_similar(
            "call the bank for loan",
            "call the shop for food",
            DEDUPE_THRESHOLD
        ));
    }

    #[test]
    fn repeated_words_do_not_break_symmetry() {
        let a = "alpha alpha beta gamma";
        let b = "alpha delta omega gamma";
        assert_eq!(is_similar(a, b, 0.5), is_similar(b, a, 0.5));
        assert_eq!(is_similar(a, b, 0.25), is_similar(b, a, 0.25));
    }

    #[test]
    fn symmetric_over_samples() {
        let samples = [
            "",
            "ship release notes",
            "ship the release notes",
            "update project documentation",
            "update documentation for project",
            "fix navigation bug on mobile",
            "fix navigation bug",
        ];
        for a in samples {
            for b in samples {
                for threshold in [0.5, 0.8, 1.0] {
                    assert_eq!(
                        is_similar(a, b, threshold),
                        is_similar(b, a, threshold),
                        "{a:?} vs {b:?} at {threshold}"
                    );
                }
            }
        }
    }
}
