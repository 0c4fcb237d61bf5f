//! Deterministic task extraction from captured text.
//!
//! Used whenever the remote path is unavailable or returns nothing usable, so
//! it must never fail: odd input only yields fewer candidates.

use crate::dates::find_due_date;
use crate::types::{CaptureKind, CapturedItem, Priority, PriorityKeywordSet, TaskCandidate};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

/// Titles shorter than this many characters are too vague to keep.
pub const MIN_TITLE_CHARS: usize = 5;

/// A sentence ends at terminal punctuation followed by whitespace, or at line end.
const END: &str = r"(?:[.!?](?:\s|$)|$)";

struct TaskPattern {
    name: &'static str,
    regex: Regex,
}

fn pattern(name: &'static str, body: &str) -> TaskPattern {
    TaskPattern {
        name,
        regex: Regex::new(&format!("(?im){body}{END}")).expect("valid task regex"),
    }
}

/// Ordered: when two matches overlap, the earlier pattern keeps the text.
static TASK_PATTERNS: Lazy<Vec<TaskPattern>> = Lazy::new(|| {
    vec![
        pattern("marker", r"\b(?:todo|to-do|task|action item):\s*(.+?)"),
        pattern("request", r"\b(?:please|pls|kindly)\s+(.+?)"),
        pattern("obligation", r"\b(?:need to|should|must|have to)\s+(.+?)"),
        pattern(
            "reminder",
            r"\b(?:don['’]t forget to|do not forget to|remember to)\s+(.+?)",
        ),
        pattern("assignment", r"\b(?:assigned to you|your task):\s*(.+?)"),
        pattern("permission", r"\b(?:can you|could you)\s+(.+?)"),
        pattern("collective", r"\bwe (?:need|should)\s+(?:to\s+)?(.+?)"),
        pattern("suggestion", r"\blet['’]s\s+(.+?)"),
        pattern("remind", r"\b(?:reminder\b:?|remind me to)\s*(.+?)"),
        pattern("follow_up", r"\b(follow up on\s+.+?)"),
        pattern("completion", r"\b((?:work on|complete|finish)\s+.+?)"),
        pattern(
            "urgent_sentence",
            r"(?:^|[.!?]\s+)((?-i:[A-Z])[^.!?\n]*\b(?:urgent|asap|immediately|critical)\b[^.!?\n]*?)",
        ),
    ]
});

static BULLET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*[-*+•][ \t]+(.+?)[ \t]*$").expect("valid bullet regex"));

/// Extract candidates from every OCR item with text.
pub fn extract_patterns(
    items: &[CapturedItem],
    keywords: &PriorityKeywordSet,
) -> Vec<TaskCandidate> {
    items
        .iter()
        .filter(|item| item.kind == CaptureKind::Ocr && !item.text.trim().is_empty())
        .flat_map(|item| extract_item(item, keywords))
        .collect()
}

fn extract_item(item: &CapturedItem, keywords: &PriorityKeywordSet) -> Vec<TaskCandidate> {
    let titles = find_titles(&item.text);
    if titles.is_empty() {
        return Vec::new();
    }

    let priority = classify_priority(&item.text, keywords);
    let due_date = find_due_date(&item.text);
    titles
        .into_iter()
        .filter_map(|title| TaskCandidate::new(&title, &item.text, item.source_label()))
        .map(|mut candidate| {
            candidate.priority = priority;
            candidate.due_date = due_date;
            candidate.source_url = item.browser_url.clone();
            candidate.screenshot = item.frame_reference.clone();
            candidate
        })
        .collect()
}

/// Task phrases in `text`, in reading order.
///
/// Each pattern may match several sentences. A title overlapping one already
/// taken is dropped, so one phrase never yields two titles. Bulleted lines are
/// scanned afterwards under the same overlap rule.
pub fn find_titles(text: &str) -> Vec<String> {
    let mut taken: Vec<(Range<usize>, String)> = Vec::new();

    for task_pattern in TASK_PATTERNS.iter() {
        let mut start = 0;
        while start <= text.len() {
            let Some(caps) = task_pattern.regex.captures_at(text, start) else {
                break;
            };
            let (Some(whole), Some(group)) = (caps.get(0), caps.get(1)) else {
                break;
            };
            // Resume at the title's end so a sentence terminator can open the next match.
            start = if group.end() > start {
                group.end()
            } else {
                next_boundary(text, whole.end().max(start))
            };
            let title = group.as_str().trim();
            if title.chars().count() < MIN_TITLE_CHARS || overlaps_any(&taken, &group.range()) {
                continue;
            }
            tracing::trace!(pattern = task_pattern.name, title, "pattern match");
            taken.push((group.range(), title.to_string()));
        }
    }

    for caps in BULLET_RE.captures_iter(text) {
        let (Some(whole), Some(group)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let title = group.as_str().trim();
        if title.chars().count() < MIN_TITLE_CHARS || overlaps_any(&taken, &whole.range()) {
            continue;
        }
        taken.push((whole.range(), title.to_string()));
    }

    taken.sort_by_key(|(range, _)| range.start);
    taken.into_iter().map(|(_, title)| title).collect()
}

fn next_boundary(text: &str, from: usize) -> usize {
    match text[from..].chars().next() {
        Some(ch) => from + ch.len_utf8(),
        None => text.len() + 1,
    }
}

fn overlaps_any(taken: &[(Range<usize>, String)], range: &Range<usize>) -> bool {
    taken
        .iter()
        .any(|(existing, _)| existing.start < range.end && range.start < existing.end)
}

/// Classify by keyword presence anywhere in `text`; high beats low, else medium.
pub fn classify_priority(text: &str, keywords: &PriorityKeywordSet) -> Priority {
    let lowered = text.to_lowercase();
    let hit = |priority: Priority| {
        keywords
            .terms(priority)
            .iter()
            .any(|term| lowered.contains(term.as_str()))
    };
    if hit(Priority::High) {
        Priority::High
    } else if hit(Priority::Low) {
        Priority::Low
    } else {
        Priority::Medium
    }
}
