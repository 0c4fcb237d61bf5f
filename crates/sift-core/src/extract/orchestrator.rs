use super::strategy::{ExtractionStrategy, PatternStrategy};
use crate::dedupe::dedupe;
use crate::pattern::extract_patterns;
use crate::types::{CaptureKind, CapturedItem, PriorityKeywordSet, TaskCandidate};
use indexmap::IndexMap;
use std::thread;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    /// Combined group text is cut to this many characters before it is sent.
    pub max_group_chars: usize,
    /// Groups with less combined text than this are skipped.
    pub min_group_chars: usize,
    /// Run source groups on scoped threads; output order stays group order.
    pub parallel_groups: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_group_chars: 2000,
            min_group_chars: 20,
            parallel_groups: false,
        }
    }
}

/// Eligible captures sharing one source application.
#[derive(Debug, Clone)]
pub struct SourceGroup {
    pub source: String,
    pub items: Vec<CapturedItem>,
    /// Newline-joined item text, truncated to the request budget.
    pub text: String,
    /// Character count before truncation.
    pub full_chars: usize,
}

/// How one group was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupReport {
    pub source: String,
    pub items: usize,
    /// Name of the strategy that produced candidates, if any did.
    pub strategy: Option<&'static str>,
    pub candidates: usize,
    pub skipped: bool,
}

/// Result of one orchestrated extraction pass.
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub candidates: Vec<TaskCandidate>,
    pub groups: Vec<GroupReport>,
    pub last_resort: bool,
}

/// Group OCR captures by source label in first-seen order.
pub fn group_by_source(items: &[CapturedItem], max_chars: usize) -> Vec<SourceGroup> {
    let mut grouped: IndexMap<String, Vec<CapturedItem>> = IndexMap::new();
    for item in items {
        if item.kind != CaptureKind::Ocr || item.text.trim().is_empty() {
            continue;
        }
        grouped
            .entry(item.source_label().to_string())
            .or_default()
            .push(item.clone());
    }

    grouped
        .into_iter()
        .map(|(source, items)| {
            let combined = items
                .iter()
                .map(|item| item.text.as_str())
                .collect::<Vec<_>>()
                .join("\n");
            let full_chars = combined.chars().count();
            let text = truncate_chars(&combined, max_chars);
            SourceGroup {
                source,
                items,
                text,
                full_chars,
            }
        })
        .collect()
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Runs an ordered list of strategies per source group, then deduplicates.
pub struct Orchestrator {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
    options: ExtractOptions,
}

impl Orchestrator {
    pub fn new(strategies: Vec<Box<dyn ExtractionStrategy>>, options: ExtractOptions) -> Self {
        Self {
            strategies,
            options,
        }
    }

    /// Pattern extraction only, for offline runs.
    pub fn pattern_only(options: ExtractOptions) -> Self {
        Self::new(vec![Box::new(PatternStrategy)], options)
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Extract deduplicated candidates from already-filtered captures.
    ///
    /// Remote failures never escape: each group falls through its strategies,
    /// and an empty overall result triggers one ungrouped pattern pass.
    pub fn extract(
        &self,
        items: &[CapturedItem],
        keywords: &PriorityKeywordSet,
    ) -> Vec<TaskCandidate> {
        self.extract_detailed(items, keywords).candidates
    }

    pub fn extract_detailed(
        &self,
        items: &[CapturedItem],
        keywords: &PriorityKeywordSet,
    ) -> Extraction {
        let groups = group_by_source(items, self.options.max_group_chars);
        let outcomes = if self.options.parallel_groups && groups.len() > 1 {
            self.run_parallel(&groups, keywords)
        } else {
            groups
                .iter()
                .map(|group| self.run_group(group, keywords))
                .collect()
        };

        let mut candidates = Vec::new();
        let mut reports = Vec::with_capacity(groups.len());
        for (group, (report, found)) in groups.iter().zip(outcomes) {
            debug!(
                source = %group.source,
                strategy = report.strategy.unwrap_or("none"),
                candidates = found.len(),
                "source group resolved"
            );
            candidates.extend(found);
            reports.push(report);
        }

        let mut last_resort = false;
        if candidates.is_empty() && !items.is_empty() {
            last_resort = true;
            candidates = extract_patterns(items, keywords);
            if !candidates.is_empty() {
                warn!(
                    candidates = candidates.len(),
                    "no group produced tasks; used ungrouped pattern pass"
                );
            }
        }

        Extraction {
            candidates: dedupe(candidates),
            groups: reports,
            last_resort,
        }
    }

    fn run_group(
        &self,
        group: &SourceGroup,
        keywords: &PriorityKeywordSet,
    ) -> (GroupReport, Vec<TaskCandidate>) {
        let mut report = GroupReport {
            source: group.source.clone(),
            items: group.items.len(),
            strategy: None,
            candidates: 0,
            skipped: false,
        };
        if group.full_chars < self.options.min_group_chars {
            report.skipped = true;
            return (report, Vec::new());
        }

        for strategy in &self.strategies {
            if let Some(found) = strategy.extract(group, keywords)
                && !found.is_empty()
            {
                report.strategy = Some(strategy.name());
                report.candidates = found.len();
                return (report, found);
            }
        }
        (report, Vec::new())
    }

    fn run_parallel(
        &self,
        groups: &[SourceGroup],
        keywords: &PriorityKeywordSet,
    ) -> Vec<(GroupReport, Vec<TaskCandidate>)> {
        thread::scope(|scope| {
            let handles: Vec<_> = groups
                .iter()
                .map(|group| scope.spawn(move || self.run_group(group, keywords)))
                .collect();
            handles
                .into_iter()
                .zip(groups)
                .map(|(handle, group)| {
                    handle.join().unwrap_or_else(|_| {
                        warn!(source = %group.source, "group worker panicked; using patterns");
                        let found = extract_patterns(&group.items, keywords);
                        let report = GroupReport {
                            source: group.source.clone(),
                            items: group.items.len(),
                            strategy: Some(PatternStrategy.name()),
                            candidates: found.len(),
                            skipped: false,
                        };
                        (report, found)
                    })
                })
                .collect()
        })
    }
}
