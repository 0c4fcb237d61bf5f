use crate::extract::Orchestrator;
use crate::filter::{FilterOptions, filter_captures};
use crate::merge::merge_with_summary;
use crate::store::TaskStore;
use crate::{CapturedItem, PriorityKeywordSet, StoreError};
use tracing::info;

/// What one scan observed and changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanReport {
    pub captured: usize,
    pub eligible: usize,
    pub candidates: usize,
    pub added: usize,
    pub refreshed: usize,
    pub preserved: usize,
    pub high_priority_added: usize,
    pub total_tasks: usize,
}

/// Filter, extract, then merge into the store. Only store failures surface;
/// extraction always degrades to pattern matching.
pub fn scan(
    items: &[CapturedItem],
    keywords: &PriorityKeywordSet,
    filter: &FilterOptions,
    orchestrator: &Orchestrator,
    store: &dyn TaskStore,
) -> Result<ScanReport, StoreError> {
    let eligible = filter_captures(items, filter);
    let candidates = orchestrator.extract(&eligible, keywords);
    let candidate_count = candidates.len();

    let existing = store.load()?;
    let (tasks, summary) = merge_with_summary(existing, candidates);
    if summary.added > 0 || summary.refreshed > 0 {
        store.save(&tasks)?;
    }

    let report = ScanReport {
        captured: items.len(),
        eligible: eligible.len(),
        candidates: candidate_count,
        added: summary.added,
        refreshed: summary.refreshed,
        preserved: summary.preserved,
        high_priority_added: summary.high_priority_added,
        total_tasks: tasks.len(),
    };
    info!(
        captured = report.captured,
        eligible = report.eligible,
        candidates = report.candidates,
        added = report.added,
        refreshed = report.refreshed,
        "scan finished"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TaskStatus;
    use crate::extract::ExtractOptions;
    use crate::store::MemoryTaskStore;

    fn orchestrator() -> Orchestrator {
        Orchestrator::pattern_only(ExtractOptions::default())
    }

    #[test]
    fn scan_adds_then_refreshes() {
        let store = MemoryTaskStore::new(Vec::new());
        let keywords = PriorityKeywordSet::default();
        let filter = FilterOptions::default();
        let items = vec![
            CapturedItem::ocr("Slack", "Please send the quarterly report asap."),
            CapturedItem::ocr("Terminal", "TODO: rebuild the index"),
        ];

        let first = scan(&items, &keywords, &filter, &orchestrator(), &store).unwrap();
        assert_eq!(first.captured, 2);
        assert_eq!(first.eligible, 1);
        assert_eq!(first.added, 1);
        assert_eq!(first.high_priority_added, 1);

        let second = scan(&items, &keywords, &filter, &orchestrator(), &store).unwrap();
        assert_eq!(second.added, 0);
        assert_eq!(second.refreshed, 1);
        assert_eq!(second.high_priority_added, 0);
        assert_eq!(store.snapshot().len(), 1);
    }

    #[test]
    fn closed_tasks_survive_rescan() {
        let store = MemoryTaskStore::new(Vec::new());
        let keywords = PriorityKeywordSet::default();
        let filter = FilterOptions::default();
        let items = vec![CapturedItem::ocr("Mail", "Please renew the domain before Friday.")];

        scan(&items, &keywords, &filter, &orchestrator(), &store).unwrap();
        let mut tasks = store.snapshot();
        tasks[0].status = TaskStatus::Completed;
        store.save(&tasks).unwrap();

        let report = scan(&items, &keywords, &filter, &orchestrator(), &store).unwrap();
        assert_eq!(report.preserved, 1);
        assert_eq!(store.snapshot()[0].status, TaskStatus::Completed);
    }

    #[test]
    fn nothing_captured_leaves_store_alone() {
        let store = MemoryTaskStore::new(Vec::new());
        let report = scan(
            &[],
            &PriorityKeywordSet::default(),
            &FilterOptions::default(),
            &orchestrator(),
            &store,
        )
        .unwrap();
        assert_eq!(report, ScanReport::default());
    }
}
