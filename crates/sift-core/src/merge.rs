use crate::types::{Priority, Task, TaskCandidate, TaskStatus};
use indexmap::IndexMap;

/// Counts describing what a merge did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub added: usize,
    pub refreshed: usize,
    /// Fresh candidates matching a completed or cancelled task, left untouched.
    pub preserved: usize,
    pub high_priority_added: usize,
}

/// Reconcile freshly extracted candidates with previously persisted tasks.
pub fn merge(existing: Vec<Task>, fresh: Vec<TaskCandidate>) -> Vec<Task> {
    merge_with_summary(existing, fresh).0
}

/// Merge by exact normalized title.
///
/// New titles become pending tasks with fresh ids. A match on a pending task
/// refreshes its content but keeps its id. A match on a completed or cancelled
/// task changes nothing. Existing tasks are never dropped, even when two of
/// them share a title; the first one is the merge target.
pub fn merge_with_summary(
    existing: Vec<Task>,
    fresh: Vec<TaskCandidate>,
) -> (Vec<Task>, MergeSummary) {
    let mut tasks = existing;
    let mut registry: IndexMap<String, usize> = IndexMap::new();
    for (index, task) in tasks.iter().enumerate() {
        registry.entry(task.normalized_title()).or_insert(index);
    }

    let mut summary = MergeSummary::default();
    for candidate in fresh {
        let key = candidate.normalized_title();
        match registry.get(&key) {
            None => {
                if candidate.priority == Priority::High {
                    summary.high_priority_added += 1;
                }
                registry.insert(key, tasks.len());
                tasks.push(Task::from_candidate(candidate));
                summary.added += 1;
            }
            Some(&index) if tasks[index].status == TaskStatus::Pending => {
                tasks[index].refresh_from(candidate);
                summary.refreshed += 1;
            }
            Some(_) => {
                summary.preserved += 1;
            }
        }
    }

    (tasks, summary)
}

/// Set the status of the task with `id`; `false` when no such task exists.
pub fn set_status(tasks: &mut [Task], id: &str, status: TaskStatus) -> bool {
    match tasks.iter_mut().find(|task| task.id == id) {
        Some(task) => {
            task.status = status;
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(title: &str, description: &str) -> TaskCandidate {
        TaskCandidate::new(title, description, "Slack").unwrap()
    }

    fn persisted(title: &str, status: TaskStatus) -> Task {
        let mut task = Task::from_candidate(cand(title, "old"));
        task.status = status;
        task
    }

    #[test]
    fn new_titles_become_pending_tasks() {
        let mut urgent = cand("Renew the domain", "asap");
        urgent.priority = Priority::High;
        let (tasks, summary) = merge_with_summary(Vec::new(), vec![urgent, cand("Book venue", "")]);
        assert_eq!(tasks.len(), 2);
        assert!(tasks.iter().all(|t| t.status == TaskStatus::Pending));
        assert_ne!(tasks[0].id, tasks[1].id);
        assert_eq!(summary.added, 2);
        assert_eq!(summary.high_priority_added, 1);
    }

    #[test]
    fn pending_match_keeps_id_and_takes_fresh_content() {
        let existing = persisted("Send invoice", TaskStatus::Pending);
        let id = existing.id.clone();
        let mut fresh = cand("send invoice ", "now with amount");
        fresh.priority = Priority::Low;
        let (tasks, summary) = merge_with_summary(vec![existing], vec![fresh]);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, id);
        assert_eq!(tasks[0].description, "now with amount");
        assert_eq!(tasks[0].priority, Priority::Low);
        assert_eq!(tasks[0].status, TaskStatus::Pending);
        assert_eq!(summary.refreshed, 1);
    }

    #[test]
    fn closed_tasks_are_never_resurrected() {
        for status in [TaskStatus::Completed, TaskStatus::Cancelled] {
            let existing = persisted("Send invoice", status);
            let before = existing.clone();
            let (tasks, summary) =
                merge_with_summary(vec![existing], vec![cand("SEND INVOICE", "again")]);
            assert_eq!(tasks, vec![before]);
            assert_eq!(summary.preserved, 1);
            assert_eq!(summary.added, 0);
        }
    }

    #[test]
    fn near_duplicates_are_not_collapsed() {
        let existing = persisted("Send the invoice", TaskStatus::Pending);
        let tasks = merge(vec![existing], vec![cand("Send the invoice!", "")]);
        assert_eq!(tasks.len(), 2);
    }

    #[test]
    fn duplicate_existing_titles_survive() {
        let first = persisted("Call bank", TaskStatus::Completed);
        let second = persisted("call bank", TaskStatus::Pending);
        let tasks = merge(vec![first.clone(), second.clone()], vec![cand("Call bank", "")]);
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0], first);
        assert_eq!(tasks[1], second);
    }

    #[test]
    fn repeated_fresh_titles_collapse_into_one_task() {
        let tasks = merge(Vec::new(), vec![cand("Book venue", "a"), cand("book venue", "b")]);
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].description, "b");
    }

    #[test]
    fn set_status_updates_only_status() {
        let mut tasks = vec![persisted("Book venue", TaskStatus::Pending)];
        let id = tasks[0].id.clone();
        let title = tasks[0].title.clone();
        assert!(set_status(&mut tasks, &id, TaskStatus::Completed));
        assert_eq!(tasks[0].status, TaskStatus::Completed);
        assert_eq!(tasks[0].title, title);
        assert!(!set_status(&mut tasks, "missing", TaskStatus::Cancelled));
    }
}
