use crate::types::{Priority, Task, TaskStatus};
use time::{Duration, OffsetDateTime};

pub const HIGH_PRIORITY_TITLE: &str = "High Priority Tasks";
pub const REMINDER_TITLE: &str = "Todo Reminder";

/// Longest reminder lead time honoured; larger values are clamped.
pub const MAX_LEAD_MINUTES: i64 = 366 * 24 * 60;

/// A message for the notification collaborator to deliver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub body: String,
}

/// Delivery is the collaborator's job; the core only decides what to say.
pub trait Notifier {
    fn notify(&self, notice: &Notice);
}

/// Notice for newly added pending high-priority tasks, if there are any.
pub fn high_priority_notice(count: usize) -> Option<Notice> {
    if count == 0 {
        return None;
    }
    Some(Notice {
        title: HIGH_PRIORITY_TITLE.to_string(),
        body: format!("Found {count} new high priority tasks"),
    })
}

/// Lead time, per priority, before a due date at which a reminder fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderTiming {
    pub high_minutes: i64,
    pub medium_minutes: i64,
    pub low_minutes: i64,
}

impl Default for ReminderTiming {
    fn default() -> Self {
        Self {
            high_minutes: 30,
            medium_minutes: 120,
            low_minutes: 360,
        }
    }
}

impl ReminderTiming {
    fn lead(&self, priority: Priority) -> Duration {
        let minutes = match priority {
            Priority::High => self.high_minutes,
            Priority::Medium => self.medium_minutes,
            Priority::Low => self.low_minutes,
        };
        Duration::minutes(minutes.clamp(0, MAX_LEAD_MINUTES))
    }
}

/// Pending tasks whose due date is past or inside their priority's lead time.
pub fn due_soon<'a>(
    tasks: &'a [Task],
    now: OffsetDateTime,
    timing: &ReminderTiming,
) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|task| task.status == TaskStatus::Pending)
        .filter(|task| {
            task.due_date
                .is_some_and(|due| due - now <= timing.lead(task.priority))
        })
        .collect()
}

pub fn reminder_notice(due: &[&Task]) -> Option<Notice> {
    match due {
        [] => None,
        [task] => Some(Notice {
            title: REMINDER_TITLE.to_string(),
            body: format!("Don't forget: {}", task.title),
        }),
        many => Some(Notice {
            title: REMINDER_TITLE.to_string(),
            body: format!("You have {} pending tasks due soon", many.len()),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TaskCandidate;

    fn task(title: &str, priority: Priority, due_in_minutes: Option<i64>, now: OffsetDateTime) -> Task {
        let mut candidate = TaskCandidate::new(title, "", "Mail").unwrap();
        candidate.priority = priority;
        candidate.due_date = due_in_minutes.map(|m| now + Duration::minutes(m));
        Task::from_candidate(candidate)
    }

    #[test]
    fn high_priority_notice_template() {
        assert_eq!(high_priority_notice(0), None);
        let notice = high_priority_notice(3).unwrap();
        assert_eq!(notice.title, "High Priority Tasks");
        assert_eq!(notice.body, "Found 3 new high priority tasks");
    }

    #[test]
    fn due_soon_respects_priority_lead_times() {
        let now = OffsetDateTime::now_utc();
        let mut closed = task("Closed", Priority::High, Some(5), now);
        closed.status = TaskStatus::Completed;
        let tasks = vec![
            task("High in 20m", Priority::High, Some(20), now),
            task("High in 90m", Priority::High, Some(90), now),
            task("Medium in 90m", Priority::Medium, Some(90), now),
            task("Low overdue", Priority::Low, Some(-60), now),
            task("No date", Priority::High, None, now),
            closed,
        ];
        let due = due_soon(&tasks, now, &ReminderTiming::default());
        let titles: Vec<_> = due.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["High in 20m", "Medium in 90m", "Low overdue"]);
    }

    #[test]
    fn huge_lead_time_is_clamped() {
        let now = OffsetDateTime::now_utc();
        let timing = ReminderTiming {
            high_minutes: i64::MAX,
            medium_minutes: i64::MIN,
            low_minutes: 0,
        };
        let tasks = vec![
            task("Next month", Priority::High, Some(30 * 24 * 60), now),
            task("Later today", Priority::Medium, Some(60), now),
        ];
        let due = due_soon(&tasks, now, &timing);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].title, "Next month");
    }

    #[test]
    fn reminder_notice_wording() {
        let now = OffsetDateTime::now_utc();
        let a = task("Renew domain", Priority::High, Some(1), now);
        let b = task("Book venue", Priority::High, Some(1), now);
        assert_eq!(reminder_notice(&[]), None);
        assert_eq!(reminder_notice(&[&a]).unwrap().body, "Don't forget: Renew domain");
        assert_eq!(
            reminder_notice(&[&a, &b]).unwrap().body,
            "You have 2 pending tasks due soon"
        );
    }
}
