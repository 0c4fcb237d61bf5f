use sift_core::extract::{
    ExtractOptions, ExtractProvider, ExtractRequest, ModelTask, Orchestrator, PatternStrategy,
    RemoteStrategy,
};
use sift_core::filter::{FilterOptions, filter_captures};
use sift_core::pipeline::scan;
use sift_core::store::{JsonTaskStore, MemoryTaskStore, TaskStore};
use sift_core::{CapturedItem, ExtractError, Priority, PriorityKeywordSet, TaskStatus};
use time::OffsetDateTime;

/// Provider double answering every group with a fixed result.
type Reply = fn() -> Result<Vec<ModelTask>, ExtractError>;

struct FixedProvider {
    reply: Reply,
}

impl FixedProvider {
    fn boxed(reply: Reply) -> Box<Self> {
        Box::new(Self { reply })
    }
}

impl ExtractProvider for FixedProvider {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn extract(&self, _request: &ExtractRequest<'_>) -> Result<Vec<ModelTask>, ExtractError> {
        (self.reply)()
    }
}

fn with_remote(provider: Box<FixedProvider>) -> Orchestrator {
    Orchestrator::new(
        vec![
            Box::new(RemoteStrategy::new(provider)),
            Box::new(PatternStrategy),
        ],
        ExtractOptions::default(),
    )
}

fn invoice_items() -> Vec<CapturedItem> {
    vec![
        CapturedItem::ocr("Slack", "please remember to send the invoice by 11/01/2025"),
        CapturedItem::ocr("Code", "please refactor the parser module soon"),
    ]
}

#[test]
fn excluded_app_is_dropped_and_due_date_is_found() {
    let eligible = filter_captures(&invoice_items(), &FilterOptions::default());
    let candidates = Orchestrator::pattern_only(ExtractOptions::default())
        .extract(&eligible, &PriorityKeywordSet::default());

    assert_eq!(candidates.len(), 1);
    let candidate = &candidates[0];
    assert_eq!(candidate.source, "Slack");
    assert_eq!(candidate.priority, Priority::Medium);
    let due = candidate.due_date.expect("due date");
    assert_eq!(
        due,
        OffsetDateTime::from_unix_timestamp(1_761_955_200).unwrap()
    );
}

#[test]
fn failing_remote_matches_pattern_only_output() {
    let eligible = filter_captures(&invoice_items(), &FilterOptions::default());
    let keywords = PriorityKeywordSet::default();
    let expected = Orchestrator::pattern_only(ExtractOptions::default()).extract(&eligible, &keywords);

    let replies: [Reply; 4] = [
        || Err(ExtractError::Network("connection refused".into())),
        || {
            Err(ExtractError::Server {
                status: 503,
                message: "overloaded".into(),
            })
        },
        || Err(ExtractError::InvalidResponse("not an array".into())),
        || Ok(Vec::new()),
    ];
    for reply in replies {
        let got = with_remote(FixedProvider::boxed(reply)).extract(&eligible, &keywords);
        assert_eq!(got, expected);
    }
}

#[test]
fn remote_tasks_carry_group_source() {
    let mut item = CapturedItem::ocr("Mail", "Quarterly numbers are attached for your review.");
    item.browser_url = Some("https://mail.example.com/msg/1".into());
    let provider = FixedProvider::boxed(|| {
        Ok(vec![
            ModelTask {
                title: "review quarterly numbers".into(),
                description: Some("Numbers attached in mail".into()),
                priority: Some(Priority::High),
                due_date: None,
            },
            ModelTask {
                title: "  ".into(),
                description: None,
                priority: None,
                due_date: None,
            },
        ])
    });
    let candidates = with_remote(provider).extract(&[item], &PriorityKeywordSet::default());

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].title, "Review quarterly numbers");
    assert_eq!(candidates[0].source, "Mail");
    assert_eq!(candidates[0].priority, Priority::High);
    assert_eq!(
        candidates[0].source_url.as_deref(),
        Some("https://mail.example.com/msg/1")
    );
}

#[test]
fn rescans_keep_ids_and_closed_status() {
    let store = MemoryTaskStore::default();
    let keywords = PriorityKeywordSet::default();
    let filter = FilterOptions::default();
    let orchestrator = Orchestrator::pattern_only(ExtractOptions::default());
    let items = vec![
        CapturedItem::ocr("Slack", "Please send the deck to the board."),
        CapturedItem::ocr("Mail", "TODO: renew the team licenses"),
    ];

    let first = scan(&items, &keywords, &filter, &orchestrator, &store).unwrap();
    assert_eq!(first.added, 2);
    let mut tasks = store.snapshot();
    let ids: Vec<String> = tasks.iter().map(|t| t.id.clone()).collect();
    tasks[1].status = TaskStatus::Cancelled;
    store.save(&tasks).unwrap();

    let second = scan(&items, &keywords, &filter, &orchestrator, &store).unwrap();
    assert_eq!(second.added, 0);
    assert_eq!(second.refreshed, 1);
    assert_eq!(second.preserved, 1);

    let after = store.snapshot();
    assert_eq!(after.iter().map(|t| t.id.clone()).collect::<Vec<_>>(), ids);
    assert_eq!(after[1].status, TaskStatus::Cancelled);
}

#[test]
fn json_store_persists_between_scans() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("tasks.json");
    let keywords = PriorityKeywordSet::default();
    let filter = FilterOptions::default();
    let orchestrator = Orchestrator::pattern_only(ExtractOptions::default());

    let items = vec![CapturedItem::ocr("Slack", "We need to book the offsite venue asap.")];
    let report = scan(&items, &keywords, &filter, &orchestrator, &JsonTaskStore::new(&path)).unwrap();
    assert_eq!(report.added, 1);
    assert_eq!(report.high_priority_added, 1);

    let reloaded = JsonTaskStore::new(&path).load().unwrap();
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded[0].priority, Priority::High);
    assert_eq!(reloaded[0].status, TaskStatus::Pending);
}
