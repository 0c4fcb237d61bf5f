use super::orchestrator::SourceGroup;
use super::{ExtractProvider, ExtractRequest, ModelTask};
use crate::pattern::extract_patterns;
use crate::types::{PriorityKeywordSet, TaskCandidate};
use tracing::{debug, warn};

/// One way of turning a source group into candidates.
///
/// `None` means "nothing usable here, try the next strategy": a failed call,
/// an unparseable reply and an empty result all look the same to the caller.
pub trait ExtractionStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn extract(
        &self,
        group: &SourceGroup,
        keywords: &PriorityKeywordSet,
    ) -> Option<Vec<TaskCandidate>>;
}

/// Asks a remote text-generation provider for structured tasks.
pub struct RemoteStrategy {
    provider: Box<dyn ExtractProvider>,
}

impl RemoteStrategy {
    pub fn new(provider: Box<dyn ExtractProvider>) -> Self {
        Self { provider }
    }
}

impl ExtractionStrategy for RemoteStrategy {
    fn name(&self) -> &'static str {
        self.provider.name()
    }

    fn extract(
        &self,
        group: &SourceGroup,
        keywords: &PriorityKeywordSet,
    ) -> Option<Vec<TaskCandidate>> {
        let request = ExtractRequest {
            text: &group.text,
            source: &group.source,
            keywords,
        };
        match self.provider.extract(&request) {
            Ok(tasks) if tasks.is_empty() => {
                debug!(
                    provider = self.provider.name(),
                    source = %group.source,
                    "provider returned no tasks"
                );
                None
            }
            Ok(tasks) => Some(
                tasks
                    .into_iter()
                    .filter_map(|task| group_candidate(group, task))
                    .collect(),
            ),
            Err(err) => {
                warn!(
                    provider = self.provider.name(),
                    source = %group.source,
                    service_error = err.is_service_error(),
                    error = %err,
                    "remote extraction failed; falling back"
                );
                None
            }
        }
    }
}

/// Provenance is tracked per group: url and frame come from its first item.
fn group_candidate(group: &SourceGroup, task: ModelTask) -> Option<TaskCandidate> {
    let description = task.description.unwrap_or_default();
    let mut candidate = TaskCandidate::new(&task.title, &description, &group.source)?;
    candidate.priority = task.priority.unwrap_or_default();
    candidate.due_date = task.due_date;
    if let Some(first) = group.items.first() {
        candidate.source_url = first.browser_url.clone();
        candidate.screenshot = first.frame_reference.clone();
    }
    Some(candidate)
}

/// The deterministic pattern extractor.
pub struct PatternStrategy;

impl ExtractionStrategy for PatternStrategy {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn extract(
        &self,
        group: &SourceGroup,
        keywords: &PriorityKeywordSet,
    ) -> Option<Vec<TaskCandidate>> {
        let candidates = extract_patterns(&group.items, keywords);
        if candidates.is_empty() {
            None
        } else {
            Some(candidates)
        }
    }
}
