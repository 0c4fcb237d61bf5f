use super::{ExtractRequest, ModelTask};
use crate::ExtractError;
use crate::dates::parse_due_date_value;
use crate::types::Priority;
use serde::Deserialize;

pub(crate) const SYSTEM_PROMPT: &str =
    "You are a task extraction engine. Follow the instructions and output only JSON.";

pub(crate) fn build_prompt(request: &ExtractRequest<'_>) -> String {
    let keywords = request.keywords;
    format!(
        r#"Extract potential tasks or todos from the following text.
Return a JSON array of objects with title, description, priority, and dueDate fields.
For priority, use "high", "medium", or "low" based on urgency words.
High priority keywords: {high}
Medium priority keywords: {medium}
Low priority keywords: {low}
If no due date is mentioned, return null for dueDate; otherwise use an ISO-8601 date.
If there are no tasks, return [].
Only return valid JSON, no other text.

Text from {source}:
{text}"#,
        high = keywords.high,
        medium = keywords.medium,
        low = keywords.low,
        source = request.source,
        text = request.text,
    )
}

/// Parse a model reply strictly: the whole trimmed reply must be a JSON array.
///
/// Elements without a usable title are dropped; unknown priorities and
/// unreadable due dates become absent rather than failing the reply.
pub(crate) fn parse_model_tasks(output: &str) -> Result<Vec<ModelTask>, ExtractError> {
    let payload: Vec<ModelTaskPayload> = serde_json::from_str(output.trim())
        .map_err(|e| ExtractError::InvalidResponse(e.to_string()))?;
    Ok(payload.into_iter().filter_map(ModelTask::from_payload).collect())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelTaskPayload {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    due_date: Option<String>,
}

impl ModelTask {
    fn from_payload(payload: ModelTaskPayload) -> Option<Self> {
        let title = payload.title?.trim().to_string();
        if title.is_empty() {
            return None;
        }
        Some(Self {
            title,
            description: payload.description,
            priority: payload.priority.as_deref().and_then(Priority::from_label),
            due_date: payload.due_date.as_deref().and_then(parse_due_date_value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{build_prompt, parse_model_tasks};
    use crate::extract::ExtractRequest;
    use crate::types::{Priority, PriorityKeywordSet};

    #[test]
    fn prompt_lists_keywords_source_and_text() {
        let keywords = PriorityKeywordSet::new("urgent,asap", "soon", "whenever");
        let prompt = build_prompt(&ExtractRequest {
            text: "please renew the domain",
            source: "Mail",
            keywords: &keywords,
        });
        assert!(prompt.contains("High priority keywords: urgent,asap"));
        assert!(prompt.contains("Medium priority keywords: soon"));
        assert!(prompt.contains("Low priority keywords: whenever"));
        assert!(prompt.contains("Text from Mail:\nplease renew the domain"));
        assert!(prompt.contains("Only return valid JSON"));
    }

    #[test]
    fn parses_array_and_normalizes_fields() {
        let output = r#"
        [
            {"title": "Renew domain", "description": "before it lapses", "priority": "HIGH", "dueDate": "2025-01-31"},
            {"title": "Book venue", "priority": "whenever", "dueDate": null},
            {"title": "   ", "priority": "low"}
        ]"#;
        let tasks = parse_model_tasks(output).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].priority, Some(Priority::High));
        assert_eq!(tasks[0].due_date.unwrap().day(), 31);
        assert_eq!(tasks[1].priority, None);
        assert_eq!(tasks[1].due_date, None);
        assert_eq!(tasks[1].description, None);
    }

    #[test]
    fn empty_array_is_ok() {
        assert!(parse_model_tasks("[]").unwrap().is_empty());
    }

    #[test]
    fn wrapped_or_non_array_output_is_rejected() {
        assert!(parse_model_tasks("Here are your tasks: []").is_err());
        assert!(parse_model_tasks("```json\n[]\n```").is_err());
        assert!(parse_model_tasks(r#"{"title": "x"}"#).is_err());
        assert!(parse_model_tasks("").is_err());
    }
}
