use crate::KeywordError;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Origin of a captured observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureKind {
    #[default]
    Ocr,
    Audio,
}

/// On-screen placement of an OCR fragment, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenPosition {
    pub top: f64,
    #[serde(default)]
    pub height: f64,
    #[serde(default)]
    pub screen_height: Option<f64>,
}

/// A single OCR or audio observation tied to its source application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapturedItem {
    #[serde(default)]
    pub kind: CaptureKind,
    #[serde(default)]
    pub source_app: String,
    #[serde(default)]
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub captured_at: OffsetDateTime,
    #[serde(default)]
    pub position: Option<ScreenPosition>,
    #[serde(default)]
    pub browser_url: Option<String>,
    #[serde(default)]
    pub frame_reference: Option<String>,
}

impl CapturedItem {
    pub fn ocr(source_app: &str, text: &str) -> Self {
        Self {
            kind: CaptureKind::Ocr,
            source_app: source_app.to_string(),
            text: text.to_string(),
            captured_at: OffsetDateTime::now_utc(),
            position: None,
            browser_url: None,
            frame_reference: None,
        }
    }

    /// Source label used for grouping and candidate provenance.
    pub fn source_label(&self) -> &str {
        let trimmed = self.source_app.trim();
        if trimmed.is_empty() {
            UNKNOWN_SOURCE
        } else {
            trimmed
        }
    }
}

pub const UNKNOWN_SOURCE: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled tasks are never reopened by a rescan.
    pub fn is_closed(&self) -> bool {
        !matches!(self, TaskStatus::Pending)
    }
}

/// User-configured priority vocabularies, each a comma-separated list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawKeywordSet")]
pub struct PriorityKeywordSet {
    pub high: String,
    pub medium: String,
    pub low: String,
}

impl PriorityKeywordSet {
    pub fn new(high: &str, medium: &str, low: &str) -> Self {
        Self {
            high: high.to_string(),
            medium: medium.to_string(),
            low: low.to_string(),
        }
    }

    /// Decode a keyword set, failing fast when any of the three lists is absent.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, KeywordError> {
        let list = |name: &'static str| {
            value
                .get(name)
                .and_then(|entry| entry.as_str())
                .map(str::to_string)
                .ok_or(KeywordError::MissingList(name))
        };
        Ok(Self {
            high: list("high")?,
            medium: list("medium")?,
            low: list("low")?,
        })
    }

    /// Lower-cased, trimmed, non-empty terms for one priority level.
    pub fn terms(&self, priority: Priority) -> Vec<String> {
        let raw = match priority {
            Priority::High => &self.high,
            Priority::Medium => &self.medium,
            Priority::Low => &self.low,
        };
        raw.split(',')
            .map(|term| term.trim().to_lowercase())
            .filter(|term| !term.is_empty())
            .collect()
    }
}

impl Default for PriorityKeywordSet {
    fn default() -> Self {
        Self::new(
            "urgent,asap,immediately,critical",
            "soon,important,needed",
            "whenever,low priority,eventually",
        )
    }
}

#[derive(Deserialize)]
struct RawKeywordSet {
    high: Option<String>,
    medium: Option<String>,
    low: Option<String>,
}

impl TryFrom<RawKeywordSet> for PriorityKeywordSet {
    type Error = KeywordError;

    fn try_from(value: RawKeywordSet) -> Result<Self, Self::Error> {
        Ok(Self {
            high: value.high.ok_or(KeywordError::MissingList("high"))?,
            medium: value.medium.ok_or(KeywordError::MissingList("medium"))?,
            low: value.low.ok_or(KeywordError::MissingList("low"))?,
        })
    }
}

/// An extracted task that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCandidate {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    pub source: String,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub screenshot: Option<String>,
}

impl TaskCandidate {
    /// Build a candidate with a sentence-cased title; `None` when the title is blank.
    pub fn new(title: &str, description: &str, source: &str) -> Option<Self> {
        let title = sentence_case(title.trim());
        if title.is_empty() {
            return None;
        }
        Some(Self {
            title,
            description: description.to_string(),
            priority: Priority::Medium,
            due_date: None,
            source: source.to_string(),
            source_url: None,
            screenshot: None,
        })
    }

    pub fn normalized_title(&self) -> String {
        normalize_title(&self.title)
    }
}

/// A persisted task: a candidate plus identity and lifecycle status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: Priority,
    pub status: TaskStatus,
    pub source: String,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
    #[serde(default)]
    pub screenshot: Option<String>,
}

impl Task {
    /// Persist a candidate as a new pending task with a fresh identifier.
    pub fn from_candidate(candidate: TaskCandidate) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            title: candidate.title,
            description: candidate.description,
            priority: candidate.priority,
            status: TaskStatus::Pending,
            source: candidate.source,
            source_url: candidate.source_url,
            created_at: OffsetDateTime::now_utc(),
            due_date: candidate.due_date,
            screenshot: candidate.screenshot,
        }
    }

    /// Overwrite content fields, keeping id, status and creation time.
    pub fn refresh_from(&mut self, candidate: TaskCandidate) {
        self.title = candidate.title;
        self.description = candidate.description;
        self.priority = candidate.priority;
        self.due_date = candidate.due_date;
        self.source = candidate.source;
        self.source_url = candidate.source_url;
        self.screenshot = candidate.screenshot;
    }

    pub fn normalized_title(&self) -> String {
        normalize_title(&self.title)
    }
}

/// Case-folded, trimmed form used for title comparisons.
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Upper-case the first character, leaving the rest untouched.
pub fn sentence_case(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
