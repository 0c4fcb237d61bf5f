//! Capture sources: where OCR and audio observations come from.

mod file;
mod screenpipe;

pub use file::FileSource;
pub use screenpipe::{DEFAULT_BASE_URL, ScreenpipeSource};

use crate::{CaptureError, CaptureKind, CapturedItem, ScreenPosition};
use serde::Deserialize;
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime};

pub const DEFAULT_WINDOW_MINUTES: i64 = 60;
pub const DEFAULT_LIMIT: usize = 50;
/// Longest look-back window honoured; larger values are clamped.
pub const MAX_WINDOW_MINUTES: i64 = 366 * 24 * 60;

/// Time window and item budget for one capture fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureQuery {
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
    pub limit: usize,
}

impl CaptureQuery {
    /// The `window_minutes` leading up to `end`.
    pub fn trailing(end: OffsetDateTime, window_minutes: i64, limit: usize) -> Self {
        Self {
            start: end.saturating_sub(Duration::minutes(
                window_minutes.clamp(0, MAX_WINDOW_MINUTES),
            )),
            end,
            limit,
        }
    }
}

pub trait CaptureSource {
    fn name(&self) -> &'static str;
    fn fetch(&self, query: &CaptureQuery) -> Result<Vec<CapturedItem>, CaptureError>;
}

/// Envelope shared by the capture service and capture dump files.
#[derive(Debug, Deserialize)]
struct CaptureEnvelope {
    #[serde(default)]
    data: Vec<WireRecord>,
}

#[derive(Debug, Deserialize)]
struct WireRecord {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    content: WireContent,
}

#[derive(Debug, Default, Deserialize)]
struct WireContent {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    transcription: Option<String>,
    #[serde(default)]
    app_name: Option<String>,
    #[serde(default)]
    device_name: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default, rename = "browserUrl", alias = "browser_url")]
    browser_url: Option<String>,
    #[serde(default)]
    frame: Option<String>,
    #[serde(default)]
    position: Option<WirePosition>,
    #[serde(default, rename = "screenHeight", alias = "screen_height")]
    screen_height: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WirePosition {
    top: f64,
    #[serde(default)]
    height: f64,
}

impl WireRecord {
    fn into_item(self, fallback_time: OffsetDateTime) -> Option<CapturedItem> {
        let kind = match self.kind.to_ascii_lowercase().as_str() {
            "ocr" => CaptureKind::Ocr,
            "audio" => CaptureKind::Audio,
            other => {
                tracing::debug!(kind = other, "skipping unsupported capture record");
                return None;
            }
        };
        let content = self.content;
        let text = match kind {
            CaptureKind::Ocr => content.text,
            CaptureKind::Audio => content.transcription.or(content.text),
        }
        .unwrap_or_default();
        let source_app = content
            .app_name
            .or(content.device_name)
            .unwrap_or_default();
        let captured_at = content
            .timestamp
            .as_deref()
            .and_then(|raw| OffsetDateTime::parse(raw, &Rfc3339).ok())
            .unwrap_or(fallback_time);
        let position = content.position.map(|pos| ScreenPosition {
            top: pos.top,
            height: pos.height,
            screen_height: content.screen_height,
        });
        Some(CapturedItem {
            kind,
            source_app,
            text,
            captured_at,
            position,
            browser_url: content.browser_url,
            frame_reference: content.frame,
        })
    }
}

/// Decode a capture envelope, dropping record kinds other than OCR and audio.
fn decode_envelope(raw: &str, fallback_time: OffsetDateTime) -> Result<Vec<CapturedItem>, CaptureError> {
    let envelope: CaptureEnvelope = serde_json::from_str(raw)?;
    Ok(into_items(envelope.data, fallback_time))
}

fn into_items(records: Vec<WireRecord>, fallback_time: OffsetDateTime) -> Vec<CapturedItem> {
    records
        .into_iter()
        .filter_map(|record| record.into_item(fallback_time))
        .collect()
}
