use super::{CaptureQuery, CaptureSource, decode_envelope};
use crate::http::{default_agent, retry_delay, should_retry};
use crate::{CaptureError, CapturedItem};
use std::thread;
use time::format_description::well_known::Rfc3339;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3030";
const MAX_RETRIES: usize = 1;

/// Reads OCR observations from a local screenpipe capture service.
pub struct ScreenpipeSource {
    base_url: String,
    agent: ureq::Agent,
}

impl ScreenpipeSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent: default_agent(),
        }
    }

    fn request_raw(&self, query: &CaptureQuery) -> Result<String, CaptureError> {
        let url = format!("{}/search", self.base_url);
        let (start, end) = format_time(query)?;
        let limit = query.limit.to_string();
        let mut attempt = 0;
        loop {
            let result = self
                .agent
                .get(&url)
                .query("content_type", "ocr")
                .query("start_time", &start)
                .query("end_time", &end)
                .query("limit", &limit)
                .call();
            match result {
                Ok(resp) => {
                    return resp
                        .into_body()
                        .read_to_string()
                        .map_err(|e| CaptureError::Network(e.to_string()));
                }
                Err(err) => {
                    if should_retry(&err) && attempt < MAX_RETRIES {
                        tracing::debug!(attempt, error = %err, "capture request failed; retrying");
                        thread::sleep(retry_delay(attempt));
                        attempt += 1;
                        continue;
                    }
                    return Err(CaptureError::Network(err.to_string()));
                }
            }
        }
    }
}

fn format_time(query: &CaptureQuery) -> Result<(String, String), CaptureError> {
    let format = |value: time::OffsetDateTime| {
        value
            .format(&Rfc3339)
            .map_err(|e| CaptureError::Query(e.to_string()))
    };
    Ok((format(query.start)?, format(query.end)?))
}

impl CaptureSource for ScreenpipeSource {
    fn name(&self) -> &'static str {
        "screenpipe"
    }

    fn fetch(&self, query: &CaptureQuery) -> Result<Vec<CapturedItem>, CaptureError> {
        let raw = self.request_raw(query)?;
        let items = decode_envelope(&raw, query.end)?;
        tracing::debug!(count = items.len(), "fetched captures");
        Ok(items)
    }
}
