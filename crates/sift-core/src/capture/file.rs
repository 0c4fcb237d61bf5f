use super::{CaptureQuery, CaptureSource, WireRecord, decode_envelope, into_items};
use crate::{CaptureError, CapturedItem};
use std::fs;
use std::path::{Path, PathBuf};

/// Replays a capture dump from disk, either the service envelope or a bare
/// array of records. The query window is ignored; only its limit applies.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CaptureSource for FileSource {
    fn name(&self) -> &'static str {
        "file"
    }

    fn fetch(&self, query: &CaptureQuery) -> Result<Vec<CapturedItem>, CaptureError> {
        let raw = fs::read_to_string(&self.path)?;
        let mut items = if raw.trim_start().starts_with('[') {
            let records: Vec<WireRecord> = serde_json::from_str(&raw)?;
            into_items(records, query.end)
        } else {
            decode_envelope(&raw, query.end)?
        };
        items.truncate(query.limit);
        Ok(items)
    }
}
