use crate::StoreError;
use crate::types::Task;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Persisted task collection; merges assume exclusive access for their duration.
pub trait TaskStore {
    fn load(&self) -> Result<Vec<Task>, StoreError>;
    fn save(&self, tasks: &[Task]) -> Result<(), StoreError>;
}

/// Tasks stored as a pretty-printed JSON array on disk.
#[derive(Debug, Clone)]
pub struct JsonTaskStore {
    path: PathBuf,
}

impl JsonTaskStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TaskStore for JsonTaskStore {
    fn load(&self) -> Result<Vec<Task>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let contents = serde_json::to_vec_pretty(tasks)?;
        write_atomic(&self.path, &contents)
    }
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), StoreError> {
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::other("task store path missing parent directory"))?;
    fs::create_dir_all(parent)?;
    let tmp_path = parent.join(".tasks.json.tmp");
    fs::write(&tmp_path, contents)?;
    fs::rename(tmp_path, path)?;
    Ok(())
}

/// In-memory store for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    tasks: std::sync::Mutex<Vec<Task>>,
}

impl MemoryTaskStore {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            tasks: std::sync::Mutex::new(tasks),
        }
    }

    pub fn snapshot(&self) -> Vec<Task> {
        self.tasks
            .lock()
            .map(|tasks| tasks.clone())
            .unwrap_or_default()
    }
}

impl TaskStore for MemoryTaskStore {
    fn load(&self) -> Result<Vec<Task>, StoreError> {
        Ok(self.snapshot())
    }

    fn save(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let mut guard = self
            .tasks
            .lock()
            .map_err(|_| io::Error::other("task store lock poisoned"))?;
        *guard = tasks.to_vec();
        Ok(())
    }
}
