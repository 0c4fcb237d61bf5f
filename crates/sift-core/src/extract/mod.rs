pub mod cloud;
pub mod local;
pub mod orchestrator;
mod prompt;
pub mod strategy;

use crate::ExtractError;
use crate::types::{Priority, PriorityKeywordSet};
use time::OffsetDateTime;

pub use orchestrator::{ExtractOptions, Orchestrator, SourceGroup, group_by_source};
pub use strategy::{ExtractionStrategy, PatternStrategy, RemoteStrategy};

const DEFAULT_OLLAMA_MODEL: &str = "llama3.1:8b";

/// What a remote provider receives for one source group.
#[derive(Debug, Clone, Copy)]
pub struct ExtractRequest<'a> {
    pub text: &'a str,
    pub source: &'a str,
    pub keywords: &'a PriorityKeywordSet,
}

/// One task object as returned by a model, before it becomes a candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelTask {
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<OffsetDateTime>,
}

/// Remote text-generation service that turns captured text into task objects.
pub trait ExtractProvider: Send + Sync {
    fn name(&self) -> &'static str;
    fn extract(&self, request: &ExtractRequest<'_>) -> Result<Vec<ModelTask>, ExtractError>;
}

/// Create an extract provider by name.
///
/// - `"ollama"` talks to a local Ollama server (`OLLAMA_BASE_URL`).
/// - `"groq"` and `"openrouter"` use their OpenAI-compatible chat APIs and
///   require an API key.
pub fn create_extract_provider(
    provider: &str,
    model: Option<&str>,
    api_key: Option<&str>,
) -> Result<Box<dyn ExtractProvider>, ExtractError> {
    match provider {
        "ollama" => Ok(Box::new(local::OllamaProvider::new(
            model.unwrap_or(DEFAULT_OLLAMA_MODEL),
        )?)),
        "groq" => Ok(Box::new(cloud::ChatProvider::new(
            cloud::ChatService::Groq,
            model,
            api_key,
        )?)),
        "openrouter" => Ok(Box::new(cloud::ChatProvider::new(
            cloud::ChatService::OpenRouter,
            model,
            api_key,
        )?)),
        other => Err(ExtractError::Failed(format!(
            "unknown extract provider: {other}"
        ))),
    }
}
