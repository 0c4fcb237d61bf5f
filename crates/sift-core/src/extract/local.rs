use super::prompt::{build_prompt, parse_model_tasks};
use super::{ExtractProvider, ExtractRequest, ModelTask};
use crate::ExtractError;
use crate::http::{classify_error, default_agent, retry_delay, should_retry};
use serde::Deserialize;
use serde_json::json;
use std::thread;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const MAX_RETRIES: usize = 2;

pub struct OllamaProvider {
    model: String,
    base_url: String,
    agent: ureq::Agent,
}

impl OllamaProvider {
    pub fn new(model: &str) -> Result<Self, ExtractError> {
        let base_url = std::env::var("OLLAMA_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
        Ok(Self {
            model: model.to_string(),
            base_url,
            agent: default_agent(),
        })
    }

    fn request_raw(&self, prompt: &str) -> Result<String, ExtractError> {
        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));
        let mut attempt = 0;
        loop {
            let body = json!({
                "model": self.model,
                "prompt": prompt,
                "stream": true,
                "options": {"temperature": 0.2},
            });
            match self.agent.post(&url).send_json(body) {
                Ok(resp) => {
                    return resp
                        .into_body()
                        .read_to_string()
                        .map_err(|e| ExtractError::Network(e.to_string()));
                }
                Err(err) => {
                    if should_retry(&err) && attempt < MAX_RETRIES {
                        tracing::debug!(attempt, error = %err, "ollama request failed; retrying");
                        thread::sleep(retry_delay(attempt));
                        attempt += 1;
                        continue;
                    }
                    return Err(classify_error(err));
                }
            }
        }
    }
}

/// Concatenate the `response` tokens of an Ollama NDJSON stream.
fn collect_stream(raw: &str) -> Result<String, ExtractError> {
    let mut full_text = String::new();
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let chunk: OllamaChunk = serde_json::from_str(line)
            .map_err(|e| ExtractError::InvalidResponse(e.to_string()))?;
        if let Some(token) = chunk.response {
            full_text.push_str(&token);
        }
        if chunk.done.unwrap_or(false) {
            break;
        }
    }
    Ok(full_text)
}

impl ExtractProvider for OllamaProvider {
    fn name(&self) -> &'static str {
        "ollama"
    }

    fn extract(&self, request: &ExtractRequest<'_>) -> Result<Vec<ModelTask>, ExtractError> {
        let prompt = build_prompt(request);
        let raw = self.request_raw(&prompt)?;
        let content = collect_stream(&raw)?;
        parse_model_tasks(&content)
    }
}

#[derive(Deserialize)]
struct OllamaChunk {
    response: Option<String>,
    done: Option<bool>,
}
