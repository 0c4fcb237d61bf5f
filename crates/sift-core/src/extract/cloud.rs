use super::prompt::{SYSTEM_PROMPT, build_prompt, parse_model_tasks};
use super::{ExtractProvider, ExtractRequest, ModelTask};
use crate::ExtractError;
use crate::http::{classify_error, default_agent};
use serde::Deserialize;
use serde_json::json;

/// OpenAI-compatible chat services the cloud provider can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatService {
    Groq,
    OpenRouter,
}

impl ChatService {
    fn name(&self) -> &'static str {
        match self {
            ChatService::Groq => "groq",
            ChatService::OpenRouter => "openrouter",
        }
    }

    fn default_base_url(&self) -> &'static str {
        match self {
            ChatService::Groq => "https://api.groq.com/openai/v1",
            ChatService::OpenRouter => "https://openrouter.ai/api/v1",
        }
    }

    fn base_url_env(&self) -> &'static str {
        match self {
            ChatService::Groq => "GROQ_BASE_URL",
            ChatService::OpenRouter => "OPENROUTER_BASE_URL",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            ChatService::Groq => "llama3-70b-8192",
            ChatService::OpenRouter => "google/gemini-2.5-flash",
        }
    }
}

pub struct ChatProvider {
    service: ChatService,
    model: String,
    base_url: String,
    api_key: String,
    agent: ureq::Agent,
}

impl ChatProvider {
    pub fn new(
        service: ChatService,
        model: Option<&str>,
        api_key: Option<&str>,
    ) -> Result<Self, ExtractError> {
        let api_key = api_key
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                ExtractError::Failed(format!("{} API key not set", service.name()))
            })?
            .to_string();
        let base_url = std::env::var(service.base_url_env())
            .unwrap_or_else(|_| service.default_base_url().into());
        let model = model
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(service.default_model())
            .to_string();
        Ok(Self {
            service,
            model,
            base_url,
            api_key,
            agent: default_agent(),
        })
    }

    fn build_request_body(&self, prompt: &str) -> serde_json::Value {
        json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": prompt},
            ],
            "temperature": 0.2,
        })
    }

    fn parse_response(body: &str) -> Result<String, ExtractError> {
        let response: ChatResponse = serde_json::from_str(body)
            .map_err(|e| ExtractError::InvalidResponse(e.to_string()))?;
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ExtractError::InvalidResponse("no choices".into()))?;
        choice
            .message
            .content
            .ok_or_else(|| ExtractError::InvalidResponse("empty message content".into()))
    }
}

impl ExtractProvider for ChatProvider {
    fn name(&self) -> &'static str {
        self.service.name()
    }

    fn extract(&self, request: &ExtractRequest<'_>) -> Result<Vec<ModelTask>, ExtractError> {
        let prompt = build_prompt(request);
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = self.build_request_body(&prompt);

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &format!("Bearer {}", self.api_key))
            .send_json(body)
            .map_err(classify_error)?;

        let raw = response
            .into_body()
            .read_to_string()
            .map_err(|e| ExtractError::Network(e.to_string()))?;

        let content = Self::parse_response(raw.trim())?;
        parse_model_tasks(&content)
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::{ChatProvider, ChatService};
    use crate::http::default_agent;

    fn provider() -> ChatProvider {
        ChatProvider {
            service: ChatService::Groq,
            model: "test-model".to_string(),
            base_url: "http://example.com".to_string(),
            api_key: "test-key".to_string(),
            agent: default_agent(),
        }
    }

    #[test]
    fn parse_response_extracts_content() {
        let body = r#"{"choices":[{"message":{"content":"[]"}}]}"#;
        assert_eq!(ChatProvider::parse_response(body).unwrap(), "[]");
    }

    #[test]
    fn parse_response_without_choices_fails() {
        assert!(ChatProvider::parse_response(r#"{"choices":[]}"#).is_err());
        assert!(ChatProvider::parse_response(r#"{"choices":[{"message":{}}]}"#).is_err());
    }

    #[test]
    fn build_request_body_uses_system_prompt_and_model() {
        let body = provider().build_request_body("prompt");
        let model = body.get("model").and_then(|value| value.as_str());
        let system = body
            .get("messages")
            .and_then(|value| value.as_array())
            .and_then(|messages| messages.first())
            .and_then(|message| message.get("content"))
            .and_then(|value| value.as_str());
        assert_eq!(model, Some("test-model"));
        assert_eq!(
            system,
            Some("You are a task extraction engine. Follow the instructions and output only JSON.")
        );
    }

    #[test]
    fn default_model_per_service() {
        let groq = ChatProvider::new(ChatService::Groq, None, Some("k")).unwrap();
        assert_eq!(groq.model, "llama3-70b-8192");
        let router = ChatProvider::new(ChatService::OpenRouter, Some(" "), Some("k")).unwrap();
        assert_eq!(router.model, "google/gemini-2.5-flash");
    }
}
