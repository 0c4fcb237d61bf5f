use crate::config::{Config, ProviderConfig};
use sift_core::extract::{
    ExtractionStrategy, Orchestrator, PatternStrategy, RemoteStrategy, create_extract_provider,
};

/// Extraction mode after CLI flags and environment are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Local,
    Cloud,
    Pattern,
}

impl Mode {
    pub fn parse(value: &str) -> Result<Self, String> {
        match value {
            "local" => Ok(Mode::Local),
            "cloud" => Ok(Mode::Cloud),
            "pattern" => Ok(Mode::Pattern),
            other => Err(format!(
                "extract mode must be local, cloud or pattern (got {other})"
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RuntimeProfiles {
    pub mode: Mode,
    pub fallback_remote: bool,
    pub local: ProviderConfig,
    pub cloud: ProviderConfig,
}

impl RuntimeProfiles {
    pub fn resolve(
        config: &Config,
        selector: Option<Mode>,
        model: Option<String>,
    ) -> Result<Self, String> {
        let mode = match selector {
            Some(mode) => mode,
            None => Mode::parse(config.extract.active.as_str())?,
        };
        let mut profiles = Self {
            mode,
            fallback_remote: config.extract.fallback_remote,
            local: config.extract.local.clone(),
            cloud: config.extract.cloud.clone(),
        };
        apply_env_overrides(&mut profiles);
        if let Some(model) = model {
            match mode {
                Mode::Local => profiles.local.model = model,
                Mode::Cloud => profiles.cloud.model = model,
                Mode::Pattern => return Err("--model needs --local or --cloud".into()),
            }
        }
        Ok(profiles)
    }

    /// Remote profiles in the order they should be tried.
    fn remote_chain(&self) -> Vec<&ProviderConfig> {
        match (self.mode, self.fallback_remote) {
            (Mode::Pattern, _) => Vec::new(),
            (Mode::Local, false) => vec![&self.local],
            (Mode::Cloud, false) => vec![&self.cloud],
            (Mode::Local, true) => vec![&self.local, &self.cloud],
            (Mode::Cloud, true) => vec![&self.cloud, &self.local],
        }
    }

    /// Remote providers that could be built, then the pattern extractor.
    pub fn build_orchestrator(&self, config: &Config) -> Orchestrator {
        let mut strategies: Vec<Box<dyn ExtractionStrategy>> = Vec::new();
        for profile in self.remote_chain() {
            match create_extract_provider(
                profile.provider.as_str(),
                non_empty_str(profile.model.as_str()),
                non_empty_str(profile.api_key.as_str()),
            ) {
                Ok(provider) => strategies.push(Box::new(RemoteStrategy::new(provider))),
                Err(err) => {
                    tracing::warn!(
                        provider = %profile.provider,
                        error = %err,
                        "extract provider unavailable; skipping"
                    );
                }
            }
        }
        strategies.push(Box::new(PatternStrategy));
        Orchestrator::new(strategies, config.extract_options())
    }
}

fn env_override(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn apply_env_overrides(profiles: &mut RuntimeProfiles) {
    if let Some(value) = env_override("SIFT_EXTRACT_LOCAL_MODEL") {
        profiles.local.model = value;
    }
    if let Some(value) = env_override("SIFT_EXTRACT_CLOUD_MODEL") {
        profiles.cloud.model = value;
    }
    if let Some(value) = env_override("SIFT_EXTRACT_CLOUD_API_KEY") {
        profiles.cloud.api_key = value;
    }
    if profiles.cloud.api_key.trim().is_empty() {
        let fallback = match profiles.cloud.provider.as_str() {
            "groq" => env_override("GROQ_API_KEY"),
            "openrouter" => env_override("OPENROUTER_API_KEY"),
            _ => None,
        };
        if let Some(value) = fallback {
            profiles.cloud.api_key = value;
        }
    }
}

fn non_empty_str(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
