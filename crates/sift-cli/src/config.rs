use serde::{Deserialize, Serialize};
use sift_core::PriorityKeywordSet;
use sift_core::extract::ExtractOptions;
use sift_core::filter::FilterOptions;
use sift_core::capture::MAX_WINDOW_MINUTES;
use sift_core::notify::{MAX_LEAD_MINUTES, ReminderTiming};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const CONFIG_VERSION: u32 = 2;

pub const MAX_INTERVAL_MINUTES: u64 = 7 * 24 * 60;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("home directory not found; set HOME")]
    HomeMissing,
    #[error("config io error: {0}")]
    Io(#[from] io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone)]
pub struct ConfigPaths {
    pub base_dir: PathBuf,
    pub config_path: PathBuf,
    pub tasks_path: PathBuf,
}

impl ConfigPaths {
    pub fn from_home() -> Result<Self, ConfigError> {
        let home = std::env::var("HOME").map_err(|_| ConfigError::HomeMissing)?;
        Ok(Self::from_base(PathBuf::from(home).join(".sift")))
    }

    pub fn from_base(base_dir: PathBuf) -> Self {
        let config_path = base_dir.join("config.toml");
        let tasks_path = base_dir.join("tasks.json");
        Self {
            base_dir,
            config_path,
            tasks_path,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub version: u32,
    pub extract: ExtractConfig,
    pub keywords: KeywordsConfig,
    pub scan: ScanConfig,
    pub capture: CaptureConfig,
    pub notify: NotifyConfig,
    pub reminders: RemindersConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            extract: ExtractConfig::default(),
            keywords: KeywordsConfig::default(),
            scan: ScanConfig::default(),
            capture: CaptureConfig::default(),
            notify: NotifyConfig::default(),
            reminders: RemindersConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    pub active: String,
    pub fallback_remote: bool,
    pub parallel_groups: bool,
    pub max_group_chars: usize,
    pub min_group_chars: usize,
    pub local: ProviderConfig,
    pub cloud: ProviderConfig,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        let options = ExtractOptions::default();
        Self {
            active: "local".to_string(),
            fallback_remote: false,
            parallel_groups: options.parallel_groups,
            max_group_chars: options.max_group_chars,
            min_group_chars: options.min_group_chars,
            local: ProviderConfig {
                provider: "ollama".to_string(),
                model: "llama3.1:8b".to_string(),
                api_key: String::new(),
            },
            cloud: ProviderConfig {
                provider: "groq".to_string(),
                model: "llama3-70b-8192".to_string(),
                api_key: String::new(),
            },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub provider: String,
    pub model: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywordsConfig {
    pub high: String,
    pub medium: String,
    pub low: String,
}

impl Default for KeywordsConfig {
    fn default() -> Self {
        let defaults = PriorityKeywordSet::default();
        Self {
            high: defaults.high,
            medium: defaults.medium,
            low: defaults.low,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub interval_minutes: u64,
    pub window_minutes: i64,
    pub limit: usize,
    pub extra_excluded_apps: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 5,
            window_minutes: sift_core::capture::DEFAULT_WINDOW_MINUTES,
            limit: sift_core::capture::DEFAULT_LIMIT,
            extra_excluded_apps: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub base_url: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            base_url: sift_core::capture::DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    pub enabled: bool,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemindersConfig {
    pub high_minutes: i64,
    pub medium_minutes: i64,
    pub low_minutes: i64,
}

impl Default for RemindersConfig {
    fn default() -> Self {
        let timing = ReminderTiming::default();
        Self {
            high_minutes: timing.high_minutes,
            medium_minutes: timing.medium_minutes,
            low_minutes: timing.low_minutes,
        }
    }
}

impl Config {
    pub fn load_or_create(paths: &ConfigPaths) -> Result<Self, ConfigError> {
        ensure_dirs(paths)?;
        if paths.config_path.exists() {
            let config = Self::load(paths)?;
            return Ok(config);
        }

        let config = Self::default();
        Self::write(paths, &config)?;
        Ok(config)
    }

    pub fn load(paths: &ConfigPaths) -> Result<Self, ConfigError> {
        ensure_dirs(paths)?;
        let content = fs::read_to_string(&paths.config_path)?;
        let raw: toml::Value = toml::from_str(&content)?;
        let file_version = raw
            .get("version")
            .and_then(|value| value.as_integer())
            .unwrap_or(0) as u32;

        let mut config: Config = toml::from_str(&content)?;
        let mut migrated = false;

        if file_version < CONFIG_VERSION {
            config.version = CONFIG_VERSION;
            migrated = true;
        } else if file_version > CONFIG_VERSION {
            tracing::warn!(
                file_version,
                supported = CONFIG_VERSION,
                "config version is newer than supported; proceeding"
            );
        }

        warn_if_loose_permissions(&paths.config_path)?;

        if migrated {
            Self::write(paths, &config)?;
        }

        Ok(config)
    }

    pub fn write(paths: &ConfigPaths, config: &Config) -> Result<(), ConfigError> {
        ensure_dirs(paths)?;
        let content = toml::to_string_pretty(config)?;
        write_atomic(&paths.config_path, content.as_bytes())?;
        Ok(())
    }

    pub fn redacted(&self) -> Self {
        let mut redacted = self.clone();
        redact_provider(&mut redacted.extract.local);
        redact_provider(&mut redacted.extract.cloud);
        redacted
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.extract.active.as_str() {
            "local" | "cloud" | "pattern" => {}
            other => {
                return Err(ConfigError::Validation(format!(
                    "extract.active must be local, cloud or pattern (got {other})"
                )));
            }
        }
        validate_profile(
            "extract.local",
            &self.extract.local,
            &["ollama"],
            self.extract.active == "local",
        )?;
        validate_profile(
            "extract.cloud",
            &self.extract.cloud,
            &["groq", "openrouter"],
            self.extract.active == "cloud",
        )?;
        if self.extract.max_group_chars == 0 {
            return Err(ConfigError::Validation(
                "extract.max_group_chars must be greater than 0".into(),
            ));
        }
        if self.scan.interval_minutes == 0 || self.scan.interval_minutes > MAX_INTERVAL_MINUTES {
            return Err(ConfigError::Validation(format!(
                "scan.interval_minutes must be between 1 and {MAX_INTERVAL_MINUTES}"
            )));
        }
        if self.scan.window_minutes <= 0 || self.scan.window_minutes > MAX_WINDOW_MINUTES {
            return Err(ConfigError::Validation(format!(
                "scan.window_minutes must be between 1 and {MAX_WINDOW_MINUTES}"
            )));
        }
        if self.scan.limit == 0 {
            return Err(ConfigError::Validation(
                "scan.limit must be greater than 0".into(),
            ));
        }
        if self.capture.base_url.trim().is_empty() {
            return Err(ConfigError::Validation(
                "capture.base_url must not be empty".into(),
            ));
        }
        for (label, minutes) in [
            ("reminders.high_minutes", self.reminders.high_minutes),
            ("reminders.medium_minutes", self.reminders.medium_minutes),
            ("reminders.low_minutes", self.reminders.low_minutes),
        ] {
            if !(0..=MAX_LEAD_MINUTES).contains(&minutes) {
                return Err(ConfigError::Validation(format!(
                    "{label} must be between 0 and {MAX_LEAD_MINUTES}"
                )));
            }
        }
        Ok(())
    }

    pub fn keyword_set(&self) -> PriorityKeywordSet {
        PriorityKeywordSet::new(&self.keywords.high, &self.keywords.medium, &self.keywords.low)
    }

    pub fn filter_options(&self) -> FilterOptions {
        FilterOptions {
            extra_excluded_apps: self.scan.extra_excluded_apps.clone(),
            ..FilterOptions::default()
        }
    }

    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions {
            max_group_chars: self.extract.max_group_chars,
            min_group_chars: self.extract.min_group_chars,
            parallel_groups: self.extract.parallel_groups,
        }
    }

    pub fn reminder_timing(&self) -> ReminderTiming {
        ReminderTiming {
            high_minutes: self.reminders.high_minutes,
            medium_minutes: self.reminders.medium_minutes,
            low_minutes: self.reminders.low_minutes,
        }
    }
}

fn ensure_dirs(paths: &ConfigPaths) -> Result<(), ConfigError> {
    fs::create_dir_all(&paths.base_dir)?;
    Ok(())
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), ConfigError> {
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::other("config path missing parent directory"))?;
    let tmp_path = parent.join("config.toml.tmp");
    fs::write(&tmp_path, contents)?;
    set_strict_permissions(&tmp_path)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

fn set_strict_permissions(path: &Path) -> Result<(), ConfigError> {
    #[cfg(unix)]
    {
        let perm = fs::Permissions::from_mode(0o600);
        fs::set_permissions(path, perm)?;
    }
    Ok(())
}

fn warn_if_loose_permissions(path: &Path) -> Result<(), ConfigError> {
    #[cfg(unix)]
    {
        let metadata = fs::metadata(path)?;
        let mode = metadata.permissions().mode() & 0o777;
        if mode & 0o077 != 0 {
            tracing::warn!(
                path = %path.display(),
                "config file is group/world readable; set permissions to 0600"
            );
        }
    }
    Ok(())
}

fn validate_profile(
    label: &str,
    profile: &ProviderConfig,
    allowed: &[&str],
    is_active: bool,
) -> Result<(), ConfigError> {
    if !allowed.contains(&profile.provider.as_str()) {
        return Err(ConfigError::Validation(format!(
            "{label}.provider must be one of {} (got {})",
            allowed.join(", "),
            profile.provider
        )));
    }
    if profile.model.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "{label}.model must not be empty"
        )));
    }
    if is_active && profile.provider != "ollama" && profile.api_key.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "{label}.api_key required when {label}.provider={}",
            profile.provider
        )));
    }
    Ok(())
}

fn redact_provider(profile: &mut ProviderConfig) {
    if !profile.api_key.trim().is_empty() {
        profile.api_key = "<redacted>".to_string();
    }
}
