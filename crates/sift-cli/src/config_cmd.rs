use crate::config::{Config, ConfigError, ConfigPaths};
use clap::Args;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Print config with secrets redacted
    #[arg(long)]
    pub print: bool,

    /// Set a config value (dotted key=value)
    #[arg(long, value_name = "key=value")]
    pub set: Vec<String>,
}

pub fn run(args: &ConfigArgs, paths: &ConfigPaths) -> Result<(), ConfigError> {
    let mut config = Config::load_or_create(paths)?;

    if !args.set.is_empty() {
        for assignment in &args.set {
            apply_set(&mut config, assignment)?;
        }
        config.validate()?;
        Config::write(paths, &config)?;
    }

    if args.print || args.set.is_empty() {
        let output = toml::to_string_pretty(&config.redacted())?;
        println!("{output}");
    }

    Ok(())
}

fn apply_set(config: &mut Config, assignment: &str) -> Result<(), ConfigError> {
    let (key, value) = assignment
        .split_once('=')
        .ok_or_else(|| ConfigError::Validation("expected key=value for --set".into()))?;
    let key = key.trim();
    let value = value.trim();
    match key {
        "extract.active" => config.extract.active = value.to_string(),
        "extract.fallback_remote" => config.extract.fallback_remote = parse_bool(value, key)?,
        "extract.parallel_groups" => config.extract.parallel_groups = parse_bool(value, key)?,
        "extract.max_group_chars" => config.extract.max_group_chars = parse_number(value, key)?,
        "extract.min_group_chars" => config.extract.min_group_chars = parse_number(value, key)?,
        "extract.local.provider" => config.extract.local.provider = value.to_string(),
        "extract.local.model" => config.extract.local.model = value.to_string(),
        "extract.local.api_key" => config.extract.local.api_key = value.to_string(),
        "extract.cloud.provider" => config.extract.cloud.provider = value.to_string(),
        "extract.cloud.model" => config.extract.cloud.model = value.to_string(),
        "extract.cloud.api_key" => config.extract.cloud.api_key = value.to_string(),
        "extract.model" => {
            let profile = active_profile(config, key)?;
            profile.model = value.to_string();
        }
        "extract.api_key" => {
            let profile = active_profile(config, key)?;
            profile.api_key = value.to_string();
        }
        "keywords.high" => config.keywords.high = value.to_string(),
        "keywords.medium" => config.keywords.medium = value.to_string(),
        "keywords.low" => config.keywords.low = value.to_string(),
        "scan.interval_minutes" => config.scan.interval_minutes = parse_number(value, key)?,
        "scan.window_minutes" => config.scan.window_minutes = parse_number(value, key)?,
        "scan.limit" => config.scan.limit = parse_number(value, key)?,
        "scan.extra_excluded_apps" => config.scan.extra_excluded_apps = parse_list(value),
        "capture.base_url" => config.capture.base_url = value.to_string(),
        "notify.enabled" => config.notify.enabled = parse_bool(value, key)?,
        "reminders.high_minutes" => config.reminders.high_minutes = parse_number(value, key)?,
        "reminders.medium_minutes" => config.reminders.medium_minutes = parse_number(value, key)?,
        "reminders.low_minutes" => config.reminders.low_minutes = parse_number(value, key)?,
        _ => {
            return Err(ConfigError::Validation(format!(
                "unknown config key: {key}"
            )));
        }
    }
    Ok(())
}

fn active_profile<'a>(
    config: &'a mut Config,
    label: &str,
) -> Result<&'a mut crate::config::ProviderConfig, ConfigError> {
    match config.extract.active.as_str() {
        "local" => Ok(&mut config.extract.local),
        "cloud" => Ok(&mut config.extract.cloud),
        other => Err(ConfigError::Validation(format!(
            "{label} needs a local or cloud active profile (got {other})"
        ))),
    }
}

fn parse_bool(value: &str, key: &str) -> Result<bool, ConfigError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ConfigError::Validation(format!(
            "{key} expects true or false"
        ))),
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, key: &str) -> Result<T, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::Validation(format!("{key} expects an integer")))
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}
