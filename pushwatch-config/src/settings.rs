// Layered service settings

use crate::env::{ENV_PREFIX, EnvLoader};
use crate::loader::SettingsLoader;
use crate::source::ConfigSource;
use crate::validation::{ConfigValidator, Validate};
use crate::{ConfigError, Result};
use pushwatch_core::{DEFAULT_MAX_CONFIG_LEN, ParseMode, RuleSetParser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Default timeout for fetching a remote rule config
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

const MAX_CONFIG_LEN_CEILING: usize = 10_000_000;
const MAX_FETCH_TIMEOUT_SECS: u64 = 300;

/// Service settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Rule config location (file path or URL)
    pub rules: Option<String>,
    /// Upper bound on rule config size in bytes
    pub max_config_len: usize,
    pub fetch_timeout_secs: u64,
    /// Recipient used when the rule config has no `email` metadata
    pub alert_email: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rules: None,
            max_config_len: DEFAULT_MAX_CONFIG_LEN,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            alert_email: None,
        }
    }
}

impl Settings {
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::new()
    }

    /// Defaults, then `path` if given, then `./.env` if present, then the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = SettingsBuilder::new();
        if let Some(path) = path {
            builder = builder.file(path);
        }
        let dotenv = Path::new(".env");
        if dotenv.is_file() {
            builder = builder.dotenv(dotenv);
        }
        builder.env().build()
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Rule config source, if a location is configured
    pub fn rules_source(&self) -> Result<Option<ConfigSource>> {
        self.rules
            .as_deref()
            .map(ConfigSource::from_location)
            .transpose()
    }

    /// Parser bounded by `max_config_len`
    pub fn parser(&self, mode: ParseMode) -> RuleSetParser {
        RuleSetParser::new().mode(mode).max_len(self.max_config_len)
    }

    /// Apply one `key = value` override
    ///
    /// Unknown keys are ignored so unrelated `PUSHWATCH_*` variables
    /// (logging, for one) can share the prefix.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "rules" => self.rules = Some(value.to_string()),
            "max_config_len" => self.max_config_len = parse_number(key, value)?,
            "fetch_timeout_secs" => self.fetch_timeout_secs = parse_number(key, value)?,
            "alert_email" => {
                self.alert_email = Some(value.to_string()).filter(|v| !v.is_empty())
            }
            _ => debug!(key, "ignoring unknown setting"),
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::ParseError(format!("{} must be a number, got {:?}", key, value)))
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        if let Some(rules) = &self.rules {
            ConfigValidator::not_empty(rules, "rules")?;
        }
        ConfigValidator::in_range(
            self.max_config_len,
            1,
            MAX_CONFIG_LEN_CEILING,
            "max_config_len",
        )?;
        ConfigValidator::in_range(
            self.fetch_timeout_secs,
            1,
            MAX_FETCH_TIMEOUT_SECS,
            "fetch_timeout_secs",
        )?;
        if let Some(email) = &self.alert_email {
            ConfigValidator::is_email(email, "alert_email")?;
        }
        Ok(())
    }
}

/// Builds [`Settings`] from layered sources, later layers winning
#[derive(Debug, Default)]
pub struct SettingsBuilder {
    file: Option<PathBuf>,
    dotenv: Option<PathBuf>,
    env: bool,
    overrides: Vec<(String, String)>,
}

impl SettingsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings file, `.toml` or `.json`
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// `.env` file; only `PUSHWATCH_*` entries are used and the process environment is untouched
    pub fn dotenv(mut self, path: impl Into<PathBuf>) -> Self {
        self.dotenv = Some(path.into());
        self
    }

    /// Read `PUSHWATCH_*` process environment variables
    pub fn env(mut self) -> Self {
        self.env = true;
        self
    }

    /// Explicit override, applied last
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.overrides.push((key.into(), value.into()));
        self
    }

    pub fn build(self) -> Result<Settings> {
        let mut settings = match &self.file {
            Some(path) => SettingsLoader::auto(path)?.load_file(path)?,
            None => Settings::default(),
        };

        let loader = EnvLoader::new(ENV_PREFIX);

        if let Some(path) = &self.dotenv {
            let entries = dotenvy::from_path_iter(path)
                .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;
            apply_all(&mut settings, loader.collect(entries))?;
        }

        if self.env {
            apply_all(&mut settings, loader.load())?;
        }

        for (key, value) in &self.overrides {
            settings.apply(key, value)?;
        }

        settings.validate()?;
        debug!(?settings, "settings loaded");
        Ok(settings)
    }
}

fn apply_all<I>(settings: &mut Settings, vars: I) -> Result<()>
where
    I: IntoIterator<Item = (String, String)>,
{
    // Deterministic order for error reporting
    let mut vars: Vec<_> = vars.into_iter().collect();
    vars.sort();
    for (key, value) in vars {
        settings.apply(&key, &value)?;
    }
    Ok(())
}
