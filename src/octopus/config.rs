use crate::credential::Credential;
use crate::error::{OctoError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const CONFIG_FILENAME: &str = "cli_config.json";
const CONFIG_DIR_ENV: &str = "OCTOPUS_CONFIG_DIR";

pub const URL_ENV: &str = "OCTOPUS_URL";
pub const API_KEY_ENV: &str = "OCTOPUS_API_KEY";
pub const ACCESS_TOKEN_ENV: &str = "OCTOPUS_ACCESS_TOKEN";
pub const SPACE_ENV: &str = "OCTOPUS_SPACE";
pub const NO_PROMPT_ENV: &str = "OCTOPUS_NO_PROMPT";

/// Persistent CLI settings, stored in `<config dir>/cli_config.json`.
///
/// Environment variables override the file; command-line flags override both
/// (applied by the CLI layer).
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct CliConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    /// Space name or ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub space: Option<String>,

    pub no_prompt: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    Url,
    ApiKey,
    AccessToken,
    Space,
    NoPrompt,
}

impl ConfigKey {
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::Url,
            ConfigKey::ApiKey,
            ConfigKey::AccessToken,
            ConfigKey::Space,
            ConfigKey::NoPrompt,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::Url => "url",
            ConfigKey::ApiKey => "api-key",
            ConfigKey::AccessToken => "access-token",
            ConfigKey::Space => "space",
            ConfigKey::NoPrompt => "no-prompt",
        }
    }

    fn is_secret(&self) -> bool {
        matches!(self, ConfigKey::ApiKey | ConfigKey::AccessToken)
    }
}

impl FromStr for ConfigKey {
    type Err = OctoError;

    fn from_str(s: &str) -> Result<Self> {
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| OctoError::Config(format!("unknown config key '{}'", s)))
    }
}

/// The directory holding `cli_config.json`: `$OCTOPUS_CONFIG_DIR` if set,
/// otherwise the platform config dir.
pub fn config_dir() -> Result<PathBuf> {
    if let Some(dir) = non_empty(std::env::var(CONFIG_DIR_ENV).ok()) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("com", "octopus", "octopus")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| OctoError::Config("could not determine config directory".to_string()))
}

impl CliConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)?;
        let config: CliConfig = serde_json::from_str(&content).map_err(|e| {
            OctoError::Config(format!("cannot read {}: {}", config_path.display(), e))
        })?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, content)?;
        Ok(())
    }

    /// Overlays values from the environment, looked up through `var`.
    pub fn apply_env<F>(mut self, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = non_empty(var(URL_ENV)) {
            self.url = Some(url);
        }
        if let Some(key) = non_empty(var(API_KEY_ENV)) {
            self.api_key = Some(key);
        }
        if let Some(token) = non_empty(var(ACCESS_TOKEN_ENV)) {
            self.access_token = Some(token);
        }
        if let Some(space) = non_empty(var(SPACE_ENV)) {
            self.space = Some(space);
        }
        if let Some(flag) = non_empty(var(NO_PROMPT_ENV)) {
            self.no_prompt = is_truthy(&flag);
        }
        self
    }

    pub fn apply_process_env(self) -> Self {
        self.apply_env(|name| std::env::var(name).ok())
    }

    pub fn server_url(&self) -> Result<&str> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                OctoError::Config(format!(
                    "no server URL configured; set {} or run `octopus config url <url>`",
                    URL_ENV
                ))
            })
    }

    /// Builds the credential. Exactly one of API key or access token must be set.
    pub fn credential(&self) -> Result<Credential> {
        let api_key = self.api_key.as_deref().filter(|v| !v.trim().is_empty());
        let token = self.access_token.as_deref().filter(|v| !v.trim().is_empty());
        match (api_key, token) {
            (Some(key), None) => Credential::api_key(key),
            (None, Some(token)) => Credential::access_token(token),
            (Some(_), Some(_)) => Err(OctoError::Config(format!(
                "both an API key and an access token are configured; unset {} or {}",
                API_KEY_ENV, ACCESS_TOKEN_ENV
            ))),
            (None, None) => Err(OctoError::Config(format!(
                "no credential configured; set {} or {}",
                API_KEY_ENV, ACCESS_TOKEN_ENV
            ))),
        }
    }

    /// The space selector, empty when not configured.
    pub fn space_selector(&self) -> String {
        self.space.clone().unwrap_or_default().trim().to_string()
    }

    /// The display value of `key`; secrets are masked.
    pub fn get(&self, key: ConfigKey) -> Option<String> {
        let value = match key {
            ConfigKey::Url => self.url.clone(),
            ConfigKey::ApiKey => self.api_key.clone(),
            ConfigKey::AccessToken => self.access_token.clone(),
            ConfigKey::Space => self.space.clone(),
            ConfigKey::NoPrompt => Some(self.no_prompt.to_string()),
        };
        if key.is_secret() {
            value.map(|v| mask(&v))
        } else {
            value
        }
    }

    /// Sets `key` after validating `value`. An empty value clears the key.
    pub fn set(&mut self, key: ConfigKey, value: &str) -> Result<()> {
        let value = value.trim();
        if value.is_empty() {
            match key {
                ConfigKey::Url => self.url = None,
                ConfigKey::ApiKey => self.api_key = None,
                ConfigKey::AccessToken => self.access_token = None,
                ConfigKey::Space => self.space = None,
                ConfigKey::NoPrompt => self.no_prompt = false,
            }
            return Ok(());
        }
        match key {
            ConfigKey::Url => {
                crate::client::parse_server_url(value)?;
                self.url = Some(value.to_string());
            }
            ConfigKey::ApiKey => {
                Credential::api_key(value)?;
                self.api_key = Some(value.to_string());
            }
            ConfigKey::AccessToken => {
                Credential::access_token(value)?;
                self.access_token = Some(value.to_string());
            }
            ConfigKey::Space => self.space = Some(value.to_string()),
            ConfigKey::NoPrompt => self.no_prompt = is_truthy(value),
        }
        Ok(())
    }
}

impl fmt::Debug for CliConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CliConfig")
            .field("url", &self.url)
            .field("api_key", &self.get(ConfigKey::ApiKey))
            .field("access_token", &self.get(ConfigKey::AccessToken))
            .field("space", &self.space)
            .field("no_prompt", &self.no_prompt)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn mask(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{}********", visible)
}
