use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILE_NAME: &str = "ghsemver.toml";

/// Represents the complete configuration for ghsemver.
///
/// Contains the GitHub API settings, local git settings and versioning defaults.
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub git: GitConfig,

    #[serde(default)]
    pub versioning: VersioningConfig,
}

fn default_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

fn default_per_page() -> u32 {
    100
}

fn default_max_pages() -> u32 {
    5
}

fn default_remote() -> String {
    "origin".to_string()
}

/// Settings for the GitHub REST API source.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitHubConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Name of the environment variable holding the API token
    #[serde(default = "default_token_env")]
    pub token_env: String,

    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Upper bound on pages fetched for any paginated listing
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// `owner/repo` override; parsed from the git remote when unset
    #[serde(default)]
    pub repository: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        GitHubConfig {
            api_url: default_api_url(),
            token_env: default_token_env(),
            per_page: default_per_page(),
            max_pages: default_max_pages(),
            repository: None,
        }
    }
}

/// Settings for the local git source.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GitConfig {
    #[serde(default = "default_remote")]
    pub remote: String,
}

impl Default for GitConfig {
    fn default() -> Self {
        GitConfig {
            remote: default_remote(),
        }
    }
}

/// Defaults applied when the invocation does not override them.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct VersioningConfig {
    #[serde(default)]
    pub main_branch: Option<String>,

    #[serde(default)]
    pub prerelease_suffix: Option<String>,
}

/// Caller-supplied overrides for a single invocation.
///
/// Built once (usually from CLI flags) and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionQuery {
    pub branch: Option<String>,
    pub main_branch: Option<String>,
    pub prerelease_suffix: Option<String>,
}

impl VersionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn with_main_branch(mut self, main_branch: impl Into<String>) -> Self {
        self.main_branch = Some(main_branch.into());
        self
    }

    pub fn with_prerelease_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.prerelease_suffix = Some(suffix.into());
        self
    }

    /// Fill unset fields from the configuration defaults.
    ///
    /// Values already present on the query always win.
    pub fn merged_with(&self, config: &VersioningConfig) -> Self {
        VersionQuery {
            branch: non_empty(self.branch.clone()),
            main_branch: non_empty(self.main_branch.clone())
                .or_else(|| non_empty(config.main_branch.clone())),
            prerelease_suffix: non_empty(self.prerelease_suffix.clone())
                .or_else(|| non_empty(config.prerelease_suffix.clone())),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `ghsemver.toml` in current directory
/// 3. `ghsemver.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new(CONFIG_FILE_NAME).exists() {
        fs::read_to_string(CONFIG_FILE_NAME)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    parse_config(&config_str)
}

/// Parse configuration from TOML text.
pub fn parse_config(config_str: &str) -> Result<Config> {
    let config: Config = toml::from_str(config_str)?;
    if config.github.per_page == 0 || config.github.per_page > 100 {
        return Err(crate::error::GhSemverError::config(format!(
            "github.per_page must be between 1 and 100, got {}",
            config.github.per_page
        )));
    }
    if config.github.max_pages == 0 {
        return Err(crate::error::GhSemverError::config(
            "github.max_pages must be at least 1",
        ));
    }
    Ok(config)
}
