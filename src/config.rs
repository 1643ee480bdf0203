use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::github::client::DEFAULT_API_URL;

pub const DEFAULT_CONFIG_PATH: &str = ".outdated-branches.toml";
pub const DEFAULT_OWNER: &str = "mberlanda";
pub const DEFAULT_REPO: &str = "outdated_branches";
pub const DEFAULT_BRANCH: &str = "master";

pub const TOKEN_ENV: &str = "GITHUB_OAUTH_TOKEN";
pub const OWNER_ENV: &str = "REPO_AUTHOR";
pub const REPO_ENV: &str = "REPO_NAME";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("GitHub token not found, export GITHUB_OAUTH_TOKEN or set github.token in the config file")]
    MissingToken,

    #[error("Invalid {field}: {value:?}")]
    InvalidIdentifier { field: &'static str, value: String },
}

/// Contents of `.outdated-branches.toml`. Every field is optional.
///
/// ```toml
/// [github]
/// token = "..."
/// owner = "mberlanda"
/// repo = "outdated_branches"
/// api_url = "https://api.github.com"
/// default_branch = "master"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub github: GitHubSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubSection {
    pub token: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub api_url: Option<String>,
    pub default_branch: Option<String>,
}

impl FileConfig {
    /// Load from `path`, or defaults if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }
}

/// Command line values that take precedence over everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub default_branch: Option<String>,
}

/// Fully resolved settings for one run.
#[derive(Clone)]
pub struct Config {
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub api_url: String,
    pub default_branch: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("token", &"<redacted>")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("api_url", &self.api_url)
            .field("default_branch", &self.default_branch)
            .finish()
    }
}

impl Config {
    /// Load the config file at `path` and merge it with the process
    /// environment and `overrides`.
    pub fn load(path: &Path, overrides: Overrides) -> Result<Config, ConfigError> {
        let file = FileConfig::load(path)?;
        Self::resolve(file, overrides, |key| std::env::var(key).ok())
    }

    /// Merge layers, highest precedence first: overrides, environment,
    /// file, built-in defaults. Empty strings count as unset.
    pub fn resolve(
        file: FileConfig,
        overrides: Overrides,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Config, ConfigError> {
        let env = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let github = file.github;

        let token = env(TOKEN_ENV)
            .or(github.token)
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::MissingToken)?;
        let owner = overrides
            .owner
            .or_else(|| env(OWNER_ENV))
            .or(github.owner)
            .unwrap_or_else(|| DEFAULT_OWNER.to_string());
        let repo = overrides
            .repo
            .or_else(|| env(REPO_ENV))
            .or(github.repo)
            .unwrap_or_else(|| DEFAULT_REPO.to_string());
        let default_branch = overrides
            .default_branch
            .or(github.default_branch)
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string());
        let api_url = github.api_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let config = Config {
            token,
            owner,
            repo,
            api_url,
            default_branch,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject identifiers that would produce a malformed API path.
    fn validate(&self) -> Result<(), ConfigError> {
        let checks = [
            ("owner", &self.owner, true),
            ("repository", &self.repo, true),
            ("default branch", &self.default_branch, false),
        ];
        for (field, value, forbid_slash) in checks {
            let invalid = value.is_empty()
                || value.chars().any(char::is_whitespace)
                || (forbid_slash && value.contains('/'));
            if invalid {
                return Err(ConfigError::InvalidIdentifier {
                    field,
                    value: value.clone(),
                });
            }
        }
        Ok(())
    }
}
