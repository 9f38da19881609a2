//! # Configuration
//!
//! Loads the application's settings from the environment (optionally seeded by a `.env` file).
//! Read once at startup; shared read-only afterwards.

use std::fmt;
use std::time::Duration;

use crate::domain::commands::CommandTable;
use crate::domain::errors::ConfigError;
use crate::domain::types::AllowList;

const DEFAULT_REPO: &str = "dikeckaan/neko-actions";
const DEFAULT_WORKFLOW: &str = "telegram-bot.yml";
const DEFAULT_BRANCH: &str = "master";
const DEFAULT_GITHUB_API: &str = "https://api.github.com";
const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Main application configuration structure.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub github: GitHubConfig,
    pub telegram: TelegramConfig,
    pub allowed_users: AllowList,
    pub commands: CommandTable,
    pub webhook: WebhookConfig,
}

#[derive(Clone)]
pub struct GitHubConfig {
    pub token: String,
    pub repo: String,
    pub workflow: String,
    pub branch: String,
    pub api_url: String,
    pub timeout: Duration,
    /// Passed to the workload as `cloudflaretoken` when set.
    pub tunnel_token: Option<String>,
}

#[derive(Clone)]
pub struct TelegramConfig {
    pub token: String,
    pub api_url: String,
    pub timeout: Duration,
}

/// Settings used only by the webhook server.
#[derive(Debug, Clone, Default)]
pub struct WebhookConfig {
    pub secret_path: Option<String>,
    pub public_url: Option<String>,
}

impl fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("token", &"<redacted>")
            .field("repo", &self.repo)
            .field("workflow", &self.workflow)
            .field("branch", &self.branch)
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .field("tunnel_token", &self.tunnel_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AppConfig {
    /// Reads the process environment.
    pub fn from_env(commands: CommandTable) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok(), commands)
    }

    /// Builds the configuration from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F, commands: CommandTable) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let telegram_token = require("TELEGRAM_BOT_TOKEN")?;
        let github_token = require("GITHUB_TOKEN")?;

        let timeout = match get("REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs: u64 = raw.parse().map_err(|_| ConfigError::Invalid {
                    name: "REQUEST_TIMEOUT_SECS",
                    reason: format!("`{raw}` is not a whole number of seconds"),
                })?;
                if secs == 0 {
                    return Err(ConfigError::Invalid {
                        name: "REQUEST_TIMEOUT_SECS",
                        reason: "must be greater than zero".into(),
                    });
                }
                Duration::from_secs(secs)
            }
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        let secret_path = get("SECRET_PATH").map(|p| p.trim_matches('/').to_string());

        Ok(Self {
            github: GitHubConfig {
                token: github_token,
                repo: get_or("GITHUB_REPO", DEFAULT_REPO),
                workflow: get_or("WORKFLOW_NAME", DEFAULT_WORKFLOW),
                branch: get_or("GITHUB_BRANCH", DEFAULT_BRANCH),
                api_url: trim_base(get_or("GITHUB_API_URL", DEFAULT_GITHUB_API)),
                timeout,
                tunnel_token: get("CLOUDFLARE_TUNNEL_TOKEN"),
            },
            telegram: TelegramConfig {
                token: telegram_token,
                api_url: trim_base(get_or("TELEGRAM_API_URL", DEFAULT_TELEGRAM_API)),
                timeout,
            },
            allowed_users: AllowList::parse(&get("ALLOWED_USER_IDS").unwrap_or_default()),
            commands,
            webhook: WebhookConfig {
                secret_path: secret_path.filter(|p| !p.is_empty()),
                public_url: get("WEBHOOK_URL"),
            },
        })
    }

    /// Browser link to the workflow repository.
    pub fn repo_url(&self) -> String {
        format!("https://github.com/{}", self.github.repo)
    }
}

fn trim_base(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
