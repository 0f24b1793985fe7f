//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use super::types::Res;

/// Default identity-provider base URL for SSO-protected backends.
fn default_idp_url() -> String {
    "https://idp.u.washington.edu/".to_string()
}

/// Configuration for the linkbot application.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ConfigInner {
    /// Slack app token (`SLACK_APP_TOKEN`).
    pub slack_app_token: String,
    /// Slack bot token (`SLACK_BOT_TOKEN`).
    pub slack_bot_token: String,
    /// Slack signing secret (`SLACK_SIGNING_SECRET`).
    pub slack_signing_secret: String,
    /// Port for the Prometheus metrics listener (`METRICS_PORT`). Disabled when unset.
    #[serde(default)]
    pub metrics_port: Option<u16>,
    /// Identity-provider base URL for SSO-protected backends (`IDP_URL`).
    #[serde(default = "default_idp_url")]
    pub idp_url: String,
    /// The link bots to run.
    #[serde(default)]
    pub linkbots: Vec<BotDefinition>,
}

/// Which backend family a bot resolves keys against.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// No backend; replies are links formatted from the template alone.
    #[default]
    Link,
    /// Jira-style issue tracker.
    Jira,
    /// ServiceNow-style service-management records.
    ServiceNow,
}

/// Username/password pair for a backend.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// One bot definition from configuration. Immutable after load; one
/// definition produces exactly one running bot.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct BotDefinition {
    /// Backend kind.
    #[serde(default)]
    pub backend: BackendKind,
    /// Regex source for keys to match. Backends provide a default; plain
    /// `link` bots must set one.
    #[serde(rename = "match", default)]
    pub match_pattern: Option<String>,
    /// Slack link template with two `{}` key slots (href and label).
    #[serde(default)]
    pub link: Option<String>,
    /// Quip templates, each with one `{}` link slot (stock list when unset).
    #[serde(default)]
    pub quips: Option<Vec<String>>,
    /// Backend host, e.g. `https://jira.example.com`.
    #[serde(default)]
    pub host: Option<String>,
    /// Backend credentials.
    #[serde(default)]
    pub auth: Option<Credentials>,
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(config::Environment::default().prefix("LINKBOT"));

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        Ok(result)
    }
}
