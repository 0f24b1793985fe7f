//! Link bots: pattern matching, quip state, and reply generation.
//!
//! A [`LinkBot`] pairs an immutable definition (pattern, templates, backend)
//! with its mutable runtime state (quip pool, quip toggle). The
//! [`BotRegistry`] is constructed once at startup and passed by handle into
//! both the message-handling path and the control-command path.

pub mod compose;
pub mod matcher;
pub mod quips;

use std::{collections::HashSet, sync::Arc};

use tracing::warn;

use crate::{
    base::{
        config::{BackendKind, BotDefinition, Config},
        types::{LookupError, Res},
    },
    service::{
        backend::{BackendClient, jira, link, service_now},
        saml::AuthenticatedSession,
    },
};

use matcher::PatternMatcher;
use quips::QuipRotator;

/// One running bot.
pub struct LinkBot {
    matcher: PatternMatcher,
    quips: QuipRotator,
    backend: BackendClient,
}

impl LinkBot {
    /// Build a bot from its definition.
    ///
    /// Fails when the pattern does not compile or when a backend definition
    /// is incomplete; the registry skips such bots and keeps the rest.
    pub fn new(definition: &BotDefinition, idp_url: &str) -> Res<Self> {
        let backend = match definition.backend {
            BackendKind::Link => {
                BackendClient::static_link(definition.link.clone().unwrap_or_else(|| link::DEFAULT_LINK_TEMPLATE.to_string()))
            }
            BackendKind::Jira => {
                let host = required_host(definition)?;
                let session = AuthenticatedSession::new(idp_url, definition.auth.clone())?;
                BackendClient::jira(host, definition.link.clone(), session)
            }
            BackendKind::ServiceNow => {
                let host = required_host(definition)?;
                let session = AuthenticatedSession::new(idp_url, definition.auth.clone())?.with_basic_auth();
                BackendClient::service_now(host, session)
            }
        };

        let pattern = match (&definition.match_pattern, definition.backend) {
            (Some(pattern), _) => pattern.clone(),
            (None, BackendKind::Jira) => jira::DEFAULT_MATCH.to_string(),
            (None, BackendKind::ServiceNow) => service_now::default_match(),
            (None, BackendKind::Link) => anyhow::bail!("link bot definition needs a match pattern"),
        };
        let matcher = PatternMatcher::compile(&pattern)?;

        let quips = match &definition.quips {
            Some(templates) => QuipRotator::new(templates.clone()),
            None => QuipRotator::with_defaults(),
        };

        Ok(Self { matcher, quips, backend })
    }

    /// The bot's display name, shown by the `links` control command.
    pub fn name(&self) -> String {
        format!("linkbot ({})", self.matcher.pattern())
    }

    pub fn match_pattern(&self) -> &str {
        self.matcher.pattern()
    }

    pub fn quips(&self) -> &QuipRotator {
        &self.quips
    }

    /// The set of unique keys mentioned in `text`.
    pub fn matches(&self, text: &str) -> HashSet<String> {
        self.matcher.matches(text)
    }

    /// Build the full reply for one matched key.
    ///
    /// The backend lookup completes before any quip state is touched, so the
    /// quip-pool lock is never held across network I/O.
    pub async fn message(&self, key: &str) -> Result<String, LookupError> {
        let record = self.backend.lookup(key).await?;
        let quip_line = self.quips.next(&self.backend.link(key));

        Ok(compose::compose(quip_line, record.as_ref()))
    }
}

fn required_host(definition: &BotDefinition) -> Res<String> {
    definition.host.clone().ok_or_else(|| anyhow::anyhow!("bot definition needs a host"))
}

/// The set of running bots.
///
/// Constructed once at startup; trivially cloneable so the message path and
/// the control plane share the same bot state.
#[derive(Clone)]
pub struct BotRegistry {
    bots: Arc<Vec<LinkBot>>,
}

impl BotRegistry {
    pub fn new(bots: Vec<LinkBot>) -> Res<Self> {
        if bots.is_empty() {
            anyhow::bail!("no linkbots defined");
        }

        Ok(Self { bots: Arc::new(bots) })
    }

    /// Build every bot from configuration, skipping definitions that fail to
    /// load so one bad pattern does not take the others down.
    pub fn from_config(config: &Config) -> Res<Self> {
        let mut bots = Vec::new();

        for definition in &config.linkbots {
            match LinkBot::new(definition, &config.idp_url) {
                Ok(bot) => bots.push(bot),
                Err(err) => warn!("Skipping bot definition: {err}"),
            }
        }

        Self::new(bots)
    }

    pub fn bots(&self) -> &[LinkBot] {
        &self.bots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::config::ConfigInner;

    fn link_definition(pattern: &str) -> BotDefinition {
        BotDefinition {
            match_pattern: Some(pattern.to_string()),
            link: Some("<https://example.com/{}|{}>".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn registry_skips_invalid_patterns_and_keeps_the_rest() {
        let config = Config {
            inner: Arc::new(ConfigInner {
                linkbots: vec![link_definition("[unclosed"), link_definition("KB[0-9]+")],
                ..Default::default()
            }),
        };

        let registry = BotRegistry::from_config(&config).expect("one good bot remains");

        assert_eq!(registry.bots().len(), 1);
        assert_eq!(registry.bots()[0].match_pattern(), "KB[0-9]+");
    }

    #[test]
    fn registry_with_no_usable_bots_is_an_error() {
        let config = Config {
            inner: Arc::new(ConfigInner::default()),
        };

        assert!(BotRegistry::from_config(&config).is_err());
    }

    #[test]
    fn link_bot_requires_a_pattern() {
        let definition = BotDefinition {
            link: Some("<https://example.com/{}|{}>".to_string()),
            ..Default::default()
        };

        assert!(LinkBot::new(&definition, "https://idp.example.com/").is_err());
    }

    #[test]
    fn backend_bots_get_default_patterns() {
        let definition = BotDefinition {
            backend: BackendKind::Jira,
            host: Some("https://jira.example.com".to_string()),
            ..Default::default()
        };

        let bot = LinkBot::new(&definition, "https://idp.example.com/").expect("defaults apply");

        assert_eq!(bot.match_pattern(), jira::DEFAULT_MATCH);
        assert!(bot.matches("see ABC-123").contains("ABC-123"));
    }

    #[tokio::test]
    async fn static_link_bot_message_is_the_quipped_link() {
        let bot = LinkBot::new(&link_definition("KB[0-9]+"), "https://idp.example.com/").expect("bot should build");
        bot.quips().set_enabled(false);

        let message = bot.message("KB123").await.expect("static links never fail");

        assert_eq!(message, "<https://example.com/KB123|KB123>");
    }
}
