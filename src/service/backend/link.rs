//! Static link backend: formats a configured template, never queries anything.

use std::sync::Arc;

use async_trait::async_trait;

use crate::base::types::LookupError;

use super::{BackendClient, GenericBackendClient, Record};

/// Bare label-only template used when a link bot configures none.
pub const DEFAULT_LINK_TEMPLATE: &str = "{}|{}";

/// Fill a two-slot link template with the key (href and label).
pub(crate) fn fill_link_template(template: &str, key: &str) -> String {
    template.replace("{}", key)
}

/// Backend for bots that only format a link template.
pub struct StaticLinkClient {
    template: String,
}

impl BackendClient {
    /// Creates a template-only backend client.
    pub fn static_link(template: impl Into<String>) -> Self {
        Self::new(Arc::new(StaticLinkClient { template: template.into() }))
    }
}

#[async_trait]
impl GenericBackendClient for StaticLinkClient {
    fn link(&self, key: &str) -> String {
        fill_link_template(&self.template, key)
    }

    async fn lookup(&self, _key: &str) -> Result<Option<Record>, LookupError> {
        Ok(None)
    }
}
