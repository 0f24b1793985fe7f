//! Backend lookup clients for matched keys.
//!
//! Each bot owns one backend client: a static link formatter, an issue
//! tracker, or a service-record system. The closed set of variants lives
//! behind the `GenericBackendClient` trait and is selected at
//! bot-construction time from configuration.

pub mod jira;
pub mod link;
pub mod service_now;

use std::{ops::Deref, sync::Arc};

use async_trait::async_trait;

use crate::base::types::LookupError;

// Traits.

/// Generic backend trait that lookup clients must implement.
#[async_trait]
pub trait GenericBackendClient: Send + Sync + 'static {
    /// The Slack-format `<url|label>` link for a key.
    fn link(&self, key: &str) -> String;

    /// Resolve a key to a normalized record, when the backend has one.
    ///
    /// Link-only backends return `Ok(None)`; the reply is then just the
    /// quip-wrapped link.
    async fn lookup(&self, key: &str) -> Result<Option<Record>, LookupError>;
}

// Structs.

/// Backend client for one bot.
///
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<dyn GenericBackendClient>,
}

impl Deref for BackendClient {
    type Target = dyn GenericBackendClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl BackendClient {
    pub fn new(inner: Arc<dyn GenericBackendClient>) -> Self {
        Self { inner }
    }
}

// Record types.

/// How the composer renders a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Rendered bare, or as `No subject` when empty.
    Subject,
    /// Never rendered as a body line; it is already the link label.
    Key,
    /// Rendered as a link to the parent record when one can be derived.
    Parent,
    /// Rendered as `*Label* value` when non-empty.
    Plain,
}

/// One display field of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub kind: FieldKind,
    pub label: &'static str,
    pub value: String,
    /// Target URL when the value itself should render as a link.
    pub link: Option<String>,
}

/// A normalized backend record with a fixed, declared field schema.
///
/// Field iteration order is the declared schema order, not backend response
/// order. Unknown backend fields are ignored. Produced fresh per lookup and
/// discarded after one composition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<Field>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: FieldKind, label: &'static str, value: String) {
        self.push_linked(kind, label, value, None);
    }

    pub fn push_linked(&mut self, kind: FieldKind, label: &'static str, value: String, link: Option<String>) {
        self.fields.push(Field { kind, label, value, link });
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}
