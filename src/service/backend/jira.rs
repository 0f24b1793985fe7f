//! Issue-tracker backend: resolves Jira issues by key.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::{base::types::LookupError, bot::compose::escape_html, service::saml::AuthenticatedSession};

use super::{BackendClient, FieldKind, GenericBackendClient, Record, link::fill_link_template};

/// Default key pattern for issue keys like `ABC-123`.
pub const DEFAULT_MATCH: &str = "[A-Z]{3,}-[0-9]+";

/// Timestamp format the tracker returns for `updated` (ISO-8601 with offset).
const UPDATED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// Issue-tracker client that resolves one issue per matched key.
pub struct IssueTrackerClient {
    host: String,
    link_template: String,
    session: AuthenticatedSession,
}

impl BackendClient {
    /// Creates an issue-tracker backend client.
    pub fn jira(host: impl Into<String>, link_template: Option<String>, session: AuthenticatedSession) -> Self {
        let host = host.into();
        let link_template = link_template.unwrap_or_else(|| format!("<{host}/browse/{{}}|{{}}>"));

        Self::new(Arc::new(IssueTrackerClient { host, link_template, session }))
    }
}

#[derive(Debug, Deserialize)]
struct Issue {
    fields: IssueFields,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct IssueFields {
    summary: Option<String>,
    reporter: Option<Person>,
    assignee: Option<Person>,
    status: Option<Status>,
    updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Person {
    #[serde(rename = "displayName")]
    display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Status {
    name: Option<String>,
}

fn display_name(person: Option<&Person>) -> String {
    person.and_then(|person| person.display_name.clone()).unwrap_or_else(|| "None".to_string())
}

/// Reformat the update timestamp for display; raw value when unparsable.
fn pretty_update_time(updated: &str) -> String {
    DateTime::parse_from_str(updated, UPDATED_FORMAT)
        .map(|updated| updated.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|_| updated.to_string())
}

fn issue_url(host: &str, key: &str) -> Result<Url, LookupError> {
    let mut url = Url::parse(host).map_err(|err| LookupError::Backend(err.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| LookupError::Backend(format!("{host} cannot be a base URL")))?
        .pop_if_empty()
        .extend(["rest", "api", "latest", "issue", key]);

    Ok(url)
}

#[async_trait]
impl GenericBackendClient for IssueTrackerClient {
    fn link(&self, key: &str) -> String {
        fill_link_template(&self.link_template, key)
    }

    async fn lookup(&self, key: &str) -> Result<Option<Record>, LookupError> {
        let url = issue_url(&self.host, key)?;
        let response = self.session.get(url).await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound(key.to_string()));
        }
        if !response.status().is_success() {
            return Err(LookupError::Backend(format!("issue tracker returned {}", response.status())));
        }

        let issue: Issue = response.json().await.map_err(|err| LookupError::Backend(err.to_string()))?;
        let fields = issue.fields;

        let mut record = Record::new();
        record.push(FieldKind::Subject, "Subject", escape_html(&fields.summary.unwrap_or_default()));
        record.push(FieldKind::Plain, "Reporter", escape_html(&display_name(fields.reporter.as_ref())));
        record.push(FieldKind::Plain, "Assignee", escape_html(&display_name(fields.assignee.as_ref())));
        record.push(FieldKind::Plain, "Status", escape_html(&fields.status.and_then(|status| status.name).unwrap_or_default()));
        record.push(
            FieldKind::Plain,
            "Last Update",
            escape_html(&fields.updated.as_deref().map(pretty_update_time).unwrap_or_default()),
        );

        Ok(Some(record))
    }
}
