//! Service-record backend: resolves ServiceNow tickets by number.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::{base::types::LookupError, bot::compose::escape_html, service::saml::AuthenticatedSession};

use super::{BackendClient, FieldKind, GenericBackendClient, Record};

/// Ticket type prefix to backend table.
const TABLE_MAP: &[(&str, &str)] = &[
    ("CHG", "change_request"),
    ("CTASK", "change_task"),
    ("INC", "incident"),
    ("ITASK", "u_incident_task"),
    ("PRB", "problem"),
    ("PTASK", "problem_task"),
    ("REQ", "u_simple_requests"),
    ("RTASK", "u_request_task"),
];

/// Record fields requested from the table API, in display order.
const FIELDS: &[(&str, &str, FieldKind)] = &[
    ("short_description", "Subject", FieldKind::Subject),
    ("number", "Number", FieldKind::Key),
    ("parent", "Parent", FieldKind::Parent),
    ("state", "State", FieldKind::Plain),
    ("assigned_to", "Assigned To", FieldKind::Plain),
    ("opened_by", "Opened By", FieldKind::Plain),
    ("sys_updated_on", "Last Update", FieldKind::Plain),
];

const API: &str = "/api/now/table";

/// Default key pattern: any known prefix followed by at least seven digits.
pub fn default_match() -> String {
    let prefixes = TABLE_MAP.iter().map(|(prefix, _)| *prefix).collect::<Vec<_>>().join("|");

    format!("({prefixes})[0-9]{{7,}}")
}

/// Service-record client that resolves one ticket per matched number.
pub struct ServiceRecordClient {
    host: String,
    session: AuthenticatedSession,
}

impl BackendClient {
    /// Creates a service-record backend client.
    pub fn service_now(host: impl Into<String>, session: AuthenticatedSession) -> Self {
        Self::new(Arc::new(ServiceRecordClient { host: host.into(), session }))
    }
}

#[derive(Debug, Deserialize)]
struct TableResponse {
    #[serde(default)]
    result: Vec<serde_json::Map<String, Value>>,
}

/// Map a ticket number to its backend table by its non-digit prefix.
///
/// The prefix is uppercased before mapping so case-insensitively matched
/// numbers resolve the same table.
fn table_from_number(number: &str) -> Result<&'static str, LookupError> {
    let ticket_type: String = number.chars().filter(|c| !c.is_ascii_digit()).collect::<String>().to_ascii_uppercase();

    TABLE_MAP
        .iter()
        .find(|(prefix, _)| *prefix == ticket_type)
        .map(|(_, table)| *table)
        .ok_or(LookupError::UnknownTicketType(ticket_type))
}

/// Prefer an object's `display_value` member over a raw value.
fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Object(object) => object.get("display_value").and_then(Value::as_str).unwrap_or_default().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

impl ServiceRecordClient {
    /// A bare URL to a record, when its number maps to a table.
    fn record_link(&self, number: &str) -> Option<String> {
        let table = table_from_number(number).ok()?;

        Some(format!(
            "{host}/{table}.do?sysparm_table={table}&sysparm_query=number%3D{number}",
            host = self.host
        ))
    }
}

#[async_trait]
impl GenericBackendClient for ServiceRecordClient {
    fn link(&self, number: &str) -> String {
        match self.record_link(number) {
            Some(link) => format!("<{link}|{number}>"),
            None => number.to_string(),
        }
    }

    async fn lookup(&self, number: &str) -> Result<Option<Record>, LookupError> {
        let table = table_from_number(number)?;

        let field_names = FIELDS.iter().map(|(name, _, _)| *name).collect::<Vec<_>>().join(",");
        let mut url = Url::parse(&format!("{}{API}/{table}", self.host)).map_err(|err| LookupError::Backend(err.to_string()))?;
        url.query_pairs_mut()
            .append_pair("sysparm_query", &format!("number={number}"))
            .append_pair("sysparm_display_value", "true")
            .append_pair("sysparm_limit", "1")
            .append_pair("sysparm_fields", &field_names);

        let response = self.session.get(url).await?;
        if !response.status().is_success() {
            return Err(LookupError::Backend(format!("service record backend returned {}", response.status())));
        }

        let body: TableResponse = response.json().await.map_err(|err| LookupError::Backend(err.to_string()))?;
        let Some(row) = body.result.into_iter().next() else {
            return Err(LookupError::NotFound(number.to_string()));
        };

        let mut record = Record::new();
        for &(name, label, kind) in FIELDS {
            let value = escape_html(&row.get(name).map(display_value).unwrap_or_default());
            let link = match kind {
                FieldKind::Parent => self.record_link(&value),
                _ => None,
            };
            record.push_linked(kind, label, value, link);
        }

        Ok(Some(record))
    }
}
