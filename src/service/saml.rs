//! Authenticated HTTP session that survives single-sign-on redirects.
//!
//! Every outbound request is checked for a redirect onto the identity
//! provider. When one is detected, the session parses the returned login
//! form, injects the configured credentials, and POSTs it back, bounded to a
//! small number of attempts per outer request. Callers see either the final
//! non-IdP response or a [`SessionError`].

use std::collections::HashMap;

use reqwest::{Method, Response, StatusCode};
use scraper::{Html, Selector};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::base::{config::Credentials, types::LookupError};

/// Login form submissions allowed per outer request.
const MAX_LOGIN_ATTEMPTS: usize = 2;

/// Form field names the identity provider uses for credentials.
const USERNAME_FIELD: &str = "j_username";
const PASSWORD_FIELD: &str = "j_password";

#[derive(Debug, Error)]
pub enum SessionError {
    /// The SSO flow failed or exceeded the retry bound.
    #[error("sign-in failed: {0}")]
    Authentication(String),
    /// The underlying transport failed.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

impl From<SessionError> for LookupError {
    fn from(err: SessionError) -> Self {
        LookupError::Backend(err.to_string())
    }
}

/// HTTP session wrapper shared by the backend clients.
///
/// Requests look identical to an unauthenticated client unless the response
/// lands on the identity provider, in which case the login form is completed
/// transparently before the caller sees anything.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    client: reqwest::Client,
    idp_url: String,
    credentials: Option<Credentials>,
    basic_auth: bool,
}

impl AuthenticatedSession {
    pub fn new(idp_url: impl Into<String>, credentials: Option<Credentials>) -> Result<Self, SessionError> {
        // The identity provider tracks sign-in state through cookies, so the
        // session needs a jar to stay signed in across lookups.
        let client = reqwest::Client::builder().cookie_store(true).build()?;

        Ok(Self {
            client,
            idp_url: idp_url.into(),
            credentials,
            basic_auth: false,
        })
    }

    /// Also send HTTP basic auth on the initial request, for backends that
    /// authenticate per request rather than through the identity provider.
    pub fn with_basic_auth(mut self) -> Self {
        self.basic_auth = true;
        self
    }

    pub async fn get(&self, url: Url) -> Result<Response, SessionError> {
        self.request(Method::GET, url).await
    }

    pub async fn request(&self, method: Method, url: Url) -> Result<Response, SessionError> {
        let mut builder = self.client.request(method, url);
        if self.basic_auth
            && let Some(credentials) = &self.credentials
        {
            builder = builder.basic_auth(&credentials.username, Some(&credentials.password));
        }

        let mut response = builder.send().await?;

        for _ in 0..MAX_LOGIN_ATTEMPTS {
            if !self.is_idp(response.url()) {
                return Ok(response);
            }

            debug!("Redirected to the identity provider, submitting login form ...");

            let body = response.text().await?;
            let (action, mut form) =
                login_form(&body, &self.idp_url).ok_or_else(|| SessionError::Authentication("no login form in identity provider response".to_string()))?;

            if let Some(credentials) = &self.credentials
                && form.contains_key(USERNAME_FIELD)
            {
                form.insert(USERNAME_FIELD.to_string(), credentials.username.clone());
                form.insert(PASSWORD_FIELD.to_string(), credentials.password.clone());
            }

            // The resubmission must use the server-dictated form encoding, so
            // no client-supplied content type carries over.
            response = self.client.post(action).form(&form).send().await?;

            if response.status() != StatusCode::OK {
                return Err(SessionError::Authentication(format!("login form submission returned {}", response.status())));
            }
        }

        if self.is_idp(response.url()) {
            return Err(SessionError::Authentication("still on the identity provider after retries".to_string()));
        }

        Ok(response)
    }

    fn is_idp(&self, url: &Url) -> bool {
        url.as_str().starts_with(&self.idp_url)
    }
}

/// Extract the action URL (resolved against the IdP base) and the named
/// input values of the single login form in `html`.
fn login_form(html: &str, idp_url: &str) -> Option<(Url, HashMap<String, String>)> {
    let document = Html::parse_document(html);
    let form_selector = Selector::parse("form").ok()?;
    let input_selector = Selector::parse("input").ok()?;

    let form = document.select(&form_selector).next()?;
    let action = form.value().attr("action")?;
    let action = Url::parse(idp_url).ok()?.join(action).ok()?;

    let mut data = HashMap::new();
    for input in form.select(&input_selector) {
        if let Some(name) = input.value().attr("name") {
            data.insert(name.to_string(), input.value().attr("value").unwrap_or_default().to_string());
        }
    }

    Some((action, data))
}
