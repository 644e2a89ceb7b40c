//! Request context and credential extraction
//!
//! Classifying the credential is pure: it only looks at headers and cookies.

use std::collections::HashMap;

use serde_json::Value;

use crate::jwt::extract_bearer_token;

/// Header carrying a delegated API-key token
pub const API_KEY_HEADER: &str = "api-key";

/// Cookie carrying the session token
pub const AUTH_COOKIE: &str = "AuthToken";

/// Transport-independent view of an inbound request
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    headers: HashMap<String, String>,
    cookies: HashMap<String, String>,
    body: Value,
}

impl RequestContext {
    /// Create from a list of header key-value pairs.
    ///
    /// Header names are case-insensitive; cookies are parsed out of any `Cookie` header.
    pub fn from_pairs(pairs: &[(impl AsRef<str>, impl AsRef<str>)]) -> Self {
        let mut headers = HashMap::new();
        let mut cookies = HashMap::new();

        for (name, value) in pairs {
            let name = name.as_ref().to_ascii_lowercase();
            let value = value.as_ref();

            if name == "cookie" {
                for (cookie_name, cookie_value) in parse_cookie_header(value) {
                    cookies.entry(cookie_name).or_insert(cookie_value);
                }
            }
            headers.insert(name, value.to_string());
        }

        Self {
            headers,
            cookies,
            body: Value::Null,
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    pub fn body(&self) -> &Value {
        &self.body
    }
}

/// Split a `Cookie` header into name/value pairs
pub fn parse_cookie_header(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .filter_map(|part| {
            let (name, value) = part.trim().split_once('=')?;
            Some((name.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Which credential, if any, a request carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    ApiKey(String),
    SessionToken(String),
    None,
}

/// Classify the credential on a request.
///
/// An `api-key` header wins outright: when it is present the session cookie and the
/// `Authorization` header are never looked at. Otherwise the `AuthToken` cookie is
/// preferred over a bearer token.
pub fn extract_credential(ctx: &RequestContext) -> Credential {
    if let Some(key) = non_empty(ctx.header(API_KEY_HEADER)) {
        return Credential::ApiKey(key.to_string());
    }

    if let Some(token) = non_empty(ctx.cookie(AUTH_COOKIE)) {
        return Credential::SessionToken(token.to_string());
    }

    if let Some(token) = ctx.header("authorization").and_then(extract_bearer_token) {
        return Credential::SessionToken(token.to_string());
    }

    Credential::None
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
