//! Portal session state threaded through each stage of a run.

use std::collections::BTreeMap;

/// Name of the ASP.NET session cookie the portal keys every call on.
pub const SESSION_COOKIE: &str = "ASP.NET_SessionId";

/// Cookie store plus the anti-forgery token scraped at landing time.
///
/// Stages never mutate a session in place; each returns the updated value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    cookies: BTreeMap<String, String>,
    token: Option<String>,
    authenticated: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges cookies from a response. An empty value deletes the cookie.
    pub fn with_cookies<I>(mut self, cookies: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (name, value) in cookies {
            if value.is_empty() {
                self.cookies.remove(&name);
            } else {
                self.cookies.insert(name, value);
            }
        }
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn authenticated(mut self) -> Self {
        self.authenticated = true;
        self
    }

    /// The state after logout: no cookies, no token.
    pub fn terminated(self) -> Self {
        Self::default()
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Value for an explicit `Cookie` request header, if any cookie is held.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}
