use crate::acwd::session::Session;
use crate::config;
use crate::error::{AcwdError, Result};
use reqwest::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use reqwest::{Client as HttpClient, RequestBuilder};
use serde::Serialize;
use std::time::Duration;

/// Header carrying the anti-forgery token on every JSON call.
pub const TOKEN_HEADER: &str = "csrftoken";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// A successful portal response: the cookies it set and its body.
#[derive(Debug)]
pub struct PortalResponse {
    pub cookies: Vec<(String, String)>,
    pub body: String,
}

pub struct Client {
    http_client: HttpClient,
    base_url: String,
    timeout_secs: u64,
}

impl Client {
    pub fn new(config: &config::AcwdConfig) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(config.request_timeout_sec))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http_client,
            base_url: config.url.trim_end_matches('/').to_string(),
            timeout_secs: config.request_timeout_sec,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Plain GET, sending the session's cookies if it holds any.
    pub async fn get(&self, path: &str, session: &Session) -> Result<PortalResponse> {
        let url = self.url(path);
        let mut request = self.http_client.get(&url);
        if let Some(cookie) = session.cookie_header() {
            request = request.header(COOKIE, cookie);
        }
        self.send(request, &url).await
    }

    /// JSON POST carrying the session's token and cookies.
    pub async fn post_json<B>(&self, path: &str, session: &Session, body: &B) -> Result<PortalResponse>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url(path);
        let mut request = self
            .http_client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .header(TOKEN_HEADER, session.token().unwrap_or_default())
            .json(body);
        if let Some(cookie) = session.cookie_header() {
            request = request.header(COOKIE, cookie);
        }
        self.send(request, &url).await
    }

    async fn send(&self, request: RequestBuilder, url: &str) -> Result<PortalResponse> {
        tracing::debug!(url = %url, "Sending portal request");
        let response = request
            .send()
            .await
            .map_err(|e| AcwdError::from_transport(e, self.timeout_secs))?;

        let status = response.status();
        let cookies = response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .filter_map(parse_set_cookie)
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| AcwdError::from_transport(e, self.timeout_secs))?;

        tracing::debug!(url = %url, status = status.as_u16(), "Portal responded");
        tracing::trace!(url = %url, body = %body, "Portal response body");

        if status.is_success() {
            Ok(PortalResponse { cookies, body })
        } else {
            Err(AcwdError::server_error(status, body))
        }
    }
}

/// Extracts the `name=value` pair from a `Set-Cookie` header value.
fn parse_set_cookie(header: &str) -> Option<(String, String)> {
    let pair = header.split(';').next()?;
    let (name, value) = pair.split_once('=')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), value.trim().trim_matches('"').to_string()))
}
