//! Landing page fetch and anti-forgery token extraction.

use crate::acwd::client::Client;
use crate::acwd::helper::html_selector;
use crate::acwd::session::{Session, SESSION_COOKIE};
use crate::error::{AcwdError, Result};
use scraper::Html;

pub const LANDING_PATH: &str = "";

const TOKEN_SELECTOR: &str = "input#hdnCSRFToken";

/// Opens a fresh session: fetches the landing page for its cookies and token.
pub async fn start_session(client: &Client) -> Result<Session> {
    let response = client.get(LANDING_PATH, &Session::new()).await?;
    let token = parse_token(&response.body)?;
    let session = Session::new()
        .with_cookies(response.cookies)
        .with_token(token);

    if session.cookie(SESSION_COOKIE).is_none() {
        tracing::warn!(
            cookie = SESSION_COOKIE,
            "Landing page did not set a session cookie"
        );
    }
    Ok(session)
}

/// Reads the hidden token field's value out of the landing page markup.
pub fn parse_token(html: &str) -> Result<String> {
    let document = Html::parse_document(html);
    let selector = html_selector(TOKEN_SELECTOR)?;
    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr("value"))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            AcwdError::protocol_shape(format!(
                "landing page has no value for '{}'",
                TOKEN_SELECTOR
            ))
        })
}
