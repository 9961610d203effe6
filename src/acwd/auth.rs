//! Credential validation and session teardown.

use crate::acwd::client::Client;
use crate::acwd::envelope;
use crate::acwd::session::Session;
use crate::error::{AcwdError, Result};
use crate::model::Account;
use serde_derive::Serialize;
use serde_json::Value;

pub const LOGIN_PATH: &str = "default.aspx/validateLogin";
pub const LOGOUT_PATH: &str = "signout.aspx";

/// Body of the login call. Apart from the credentials every field is a
/// constant the portal's own login form sends.
#[derive(Serialize, Debug)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    rememberme: bool,
    #[serde(rename = "calledFrom")]
    called_from: &'static str,
    #[serde(rename = "ExternalLoginId")]
    external_login_id: &'static str,
    #[serde(rename = "LoginMode")]
    login_mode: &'static str,
    #[serde(rename = "utilityAcountNumber")]
    utility_account_number: &'static str,
    #[serde(rename = "isEdgeBrowser")]
    is_edge_browser: bool,
}

impl<'a> LoginRequest<'a> {
    fn new(account: &'a Account) -> Self {
        Self {
            username: account.username(),
            password: account.password(),
            // has no observable effect on later calls
            rememberme: false,
            called_from: "LN",
            external_login_id: "",
            login_mode: "1",
            utility_account_number: "",
            is_edge_browser: false,
        }
    }
}

/// Submits the credentials and returns the authenticated session.
///
/// The portal has no success flag: login succeeded exactly when the decoded
/// identity list contains an entry whose `UserName` equals the submitted one.
pub async fn login(client: &Client, session: Session, account: &Account) -> Result<Session> {
    tracing::debug!(username = %account.username(), "Sending login request");
    let response = client
        .post_json(LOGIN_PATH, &session, &LoginRequest::new(account))
        .await?;
    let identities: Value = envelope::decode_encoded(&response.body)?;

    if identity_matches(&identities, account.username())? {
        tracing::info!(username = %account.username(), "Login succeeded");
        Ok(session.with_cookies(response.cookies).authenticated())
    } else {
        Err(AcwdError::authentication(format!(
            "no identity for '{}' in login response",
            account.username()
        )))
    }
}

/// Checks a decoded login payload for the submitted username.
pub fn identity_matches(identities: &Value, username: &str) -> Result<bool> {
    let list = identities.as_array().ok_or_else(|| {
        AcwdError::authentication("login response is not a list of identities")
    })?;
    Ok(list
        .iter()
        .any(|identity| identity.get("UserName").and_then(Value::as_str) == Some(username)))
}

/// Best-effort sign out. Failures are logged, never returned; the session is
/// gone afterwards either way. Unauthenticated sessions are not signed out,
/// so calling this again on its own result does nothing further.
pub async fn logout(client: &Client, session: Session) -> Session {
    if !session.is_authenticated() {
        tracing::debug!("No authenticated session, skipping logout");
        return session.terminated();
    }
    match client.get(LOGOUT_PATH, &session).await {
        Ok(_) => tracing::debug!("Logout successful"),
        Err(e) => tracing::warn!(error = %e, "Logout failed"),
    }
    session.terminated()
}
