//! Login token acquisition.
//!
//! The session token is a process-wide singleton held by the cache; a
//! non-empty cached value short-circuits the login flow entirely.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde_json::Value;
use tracing::debug;
use tryline_core::{Error, LoginFailure, Result, SubscriptionType};

use crate::OoyalaSession;

impl OoyalaSession {
    /// Get the session token, logging in if none is cached.
    ///
    /// A non-empty cached token is returned without any network call.
    /// On a fresh login the token is stored in the cache before returning.
    pub async fn user_token(&self) -> Result<String> {
        if let Some(token) = self.cache.get()? {
            if !token.is_empty() {
                debug!("Using cached token: {}", mask_token(&token));
                return Ok(token);
            }
        }

        let token = match self.config.subscription {
            SubscriptionType::Free => self.free_login().await?,
            SubscriptionType::Paid => self.paid_login().await?,
        };

        self.cache.set(&token)?;
        debug!("Using token: {}", mask_token(&token));
        Ok(token)
    }

    /// Paid subscription flow: the subscription service answers JSON with
    /// either a `UserToken` or an `ErrorCode`.
    async fn paid_login(&self) -> Result<String> {
        let body = self.post_credentials(&self.config.paid_login_url).await?;
        let json: Value = serde_json::from_str(&body)?;

        if let Some(code) = json.get("ErrorCode") {
            let code = code.as_str().map_or_else(|| code.to_string(), str::to_owned);
            let failure = match code.as_str() {
                "MIS_EMPTY" => LoginFailure::NoSubscription,
                "5" => LoginFailure::BadCredentials,
                _ => LoginFailure::Provider(
                    json.get("ErrorMessage")
                        .and_then(Value::as_str)
                        .unwrap_or("login rejected by provider")
                        .to_string(),
                ),
            };
            return Err(failure.into());
        }

        json.get("UserToken")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| {
                LoginFailure::Provider("login response missing UserToken".to_string()).into()
            })
    }

    /// Free entitlement flow: the response body is the token itself.
    async fn free_login(&self) -> Result<String> {
        let body = self.post_credentials(&self.config.free_login_url).await?;
        let token = body.trim().to_string();
        if token.is_empty() {
            return Err(LoginFailure::Provider("free login returned an empty token".to_string()).into());
        }
        Ok(token)
    }

    async fn post_credentials(&self, url: &str) -> Result<String> {
        debug!("Logging in via {url}");

        let response = self
            .http
            .post(url)
            .form(&[
                ("username", self.config.username.as_str()),
                ("password", self.config.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read login response: {e}")))
    }
}

/// Serialize the single-element XML document POSTed when requesting an
/// embed token: `<Subscription><UserToken>…</UserToken></Subscription>`.
pub fn user_id_document(token: &str) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| Error::Internal(format!("Failed to write XML declaration: {e}")))?;
    writer
        .write_event(Event::Start(BytesStart::new("Subscription")))
        .map_err(|e| Error::Internal(e.to_string()))?;
    writer
        .write_event(Event::Start(BytesStart::new("UserToken")))
        .map_err(|e| Error::Internal(e.to_string()))?;
    writer
        .write_event(Event::Text(BytesText::new(token)))
        .map_err(|e| Error::Internal(e.to_string()))?;
    writer
        .write_event(Event::End(BytesEnd::new("UserToken")))
        .map_err(|e| Error::Internal(e.to_string()))?;
    writer
        .write_event(Event::End(BytesEnd::new("Subscription")))
        .map_err(|e| Error::Internal(e.to_string()))?;

    Ok(writer.into_inner())
}

/// Mask a token for logging, keeping everything but the last six characters.
fn mask_token(token: &str) -> String {
    let visible = token.chars().count().saturating_sub(6);
    let head: String = token.chars().take(visible).collect();
    format!("{head}******")
}
