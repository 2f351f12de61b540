//! Embed-token exchange.
//!
//! The user token is POSTed as a small XML document to a per-video
//! endpoint. A provider error here means the session token went stale
//! mid-chain, so the cached token is purged before the error surfaces and
//! the next resolution re-authenticates.

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::{debug, warn};
use tryline_core::{Error, Result};

use crate::{auth, OoyalaSession};

impl OoyalaSession {
    /// Exchange the session token for a per-video embed token.
    pub async fn embed_token(&self, user_token: &str, video_id: &str) -> Result<String> {
        let url = self.config.embed_token_endpoint(video_id);
        debug!("Fetching URL: {url}");

        let body = auth::user_id_document(user_token)?;

        let mut request = self.http.post(&url).body(body);
        for (name, value) in &self.config.auth_headers {
            request = request.header(name, value);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                url,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("Failed to read embed token response: {e}")))?;

        // The first character of the body is a known-invalid prefix.
        let mut chars = text.chars();
        chars.next();
        let xml = chars.as_str();

        match parse_embed_response(xml) {
            Ok(EmbedResponse::Token(token)) => Ok(token),
            Ok(EmbedResponse::ErrorCode(code)) => {
                warn!("Embed token request rejected with ErrorCode {code}, purging session");
                self.cache.delete()?;
                Err(Error::LoginExpired)
            }
            Err(e) => {
                warn!("Embed token response is: {xml}");
                self.cache.delete()?;
                Err(e)
            }
        }
    }
}

/// What the embed-token endpoint answered with.
#[derive(Debug)]
enum EmbedResponse {
    Token(String),
    ErrorCode(String),
}

fn parse_embed_response(xml: &str) -> Result<EmbedResponse> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut current: Option<String> = None;
    let mut token = None;
    let mut error_code = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = std::str::from_utf8(e.name().as_ref())
                    .unwrap_or("")
                    .to_string();
                if name == "ErrorCode" {
                    // Present even when the element text turns out empty
                    error_code.get_or_insert_with(String::new);
                }
                current = Some(name);
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                match current.as_deref() {
                    Some("ErrorCode") => error_code = Some(text),
                    Some("Token") => token = Some(text),
                    _ => {}
                }
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::ManifestParse(format!(
                    "embed token response is not well-formed XML: {e}"
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    if let Some(code) = error_code {
        return Ok(EmbedResponse::ErrorCode(code));
    }

    token.map(EmbedResponse::Token).ok_or_else(|| {
        Error::ManifestParse("embed token response missing Token element".to_string())
    })
}
