//! Playback authorization.
//!
//! The authorize endpoint answers JSON whose
//! `authorization_data[video_id].streams[0].url.data` field carries a
//! base64-encoded playback URL (either a direct chunklist or a master
//! manifest reference).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::Value;
use tracing::debug;
use tryline_core::{Error, Result};

use crate::OoyalaSession;

/// Message the provider uses for location-restricted requests.
const UNAUTHORIZED_LOCATION: &str = "unauthorizedlocation";

impl OoyalaSession {
    /// Fetch and decode the playback URL for a video.
    pub async fn secure_token(&self, authorize_url: &str, video_id: &str) -> Result<String> {
        let body = self.get_text(authorize_url).await?;
        let json: Value = serde_json::from_str(&body)?;

        let auth_data = &json["authorization_data"][video_id];

        if let Some(data) = auth_data["streams"][0]["url"]["data"].as_str() {
            let bytes = BASE64.decode(data).map_err(|e| {
                Error::Authorization(format!("playback token is not valid base64: {e}"))
            })?;
            return String::from_utf8(bytes).map_err(|e| {
                Error::Authorization(format!("decoded playback token is not UTF-8: {e}"))
            });
        }

        debug!("Authorization response: {json}");

        if auth_data["message"].as_str() == Some(UNAUTHORIZED_LOCATION) {
            let country = json["user_info"]["country"]
                .as_str()
                .unwrap_or("unknown")
                .to_string();
            return Err(Error::GeoBlocked { country });
        }

        Err(Error::Authorization(format!(
            "no stream data at authorization_data.{video_id}.streams[0].url.data"
        )))
    }
}
