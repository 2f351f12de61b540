//! Resolver configuration.
//!
//! Settings normally come from the host media-center plugin; `Default`
//! carries the fixed provider endpoints and headers so only credentials
//! and quality preferences need filling in.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::QualitySelection;

/// Subscription tier the account authenticates under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionType {
    /// Bundled free entitlement, separate login flow.
    Free,
    /// Paid subscription, token issued by the subscription service.
    #[default]
    Paid,
}

/// Resolver settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Which login flow to run when no session token is cached.
    pub subscription: SubscriptionType,
    pub username: String,
    pub password: String,

    /// Quality index for live streams (into the bandwidth-ascending list).
    pub live_quality: u32,
    /// Quality index for replays.
    pub replay_quality: u32,
    /// Host setting value meaning "highest available" for live streams.
    pub max_live_quality: u32,
    /// Host setting value meaning "highest available" for replays.
    pub max_replay_quality: u32,

    /// Login endpoint for the free entitlement flow.
    pub free_login_url: String,
    /// Login endpoint for the paid subscription flow.
    pub paid_login_url: String,
    /// Embed-token endpoint template; `{video_id}` is substituted.
    pub embed_token_url: String,
    /// Playback-authorization endpoint template; `{pcode}`, `{video_id}`
    /// and `{embed_token}` are substituted.
    pub authorize_url: String,
    /// Fixed Ooyala provider code.
    pub provider_code: String,
    /// Fixed headers sent with the embed-token request.
    pub auth_headers: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        let mut auth_headers = BTreeMap::new();
        auth_headers.insert("X-YinzCam-AppID".to_string(), "NRL_LIVE".to_string());
        auth_headers.insert("App-Type".to_string(), "GENERIC".to_string());

        Self {
            subscription: SubscriptionType::Paid,
            username: String::new(),
            password: String::new(),
            live_quality: 4,
            replay_quality: 5,
            max_live_quality: 4,
            max_replay_quality: 5,
            free_login_url: "https://api.telstra.com/v1/media/free/token".to_string(),
            paid_login_url: "https://api.telstra.com/v1/mis/subscription/token".to_string(),
            embed_token_url:
                "https://nrl.yinzcam.com/V2/Subscription/Ooyala/EmbedToken/{video_id}".to_string(),
            authorize_url: "https://player.ooyala.com/sas/player_api/v2/authorization/embed_token/{pcode}/{video_id}?embedToken={embed_token}"
                .to_string(),
            provider_code: "F0Y2a6ir8sX1d2P1rT6kYfbTR7h8".to_string(),
            auth_headers,
        }
    }
}

impl Config {
    /// Embed-token endpoint for a video.
    pub fn embed_token_endpoint(&self, video_id: &str) -> String {
        self.embed_token_url.replace("{video_id}", video_id)
    }

    /// Playback-authorization endpoint for a video and embed token.
    pub fn authorize_endpoint(&self, video_id: &str, embed_token: &str) -> String {
        self.authorize_url
            .replace("{pcode}", &self.provider_code)
            .replace("{video_id}", video_id)
            .replace("{embed_token}", embed_token)
    }

    /// Translate the configured quality setting into a selection.
    ///
    /// A setting equal to the maximum sentinel means "highest available";
    /// anything else is a direct index into the ascending variant list.
    pub fn quality_selection(&self, live: bool) -> QualitySelection {
        let (setting, max) = if live {
            (self.live_quality, self.max_live_quality)
        } else {
            (self.replay_quality, self.max_replay_quality)
        };

        if setting == max {
            QualitySelection::Highest
        } else {
            QualitySelection::Index(setting as usize)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embed_token_endpoint_substitution() {
        let config = Config::default();
        let url = config.embed_token_endpoint("abc123");
        assert!(url.ends_with("/EmbedToken/abc123"));
        assert!(!url.contains("{video_id}"));
    }

    #[test]
    fn test_authorize_endpoint_substitution() {
        let config = Config::default();
        let url = config.authorize_endpoint("vid1", "tok1");
        assert!(url.contains(&config.provider_code));
        assert!(url.contains("/vid1?"));
        assert!(url.ends_with("embedToken=tok1"));
    }

    #[test]
    fn test_quality_sentinel_maps_to_highest() {
        let config = Config {
            live_quality: 4,
            max_live_quality: 4,
            replay_quality: 2,
            max_replay_quality: 5,
            ..Config::default()
        };
        assert_eq!(config.quality_selection(true), QualitySelection::Highest);
        assert_eq!(config.quality_selection(false), QualitySelection::Index(2));
    }

    #[test]
    fn test_config_roundtrip_from_host_settings() {
        let json = r#"{
            "subscription": "free",
            "username": "user@example.com",
            "password": "hunter2",
            "live_quality": 1
        }"#;
        let config: Config = serde_json::from_str(json).expect("valid settings");
        assert_eq!(config.subscription, SubscriptionType::Free);
        assert_eq!(config.live_quality, 1);
        // Unspecified fields fall back to defaults
        assert!(!config.provider_code.is_empty());
    }
}
