//! Error types for tryline.

use thiserror::Error;

/// Result type alias using tryline's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for tryline.
#[derive(Error, Debug)]
pub enum Error {
    // Authentication errors
    #[error("login failed: {0}")]
    Login(#[from] LoginFailure),

    #[error("Login token has expired, please try again")]
    LoginExpired,

    #[error(
        "Unauthorised location for streaming. Detected location is: {country}. \
         Please check VPN/smart DNS settings and try again"
    )]
    GeoBlocked { country: String },

    // Resolution errors
    #[error("authorization response had an unexpected shape: {0}")]
    Authorization(String),

    #[error("failed to parse provider response: {0}")]
    ManifestParse(String),

    #[error("no stream at quality index {requested} ({available} variants available)")]
    QualityUnavailable { requested: i64, available: usize },

    // Transport errors
    #[error("request to {url} failed with status {status}")]
    Http { status: u16, url: String },

    #[error("network error: {0}")]
    Network(String),

    // Cache errors
    #[error("token cache error: {0}")]
    Cache(String),

    // Plumbing
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Reason a login attempt was rejected by the provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoginFailure {
    #[error("no paid subscription found on this account")]
    NoSubscription,

    #[error("please check your username and password in the settings")]
    BadCredentials,

    #[error("{0}")]
    Provider(String),
}

impl Error {
    /// Returns true if the cached session token was invalidated as part of
    /// raising this error, so the next resolution re-authenticates.
    pub const fn purges_session(&self) -> bool {
        matches!(self, Self::LoginExpired | Self::ManifestParse(_))
    }

    /// Returns true if this error calls for fixing credentials or the
    /// subscription rather than anything on our side.
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Login(_) | Self::LoginExpired)
    }
}
