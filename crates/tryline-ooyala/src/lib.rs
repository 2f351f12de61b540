//! # tryline-ooyala
//!
//! NRL Live / Ooyala API integration for tryline.
//!
//! This crate runs the token exchange chain (login token → embed token →
//! playback authorization) and resolves a playable HLS URL at the
//! configured quality tier.

pub mod auth;
pub mod client;
pub mod embed;
pub mod hls;
pub mod playback;
pub mod resolve;

pub use client::OoyalaSession;
pub use hls::Variant;
