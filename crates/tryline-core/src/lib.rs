//! # tryline-core
//!
//! Core types, configuration, and error handling for the tryline
//! NRL Live stream resolver.

pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, SubscriptionType};
pub use error::{Error, LoginFailure, Result};
pub use types::QualitySelection;
