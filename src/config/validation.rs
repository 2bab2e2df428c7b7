//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Base URI must be an absolute http(s) URL
//! - Timeouts must be positive and finite
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ClientConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;
use url::Url;

use crate::config::schema::ClientConfig;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("base_uri '{uri}' is not a valid absolute URL: {reason}")]
    InvalidBaseUri { uri: String, reason: String },

    #[error("base_uri '{0}' must use http or https")]
    UnsupportedScheme(String),

    #[error("{field} must be a positive number of seconds, got {value}")]
    InvalidTimeout { field: &'static str, value: f64 },
}

pub fn validate_config(config: &ClientConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match Url::parse(&config.base_uri) {
        Ok(url) => {
            if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
                errors.push(ValidationError::UnsupportedScheme(config.base_uri.clone()));
            }
        }
        Err(e) => errors.push(ValidationError::InvalidBaseUri {
            uri: config.base_uri.clone(),
            reason: e.to_string(),
        }),
    }

    for (field, value) in [
        ("timeout_secs", config.timeout_secs),
        ("shutdown_timeout_secs", config.shutdown_timeout_secs),
    ] {
        if !(value.is_finite() && value > 0.0) {
            errors.push(ValidationError::InvalidTimeout { field, value });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
