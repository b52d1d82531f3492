//! Full configuration validation.
//!
//! Validates the server URL, numeric ranges, and log level.

use crate::schema::{PdfChatConfig, LOG_LEVELS};
use pdfchat_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &PdfChatConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    let base_url = config.server.base_url.trim();
    if base_url.is_empty() {
        errors.push("server.base_url is empty".into());
    } else if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        errors.push(format!(
            "server.base_url = {base_url:?} must start with http:// or https://"
        ));
    }

    validate_range(
        &mut errors,
        "server.connect_timeout_secs",
        config.server.connect_timeout_secs,
        1,
        120,
    );
    validate_range(
        &mut errors,
        "server.stream_idle_timeout_secs",
        config.server.stream_idle_timeout_secs,
        0,
        3600,
    );

    if let Some(cookie) = &config.server.session_cookie {
        if cookie.contains(['\r', '\n']) {
            errors.push("server.session_cookie must be a single line".into());
        }
    }

    if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
        errors.push(format!(
            "logging.level = {:?} is not one of {}",
            config.logging.level,
            LOG_LEVELS.join(", ")
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_range(errors: &mut Vec<String>, name: &str, value: u32, min: u32, max: u32) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}
