//! Reads the config file, falling back to the commented template on first run.

use std::io::ErrorKind;
use std::path::Path;

use pdfchat_common::ConfigError;
use tracing::{debug, info, warn};

use crate::schema::PdfChatConfig;
use crate::validation;

use super::paths::{create_default_config, default_config_path};

/// Parse config text. Absent keys and sections take their defaults.
pub fn parse_config(content: &str) -> Result<PdfChatConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::ParseError(e.message().to_string()))
}

/// Load the file at `path`.
///
/// Out-of-range values are only warned about here; [`crate::load_config`]
/// is the entry point that rejects them.
pub fn load_from_path(path: &Path) -> Result<PdfChatConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ConfigError::FileNotFound(path.to_path_buf()),
        _ => ConfigError::ParseError(format!("cannot read {}: {e}", path.display())),
    })?;

    let config = parse_config(&content)?;
    if let Err(e) = validation::validate(&config) {
        warn!(path = %path.display(), "{e}");
    }

    debug!(path = %path.display(), base_url = %config.server.base_url, "config loaded");
    Ok(config)
}

/// Load `<config dir>/pdfchat/config.toml`, writing the template there when
/// the file does not exist yet.
pub fn load_default() -> Result<PdfChatConfig, ConfigError> {
    let path = default_config_path()?;
    match load_from_path(&path) {
        Err(ConfigError::FileNotFound(_)) => {
            create_default_config(&path)?;
            info!(path = %path.display(), "wrote default config");
            Ok(PdfChatConfig::default())
        }
        other => other,
    }
}
