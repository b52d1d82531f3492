//! pdfchat configuration.
//!
//! TOML-based configuration with serde defaults for every section, so a
//! partial (or empty) file works out of the box.

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{ChatConfig, LoggingConfig, PdfChatConfig, ServerConfig};
pub use toml_loader::{load_default, load_from_path, parse_config};
pub use validation::validate;

use pdfchat_common::ConfigError;
use std::path::Path;

/// Load config from an explicit path, or from the platform default path
/// when `path` is `None`, then validate it.
pub fn load_config(path: Option<&Path>) -> Result<PdfChatConfig, ConfigError> {
    let config = match path {
        Some(path) => toml_loader::load_from_path(path)?,
        None => toml_loader::load_default()?,
    };
    validation::validate(&config)?;
    Ok(config)
}
