use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PdfChatError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("client error: {0}")]
    Client(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::ValidationError("server.base_url is empty".into());
        assert_eq!(
            err.to_string(),
            "config validation error: server.base_url is empty"
        );
    }

    #[test]
    fn pdfchat_error_from_config() {
        let config_err = ConfigError::ParseError("bad toml".into());
        let err: PdfChatError = config_err.into();
        assert!(matches!(err, PdfChatError::Config(_)));
        assert!(err.to_string().contains("bad toml"));
    }

    #[test]
    fn pdfchat_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: PdfChatError = io_err.into();
        assert!(matches!(err, PdfChatError::Io(_)));
        assert!(err.to_string().contains("file missing"));
    }

    #[test]
    fn pdfchat_error_client_display() {
        let err = PdfChatError::Client("connection refused".into());
        assert_eq!(err.to_string(), "client error: connection refused");
    }
}
