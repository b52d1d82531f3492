//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# pdfchat configuration
# Only override what you want to change -- missing fields use defaults.

[server]
# base_url = "http://localhost:5000/api"
# connect_timeout_secs = 10        # 1-120
# stream_idle_timeout_secs = 0     # 0 disables, 0-3600
# session_cookie = "session=..."

[chat]
# web_search = false               # true sends mode = "hybrid"

[logging]
# level = "info"                   # trace, debug, info, warn, error
"##
    .to_string()
}
