mod cli;
mod command;
mod render;
mod repl;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use pdfchat_client::{ChatBackend, ChatSession, HttpBackend, HttpBackendConfig};
use pdfchat_common::PdfChatError;
use pdfchat_config::{PdfChatConfig, ServerConfig};

const DEFAULT_DIRECTIVE: &str = "pdfchat=info";

fn backend_config(server: &ServerConfig) -> HttpBackendConfig {
    let config = HttpBackendConfig::new(server.base_url.clone())
        .with_connect_timeout(Duration::from_secs(server.connect_timeout_secs.into()));
    match &server.session_cookie {
        Some(cookie) => config.with_session_cookie(cookie.clone()),
        None => config,
    }
}

fn idle_timeout(server: &ServerConfig) -> Option<Duration> {
    match server.stream_idle_timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs.into())),
    }
}

async fn run(args: cli::Args, mut config: PdfChatConfig) -> pdfchat_common::Result<()> {
    if let Some(base_url) = args.base_url {
        config.server.base_url = base_url;
    }
    if args.web {
        config.chat.web_search = true;
    }
    pdfchat_config::validate(&config)?;

    let backend = HttpBackend::new(backend_config(&config.server))
        .map_err(|e| PdfChatError::Client(e.to_string()))?;
    let backend: Arc<dyn ChatBackend> = Arc::new(backend);
    tracing::info!(
        base_url = %config.server.base_url,
        mode = config.chat.mode().as_str(),
        "backend ready"
    );

    let session = Arc::new(
        ChatSession::new(backend.clone())
            .with_idle_timeout(idle_timeout(&config.server))
            .with_mode(config.chat.mode()),
    );
    let printer = tokio::spawn(render::print_events(
        Arc::downgrade(&session),
        session.subscribe(),
    ));

    let repl = repl::Repl::new(&session, backend.as_ref());
    match &args.document {
        Some(document) => repl.open(document).await,
        None => session.clear_selection(),
    }
    let result = repl.run().await;

    // The printer holds only a weak handle, so dropping the session closes
    // the event bus and ends it.
    drop(session);
    let _ = printer.await;
    Ok(result?)
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = cli::parse();
    let loaded = pdfchat_config::load_config(args.config.as_deref());

    // RUST_LOG wins over --log-level, which wins over the config file.
    let directive = args
        .log_level
        .as_deref()
        .map(|level| format!("pdfchat={level}"))
        .or_else(|| loaded.as_ref().ok().map(|c| c.logging.directive()))
        .unwrap_or_else(|| DEFAULT_DIRECTIVE.into());
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive)),
        )
        .init();

    tracing::info!("pdfchat v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = loaded.unwrap_or_else(|e| {
        tracing::warn!("Config load failed, using defaults: {e}");
        PdfChatConfig::default()
    });

    match run(args, config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
