use std::path::PathBuf;

use clap::Parser;

/// pdfchat: ask questions about your uploaded PDFs from the terminal.
#[derive(Parser, Debug)]
#[command(name = "pdfchat", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Backend API root, overriding `server.base_url`.
    #[arg(long)]
    pub base_url: Option<String>,

    /// Document to open on startup.
    #[arg(short = 'd', long)]
    pub document: Option<String>,

    /// Start with web search enabled.
    #[arg(long)]
    pub web: bool,
}

pub fn parse() -> Args {
    Args::parse()
}
