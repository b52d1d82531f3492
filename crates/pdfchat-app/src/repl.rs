//! Line-oriented chat loop over stdin.

use std::io;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use pdfchat_client::{ChatBackend, ChatSession};
use pdfchat_common::RetrievalMode;

use crate::command::{self, Command, HELP};

pub struct Repl<'a> {
    session: &'a ChatSession,
    backend: &'a dyn ChatBackend,
}

impl<'a> Repl<'a> {
    pub fn new(session: &'a ChatSession, backend: &'a dyn ChatBackend) -> Self {
        Self { session, backend }
    }

    /// Read commands until `/quit`, end of input, or Ctrl-C at the prompt.
    pub async fn run(&self) -> io::Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = tokio::signal::ctrl_c() => {
                    info!("interrupted at prompt");
                    None
                }
            };
            let Some(line) = line else {
                break;
            };
            let Some(command) = command::parse(&line) else {
                continue;
            };
            if !self.dispatch(command).await {
                break;
            }
        }
        Ok(())
    }

    /// Returns `false` when the loop should stop.
    async fn dispatch(&self, command: Command) -> bool {
        match command {
            Command::Open(file) => self.open(&file).await,
            Command::Docs => self.list_documents().await,
            Command::Web(enabled) => {
                self.session
                    .set_mode(RetrievalMode::from_web_search(enabled));
                println!("web search {}", if enabled { "on" } else { "off" });
            }
            Command::Clear => self.session.clear_view(),
            Command::Close => self.session.clear_selection(),
            Command::Help => println!("{HELP}"),
            Command::Quit => return false,
            Command::Ask(query) => self.ask(&query).await,
            Command::Invalid(message) => eprintln!("{message}"),
        }
        true
    }

    pub async fn open(&self, file: &str) {
        if self.session.select_document(file).await.is_none() && self.session.messages().is_empty() {
            println!("No conversation found for {file}. Questions will be sent without one.");
        }
        let suggestions = self.session.suggestions();
        if !suggestions.is_empty() {
            println!("try: {}", suggestions.join(" | "));
        }
    }

    async fn list_documents(&self) {
        match self.backend.list_collections().await {
            Ok(collections) if collections.is_empty() => println!("no documents uploaded"),
            Ok(collections) => {
                for collection in collections {
                    let status = collection.processing_status.as_deref().unwrap_or("unknown");
                    println!("  {} ({status})", collection.filename);
                }
            }
            Err(e) => {
                warn!(error = %e, "listing documents failed");
                eprintln!("{e}");
            }
        }
    }

    /// Send one question; Ctrl-C while it streams stops this answer only.
    async fn ask(&self, query: &str) {
        let cancel = CancellationToken::new();
        let send = self.session.send(query, cancel.clone());
        tokio::pin!(send);

        let result = loop {
            tokio::select! {
                result = &mut send => break result,
                _ = tokio::signal::ctrl_c(), if !cancel.is_cancelled() => {
                    info!("stopping answer");
                    cancel.cancel();
                }
            }
        };
        match result {
            Ok(outcome) => debug!(status = ?outcome.status, "exchange finished"),
            Err(e) => eprintln!("{e}"),
        }
    }
}
