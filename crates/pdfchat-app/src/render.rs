//! Terminal rendering of conversation events.

use std::io::{self, Write};
use std::sync::Weak;

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, warn};

use pdfchat_client::{ChatSession, Message};
use pdfchat_common::{ExchangePhase, Role, StateEvent};

/// Print events until the session (and with it the event bus) is dropped.
///
/// A renderer that falls behind redraws the transcript from a fresh
/// snapshot and carries on with events published after it.
pub async fn print_events(session: Weak<ChatSession>, mut rx: broadcast::Receiver<StateEvent>) {
    loop {
        let written = match rx.recv().await {
            Ok(event) => {
                let mut out = io::stdout().lock();
                render(&mut out, &event).and_then(|()| out.flush())
            }
            Err(RecvError::Lagged(skipped)) => {
                let Some(session) = session.upgrade() else {
                    break;
                };
                warn!(skipped, "renderer fell behind, redrawing transcript");
                let (messages, fresh) = session.resubscribe();
                let phase = session.phase();
                drop(session);
                rx = fresh;
                let mut out = io::stdout().lock();
                render_snapshot(&mut out, &messages, phase).and_then(|()| out.flush())
            }
            Err(RecvError::Closed) => break,
        };
        if let Err(e) = written {
            debug!(error = %e, "stdout closed");
            break;
        }
    }
}

/// Redraw the whole log. An answer that is still streaming is left open so
/// later tokens continue its line.
pub fn render_snapshot(
    out: &mut impl Write,
    messages: &[Message],
    phase: ExchangePhase,
) -> io::Result<()> {
    writeln!(out, "\n[transcript redrawn]")?;
    for (i, message) in messages.iter().enumerate() {
        let prefix = match message.role {
            Role::User => "you>",
            Role::Assistant => "pdfchat>",
        };
        write!(out, "{prefix} {}", message.content)?;
        if let Some(sources) = message.sources.as_ref().filter(|s| !s.is_empty()) {
            write!(out, "\n  sources: {}", sources.join(", "))?;
        }
        let open = phase.is_active() && i + 1 == messages.len() && message.role == Role::Assistant;
        if !open {
            writeln!(out)?;
        }
    }
    Ok(())
}

pub fn render(out: &mut impl Write, event: &StateEvent) -> io::Result<()> {
    match event {
        StateEvent::MessageAppended {
            role: Role::User,
            content,
            ..
        } => writeln!(out, "you> {content}"),
        StateEvent::MessageAppended { content, .. } if content.is_empty() => {
            write!(out, "pdfchat> ")
        }
        StateEvent::MessageAppended { content, .. } => writeln!(out, "pdfchat> {content}"),
        StateEvent::ContentAppended { text, .. } => write!(out, "{text}"),
        StateEvent::SourcesSet { sources, .. } if !sources.is_empty() => {
            write!(out, "\n  sources: {}", sources.join(", "))
        }
        StateEvent::PhaseChanged(ExchangePhase::Cancelled) => writeln!(out, " [stopped]"),
        StateEvent::PhaseChanged(phase) if phase.is_terminal() => writeln!(out),
        StateEvent::ConversationAssigned(id) => {
            debug!(%id, "conversation assigned");
            Ok(())
        }
        _ => Ok(()),
    }
}
