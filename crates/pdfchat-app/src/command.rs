//! REPL input parsing.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Open(String),
    Docs,
    Web(bool),
    Clear,
    Close,
    Help,
    Quit,
    Ask(String),
    Invalid(String),
}

pub const HELP: &str = "\
/open <file>   select a document
/docs          list uploaded documents
/web on|off    toggle web search
/clear         clear the visible conversation
/close         deselect the document
/quit          exit
anything else is sent as a question (Ctrl-C stops the answer)";

/// Parse one input line. Returns `None` for a blank line.
pub fn parse(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Some(Command::Ask(line.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };
    let command = match (name, arg) {
        ("open", "") => Command::Invalid("usage: /open <file>".into()),
        ("open", file) => Command::Open(file.to_string()),
        ("docs", _) => Command::Docs,
        ("web", "on") => Command::Web(true),
        ("web", "off") => Command::Web(false),
        ("web", _) => Command::Invalid("usage: /web on|off".into()),
        ("clear", _) => Command::Clear,
        ("close", _) => Command::Close,
        ("help", _) => Command::Help,
        ("quit" | "exit", _) => Command::Quit,
        (other, _) => Command::Invalid(format!("unknown command: /{other}")),
    };
    Some(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_question() {
        assert_eq!(
            parse("  What is this about? "),
            Some(Command::Ask("What is this about?".into()))
        );
        assert_eq!(parse("   "), None);
    }

    #[test]
    fn open_keeps_spaces_in_filename() {
        assert_eq!(
            parse("/open Annual Report.pdf"),
            Some(Command::Open("Annual Report.pdf".into()))
        );
        assert!(matches!(parse("/open"), Some(Command::Invalid(_))));
    }

    #[test]
    fn web_toggle() {
        assert_eq!(parse("/web on"), Some(Command::Web(true)));
        assert_eq!(parse("/web off"), Some(Command::Web(false)));
        assert!(matches!(parse("/web maybe"), Some(Command::Invalid(_))));
    }

    #[test]
    fn simple_commands() {
        assert_eq!(parse("/docs"), Some(Command::Docs));
        assert_eq!(parse("/clear"), Some(Command::Clear));
        assert_eq!(parse("/close"), Some(Command::Close));
        assert_eq!(parse("/quit"), Some(Command::Quit));
        assert_eq!(parse("/exit"), Some(Command::Quit));
        assert_eq!(
            parse("/frobnicate"),
            Some(Command::Invalid("unknown command: /frobnicate".into()))
        );
    }
}
