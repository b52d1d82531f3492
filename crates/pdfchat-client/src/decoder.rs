//! Newline-delimited JSON frame decoder.
//!
//! The answer stream is a sequence of JSON records separated by `\n`, but the
//! network hands it over in arbitrary chunks: a record may be split across
//! reads, and one read may carry many records. [`FrameDecoder`] buffers the
//! unterminated tail between reads and yields every complete record in order.
//!
//! Splitting happens on raw bytes. `0x0A` never occurs inside a multi-byte
//! UTF-8 sequence, so a character split across chunks is reassembled before
//! its line is decoded.

use tracing::{debug, warn};

use crate::wire::StreamEvent;

const PREVIEW_CHARS: usize = 120;

/// Incremental decoder for one exchange. Start a new exchange with a new decoder.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
    dropped: usize,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a network chunk and iterate the records it completes.
    ///
    /// Records are parsed lazily as the iterator advances. Lines that are
    /// blank are skipped; lines that do not parse are logged and dropped.
    pub fn feed(&mut self, bytes: &[u8]) -> Frames<'_> {
        self.buffer.extend_from_slice(bytes);

        let lines = match self.buffer.iter().rposition(|&b| b == b'\n') {
            Some(end) => self.buffer.drain(..=end).collect(),
            None => Vec::new(),
        };

        Frames {
            lines,
            pos: 0,
            dropped: &mut self.dropped,
        }
    }

    /// Bytes received after the last line separator.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    /// Number of lines dropped because they did not parse.
    pub fn dropped_frames(&self) -> usize {
        self.dropped
    }

    /// End of stream. Leftover bytes are discarded without a final parse;
    /// returns how many there were.
    pub fn finish(self) -> usize {
        let leftover = self.buffer.len();
        if leftover > 0 {
            debug!(bytes = leftover, "discarding unterminated frame at end of stream");
        }
        leftover
    }
}

/// Records completed by one [`FrameDecoder::feed`] call.
pub struct Frames<'a> {
    lines: Vec<u8>,
    pos: usize,
    dropped: &'a mut usize,
}

impl Iterator for Frames<'_> {
    type Item = StreamEvent;

    fn next(&mut self) -> Option<StreamEvent> {
        while self.pos < self.lines.len() {
            let rest = &self.lines[self.pos..];
            let len = rest.iter().position(|&b| b == b'\n').unwrap_or(rest.len());
            let line = &rest[..len];
            self.pos += len + 1;

            if let Some(event) = parse_line(line, self.dropped) {
                return Some(event);
            }
        }
        None
    }
}

fn parse_line(line: &[u8], dropped: &mut usize) -> Option<StreamEvent> {
    let text = String::from_utf8_lossy(line);
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    match serde_json::from_str::<StreamEvent>(text) {
        Ok(event) => Some(event),
        Err(e) => {
            *dropped += 1;
            let preview = text.chars().take(PREVIEW_CHARS).collect::<String>();
            warn!(error = %e, line = %preview, "skipping invalid stream frame");
            None
        }
    }
}
