//! STOMP frame decoding.
//!
//! Two entry points with different buffering contracts:
//!
//! - [`decode_first`] parses at most one frame from a text chunk and ignores
//!   anything after the first NUL. This mirrors the minimal decoder the
//!   session was first built on and is kept for callers that own their own
//!   buffering.
//! - [`FrameBuffer`] accumulates chunks and drains *every* complete frame,
//!   retaining a trailing partial. A server or proxy that coalesces frames
//!   into one WebSocket message would otherwise cause silent message loss,
//!   so the session layer uses this path.

use crate::frame::{Command, Frame};

/// Frame terminator octet.
const NUL: char = '\0';

/// Header/body separator: the first blank line.
const SEPARATOR: &str = "\n\n";

/// Whether a received payload is a STOMP heartbeat rather than a frame.
///
/// Heartbeats are empty or a lone line terminator and are never handed to
/// the decoder.
pub fn is_heartbeat(raw: &str) -> bool {
    matches!(raw, "" | "\n" | "\r\n")
}

/// Decode at most one frame from a raw text chunk.
///
/// Takes everything up to the first NUL (or the whole input when no NUL is
/// present), splits headers from body at the first blank line, and parses
/// header lines on the first colon only so header values may themselves
/// contain colons. Returns `None` when no header/body separator exists, i.e.
/// on malformed or partial input. Never panics.
///
/// Frames concatenated after the first NUL are dropped; use [`FrameBuffer`]
/// where that matters.
pub fn decode_first(raw: &str) -> Option<Frame> {
    let chunk = match raw.find(NUL) {
        Some(idx) => &raw[..idx],
        None => raw,
    };
    decode_chunk(chunk)
}

/// Decode one NUL-stripped frame chunk.
fn decode_chunk(chunk: &str) -> Option<Frame> {
    let sep = chunk.find(SEPARATOR)?;
    let header_part = &chunk[..sep];
    let body = &chunk[sep + SEPARATOR.len()..];

    let mut lines = header_part.split('\n');
    let command = Command::from(lines.next().unwrap_or_default());

    let mut headers = Vec::new();
    for line in lines {
        // Split on the first colon only; a colon at position 0 means an
        // empty header name, which we drop like any other unparsable line.
        match line.find(':') {
            Some(colon) if colon > 0 => {
                headers.push((line[..colon].to_string(), line[colon + 1..].to_string()));
            },
            _ => {},
        }
    }

    Some(Frame { command, headers, body: body.to_string() })
}

/// Receive buffer that extracts every complete frame from incoming chunks.
///
/// Push each WebSocket text payload as it arrives; complete NUL-terminated
/// frames are drained in order and a trailing partial frame is retained
/// until the rest of it shows up.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    pending: String,
}

impl FrameBuffer {
    /// Empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and drain all complete frames, in arrival order.
    ///
    /// Chunks that fail to decode (no header/body separator before their
    /// NUL) are dropped silently, matching [`decode_first`].
    pub fn push(&mut self, chunk: &str) -> Vec<Frame> {
        self.pending.push_str(chunk);

        let mut frames = Vec::new();
        while let Some(idx) = self.pending.find(NUL) {
            let rest = self.pending.split_off(idx + 1);
            let complete = std::mem::replace(&mut self.pending, rest);
            let trimmed = complete.trim_end_matches(NUL);
            if let Some(frame) = decode_chunk(trimmed) {
                frames.push(frame);
            }
            // Servers may pad between frames with line terminators.
            while self.pending.starts_with('\n') || self.pending.starts_with("\r\n") {
                let skip = if self.pending.starts_with("\r\n") { 2 } else { 1 };
                self.pending.replace_range(..skip, "");
            }
        }
        frames
    }

    /// Bytes of partial frame still waiting for completion.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Discard any buffered partial frame.
    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
