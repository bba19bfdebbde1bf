//! Server-Sent Events decoding
//!
//! Turns the raw byte stream of a `text/event-stream` response into the
//! `data` payloads of complete events. Only the subset the backend uses is
//! interpreted: `data:` lines (joined with `\n`), `event:` names, comment
//! lines and blank-line dispatch. Unknown fields are ignored.

use bytes::Bytes;
use futures::stream::{Stream, StreamExt};
use tracing::warn;

/// Longest line kept while waiting for its terminator
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// One dispatched SSE event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseMessage {
    /// `event:` field, `None` for the default `message` type
    pub event: Option<String>,
    /// Concatenated `data:` lines
    pub data: String,
}

/// Incremental SSE line decoder
///
/// Bytes may arrive split anywhere, including inside a UTF-8 sequence;
/// decoding happens per complete line so multi-byte characters are never
/// torn. A line that outgrows [`MAX_LINE_BYTES`] is dropped up to its
/// newline, together with the event it belonged to.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: Vec<u8>,
    discarding: bool,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk, returning every event completed by it
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseMessage> {
        self.pending.extend_from_slice(chunk);

        let mut out = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
            if std::mem::take(&mut self.discarding) {
                continue;
            }
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line);
            if let Some(message) = self.process_line(&line) {
                out.push(message);
            }
        }

        if self.pending.len() > MAX_LINE_BYTES {
            warn!(bytes = self.pending.len(), "Dropping oversized event stream line");
            self.pending.clear();
            self.event = None;
            self.data.clear();
            self.discarding = true;
        }
        out
    }

    fn process_line(&mut self, line: &str) -> Option<SseMessage> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "data" => self.data.push(value.to_string()),
            "event" => self.event = Some(value.to_string()),
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseMessage> {
        let event = self.event.take();
        if self.data.is_empty() {
            return None;
        }
        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseMessage { event, data })
    }
}

/// Adapt a byte stream into a stream of SSE messages
///
/// A transport error is forwarded once and ends the stream. A partial event
/// left in the buffer when the body ends is discarded.
pub fn decode_stream<S, E>(bytes: S) -> impl Stream<Item = Result<SseMessage, E>>
where
    S: Stream<Item = Result<Bytes, E>>,
{
    async_stream::stream! {
        let mut bytes = Box::pin(bytes);
        let mut decoder = SseDecoder::new();
        while let Some(chunk) = bytes.next().await {
            match chunk {
                Ok(chunk) => {
                    for message in decoder.push(&chunk) {
                        yield Ok(message);
                    }
                }
                Err(e) => {
                    yield Err(e);
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_event() {
        let mut decoder = SseDecoder::new();
        let out = decoder.push(b"data: {\"step\":\"cleanup\"}\n\n");
        assert_eq!(
            out,
            vec![SseMessage {
                event: None,
                data: "{\"step\":\"cleanup\"}".to_string()
            }]
        );
    }

    #[test]
    fn test_event_split_across_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"da").is_empty());
        assert!(decoder.push(b"ta: hel").is_empty());
        assert!(decoder.push(b"lo\r\n").is_empty());
        let out = decoder.push(b"\r\n");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].data, "hello");
    }

    #[test]
    fn test_multibyte_character_split() {
        let mut decoder = SseDecoder::new();
        let payload = "data: ❌ failed\n\n".as_bytes();
        let (a, b) = payload.split_at(8);
        assert!(decoder.push(a).is_empty());
        let out = decoder.push(b);
        assert_eq!(out[0].data, "❌ failed");
    }

    #[test]
    fn test_comments_and_heartbeats_ignored() {
        let mut decoder = SseDecoder::new();
        let out = decoder.push(b": heartbeat\n\n");
        assert!(out.is_empty());
    }

    #[test]
    fn test_multiline_data_and_event_name() {
        let mut decoder = SseDecoder::new();
        let out = decoder.push(b"event: status\ndata: a\ndata: b\n\ndata: c\n\n");
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].event.as_deref(), Some("status"));
        assert_eq!(out[0].data, "a\nb");
        assert_eq!(out[1].event, None);
        assert_eq!(out[1].data, "c");
    }

    #[test]
    fn test_unterminated_line_is_capped() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: kept-out\n").is_empty());
        let flood = vec![b'x'; MAX_LINE_BYTES + 1];
        assert!(decoder.push(b"data: ").is_empty());
        assert!(decoder.push(&flood).is_empty());
        assert!(decoder.pending.is_empty());

        // The rest of the oversized line is skipped, then decoding resumes
        assert!(decoder.push(b"xxxx\n\n").is_empty());
        let out = decoder.push(b"data: next\n\n");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].data, "next");
    }

    #[tokio::test]
    async fn test_decode_stream_forwards_error_and_stops() {
        let chunks: Vec<Result<Bytes, &'static str>> = vec![
            Ok(Bytes::from_static(b"data: one\n\n")),
            Err("reset"),
            Ok(Bytes::from_static(b"data: two\n\n")),
        ];
        let decoded: Vec<_> = decode_stream(futures::stream::iter(chunks)).collect().await;
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].as_ref().unwrap().data, "one");
        assert_eq!(decoded[1], Err("reset"));
    }
}
