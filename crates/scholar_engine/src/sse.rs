//! Incremental decoder for `text/event-stream` bodies.

use bytes::{Buf, BytesMut};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";
/// Upper bound for an unterminated line or an accumulated event payload.
pub const MAX_EVENT_BYTES: usize = 1024 * 1024;

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseMessage {
    pub event: Option<String>,
    pub data: String,
}

impl SseMessage {
    /// Unnamed events and events named `message` carry progress payloads.
    pub fn is_message(&self) -> bool {
        matches!(self.event.as_deref(), None | Some("message"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SseError {
    #[error("event stream line exceeds {limit} bytes")]
    LineTooLong { limit: usize },
    #[error("event payload exceeds {limit} bytes")]
    EventTooLarge { limit: usize },
}

/// Accepts body chunks split at arbitrary byte boundaries and yields complete events.
#[derive(Debug, Default)]
pub struct SseDecoder {
    pending: BytesMut,
    bom_checked: bool,
    event: Option<String>,
    data: String,
    has_data: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<SseMessage>, SseError> {
        self.pending.extend_from_slice(chunk);
        let mut messages = Vec::new();

        if !self.bom_checked {
            if self.pending.len() < UTF8_BOM.len() && UTF8_BOM.starts_with(&self.pending) {
                return Ok(messages);
            }
            if self.pending.starts_with(UTF8_BOM) {
                self.pending.advance(UTF8_BOM.len());
            }
            self.bom_checked = true;
        }

        while let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
            let mut line = self.pending.split_to(pos);
            self.pending.advance(1);
            if line.last() == Some(&b'\r') {
                line.truncate(pos - 1);
            }
            let line = String::from_utf8_lossy(&line);
            if let Some(message) = self.process_line(&line)? {
                messages.push(message);
            }
        }

        if self.pending.len() > MAX_EVENT_BYTES {
            return Err(SseError::LineTooLong {
                limit: MAX_EVENT_BYTES,
            });
        }
        Ok(messages)
    }

    fn process_line(&mut self, line: &str) -> Result<Option<SseMessage>, SseError> {
        if line.is_empty() {
            return Ok(self.dispatch());
        }
        if line.starts_with(':') {
            return Ok(None);
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => {
                if self.data.len() + value.len() + 1 > MAX_EVENT_BYTES {
                    return Err(SseError::EventTooLarge {
                        limit: MAX_EVENT_BYTES,
                    });
                }
                if self.has_data {
                    self.data.push('\n');
                }
                self.data.push_str(value);
                self.has_data = true;
            }
            // `id` and `retry` only matter for reconnection, which is not attempted.
            _ => {}
        }
        Ok(None)
    }

    fn dispatch(&mut self) -> Option<SseMessage> {
        let event = self.event.take();
        if !self.has_data {
            return None;
        }
        self.has_data = false;
        Some(SseMessage {
            event,
            data: std::mem::take(&mut self.data),
        })
    }
}
