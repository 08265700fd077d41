use tracing::debug;

/// Longest line or event payload kept while waiting for its terminator
pub const MAX_PENDING_BYTES: usize = 1 << 20;

/// Incremental `text/event-stream` decoder.
///
/// Bytes are fed as they arrive off the wire; each completed event yields its
/// `data` payload (multiple `data:` lines joined with `\n`). `event`, `id` and
/// `retry` fields are not used by the feed and are dropped.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    /// Bytes of `buffer` already known to hold no newline
    scanned: usize,
    /// The current line outgrew the cap; skip until the next newline
    overflowed: bool,
    data: Vec<String>,
    data_len: usize,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every payload it completed
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut payloads = Vec::new();
        while let Some(offset) = self.buffer[self.scanned..].iter().position(|b| *b == b'\n') {
            let pos = self.scanned + offset;
            let raw: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.scanned = 0;

            if std::mem::take(&mut self.overflowed) {
                continue;
            }
            self.handle_line(&raw[..raw.len() - 1], &mut payloads);
        }
        self.scanned = self.buffer.len();

        if self.buffer.len() > MAX_PENDING_BYTES {
            debug!(len = self.buffer.len(), "Dropping oversized stream line");
            self.buffer.clear();
            self.scanned = 0;
            self.overflowed = true;
        }

        payloads
    }

    fn handle_line(&mut self, raw: &[u8], payloads: &mut Vec<String>) {
        let text = String::from_utf8_lossy(raw);
        let line = text.strip_suffix('\r').unwrap_or(&*text);

        if line.is_empty() {
            if !self.data.is_empty() {
                payloads.push(self.data.join("\n"));
                self.data.clear();
                self.data_len = 0;
            }
            return;
        }

        if line.starts_with(':') {
            return;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        if field == "data" {
            self.data_len += value.len();
            if self.data_len > MAX_PENDING_BYTES {
                debug!(len = self.data_len, "Dropping oversized stream event");
                self.data.clear();
                self.data_len = 0;
                return;
            }
            self.data.push(value.to_string());
        }
    }
}
