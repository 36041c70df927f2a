//! Bounded line buffer of session output.

use std::collections::VecDeque;

use settings::constants::sessions::TRANSCRIPT_ROWS;

/// Last [`TRANSCRIPT_ROWS`] lines of output, replayed when a client attaches.
#[derive(Debug, Clone)]
pub struct Transcript {
    lines: VecDeque<String>,
    pending: Vec<u8>,
    max_rows: usize,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::with_max_rows(TRANSCRIPT_ROWS)
    }
}

impl Transcript {
    pub fn with_max_rows(max_rows: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            pending: Vec::new(),
            max_rows: max_rows.max(1),
        }
    }

    /// Append raw output. Bytes after the last newline wait for more input,
    /// so multi-byte characters split across reads decode correctly.
    pub fn push(&mut self, data: &[u8]) {
        self.pending.extend_from_slice(data);
        while let Some(newline) = self.pending.iter().position(|&b| b == b'\n') {
            let rest = self.pending.split_off(newline + 1);
            let line = std::mem::replace(&mut self.pending, rest);
            let text = String::from_utf8_lossy(&line[..newline]);
            self.lines.push_back(text.trim_end_matches('\r').to_string());
            if self.lines.len() > self.max_rows {
                self.lines.pop_front();
            }
        }
    }

    /// Complete lines, oldest first.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// The unterminated tail (usually the prompt).
    pub fn partial(&self) -> String {
        String::from_utf8_lossy(&self.pending).into_owned()
    }

    /// The last `count` complete lines followed by the partial line.
    pub fn tail(&self, count: usize) -> Vec<String> {
        let skip = self.lines.len().saturating_sub(count);
        let mut out: Vec<String> = self.lines.iter().skip(skip).cloned().collect();
        let partial = self.partial();
        if !partial.is_empty() {
            out.push(partial);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.pending.is_empty()
    }
}
