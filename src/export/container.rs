//! The legacy-hypertext container: one output file holding a tree of
//! embedded sub-files, each with its own name and a fixed 32-bit file
//! type. The writer only ever calls `open`/`sub_open`/`sub_close`/
//! `close`/`write_text`/`write_plain`/`write_newline`; the on-disk byte
//! layout is this module's business alone.
//!
//! No historical byte-for-byte container format is available to ground
//! this on, so the layout here is invented but simple: a 4-byte magic,
//! a 4-byte entry count, then each entry as a length-prefixed name, a
//! 4-byte filetype, and a length-prefixed body. This is recorded as an
//! accepted Open Question resolution rather than a faithful
//! reproduction of any real historical container.

use crate::diagnostics::{DiagnosticSink, Position};
use crate::encoding::{BoundedBuffer, Transcoder};

const MAGIC: &[u8; 4] = b"FCNT";

/// The filetype every text page in the container carries.
pub const PAGE_FILETYPE: u32 = 0xFFF;

/// The container's single entry point.
pub const ROOT_NAME: &str = "!Root";

struct Entry {
    name: String,
    filetype: u32,
    data: Vec<u8>,
}

pub struct Container {
    entries: Vec<Entry>,
    current: Option<usize>,
}

impl Container {
    pub fn new() -> Self {
        Self { entries: Vec::new(), current: None }
    }

    /// Opens the container. A no-op placeholder in this in-memory
    /// design — kept as its own call so the writer's call sequence
    /// matches a container format that did need an explicit open.
    pub fn open(&mut self) {}

    pub fn sub_open(&mut self, name: &str, filetype: u32) {
        self.entries.push(Entry { name: name.to_string(), filetype, data: Vec::new() });
        self.current = Some(self.entries.len() - 1);
    }

    pub fn sub_close(&mut self) {
        self.current = None;
    }

    /// Writes `text`, transcoding every character through `transcoder`,
    /// into the currently open sub-file.
    pub fn write_text(&mut self, text: &str, transcoder: &Transcoder, sink: &mut impl DiagnosticSink, at: &Position) {
        let Some(index) = self.current else { return };
        for c in text.chars() {
            let mut scratch = BoundedBuffer::with_capacity(4);
            transcoder.write_unicode(&mut scratch, c as u32, sink, at);
            self.entries[index].data.extend_from_slice(scratch.as_slice());
        }
    }

    /// Writes `text` verbatim as ASCII bytes, bypassing the transcoder —
    /// for structural markup that's always plain ASCII regardless of
    /// the declared target.
    pub fn write_plain(&mut self, text: &str) {
        if let Some(index) = self.current {
            self.entries[index].data.extend_from_slice(text.as_bytes());
        }
    }

    pub fn write_newline(&mut self, transcoder: &Transcoder) {
        if let Some(index) = self.current {
            self.entries[index].data.extend_from_slice(transcoder.line_ending().bytes());
        }
    }

    /// Serializes every sub-file into the final container bytes.
    pub fn close(self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&(self.entries.len() as u32).to_le_bytes());
        for entry in &self.entries {
            let name = entry.name.as_bytes();
            out.extend_from_slice(&(name.len() as u32).to_le_bytes());
            out.extend_from_slice(name);
            out.extend_from_slice(&entry.filetype.to_le_bytes());
            out.extend_from_slice(&(entry.data.len() as u32).to_le_bytes());
            out.extend_from_slice(&entry.data);
        }
        out
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ConsoleSink;
    use crate::encoding::{LineEnding, Target};

    fn pos() -> Position {
        Position::start_of("test")
    }

    #[test]
    fn round_trips_entry_count_and_names_into_the_serialized_layout() {
        let mut sink = ConsoleSink::default();
        let transcoder = Transcoder::new(Target::Utf8, LineEnding::Lf, &mut sink, &pos());
        let mut container = Container::new();
        container.open();
        container.sub_open(ROOT_NAME, PAGE_FILETYPE);
        container.write_plain("Welcome");
        container.write_newline(&transcoder);
        container.write_text("caf\u{e9}", &transcoder, &mut sink, &pos());
        container.sub_close();
        let bytes = container.close();
        assert_eq!(&bytes[0..4], MAGIC);
        assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 1);
        let name_len = u32::from_le_bytes(bytes[8..12].try_into().unwrap()) as usize;
        assert_eq!(&bytes[12..12 + name_len], ROOT_NAME.as_bytes());
    }
}
