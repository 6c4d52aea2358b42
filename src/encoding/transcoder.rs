//! `select_target`/`select_line_ending`/`write_unicode`/`parse_utf8`/
//! `write_utf8`: the transcoder operations. A selected target's table is
//! validated once, at selection time, rather than on every lookup.

use crate::diagnostics::{Code, DiagnosticSink, Position};
use crate::xml::search::{is_sorted_strictly_by_key, lookup};

use super::targets::Target;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineEnding {
    Cr,
    Lf,
    CrLf,
    LfCr,
}

impl LineEnding {
    pub fn bytes(self) -> &'static [u8] {
        match self {
            LineEnding::Cr => b"\r",
            LineEnding::Lf => b"\n",
            LineEnding::CrLf => b"\r\n",
            LineEnding::LfCr => b"\n\r",
        }
    }
}

/// A fixed-capacity byte sink. `write_unicode`/`write_utf8` report
/// `Code::BufferExhausted` and return `false` rather than growing past
/// the configured capacity.
#[derive(Debug, Default)]
pub struct BoundedBuffer {
    data: Vec<u8>,
    cap: usize,
}

impl BoundedBuffer {
    pub fn with_capacity(cap: usize) -> Self {
        Self { data: Vec::with_capacity(cap.min(64 * 1024)), cap }
    }

    pub fn push(&mut self, byte: u8) -> bool {
        if self.data.len() >= self.cap {
            return false;
        }
        self.data.push(byte);
        true
    }

    pub fn push_slice(&mut self, bytes: &[u8]) -> bool {
        if self.data.len() + bytes.len() > self.cap {
            return false;
        }
        self.data.extend_from_slice(bytes);
        true
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Validates a target's table against the invariants transcoding
/// depends on: strictly increasing by code point, bytes unique and in
/// `0x80..=0xFF`, and (as a non-fatal note) any byte in that range no
/// entry ever produces.
pub fn validate_table(target: Target, sink: &mut impl DiagnosticSink, at: &Position) {
    let Some(table) = target.table() else { return };
    if let Some(index) = is_sorted_strictly_by_key(table, |m| m.codepoint) {
        sink.report(at.clone(), Code::TargetTableUnsorted { target: target.name().to_string(), index });
        return;
    }
    let mut seen = [false; 128];
    for mapping in table {
        let slot = (mapping.byte as usize).saturating_sub(0x80);
        if mapping.byte < 0x80 || slot >= 128 {
            continue;
        }
        if seen[slot] {
            sink.report(at.clone(), Code::TargetByteCollision { target: target.name().to_string(), byte: mapping.byte });
        }
        seen[slot] = true;
    }
    for (slot, hit) in seen.iter().enumerate() {
        if !hit {
            sink.report(at.clone(), Code::TargetByteHole { target: target.name().to_string(), byte: (0x80 + slot) as u8 });
        }
    }
}

pub struct Transcoder {
    target: Target,
    line_ending: LineEnding,
}

impl Transcoder {
    pub fn new(target: Target, line_ending: LineEnding, sink: &mut impl DiagnosticSink, at: &Position) -> Self {
        validate_table(target, sink, at);
        Self { target, line_ending }
    }

    pub fn select_target(&mut self, target: Target, sink: &mut impl DiagnosticSink, at: &Position) {
        validate_table(target, sink, at);
        self.target = target;
    }

    pub fn select_line_ending(&mut self, line_ending: LineEnding) {
        self.line_ending = line_ending;
    }

    pub fn target(&self) -> Target {
        self.target
    }

    pub fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    pub fn write_newline(&self, buf: &mut BoundedBuffer, sink: &mut impl DiagnosticSink, at: &Position) -> bool {
        if buf.push_slice(self.line_ending.bytes()) {
            true
        } else {
            sink.report(at.clone(), Code::BufferExhausted);
            false
        }
    }

    /// Writes `codepoint`, mapped through the selected target: itself if
    /// ASCII, the target's mapped byte if the target has one, `?` if the
    /// target is `SevenBit` or the code point isn't in the target's
    /// table, or a UTF-8 sequence if the target is `Utf8`.
    pub fn write_unicode(&self, buf: &mut BoundedBuffer, codepoint: u32, sink: &mut impl DiagnosticSink, at: &Position) -> bool {
        let ok = if codepoint < 0x80 {
            buf.push(codepoint as u8)
        } else {
            match self.target {
                Target::Utf8 => return write_utf8(buf, codepoint, sink, at),
                Target::SevenBit => buf.push(b'?'),
                _ => match self.target.table().and_then(|t| lookup(t, |m| m.codepoint, &codepoint)) {
                    Some(m) => buf.push(m.byte),
                    None => buf.push(b'?'),
                },
            }
        };
        if !ok {
            sink.report(at.clone(), Code::BufferExhausted);
        }
        ok
    }
}

/// Encodes `codepoint` as UTF-8, regardless of any selected target —
/// used for output that must always stay UTF-8 (e.g. the web writer).
pub fn write_utf8(buf: &mut BoundedBuffer, codepoint: u32, sink: &mut impl DiagnosticSink, at: &Position) -> bool {
    let Some(c) = char::from_u32(codepoint) else {
        sink.report(at.clone(), Code::MalformedUtf8 { offset: 0 });
        return false;
    };
    let mut tmp = [0u8; 4];
    let encoded = c.encode_utf8(&mut tmp);
    if buf.push_slice(encoded.as_bytes()) {
        true
    } else {
        sink.report(at.clone(), Code::BufferExhausted);
        false
    }
}

/// Decodes one code point from `bytes[*pos..]`, advancing `*pos` past
/// it. Reports and skips a single byte on malformed input so the caller
/// can keep decoding the rest of the buffer.
pub fn parse_utf8(bytes: &[u8], pos: &mut usize, sink: &mut impl DiagnosticSink, at: &Position) -> Option<char> {
    let rest = &bytes[*pos..];
    if rest.is_empty() {
        return None;
    }
    match std::str::from_utf8(rest) {
        Ok(s) => {
            let c = s.chars().next()?;
            *pos += c.len_utf8();
            Some(c)
        }
        Err(e) if e.valid_up_to() > 0 => {
            let s = std::str::from_utf8(&rest[..e.valid_up_to()]).ok()?;
            let c = s.chars().next()?;
            *pos += c.len_utf8();
            Some(c)
        }
        Err(_) => {
            sink.report(at.clone(), Code::MalformedUtf8 { offset: *pos });
            *pos += 1;
            None
        }
    }
}
