//! The stack-based, column-oriented text line formatter.
//!
//! Columns are opened with [`LineFormatter::push`]/[`push_absolute`]/
//! [`push_to_column`] and closed with [`LineFormatter::pop`]; a closed
//! column either holds wrapped text (if [`LineFormatter::add_text`] fed
//! it directly) or the columns nested inside it (if it was itself used
//! only to hold further `push`ed columns) — a frame is expected to be
//! one or the other, not both, the same way a table row either holds
//! cells or further structure, never a mix.
//!
//! [`LineFormatter::write`] merges every column finished at the top
//! level since the last `write` into one set of physical lines, laid
//! out side by side by starting column, and appends them to the output.

use crate::ast::Alignment;
use crate::diagnostics::{Code, DiagnosticSink, Position};

struct Frame {
    start: u32,
    width: u32,
    align: Alignment,
    hanging_indent: u32,
    bottom_align: bool,
    text: String,
}

struct ColumnResult {
    start: u32,
    width: u32,
    align: Alignment,
    bottom_align: bool,
    lines: Vec<String>,
}

pub struct LineFormatter {
    page_width: u32,
    stack: Vec<Frame>,
    /// `siblings[d]` accumulates columns popped while depth `d` was the
    /// active parent level. `siblings[0]` is the current row.
    siblings: Vec<Vec<ColumnResult>>,
    output: Vec<String>,
    pushes: u32,
    pops: u32,
}

impl LineFormatter {
    pub fn new(page_width: u32) -> Self {
        Self { page_width, stack: Vec::new(), siblings: vec![Vec::new()], output: Vec::new(), pushes: 0, pops: 0 }
    }

    fn cursor(&self) -> u32 {
        self.siblings.last().and_then(|level| level.iter().map(|c| c.start + c.width).max()).unwrap_or(0)
    }

    fn open(&mut self, start: u32, width: u32) {
        self.pushes += 1;
        self.stack.push(Frame { start, width, align: Alignment::Left, hanging_indent: 0, bottom_align: false, text: String::new() });
        self.siblings.push(Vec::new());
    }

    /// Opens a new column immediately after the previous sibling at this
    /// depth, `width` columns wide.
    pub fn push(&mut self, width: u32) {
        let start = self.cursor();
        self.open(start, width);
    }

    /// Opens a new column at a fixed absolute start column.
    pub fn push_absolute(&mut self, col: u32) {
        self.open(col, self.page_width.saturating_sub(col));
    }

    /// Opens a new column spanning from the cursor up to (not
    /// including) `col`.
    pub fn push_to_column(&mut self, col: u32) {
        let start = self.cursor();
        self.open(start, col.saturating_sub(start));
    }

    /// `push` plus an immediate alignment, for the common case of a
    /// fixed table-column definition.
    pub fn add_column(&mut self, width: u32, align: Alignment) {
        self.push(width);
        if let Some(frame) = self.stack.last_mut() {
            frame.align = align;
        }
    }

    /// Opens a column at a fixed absolute start and width with an
    /// immediate alignment — the combination writers reach for when a
    /// row's first cell sits at an inset's left margin rather than at
    /// column 0 (a table row under a footnote, an indented code block).
    pub fn push_at(&mut self, col: u32, width: u32, align: Alignment) {
        self.open(col, width);
        if let Some(frame) = self.stack.last_mut() {
            frame.align = align;
        }
    }

    pub fn set_column_width(&mut self, width: u32, sink: &mut impl DiagnosticSink, at: &Position) {
        if let Some(frame) = self.stack.last_mut() {
            if frame.start + width > self.page_width {
                sink.report(at.clone(), Code::LineOverflow { over: frame.start + width - self.page_width });
            }
            frame.width = width;
        }
    }

    pub fn set_column_flags(&mut self, bottom_align: bool) {
        if let Some(frame) = self.stack.last_mut() {
            frame.bottom_align = bottom_align;
        }
    }

    pub fn set_hanging_indent(&mut self, indent: u32, sink: &mut impl DiagnosticSink, at: &Position) {
        if let Some(frame) = self.stack.last_mut() {
            if indent >= frame.width {
                sink.report(at.clone(), Code::HangingIndentTooWide { indent, width: frame.width });
            } else {
                frame.hanging_indent = indent;
            }
        }
    }

    pub fn add_text(&mut self, text: &str) {
        if let Some(frame) = self.stack.last_mut() {
            if !frame.text.is_empty() {
                frame.text.push(' ');
            }
            frame.text.push_str(text);
        }
    }

    /// Closes the top column, wrapping its text (or merging whatever
    /// columns were pushed and popped inside it) and attaching the
    /// result to its parent.
    pub fn pop(&mut self, sink: &mut impl DiagnosticSink, at: &Position) {
        self.pops += 1;
        let Some(frame) = self.stack.pop() else {
            sink.report(at.clone(), Code::UnbalancedLineStack { pushes: self.pushes, pops: self.pops });
            return;
        };
        let children = self.siblings.pop().unwrap_or_default();
        let lines = if !children.is_empty() {
            merge(frame.width, children)
        } else if frame.align == Alignment::Preformatted {
            frame.text.lines().map(str::to_string).collect()
        } else {
            wrap_text(&frame.text, frame.width, frame.hanging_indent)
        };
        let result = ColumnResult { start: frame.start, width: frame.width, align: frame.align, bottom_align: frame.bottom_align, lines };
        self.siblings.last_mut().expect("base level always present").push(result);
    }

    /// Merges every column finished at the top level into physical
    /// lines and appends them to the output.
    pub fn write(&mut self) {
        let row = std::mem::take(&mut self.siblings[0]);
        if row.is_empty() {
            return;
        }
        self.output.extend(merge(self.page_width, row));
    }

    pub fn write_ruleoff(&mut self) {
        self.output.push("-".repeat(self.page_width as usize));
    }

    pub fn write_newline(&mut self) {
        self.output.push(String::new());
    }

    pub fn reset(&mut self) {
        self.stack.clear();
        self.siblings = vec![Vec::new()];
        self.pushes = 0;
        self.pops = 0;
    }

    pub fn lines(&self) -> &[String] {
        &self.output
    }

    pub fn into_lines(self) -> Vec<String> {
        self.output
    }
}

fn justify(cell: &str, width: usize, align: Alignment) -> String {
    let truncated: String = cell.chars().take(width).collect();
    match align {
        Alignment::Left | Alignment::Preformatted => format!("{truncated:<width$}"),
        Alignment::Right => format!("{truncated:>width$}"),
        Alignment::Centre => {
            let pad = width.saturating_sub(truncated.chars().count());
            let left = pad / 2;
            let right = pad - left;
            format!("{}{}{}", " ".repeat(left), truncated, " ".repeat(right))
        }
    }
}

fn merge(total_width: u32, children: Vec<ColumnResult>) -> Vec<String> {
    let max_lines = children.iter().map(|c| c.lines.len()).max().unwrap_or(0);
    let mut rows: Vec<Vec<char>> = vec![vec![' '; total_width as usize]; max_lines];
    for child in &children {
        let pad_top = if child.bottom_align { max_lines.saturating_sub(child.lines.len()) } else { 0 };
        for (i, row) in rows.iter_mut().enumerate() {
            let cell = if i < pad_top {
                String::new()
            } else {
                child.lines.get(i - pad_top).cloned().unwrap_or_default()
            };
            let justified = justify(&cell, child.width as usize, child.align);
            let start = child.start as usize;
            if row.len() < start + justified.chars().count() {
                row.resize(start + justified.chars().count(), ' ');
            }
            for (j, c) in justified.chars().enumerate() {
                row[start + j] = c;
            }
        }
    }
    rows.into_iter().map(|r| r.into_iter().collect::<String>().trim_end().to_string()).collect()
}

/// A forced line break inside otherwise-reflowable text — the way a
/// `br` chunk asks the wrapper for a hard break mid-paragraph rather
/// than letting `add_text`'s word-joining swallow it as whitespace.
pub const FORCED_BREAK: char = '\u{2028}';

/// Greedy word wrap with a hyphenation fallback for a single word wider
/// than the column, and a hanging indent applied to every line after
/// the first. A [`FORCED_BREAK`] splits the text into independently
/// wrapped segments before any other wrapping happens.
fn wrap_text(text: &str, width: u32, hanging_indent: u32) -> Vec<String> {
    if text.contains(FORCED_BREAK) {
        return text.split(FORCED_BREAK).flat_map(|segment| wrap_segment(segment, width, hanging_indent)).collect();
    }
    wrap_segment(text, width, hanging_indent)
}

/// A breakpoint is a literal space or hyphen; the non-breaking forms
/// (`U+00A0`, `U+2011`) render identically but are never split on,
/// matched here by codepoint rather than by `char::is_whitespace`.
fn is_break_char(c: char) -> bool {
    c == ' ' || c == '-'
}

fn push_wrapped_line(lines: &mut Vec<String>, body: &str, hanging: usize, first: &mut bool) {
    let line = if *first || hanging == 0 { body.to_string() } else { format!("{}{}", " ".repeat(hanging), body) };
    lines.push(line);
    *first = false;
}

fn wrap_segment(text: &str, width: u32, hanging_indent: u32) -> Vec<String> {
    let width = (width as usize).max(1);
    let hanging = (hanging_indent as usize).min(width.saturating_sub(1));
    let chars: Vec<char> = text.chars().collect();
    let mut lines = Vec::new();
    let mut first = true;
    let mut i = 0;

    while i < chars.len() {
        while i < chars.len() && chars[i] == ' ' {
            i += 1;
        }
        if i >= chars.len() {
            break;
        }
        let start = i;
        let room = (if first { width } else { width.saturating_sub(hanging) }).max(1);

        // the longest prefix starting here that fits in `room`, tracking
        // the rightmost breakpoint seen along the way
        let mut consumed = 0usize;
        let mut last_break: Option<usize> = None;
        let mut j = start;
        while j < chars.len() && consumed + 1 <= room {
            if is_break_char(chars[j]) {
                last_break = Some(j);
            }
            consumed += 1;
            j += 1;
        }

        if j == chars.len() {
            let body: String = chars[start..j].iter().collect();
            push_wrapped_line(&mut lines, &body, hanging, &mut first);
            i = j;
            continue;
        }

        if chars[j] == ' ' {
            // the fitting prefix ends exactly on a word boundary
            let body: String = chars[start..j].iter().collect();
            push_wrapped_line(&mut lines, &body, hanging, &mut first);
            let mut skip = j;
            while skip < chars.len() && chars[skip] == ' ' {
                skip += 1;
            }
            i = skip;
            continue;
        }

        match last_break {
            Some(bp) if chars[bp] == ' ' => {
                let body: String = chars[start..bp].iter().collect();
                push_wrapped_line(&mut lines, &body, hanging, &mut first);
                let mut skip = bp;
                while skip < chars.len() && chars[skip] == ' ' {
                    skip += 1;
                }
                i = skip;
            }
            Some(bp) => {
                // hyphen stays at the end of the line it closes
                let body: String = chars[start..=bp].iter().collect();
                push_wrapped_line(&mut lines, &body, hanging, &mut first);
                i = bp + 1;
            }
            None if room <= 1 => {
                // column too narrow to hyphenate meaningfully; force characters through
                let body: String = chars[start..j].iter().collect();
                push_wrapped_line(&mut lines, &body, hanging, &mut first);
                i = j;
            }
            None => {
                let cut = start + room - 1;
                let body: String = chars[start..cut].iter().collect::<String>() + "-";
                push_wrapped_line(&mut lines, &body, hanging, &mut first);
                i = cut;
            }
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ConsoleSink;

    fn pos() -> Position {
        Position::start_of("test")
    }

    #[test]
    fn wraps_at_word_boundaries() {
        let lines = wrap_text("the quick brown fox jumps", 10, 0);
        assert!(lines.iter().all(|l| l.chars().count() <= 10));
        assert_eq!(lines[0], "the quick");
    }

    #[test]
    fn hyphenates_an_overlong_word() {
        let lines = wrap_text("supercalifragilistic", 8, 0);
        assert!(lines[0].ends_with('-'));
        assert!(lines.iter().all(|l| l.chars().count() <= 8));
    }

    #[test]
    fn breaks_a_hyphenated_word_at_its_hyphens_before_falling_back_to_hyphenation() {
        let lines = wrap_text("foo-bar-baz-qux", 8, 0);
        assert_eq!(lines, vec!["foo-bar-".to_string(), "baz-qux".to_string()]);
    }

    #[test]
    fn non_breaking_space_renders_but_is_never_a_breakpoint() {
        // unlike an ordinary space at the same position (which would
        // split cleanly into "alpha"/"beta"), the non-breaking space
        // forces the hyphenation fallback instead.
        let text = format!("alpha{}beta", '\u{00A0}');
        let lines = wrap_text(&text, 8, 0);
        assert_eq!(lines, vec![format!("alpha{}b-", '\u{00A0}'), "eta".to_string()]);
    }

    #[test]
    fn non_breaking_hyphen_renders_but_is_never_a_breakpoint() {
        let text = format!("alpha{}beta", '\u{2011}');
        let lines = wrap_text(&text, 8, 0);
        assert_eq!(lines, vec![format!("alpha{}b-", '\u{2011}'), "eta".to_string()]);
    }

    #[test]
    fn forced_break_starts_a_new_line_regardless_of_width() {
        let text = format!("alpha beta{FORCED_BREAK}gamma");
        let lines = wrap_text(&text, 20, 0);
        assert_eq!(lines, vec!["alpha beta".to_string(), "gamma".to_string()]);
    }

    #[test]
    fn hanging_indent_applies_after_first_line() {
        let lines = wrap_text("alpha beta gamma delta", 8, 2);
        assert!(!lines[0].starts_with("  "));
        assert!(lines[1].starts_with("  "));
    }

    #[test]
    fn single_column_round_trips_through_formatter() {
        let mut sink = ConsoleSink::default();
        let mut fmt = LineFormatter::new(20);
        fmt.push(20);
        fmt.add_text("hello world this is a test of wrapping");
        fmt.pop(&mut sink, &pos());
        fmt.write();
        assert!(fmt.lines().iter().all(|l| l.chars().count() <= 20));
        assert!(!fmt.lines().is_empty());
    }

    #[test]
    fn two_columns_render_side_by_side() {
        let mut sink = ConsoleSink::default();
        let mut fmt = LineFormatter::new(20);
        fmt.push(10);
        fmt.add_text("left");
        fmt.pop(&mut sink, &pos());
        fmt.push(10);
        fmt.add_text("right");
        fmt.pop(&mut sink, &pos());
        fmt.write();
        assert_eq!(fmt.lines()[0].get(0..4), Some("left"));
        assert_eq!(&fmt.lines()[0][10..15], "right");
    }

    #[test]
    fn bottom_align_pads_short_column_at_the_top() {
        let mut sink = ConsoleSink::default();
        let mut fmt = LineFormatter::new(20);
        fmt.push(10);
        fmt.add_text("one two three four five six");
        fmt.pop(&mut sink, &pos());
        fmt.push(10);
        fmt.set_column_flags(true);
        fmt.add_text("short");
        fmt.pop(&mut sink, &pos());
        fmt.write();
        let last = fmt.lines().last().unwrap();
        assert!(last[10..].trim_end() == "short" || last[10..].starts_with("short"));
    }

    #[test]
    fn unbalanced_pop_is_reported() {
        let mut sink = ConsoleSink::default();
        let mut fmt = LineFormatter::new(20);
        fmt.pop(&mut sink, &pos());
        assert!(sink.diagnostics.iter().any(|d| matches!(d.code, Code::UnbalancedLineStack { .. })));
    }
}
