//! The diagnostic catalogue.
//!
//! Every component that can fail reports through a [`DiagnosticSink`]
//! instead of unwinding: a [`Code`] carries its positional arguments as
//! enum fields, and `Code::severity` says whether the run can continue.
//! Rendering the message text is the sink's job; the core only ever
//! hands over a `Code` plus a [`Position`].

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// A location in an input file, as the tokenizer saw it when the
/// diagnostic was raised.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    pub file: PathBuf,
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(file: impl Into<PathBuf>, line: u32, column: u32) -> Self {
        Self { file: file.into(), line, column }
    }

    pub fn start_of(file: impl Into<PathBuf>) -> Self {
        Self::new(file, 1, 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// Whether a diagnostic can be skipped over (`Recoverable`) or aborts the
/// current file and the run (`Fatal`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    Recoverable,
    Fatal,
}

/// The closed diagnostic catalogue. One variant per reportable condition,
/// each carrying the positional arguments the message needs. Grouped by
/// the component that raises it, grouped in pipeline order.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Code {
    // --- tokenizer ---
    #[error("unterminated tag `<{name}`")]
    UnterminatedTag { name: String },
    #[error("unterminated entity reference")]
    UnterminatedEntity,
    #[error("unterminated attribute value on `{attr}`")]
    UnterminatedAttribute { attr: String },
    #[error("unterminated comment")]
    UnterminatedComment,
    #[error("name `{prefix}...` exceeds the {max}-byte name limit")]
    NameTooLong { prefix: String, max: usize },
    #[error("tag `<{name}` has more than {max} attributes")]
    TooManyAttributes { name: String, max: usize },
    #[error("`/` before `>` conflicts with an already-closed end tag `</{name}>`")]
    SelfClosingConflict { name: String },
    #[error("end tag `</{name}/>` may not be self-closing")]
    EndTagSelfClosing { name: String },
    #[error("whitespace inside entity reference `&{partial}`")]
    WhitespaceInEntity { partial: String },
    #[error("attribute value quote left unterminated at end of file")]
    UnterminatedQuote,
    #[error("tokenizer is in a sticky error state and cannot continue")]
    TokenizerErrorState,

    // --- grammar / document builder ---
    #[error("element `<{name}>` is not recognised")]
    UnknownElement { name: String },
    #[error("attribute `{attr}` is not recognised on `<{element}>`")]
    UnknownAttribute { attr: String, element: String },
    #[error("`<{element}>` is missing required attribute `{attr}`")]
    MissingRequiredAttribute { element: String, attr: String },
    #[error("`<{child}>` is not permitted inside `<{parent}>`")]
    UnexpectedChild { child: String, parent: String },
    #[error("text is not permitted inside `<{parent}>`")]
    UnexpectedText { parent: String },
    #[error("unexpected end tag `</{name}>`, expected `</{expected}>`")]
    MismatchedEndTag { name: String, expected: String },
    #[error("unexpected entity `&{name};` inside `<{parent}>`")]
    UnexpectedEntity { name: String, parent: String },
    #[error("unknown entity `&{name};`")]
    UnknownEntity { name: String },
    #[error("include depth exceeded {max}; dropping include of `{file}`")]
    IncludeTooDeep { file: PathBuf, max: u32 },
    #[error("could not open included file `{file}`")]
    IncludeNotFound { file: PathBuf },
    #[error("document root must be `<manual>`, found `<{name}>`")]
    WrongDocumentRoot { name: String },

    // --- linker ---
    #[error("duplicate id `{id}`; keeping the first binding")]
    DuplicateId { id: String },
    #[error("reference to unknown id `{id}`")]
    UnresolvedReference { id: String },

    // --- transcoder ---
    #[error("target `{target}` table is not sorted at entry {index}")]
    TargetTableUnsorted { target: String, index: usize },
    #[error("target `{target}` maps two code points to byte {byte:#04x}")]
    TargetByteCollision { target: String, byte: u8 },
    #[error("target `{target}` byte {byte:#04x} is never produced by any mapping")]
    TargetByteHole { target: String, byte: u8 },
    #[error("malformed UTF-8 sequence at byte offset {offset}")]
    MalformedUtf8 { offset: usize },
    #[error("output buffer exhausted while transcoding")]
    BufferExhausted,

    // --- list numbering ---
    #[error("list of {count} items exceeds the maximum of {max} for this numbering style")]
    ListTooLong { count: u32, max: u32 },
    #[error("attribute `{name}` value {value} is outside [{min}, {max}]; clamping")]
    IntegerOutOfRange { name: String, value: i64, min: i64, max: i64 },

    // --- line formatter ---
    #[error("full-width column allocation overflows the page width by {over} columns")]
    LineOverflow { over: u32 },
    #[error("hanging indent of {indent} exceeds column width {width}; clearing it")]
    HangingIndentTooWide { indent: u32, width: u32 },
    #[error("line formatter stack is unbalanced: {pushes} pushes, {pops} pops")]
    UnbalancedLineStack { pushes: u32, pops: u32 },

    // --- dispatcher / writers ---
    #[error("`<{element}>` has no rendering in {mode} output")]
    UnsupportedInMode { element: String, mode: &'static str },
    #[error("could not create output file `{file}`")]
    OutputCreateFailed { file: PathBuf },
    #[error("reference target has no id and is not a table, code block, or footnote")]
    UnanchorableTarget,

    // --- resource model ---
    #[error("out of memory while growing a column buffer")]
    OutOfMemory,
    #[error("input file `{file}` could not be found")]
    InputNotFound { file: PathBuf },
}

impl Code {
    pub fn severity(&self) -> Severity {
        use Code::*;
        match self {
            UnterminatedTag { .. }
            | UnterminatedEntity
            | UnterminatedAttribute { .. }
            | UnterminatedComment
            | NameTooLong { .. }
            | TooManyAttributes { .. }
            | TokenizerErrorState
            | UnterminatedQuote
            | WrongDocumentRoot { .. }
            | OutOfMemory
            | InputNotFound { .. }
            | OutputCreateFailed { .. }
            | TargetTableUnsorted { .. }
            | TargetByteCollision { .. } => Severity::Fatal,
            _ => Severity::Recoverable,
        }
    }
}

/// A code tied to the position it was raised at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub at: Position,
    pub code: Code,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.at, self.code.severity().as_str(), self.code)
    }
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Recoverable => "warning",
            Severity::Fatal => "error",
        }
    }
}

/// The seam every component reports diagnostics through. The core never
/// renders text itself; it only ever calls `report`.
pub trait DiagnosticSink {
    fn report(&mut self, at: Position, code: Code);
}

/// Renders diagnostics to stderr as `file:line:col: severity: message`.
/// Lives outside the core proper, alongside the CLI, since message
/// rendering is an external collaborator.
#[derive(Default)]
pub struct ConsoleSink {
    pub diagnostics: Vec<Diagnostic>,
}

impl DiagnosticSink for ConsoleSink {
    fn report(&mut self, at: Position, code: Code) {
        let diagnostic = Diagnostic { at, code };
        eprintln!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }
}

/// Tracks whether any diagnostic has been raised during a run, so the CLI
/// can pick an exit status: remembers whether any error has been
/// reported and exits non-zero if so.
#[derive(Default)]
pub struct Run {
    pub saw_error: bool,
    pub saw_fatal: bool,
}

impl Run {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn note(&mut self, code: &Code) {
        self.saw_error = true;
        if code.severity() == Severity::Fatal {
            self.saw_fatal = true;
        }
    }

    pub fn exit_code(&self) -> i32 {
        if self.saw_error { 1 } else { 0 }
    }
}

/// A sink that also feeds a [`Run`], so callers don't have to duplicate
/// the bookkeeping at every report site.
pub struct TrackingSink<'a, S> {
    pub inner: &'a mut S,
    pub run: &'a mut Run,
}

impl<'a, S: DiagnosticSink> DiagnosticSink for TrackingSink<'a, S> {
    fn report(&mut self, at: Position, code: Code) {
        self.run.note(&code);
        self.inner.report(at, code);
    }
}

pub fn position_of(file: &Path, line: u32, column: u32) -> Position {
    Position::new(file, line, column)
}
