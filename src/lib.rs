//! Compiles a structured XML manual source into plain-text,
//! legacy-hypertext, web-hypertext, and debug (resolved-tree JSON)
//! renderings.
//!
//! The pipeline, driven by [`export::dispatch`]: the [`xml`] tokenizer
//! streams an input file, [`ast`] builds a resolved document tree from
//! it (recursing into included files), [`link`] assigns numbering and
//! binds references, and [`export`] walks the tree once per requested
//! output mode, delegating text layout to [`format`] and byte-level
//! character output to [`encoding`]. [`cli`] wires this up for the
//! `folio` binary.

pub mod ast;
pub mod cli;
pub mod diagnostics;
pub mod encoding;
pub mod export;
pub mod filename;
pub mod format;
pub mod link;
pub mod xml;

pub use diagnostics::{Code, Diagnostic, DiagnosticSink, Run, Severity};
pub use export::{OutputMode, dispatch};
