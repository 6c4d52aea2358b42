//! Argument parsing for the `folio` binary. Kept out of `main.rs` so the
//! binary itself stays a thin call into the library.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::encoding::{LineEnding, Target};
use crate::export::OutputMode;

#[derive(Parser)]
#[command(name = "folio", about = "Compiles a structured XML manual into plain-text, hypertext, and web renderings", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compile a manual's root file into one or more renderings
    Build {
        /// The manual's root XML file
        root: PathBuf,

        /// Directory the renderings are written under
        #[arg(short, long, default_value = "output")]
        output: PathBuf,

        /// Renderings to produce (repeatable)
        #[arg(short, long = "mode", value_enum, default_values_t = [ModeArg::Text])]
        modes: Vec<ModeArg>,

        /// Character target the text and legacy-hypertext renderings are
        /// transcoded to
        #[arg(short, long, default_value = "UTF8")]
        target: String,

        /// Line ending the text and legacy-hypertext renderings use
        #[arg(long, value_enum, default_value_t = LineEndingArg::Lf)]
        line_ending: LineEndingArg,

        /// Column width the text rendering wraps to
        #[arg(long, default_value_t = 77)]
        page_width: u32,

        /// Name given to the whole manual's file when it has no
        /// file-producing resources of its own
        #[arg(long, default_value = "ReadMe")]
        single_file_name: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Text,
    Hypertext,
    Web,
    Debug,
}

impl ModeArg {
    pub fn to_output_mode(self) -> OutputMode {
        match self {
            ModeArg::Text => OutputMode::Text,
            ModeArg::Hypertext => OutputMode::LegacyHypertext,
            ModeArg::Web => OutputMode::WebHypertext,
            ModeArg::Debug => OutputMode::Debug,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LineEndingArg {
    Cr,
    Lf,
    CrLf,
    LfCr,
}

impl LineEndingArg {
    pub fn to_line_ending(self) -> LineEnding {
        match self {
            LineEndingArg::Cr => LineEnding::Cr,
            LineEndingArg::Lf => LineEnding::Lf,
            LineEndingArg::CrLf => LineEnding::CrLf,
            LineEndingArg::LfCr => LineEnding::LfCr,
        }
    }
}

/// Looks a target up by its display name, case-insensitively (`utf8`,
/// `AcornL1`, ...). `clap` validates the CLI's own enums for us; this one
/// stays a free string since the legacy target set is too wide to spell
/// out as variants one by one.
pub fn parse_target(name: &str) -> Option<Target> {
    Target::ALL.iter().copied().find(|t| t.name().eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_target_is_case_insensitive() {
        assert_eq!(parse_target("utf8"), Some(Target::Utf8));
        assert_eq!(parse_target("AcornL1"), Some(Target::AcornL1));
        assert_eq!(parse_target("nonsense"), None);
    }
}
