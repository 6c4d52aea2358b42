//! Output dispatch: runs each requested output mode's writer over the
//! same resolved tree, nesting every mode's output under its own
//! subdirectory of the caller's output root so a single run can ask
//! for more than one at once without the writers colliding.

pub mod container;
pub mod debug;
pub mod entities_render;
pub mod hypertext;
pub mod inline;
pub mod ownership;
pub mod queue;
pub mod refnum;
pub mod text;
pub mod web;

pub use ownership::{DispatchOptions, OutputMode};
pub use queue::ManualQueue;

use crate::ast::{NodeId, Tree};
use crate::diagnostics::DiagnosticSink;
use crate::filename::Filenames;

/// Per-mode output subdirectory name, nested under the run's output
/// root so requesting several modes in one run can't make two writers
/// write the same path.
fn subdir(mode: OutputMode) -> &'static str {
    match mode {
        OutputMode::Text => "text",
        OutputMode::LegacyHypertext => "hypertext",
        OutputMode::WebHypertext => "web",
        OutputMode::Debug => "debug",
    }
}

/// Renders `modes` in turn, each into its own subdirectory of
/// `options.output_root`.
pub fn dispatch<S: DiagnosticSink>(
    tree: &Tree,
    root: NodeId,
    modes: &[OutputMode],
    options: &DispatchOptions,
    filenames: &dyn Filenames,
    sink: &mut S,
) -> std::io::Result<()> {
    for &mode in modes {
        let mode_root = filenames.join(&options.output_root, subdir(mode));
        match mode {
            OutputMode::Debug => {
                filenames.create_dir_all(&mode_root)?;
                debug::emit(tree, root, &mode_root, filenames, sink)?;
            }
            _ => {
                let mode_options = DispatchOptions { output_root: mode_root, ..options.clone() };
                match mode {
                    OutputMode::Text => text::emit(tree, root, &mode_options, filenames, sink)?,
                    OutputMode::LegacyHypertext => hypertext::emit(tree, root, &mode_options, filenames, sink)?,
                    OutputMode::WebHypertext => web::emit(tree, root, &mode_options, filenames, sink)?,
                    OutputMode::Debug => unreachable!(),
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build_file;
    use crate::diagnostics::ConsoleSink;
    use crate::filename::StdFilenames;
    use crate::link::link;
    use std::io::Write;

    #[test]
    fn dispatching_two_modes_writes_under_separate_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.xml");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(
                br#"<manual><chapterlist><chapter id="c"><section id="s">
                    <p>hello</p>
                </section></chapter></chapterlist></manual>"#,
            )
            .unwrap();
        let mut sink = ConsoleSink::default();
        let (mut tree, root) = build_file(&path, &mut sink);
        let root = root.unwrap();
        link(&mut tree, root, &mut sink);

        let out = tempfile::tempdir().unwrap();
        let options = DispatchOptions { output_root: out.path().to_path_buf(), ..DispatchOptions::default() };
        dispatch(&tree, root, &[OutputMode::Text, OutputMode::Debug], &options, &StdFilenames, &mut sink).unwrap();

        assert!(out.path().join("text").join("ReadMe.txt").exists());
        assert!(out.path().join("debug").join("tree.json").exists());
    }
}
