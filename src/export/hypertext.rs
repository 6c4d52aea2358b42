//! The legacy-hypertext writer: one [`Container`] holding a named,
//! typed sub-file per file-owning node, each sub-file's body built the
//! same margin-threaded way as the plain-text writer but escaped
//! through the legacy dialect's directive syntax instead of wrapped
//! fixed-width.

use crate::ast::{NodeId, Payload, Tree};
use crate::diagnostics::{DiagnosticSink, Position};
use crate::encoding::Transcoder;
use crate::filename::Filenames;
use crate::xml::ElementKind;

use super::container::{Container, PAGE_FILETYPE, ROOT_NAME};
use super::inline::{self, InlineContext, Style};
use super::ownership::{file_stem, owns_file, DispatchOptions, OutputMode};
use super::queue::ManualQueue;
use super::refnum::{self, RefNumbers};

pub fn emit<S: DiagnosticSink>(
    tree: &Tree,
    root: NodeId,
    options: &DispatchOptions,
    filenames: &dyn Filenames,
    sink: &mut S,
) -> std::io::Result<()> {
    let numbers = refnum::compute(tree, root);
    let transcoder = Transcoder::new(options.target, options.line_ending, sink, &tree.get(root).at);
    let mut container = Container::new();
    container.open();

    let mut queue = ManualQueue::seed(root);
    while let Some(file_root) = queue.pop() {
        let name = sub_file_name(tree, file_root, root);
        container.sub_open(&name, PAGE_FILETYPE);
        render_file(tree, file_root, root, &numbers, &transcoder, &mut container, sink, &mut queue);
        container.sub_close();
    }

    filenames.create_dir_all(&options.output_root)?;
    let path = filenames.join(&options.output_root, &options.single_file_name);
    std::fs::write(path, container.close())
}

fn sub_file_name(tree: &Tree, file_root: NodeId, doc_root: NodeId) -> String {
    if file_root == doc_root && !owns_file(tree, doc_root, OutputMode::LegacyHypertext) {
        ROOT_NAME.to_string()
    } else {
        file_stem(tree, file_root, OutputMode::LegacyHypertext)
    }
}

fn heading_label(tree: &Tree, node: NodeId) -> String {
    let title = tree.get(node).title.map(|t| inline::title_text(tree, Style::Hypertext, t)).unwrap_or_default();
    if tree.get(node).kind.is_numbered() && tree.get(node).index > 0 {
        format!("{}. {}", tree.get(node).index, title)
    } else {
        title
    }
}

fn inline_ctx<'a>(tree: &'a Tree, doc_root: NodeId, numbers: &'a RefNumbers, current_file: NodeId) -> InlineContext<'a> {
    InlineContext { tree, root: doc_root, numbers, mode: OutputMode::LegacyHypertext, style: Style::Hypertext, current_file, paths: None }
}

#[allow(clippy::too_many_arguments)]
fn render_file<S: DiagnosticSink>(
    tree: &Tree,
    file_root: NodeId,
    doc_root: NodeId,
    numbers: &RefNumbers,
    transcoder: &Transcoder,
    container: &mut Container,
    sink: &mut S,
    queue: &mut ManualQueue,
) {
    let at = tree.get(file_root).at.clone();
    if tree.get(file_root).title.is_some() {
        container.write_plain("\\b");
        container.write_text(&heading_label(tree, file_root), transcoder, sink, &at);
        container.write_plain("\\b");
        container.write_newline(transcoder);
        container.write_newline(transcoder);
    }
    for child in tree.children(file_root) {
        render_block(tree, child, file_root, doc_root, numbers, transcoder, container, queue, sink);
    }
}

#[allow(clippy::too_many_arguments)]
fn render_block<S: DiagnosticSink>(
    tree: &Tree,
    node: NodeId,
    file_root: NodeId,
    doc_root: NodeId,
    numbers: &RefNumbers,
    transcoder: &Transcoder,
    container: &mut Container,
    queue: &mut ManualQueue,
    sink: &mut S,
) {
    let kind = tree.get(node).kind;
    let at = tree.get(node).at.clone();

    if node != file_root && owns_file(tree, node, OutputMode::LegacyHypertext) {
        write_stub(tree, node, transcoder, container, sink, &at);
        queue.push(node);
        return;
    }

    match kind {
        ElementKind::Manual | ElementKind::Chapter | ElementKind::Index | ElementKind::Section => {
            if tree.get(node).title.is_some() {
                container.write_plain("\\b");
                container.write_text(&heading_label(tree, node), transcoder, sink, &at);
                container.write_plain("\\b");
                container.write_newline(transcoder);
                container.write_newline(transcoder);
            }
            for child in tree.children(node) {
                render_block(tree, child, file_root, doc_root, numbers, transcoder, container, queue, sink);
            }
        }
        ElementKind::Chapterlist => {
            for child in tree.children(node) {
                render_block(tree, child, file_root, doc_root, numbers, transcoder, container, queue, sink);
            }
        }
        ElementKind::P => {
            let ctx = inline_ctx(tree, doc_root, numbers, file_root);
            let text = inline::render(&ctx, node);
            container.write_text(&text, transcoder, sink, &at);
            container.write_newline(transcoder);
            container.write_newline(transcoder);
        }
        ElementKind::Ol | ElementKind::Ul => {
            render_list(tree, node, kind, file_root, doc_root, numbers, transcoder, container, queue, sink);
        }
        ElementKind::Table => {
            render_table(tree, node, file_root, doc_root, numbers, transcoder, container, sink);
        }
        ElementKind::Code => {
            render_code(tree, node, transcoder, container, sink, &at);
        }
        ElementKind::Footnote | ElementKind::Callout => {
            render_inset(tree, node, kind, file_root, doc_root, numbers, transcoder, container, queue, sink);
        }
        _ => {}
    }
}

#[allow(clippy::too_many_arguments)]
fn render_list<S: DiagnosticSink>(
    tree: &Tree,
    node: NodeId,
    kind: ElementKind,
    file_root: NodeId,
    doc_root: NodeId,
    numbers: &RefNumbers,
    transcoder: &Transcoder,
    container: &mut Container,
    queue: &mut ManualQueue,
    sink: &mut S,
) {
    let style = if kind == ElementKind::Ol { crate::format::Style::Numeric } else { crate::format::Style::Unordered };
    let items: Vec<NodeId> = tree.children(node).collect();
    for (i, item) in items.iter().enumerate() {
        let item_at = tree.get(*item).at.clone();
        let label = crate::format::label(style, (i + 1) as u32, sink, &item_at);
        container.write_plain(&format!("{label}. "));
        for child in tree.children(*item) {
            render_block(tree, child, file_root, doc_root, numbers, transcoder, container, queue, sink);
        }
    }
    container.write_newline(transcoder);
}

fn cell_text(tree: &Tree, cell: NodeId, ctx: &InlineContext) -> String {
    let mut out = String::new();
    for child in tree.children(cell) {
        if tree.get(child).kind == ElementKind::P {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&inline::render(ctx, child));
        }
    }
    out
}

fn render_table<S: DiagnosticSink>(
    tree: &Tree,
    node: NodeId,
    file_root: NodeId,
    doc_root: NodeId,
    numbers: &RefNumbers,
    transcoder: &Transcoder,
    container: &mut Container,
    sink: &mut S,
) {
    let ctx = inline_ctx(tree, doc_root, numbers, file_root);
    for row in tree.children(node).filter(|n| tree.get(*n).kind == ElementKind::Row) {
        let cells: Vec<NodeId> = tree.children(row).collect();
        for (i, cell) in cells.iter().enumerate() {
            if i > 0 {
                container.write_plain("\t");
            }
            let at = tree.get(*cell).at.clone();
            container.write_text(&cell_text(tree, *cell, &ctx), transcoder, sink, &at);
        }
        container.write_newline(transcoder);
    }
    container.write_newline(transcoder);
}

fn render_code<S: DiagnosticSink>(tree: &Tree, node: NodeId, transcoder: &Transcoder, container: &mut Container, sink: &mut S, at: &Position) {
    container.write_plain("\\c");
    for child in tree.children(node) {
        match &tree.get(child).payload {
            Payload::Text(text) => container.write_text(text, transcoder, sink, at),
            Payload::Entity(kind) => container.write_plain(&super::entities_render::render_hypertext(*kind)),
            _ => {}
        }
    }
    container.write_plain("\\c");
    container.write_newline(transcoder);
    container.write_newline(transcoder);
}

#[allow(clippy::too_many_arguments)]
fn render_inset<S: DiagnosticSink>(
    tree: &Tree,
    node: NodeId,
    kind: ElementKind,
    file_root: NodeId,
    doc_root: NodeId,
    numbers: &RefNumbers,
    transcoder: &Transcoder,
    container: &mut Container,
    queue: &mut ManualQueue,
    sink: &mut S,
) {
    let at = tree.get(node).at.clone();
    let word = if kind == ElementKind::Footnote { "Footnote" } else { "See also" };
    let label = match (tree.get(node).id(), refnum::anchor_for(tree, numbers, node)) {
        (Some(id), _) => format!("[{word}: {id}]"),
        (None, Some(anchor)) => format!("[{anchor}]"),
        (None, None) => format!("[{word}]"),
    };
    container.write_text(&label, transcoder, sink, &at);
    container.write_newline(transcoder);
    for child in tree.children(node) {
        render_block(tree, child, file_root, doc_root, numbers, transcoder, container, queue, sink);
    }
}

fn write_stub<S: DiagnosticSink>(tree: &Tree, node: NodeId, transcoder: &Transcoder, container: &mut Container, sink: &mut S, at: &Position) {
    container.write_plain("\\b");
    container.write_text(&heading_label(tree, node), transcoder, sink, at);
    container.write_plain("\\b");
    container.write_newline(transcoder);

    let summary = tree
        .get(node)
        .resources()
        .and_then(|r| r.summary.clone())
        .unwrap_or_else(|| "See the linked page for details.".to_string());
    let stem = file_stem(tree, node, OutputMode::LegacyHypertext);
    container.write_text(&format!("{summary} \\@{stem}@(more)\\@"), transcoder, sink, at);
    container.write_newline(transcoder);
    container.write_newline(transcoder);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build_file;
    use crate::diagnostics::ConsoleSink;
    use crate::filename::StdFilenames;
    use crate::link::link;
    use std::io::Write;

    fn build(text: &str) -> (Tree, NodeId) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.xml");
        std::fs::File::create(&path).unwrap().write_all(text.as_bytes()).unwrap();
        let mut sink = ConsoleSink::default();
        let (mut tree, root) = build_file(&path, &mut sink);
        let root = root.unwrap();
        link(&mut tree, root, &mut sink);
        (tree, root)
    }

    #[test]
    fn single_file_document_produces_one_container_with_a_root_entry() {
        let (tree, root) = build(
            r#"<manual><chapterlist><chapter id="c"><title>Intro</title><section id="s">
                <p>Hello there.</p>
            </section></chapter></chapterlist></manual>"#,
        );
        let out_dir = tempfile::tempdir().unwrap();
        let options = DispatchOptions { output_root: out_dir.path().to_path_buf(), single_file_name: "Manual".to_string(), ..Default::default() };
        let mut sink = ConsoleSink::default();
        emit(&tree, root, &options, &StdFilenames, &mut sink).unwrap();
        let bytes = std::fs::read(out_dir.path().join("Manual")).unwrap();
        assert_eq!(&bytes[0..4], b"FCNT");
        assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 1);
    }

    #[test]
    fn a_chapter_with_its_own_filename_becomes_a_second_sub_file() {
        let (tree, root) = build(
            r#"<manual><chapterlist><chapter id="c"><title>Setup</title>
                <resources><mode name="hypertext"><filename>Setup</filename></mode></resources>
                <section id="s"><p>Step one.</p></section>
            </chapter></chapterlist></manual>"#,
        );
        let out_dir = tempfile::tempdir().unwrap();
        let options = DispatchOptions { output_root: out_dir.path().to_path_buf(), single_file_name: "Manual".to_string(), ..Default::default() };
        let mut sink = ConsoleSink::default();
        emit(&tree, root, &options, &StdFilenames, &mut sink).unwrap();
        let bytes = std::fs::read(out_dir.path().join("Manual")).unwrap();
        assert_eq!(u32::from_le_bytes(bytes[4..8].try_into().unwrap()), 2);
    }
}
