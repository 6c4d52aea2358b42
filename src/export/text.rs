//! The plain-text writer: hard-wrapped, column-laid-out output driven
//! by [`LineFormatter`].
//!
//! Two phases, since the formatter only ever produces `String`s: the
//! whole tree walk builds Unicode lines, then [`serialize`] transcodes
//! each finished line to the selected target's bytes exactly once, at
//! the very end.

use std::path::PathBuf;

use crate::ast::{Alignment, NodeId, Payload, Tree};
use crate::diagnostics::{DiagnosticSink, Position};
use crate::encoding::{BoundedBuffer, Transcoder};
use crate::filename::Filenames;
use crate::format::{self, LineFormatter};
use crate::xml::ElementKind;

use super::entities_render;
use super::inline::{self, InlineContext, Style};
use super::ownership::{file_stem, owns_file, DispatchOptions, OutputMode};
use super::queue::ManualQueue;
use super::refnum::{self, RefNumbers};

/// How far a nested inset (list item, footnote, callout, table cell)
/// indents relative to its parent's left margin.
const INSET: u32 = 3;

pub fn emit<S: DiagnosticSink>(
    tree: &Tree,
    root: NodeId,
    options: &DispatchOptions,
    filenames: &dyn Filenames,
    sink: &mut S,
) -> std::io::Result<()> {
    filenames.create_dir_all(&options.output_root)?;
    let numbers = refnum::compute(tree, root);
    let mut queue = ManualQueue::seed(root);
    while let Some(file_root) = queue.pop() {
        render_file(tree, file_root, root, &numbers, options, filenames, sink, &mut queue)?;
    }
    Ok(())
}

fn path_for(tree: &Tree, file_root: NodeId, doc_root: NodeId, options: &DispatchOptions, filenames: &dyn Filenames) -> PathBuf {
    let stem = if file_root == doc_root && !owns_file(tree, doc_root, OutputMode::Text) {
        options.single_file_name.clone()
    } else {
        file_stem(tree, file_root, OutputMode::Text)
    };
    filenames.with_extension(&filenames.join(&options.output_root, &stem), "txt")
}

fn heading_label(tree: &Tree, node: NodeId) -> String {
    let title = tree.get(node).title.map(|t| inline::title_text(tree, Style::Text, t)).unwrap_or_default();
    if tree.get(node).kind.is_numbered() && tree.get(node).index > 0 {
        format!("{}. {}", tree.get(node).index, title)
    } else {
        title
    }
}

fn render_file<S: DiagnosticSink>(
    tree: &Tree,
    file_root: NodeId,
    doc_root: NodeId,
    numbers: &RefNumbers,
    options: &DispatchOptions,
    filenames: &dyn Filenames,
    sink: &mut S,
    queue: &mut ManualQueue,
) -> std::io::Result<()> {
    let mut fmt = LineFormatter::new(options.page_width);
    let at = tree.get(file_root).at.clone();

    if tree.get(file_root).title.is_some() {
        let heading = heading_label(tree, file_root);
        fmt.push(options.page_width);
        fmt.add_text(&heading);
        fmt.pop(sink, &at);
        fmt.write();
        fmt.write_ruleoff();
        fmt.write_newline();
    }

    for child in tree.children(file_root) {
        render_block(tree, child, file_root, doc_root, numbers, options, &mut fmt, queue, sink, 0);
    }

    let path = path_for(tree, file_root, doc_root, options, filenames);
    if let Some(parent) = path.parent() {
        filenames.create_dir_all(parent)?;
    }
    let bytes = serialize(&fmt.into_lines(), options, sink, &at);
    std::fs::write(path, bytes)
}

fn serialize<S: DiagnosticSink>(lines: &[String], options: &DispatchOptions, sink: &mut S, at: &Position) -> Vec<u8> {
    let capacity = lines.iter().map(|l| l.len() * 4 + 4).sum::<usize>() + 16;
    let mut buf = BoundedBuffer::with_capacity(capacity);
    let transcoder = Transcoder::new(options.target, options.line_ending, sink, at);
    for line in lines {
        for c in line.chars() {
            transcoder.write_unicode(&mut buf, c as u32, sink, at);
        }
        transcoder.write_newline(&mut buf, sink, at);
    }
    buf.into_vec()
}

fn inline_ctx<'a>(tree: &'a Tree, doc_root: NodeId, numbers: &'a RefNumbers, current_file: NodeId) -> InlineContext<'a> {
    InlineContext { tree, root: doc_root, numbers, mode: OutputMode::Text, style: Style::Text, current_file, paths: None }
}

#[allow(clippy::too_many_arguments)]
fn render_block<S: DiagnosticSink>(
    tree: &Tree,
    node: NodeId,
    file_root: NodeId,
    doc_root: NodeId,
    numbers: &RefNumbers,
    options: &DispatchOptions,
    fmt: &mut LineFormatter,
    queue: &mut ManualQueue,
    sink: &mut S,
    margin: u32,
) {
    let kind = tree.get(node).kind;
    let at = tree.get(node).at.clone();

    if node != file_root && owns_file(tree, node, OutputMode::Text) {
        write_stub(tree, node, margin, options, fmt, sink);
        queue.push(node);
        return;
    }

    match kind {
        ElementKind::Manual | ElementKind::Chapter | ElementKind::Index | ElementKind::Section => {
            if tree.get(node).title.is_some() {
                let heading = heading_label(tree, node);
                fmt.push_at(margin, options.page_width.saturating_sub(margin), Alignment::Left);
                fmt.add_text(&heading);
                fmt.pop(sink, &at);
                fmt.write();
                fmt.write_newline();
            }
            for child in tree.children(node) {
                render_block(tree, child, file_root, doc_root, numbers, options, fmt, queue, sink, margin);
            }
        }
        ElementKind::Chapterlist => {
            for child in tree.children(node) {
                render_block(tree, child, file_root, doc_root, numbers, options, fmt, queue, sink, margin);
            }
        }
        ElementKind::P => {
            let ctx = inline_ctx(tree, doc_root, numbers, file_root);
            let text = inline::render(&ctx, node);
            fmt.push_at(margin, options.page_width.saturating_sub(margin), Alignment::Left);
            fmt.add_text(&text);
            fmt.pop(sink, &at);
            fmt.write();
            fmt.write_newline();
        }
        ElementKind::Ol | ElementKind::Ul => {
            render_list(tree, node, kind, file_root, doc_root, numbers, options, fmt, queue, sink, margin);
        }
        ElementKind::Table => {
            render_table(tree, node, file_root, doc_root, numbers, options, fmt, sink, margin);
        }
        ElementKind::Code => {
            render_code(tree, node, margin, options, fmt, sink);
        }
        ElementKind::Footnote | ElementKind::Callout => {
            render_inset(tree, node, kind, file_root, doc_root, numbers, options, fmt, queue, sink, margin);
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
    options: &DispatchOptions,
    fmt: &mut LineFormatter,
    queue: &mut ManualQueue,
    sink: &mut S,
    margin: u32,
) {
    let style = if kind == ElementKind::Ol { format::Style::Numeric } else { format::Style::Unordered };
    let items: Vec<NodeId> = tree.children(node).collect();
    let label_width = format::max_label_width(style, items.len() as u32);
    let body_margin = margin + label_width + 1;

    for (i, item) in items.iter().enumerate() {
        let item_at = tree.get(*item).at.clone();
        let label = format::label(style, (i + 1) as u32, sink, &item_at);
        let children: Vec<NodeId> = tree.children(*item).collect();
        let first_is_paragraph = children.first().is_some_and(|c| tree.get(*c).kind == ElementKind::P);

        fmt.push_at(margin, label_width, Alignment::Left);
        fmt.add_text(&label);
        fmt.pop(sink, &item_at);

        if first_is_paragraph {
            let ctx = inline_ctx(tree, doc_root, numbers, file_root);
            let text = inline::render(&ctx, children[0]);
            fmt.push_at(body_margin, options.page_width.saturating_sub(body_margin), Alignment::Left);
            fmt.add_text(&text);
            fmt.pop(sink, &item_at);
            fmt.write();
            for child in &children[1..] {
                render_block(tree, *child, file_root, doc_root, numbers, options, fmt, queue, sink, body_margin);
            }
        } else {
            fmt.write();
            for child in &children {
                render_block(tree, *child, file_root, doc_root, numbers, options, fmt, queue, sink, body_margin);
            }
        }
    }
    fmt.write_newline();
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

#[allow(clippy::too_many_arguments)]
fn render_table<S: DiagnosticSink>(
    tree: &Tree,
    node: NodeId,
    file_root: NodeId,
    doc_root: NodeId,
    numbers: &RefNumbers,
    options: &DispatchOptions,
    fmt: &mut LineFormatter,
    sink: &mut S,
    margin: u32,
) {
    let ctx = inline_ctx(tree, doc_root, numbers, file_root);
    let column_defs = match &tree.get(node).payload {
        Payload::TableColumns(defs) => Some(defs.clone()),
        _ => None,
    };
    let available = options.page_width.saturating_sub(margin).max(1);

    for row in tree.children(node).filter(|n| tree.get(*n).kind == ElementKind::Row) {
        let cells: Vec<NodeId> = tree.children(row).collect();
        if cells.is_empty() {
            continue;
        }
        let equal_share = (available / cells.len() as u32).max(1);
        let spec: Vec<(u32, Alignment)> = (0..cells.len())
            .map(|i| {
                if let Some(defs) = column_defs.as_ref().filter(|d| d.len() == cells.len()) {
                    (defs[i].width.unwrap_or(equal_share), defs[i].align)
                } else if let Payload::Column(def) = &tree.get(cells[i]).payload {
                    (def.width.unwrap_or(equal_share), def.align)
                } else {
                    (equal_share, Alignment::Left)
                }
            })
            .collect();

        let mut col = margin;
        for (i, cell) in cells.iter().enumerate() {
            let (width, align) = spec[i];
            let text = cell_text(tree, *cell, &ctx);
            let at = tree.get(*cell).at.clone();
            fmt.push_at(col, width, align);
            fmt.add_text(&text);
            fmt.pop(sink, &at);
            col += width;
        }
        fmt.write();
    }
    fmt.write_newline();
}

fn render_code<S: DiagnosticSink>(tree: &Tree, node: NodeId, margin: u32, options: &DispatchOptions, fmt: &mut LineFormatter, sink: &mut S) {
    let at = tree.get(node).at.clone();
    let mut raw = String::new();
    for child in tree.children(node) {
        match &tree.get(child).payload {
            Payload::Text(text) => raw.push_str(text),
            Payload::Entity(kind) => raw.push_str(&entities_render::render_text(*kind)),
            _ => {}
        }
    }
    fmt.push_at(margin, options.page_width.saturating_sub(margin), Alignment::Preformatted);
    fmt.add_text(&raw);
    fmt.pop(sink, &at);
    fmt.write();
    fmt.write_newline();
}

#[allow(clippy::too_many_arguments)]
fn render_inset<S: DiagnosticSink>(
    tree: &Tree,
    node: NodeId,
    kind: ElementKind,
    file_root: NodeId,
    doc_root: NodeId,
    numbers: &RefNumbers,
    options: &DispatchOptions,
    fmt: &mut LineFormatter,
    queue: &mut ManualQueue,
    sink: &mut S,
    margin: u32,
) {
    let at = tree.get(node).at.clone();
    let word = if kind == ElementKind::Footnote { "Footnote" } else { "See also" };
    let label = match (tree.get(node).id(), refnum::anchor_for(tree, numbers, node)) {
        (Some(id), _) => format!("[{word}: {id}]"),
        (None, Some(anchor)) => format!("[{anchor}]"),
        (None, None) => format!("[{word}]"),
    };
    fmt.push_at(margin, options.page_width.saturating_sub(margin), Alignment::Left);
    fmt.add_text(&label);
    fmt.pop(sink, &at);
    fmt.write();

    let body_margin = margin + INSET;
    for child in tree.children(node) {
        render_block(tree, child, file_root, doc_root, numbers, options, fmt, queue, sink, body_margin);
    }
}

fn write_stub<S: DiagnosticSink>(tree: &Tree, node: NodeId, margin: u32, options: &DispatchOptions, fmt: &mut LineFormatter, sink: &mut S) {
    let at = tree.get(node).at.clone();
    let heading = heading_label(tree, node);
    fmt.push_at(margin, options.page_width.saturating_sub(margin), Alignment::Left);
    fmt.add_text(&heading);
    fmt.pop(sink, &at);
    fmt.write();

    let summary = tree
        .get(node)
        .resources()
        .and_then(|r| r.summary.clone())
        .unwrap_or_else(|| "See the linked page for details.".to_string());
    let stem = file_stem(tree, node, OutputMode::Text);
    fmt.push_at(margin, options.page_width.saturating_sub(margin), Alignment::Left);
    fmt.add_text(&format!("{summary} (see {stem})"));
    fmt.pop(sink, &at);
    fmt.write();
    fmt.write_newline();
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
    fn single_file_document_renders_to_the_caller_named_file() {
        let (tree, root) = build(
            r#"<manual><chapterlist><chapter id="c"><title>Intro</title><section id="s">
                <p>Hello there, this is a short paragraph.</p>
            </section></chapter></chapterlist></manual>"#,
        );
        let out_dir = tempfile::tempdir().unwrap();
        let options = DispatchOptions { output_root: out_dir.path().to_path_buf(), ..Default::default() };
        let mut sink = ConsoleSink::default();
        emit(&tree, root, &options, &StdFilenames, &mut sink).unwrap();
        let path = out_dir.path().join("ReadMe.txt");
        assert!(path.exists());
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("Hello there"));
        assert!(content.contains("1. Intro"));
    }

    #[test]
    fn a_chapter_with_a_declared_filename_splits_into_its_own_page() {
        let (tree, root) = build(
            r#"<manual><chapterlist><chapter id="c"><title>Setup</title>
                <resources><mode name="text"><filename>setup.txt</filename></mode><summary>How to set up.</summary></resources>
                <section id="s"><p>Step one.</p></section>
            </chapter></chapterlist></manual>"#,
        );
        let out_dir = tempfile::tempdir().unwrap();
        let options = DispatchOptions { output_root: out_dir.path().to_path_buf(), ..Default::default() };
        let mut sink = ConsoleSink::default();
        emit(&tree, root, &options, &StdFilenames, &mut sink).unwrap();
        let root_page = std::fs::read_to_string(out_dir.path().join("ReadMe.txt")).unwrap();
        assert!(root_page.contains("How to set up."));
        assert!(root_page.contains("setup.txt"));
        let chapter_page = std::fs::read_to_string(out_dir.path().join("setup.txt")).unwrap();
        assert!(chapter_page.contains("Step one."));
    }

    #[test]
    fn table_cells_lay_out_side_by_side() {
        let (tree, root) = build(
            r#"<manual><chapterlist><chapter id="c"><section id="s">
                <table id="t">
                    <columns><coldef width="6" align="left"/><coldef width="6" align="right"/></columns>
                    <row><col width="6">a</col><col width="6">1</col></row>
                </table>
            </section></chapter></chapterlist></manual>"#,
        );
        let out_dir = tempfile::tempdir().unwrap();
        let options = DispatchOptions { output_root: out_dir.path().to_path_buf(), ..Default::default() };
        let mut sink = ConsoleSink::default();
        emit(&tree, root, &options, &StdFilenames, &mut sink).unwrap();
        let content = std::fs::read_to_string(out_dir.path().join("ReadMe.txt")).unwrap();
        let row = content.lines().find(|l| l.contains('a')).unwrap();
        assert!(row.starts_with("a"));
        assert!(row.trim_end().ends_with('1'));
    }
}
