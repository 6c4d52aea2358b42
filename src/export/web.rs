//! The web-hypertext writer: one real HTML file per file-owning node,
//! laid out under the output root with genuine relative links between
//! them, each page's body assembled with [`maud`] and dropped into a
//! [`minijinja`] page template.
//!
//! Two passes, mirroring the other writers' two-phase shape: a
//! discovery pass walks the tree once to find every file-owning node
//! and assign it an output path (so a reference can link forward to a
//! page that hasn't been rendered yet), then a render pass builds and
//! writes each page in turn.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use maud::{html, Markup, PreEscaped};
use minijinja::Environment;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::Serialize;

use crate::ast::{Alignment, NodeId, Payload, Tree};
use crate::diagnostics::DiagnosticSink;
use crate::filename::Filenames;
use crate::xml::ElementKind;

use super::entities_render;
use super::inline::{self, InlineContext, Style};
use super::ownership::{file_stem, mode_resource, owns_file, DispatchOptions, OutputMode};
use super::queue::ManualQueue;
use super::refnum::{self, RefNumbers};

const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'%');

fn percent_encode_path(stem: &str) -> String {
    stem.split('/').map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string()).collect::<Vec<_>>().join("/")
}

const BASE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{{ title }}</title>
{% if stylesheet %}<link rel="stylesheet" href="{{ stylesheet }}">{% endif %}
</head>
<body>
<article>
{{ content | safe }}
</article>
</body>
</html>
"#;

#[derive(Serialize)]
struct PageContext {
    title: String,
    content: String,
    stylesheet: Option<String>,
}

fn render_page(context: &PageContext) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("page.html", BASE_TEMPLATE)?;
    env.get_template("page.html")?.render(context)
}

pub fn emit<S: DiagnosticSink>(
    tree: &Tree,
    root: NodeId,
    options: &DispatchOptions,
    filenames: &dyn Filenames,
    sink: &mut S,
) -> std::io::Result<()> {
    filenames.create_dir_all(&options.output_root)?;
    let numbers = refnum::compute(tree, root);
    let file_roots = discover_file_roots(tree, root);
    let paths = build_paths(tree, root, &file_roots, options);

    let mut queue = ManualQueue::seed(root);
    while let Some(file_root) = queue.pop() {
        render_file(tree, file_root, root, &numbers, &paths, options, filenames, sink, &mut queue)?;
    }
    Ok(())
}

fn discover_file_roots(tree: &Tree, root: NodeId) -> Vec<NodeId> {
    let mut roots = vec![root];
    let mut queue = ManualQueue::seed(root);
    while let Some(file_root) = queue.pop() {
        collect_owned(tree, file_root, file_root, &mut queue, &mut roots);
    }
    roots
}

fn collect_owned(tree: &Tree, node: NodeId, file_root: NodeId, queue: &mut ManualQueue, roots: &mut Vec<NodeId>) {
    if node != file_root && owns_file(tree, node, OutputMode::WebHypertext) {
        queue.push(node);
        roots.push(node);
        return;
    }
    for child in tree.children(node) {
        collect_owned(tree, child, file_root, queue, roots);
    }
}

fn build_paths(tree: &Tree, doc_root: NodeId, file_roots: &[NodeId], options: &DispatchOptions) -> HashMap<NodeId, PathBuf> {
    let mut map = HashMap::new();
    for &node in file_roots {
        let stem = if node == doc_root && !owns_file(tree, doc_root, OutputMode::WebHypertext) {
            options.single_file_name.clone()
        } else {
            file_stem(tree, node, OutputMode::WebHypertext)
        };
        map.insert(node, PathBuf::from(format!("{}.html", percent_encode_path(&stem))));
    }
    map
}

fn href_to(paths: &HashMap<NodeId, PathBuf>, from_file: NodeId, to_file: NodeId) -> String {
    let fallback = PathBuf::from(format!("page{}.html", to_file.0));
    let to_path = paths.get(&to_file).cloned().unwrap_or(fallback);
    let from_dir = paths.get(&from_file).and_then(|p| p.parent()).unwrap_or_else(|| Path::new(""));
    pathdiff::diff_paths(&to_path, from_dir).unwrap_or(to_path).to_string_lossy().replace('\\', "/")
}

fn heading_label(tree: &Tree, node: NodeId) -> String {
    let title = tree.get(node).title.map(|t| inline::title_text(tree, Style::Web, t)).unwrap_or_default();
    if tree.get(node).kind.is_numbered() && tree.get(node).index > 0 {
        format!("{}. {}", tree.get(node).index, title)
    } else {
        title
    }
}

fn heading_markup(level: u32, id: Option<&str>, text: &str) -> Markup {
    let tag = format!("h{}", level.min(6));
    let id_attr = id.map(|id| format!(" id=\"{id}\"")).unwrap_or_default();
    html! { (PreEscaped(format!("<{tag}{id_attr}>{text}</{tag}>\n"))) }
}

fn inline_ctx<'a>(tree: &'a Tree, doc_root: NodeId, numbers: &'a RefNumbers, current_file: NodeId, paths: &'a HashMap<NodeId, PathBuf>) -> InlineContext<'a> {
    InlineContext { tree, root: doc_root, numbers, mode: OutputMode::WebHypertext, style: Style::Web, current_file, paths: Some(paths) }
}

#[allow(clippy::too_many_arguments)]
fn render_file<S: DiagnosticSink>(
    tree: &Tree,
    file_root: NodeId,
    doc_root: NodeId,
    numbers: &RefNumbers,
    paths: &HashMap<NodeId, PathBuf>,
    options: &DispatchOptions,
    filenames: &dyn Filenames,
    sink: &mut S,
    queue: &mut ManualQueue,
) -> std::io::Result<()> {
    let mut body = String::new();
    let title = if tree.get(file_root).title.is_some() {
        let text = heading_label(tree, file_root);
        body.push_str(&heading_markup(1, tree.get(file_root).id(), &text).into_string());
        text
    } else {
        String::new()
    };

    for child in tree.children(file_root) {
        body.push_str(&render_block_inner(tree, child, file_root, doc_root, numbers, paths, 2, queue).into_string());
    }

    let stylesheet = mode_resource(tree.get(file_root), OutputMode::WebHypertext).and_then(|m| m.stylesheet.clone());
    let context = PageContext { title, content: body, stylesheet };
    let at = tree.get(file_root).at.clone();
    let rel = paths.get(&file_root).cloned().unwrap_or_else(|| PathBuf::from(format!("page{}.html", file_root.0)));
    let path = filenames.join(&options.output_root, &rel.to_string_lossy());
    let html = render_page(&context).unwrap_or_else(|_| {
        sink.report(at, crate::diagnostics::Code::OutputCreateFailed { file: path.clone() });
        context.content.clone()
    });

    if let Some(parent) = path.parent() {
        filenames.create_dir_all(parent)?;
    }
    std::fs::write(path, html)
}

#[allow(clippy::too_many_arguments)]
fn render_block_inner(
    tree: &Tree,
    node: NodeId,
    file_root: NodeId,
    doc_root: NodeId,
    numbers: &RefNumbers,
    paths: &HashMap<NodeId, PathBuf>,
    level: u32,
    queue: &mut ManualQueue,
) -> Markup {
    let kind = tree.get(node).kind;

    if node != file_root && owns_file(tree, node, OutputMode::WebHypertext) {
        queue.push(node);
        return render_stub(tree, node, file_root, paths, level);
    }

    match kind {
        ElementKind::Manual | ElementKind::Chapter | ElementKind::Index | ElementKind::Section => {
            let heading = if tree.get(node).title.is_some() {
                let text = heading_label(tree, node);
                heading_markup(level, tree.get(node).id(), &text)
            } else {
                html! {}
            };
            html! {
                (heading)
                @for child in tree.children(node) {
                    (render_block_inner(tree, child, file_root, doc_root, numbers, paths, level + 1, queue))
                }
            }
        }
        ElementKind::Chapterlist => html! {
            @for child in tree.children(node) {
                (render_block_inner(tree, child, file_root, doc_root, numbers, paths, level, queue))
            }
        },
        ElementKind::P => {
            let ctx = inline_ctx(tree, doc_root, numbers, file_root, paths);
            let text = inline::render(&ctx, node);
            html! { p { (PreEscaped(text)) } }
        }
        ElementKind::Ol => render_list(tree, node, true, file_root, doc_root, numbers, paths, level, queue),
        ElementKind::Ul => render_list(tree, node, false, file_root, doc_root, numbers, paths, level, queue),
        ElementKind::Table => render_table(tree, node, file_root, doc_root, numbers, paths),
        ElementKind::Code => render_code(tree, node),
        ElementKind::Footnote | ElementKind::Callout => render_inset(tree, node, kind, file_root, doc_root, numbers, paths, level, queue),
        _ => html! {},
    }
}

#[allow(clippy::too_many_arguments)]
fn render_list(tree: &Tree, node: NodeId, ordered: bool, file_root: NodeId, doc_root: NodeId, numbers: &RefNumbers, paths: &HashMap<NodeId, PathBuf>, level: u32, queue: &mut ManualQueue) -> Markup {
    let items: Vec<Markup> = tree
        .children(node)
        .map(|item| {
            let children: Vec<NodeId> = tree.children(item).collect();
            let first_is_paragraph = children.first().is_some_and(|c| tree.get(*c).kind == ElementKind::P);
            if first_is_paragraph {
                let ctx = inline_ctx(tree, doc_root, numbers, file_root, paths);
                let text = inline::render(&ctx, children[0]);
                html! {
                    li {
                        (PreEscaped(text))
                        @for child in &children[1..] {
                            (render_block_inner(tree, *child, file_root, doc_root, numbers, paths, level, queue))
                        }
                    }
                }
            } else {
                html! {
                    li {
                        @for child in &children {
                            (render_block_inner(tree, *child, file_root, doc_root, numbers, paths, level, queue))
                        }
                    }
                }
            }
        })
        .collect();

    if ordered {
        html! { ol { @for item in items { (item) } } }
    } else {
        html! { ul { @for item in items { (item) } } }
    }
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

fn align_style(align: Alignment) -> Option<&'static str> {
    match align {
        Alignment::Left | Alignment::Preformatted => None,
        Alignment::Right => Some("text-align: right"),
        Alignment::Centre => Some("text-align: center"),
    }
}

fn render_table(tree: &Tree, node: NodeId, file_root: NodeId, doc_root: NodeId, numbers: &RefNumbers, paths: &HashMap<NodeId, PathBuf>) -> Markup {
    let ctx = inline_ctx(tree, doc_root, numbers, file_root, paths);
    let column_defs = match &tree.get(node).payload {
        Payload::TableColumns(defs) => Some(defs.clone()),
        _ => None,
    };

    let rows: Vec<Markup> = tree
        .children(node)
        .filter(|n| tree.get(*n).kind == ElementKind::Row)
        .map(|row| {
            let cells: Vec<NodeId> = tree.children(row).collect();
            let cell_markup: Vec<Markup> = cells
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    let align = column_defs
                        .as_ref()
                        .filter(|d| d.len() == cells.len())
                        .map(|d| d[i].align)
                        .or_else(|| match &tree.get(*cell).payload {
                            Payload::Column(def) => Some(def.align),
                            _ => None,
                        })
                        .unwrap_or(Alignment::Left);
                    let text = cell_text(tree, *cell, &ctx);
                    match align_style(align) {
                        Some(style) => html! { td style=(style) { (PreEscaped(text)) } },
                        None => html! { td { (PreEscaped(text)) } },
                    }
                })
                .collect();
            html! { tr { @for cell in cell_markup { (cell) } } }
        })
        .collect();

    html! { table { @for row in rows { (row) } } }
}

fn render_code(tree: &Tree, node: NodeId) -> Markup {
    let mut raw = String::new();
    for child in tree.children(node) {
        match &tree.get(child).payload {
            Payload::Text(text) => raw.push_str(&html_escape(text)),
            Payload::Entity(kind) => raw.push_str(&entities_render::render_web(*kind)),
            _ => {}
        }
    }
    let id_attr = tree.get(node).id().map(|id| format!(" id=\"{id}\"")).unwrap_or_default();
    html! { (PreEscaped(format!("<pre{id_attr}><code>{raw}</code></pre>\n"))) }
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[allow(clippy::too_many_arguments)]
fn render_inset(tree: &Tree, node: NodeId, kind: ElementKind, file_root: NodeId, doc_root: NodeId, numbers: &RefNumbers, paths: &HashMap<NodeId, PathBuf>, level: u32, queue: &mut ManualQueue) -> Markup {
    let class = if kind == ElementKind::Footnote { "footnote" } else { "callout" };
    let word = if kind == ElementKind::Footnote { "Footnote" } else { "See also" };
    let label = match (tree.get(node).id(), refnum::anchor_for(tree, numbers, node)) {
        (Some(id), _) => format!("{word}: {id}"),
        (None, Some(anchor)) => anchor,
        (None, None) => word.to_string(),
    };
    let id_attr = refnum::anchor_for(tree, numbers, node);
    html! {
        div class=(class) id=[id_attr] {
            p { strong { (label) } }
            @for child in tree.children(node) {
                (render_block_inner(tree, child, file_root, doc_root, numbers, paths, level, queue))
            }
        }
    }
}

fn render_stub(tree: &Tree, node: NodeId, file_root: NodeId, paths: &HashMap<NodeId, PathBuf>, level: u32) -> Markup {
    let text = heading_label(tree, node);
    let heading = heading_markup(level, tree.get(node).id(), &text);
    let summary = tree.get(node).resources().and_then(|r| r.summary.clone()).unwrap_or_else(|| "See the linked page for details.".to_string());
    let href = href_to(paths, file_root, node);
    html! {
        (heading)
        p { (summary) " " a href=(href) { "Read more" } }
    }
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
    fn single_file_document_renders_to_the_caller_named_page() {
        let (tree, root) = build(
            r#"<manual><chapterlist><chapter id="c"><title>Intro</title><section id="s">
                <p>Hello there.</p>
            </section></chapter></chapterlist></manual>"#,
        );
        let out_dir = tempfile::tempdir().unwrap();
        let options = DispatchOptions { output_root: out_dir.path().to_path_buf(), single_file_name: "index".to_string(), ..Default::default() };
        let mut sink = ConsoleSink::default();
        emit(&tree, root, &options, &StdFilenames, &mut sink).unwrap();
        let content = std::fs::read_to_string(out_dir.path().join("index.html")).unwrap();
        assert!(content.contains("<h1"));
        assert!(content.contains("Hello there."));
    }

    #[test]
    fn a_chapter_with_a_declared_folder_becomes_a_nested_index_page() {
        let (tree, root) = build(
            r#"<manual><chapterlist><chapter id="c"><title>Setup</title>
                <resources><mode name="web"><folder>setup</folder></mode><summary>How to set up.</summary></resources>
                <section id="s"><p>Step one.</p></section>
            </chapter></chapterlist></manual>"#,
        );
        let out_dir = tempfile::tempdir().unwrap();
        let options = DispatchOptions { output_root: out_dir.path().to_path_buf(), single_file_name: "index".to_string(), ..Default::default() };
        let mut sink = ConsoleSink::default();
        emit(&tree, root, &options, &StdFilenames, &mut sink).unwrap();
        let root_page = std::fs::read_to_string(out_dir.path().join("index.html")).unwrap();
        assert!(root_page.contains("How to set up."));
        assert!(root_page.contains("setup/index.html"));
        let chapter_page = std::fs::read_to_string(out_dir.path().join("setup/index.html")).unwrap();
        assert!(chapter_page.contains("Step one."));
    }

    #[test]
    fn same_file_references_link_to_a_bare_anchor() {
        let (tree, root) = build(
            r#"<manual><chapterlist><chapter id="c"><section id="s">
                <p>intro <ref id="s">here</ref></p>
            </section></chapter></chapterlist></manual>"#,
        );
        let out_dir = tempfile::tempdir().unwrap();
        let options = DispatchOptions { output_root: out_dir.path().to_path_buf(), single_file_name: "index".to_string(), ..Default::default() };
        let mut sink = ConsoleSink::default();
        emit(&tree, root, &options, &StdFilenames, &mut sink).unwrap();
        let content = std::fs::read_to_string(out_dir.path().join("index.html")).unwrap();
        assert!(content.contains("href=\"#s\""));
    }
}
