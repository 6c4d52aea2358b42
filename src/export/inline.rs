//! Flattens a chunk-bearing node's inline content (text, entities,
//! decorated spans, forced breaks, and references) into one string for
//! a specific output mode, sharing reference-destination resolution
//! between the text, legacy-hypertext and web writers — only the final
//! escape/markup syntax differs between them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::ast::{NodeId, Payload, ReferencePayload, RefTarget, Tree};
use crate::format::FORCED_BREAK;
use crate::xml::ElementKind;

use super::entities_render;
use super::ownership::{file_of, file_stem, OutputMode};
use super::refnum::{anchor_for, RefNumbers};

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Text,
    Hypertext,
    Web,
}

pub struct InlineContext<'a> {
    pub tree: &'a Tree,
    pub root: NodeId,
    pub numbers: &'a RefNumbers,
    pub mode: OutputMode,
    pub style: Style,
    /// The file (or container sub-file) the node being rendered lives
    /// in — same-file references render as a bare anchor, others carry
    /// the other unit's name too.
    pub current_file: NodeId,
    /// Every file-owning node's output path, relative to the output
    /// root. Only the web writer populates this — it needs a real
    /// relative href between two emitted pages, not just a bare stem.
    pub paths: Option<&'a HashMap<NodeId, PathBuf>>,
}

/// Renders every chunk child of `node` (a paragraph, a list item's
/// implied paragraph, a table cell, ...).
pub fn render(ctx: &InlineContext, node: NodeId) -> String {
    let mut out = String::new();
    for child in ctx.tree.children(node) {
        render_chunk(ctx, child, &mut out);
    }
    out
}

fn render_chunk(ctx: &InlineContext, node: NodeId, out: &mut String) {
    let kind = ctx.tree.get(node).kind;
    match &ctx.tree.get(node).payload {
        Payload::Text(text) => out.push_str(text),
        Payload::Entity(entity) => out.push_str(&render_entity(ctx.style, *entity)),
        Payload::Reference(reference) => render_reference(ctx, node, reference, out),
        _ if kind == ElementKind::Br => out.push(FORCED_BREAK),
        _ => {
            let (before, after) = decoration(ctx.style, kind);
            out.push_str(before);
            for child in ctx.tree.children(node) {
                render_chunk(ctx, child, out);
            }
            out.push_str(after);
        }
    }
}

/// Flattens a `title`/`summary`/similar text-only field's leaves,
/// applying the mode's entity idiom rather than the raw code point —
/// used for headings, since [`crate::ast::plain_text`] is idiom-blind.
pub fn title_text(tree: &Tree, style: Style, node: NodeId) -> String {
    let mut out = String::new();
    for child in tree.children(node) {
        match &tree.get(child).payload {
            Payload::Text(text) => out.push_str(text),
            Payload::Entity(kind) => out.push_str(&render_entity(style, *kind)),
            _ => {}
        }
    }
    out
}

fn render_entity(style: Style, kind: crate::xml::EntityKind) -> String {
    match style {
        Style::Text => entities_render::render_text(kind),
        Style::Hypertext => entities_render::render_hypertext(kind),
        Style::Web => entities_render::render_web(kind),
    }
}

/// Plain-text decoration for a handful of the inline-span kinds whose
/// meaning clearly survives in ASCII (keys, menu paths, emphasis); every
/// other span kind is passed through as flattened text with nothing
/// wrapped around it.
fn decoration(style: Style, kind: ElementKind) -> (&'static str, &'static str) {
    use ElementKind::*;
    match (style, kind) {
        (Style::Text, Strong) => ("*", "*"),
        (Style::Text, Em) => ("/", "/"),
        (Style::Text, Key) => ("[", "]"),
        (Style::Text, Command | Swi | Function) => ("`", "`"),
        (Style::Hypertext, Strong) => ("\\b", "\\b"),
        (Style::Hypertext, Em) => ("\\i", "\\i"),
        (Style::Hypertext, Key) => ("\\k", "\\k"),
        (Style::Hypertext, Command | Swi | Function) => ("\\c", "\\c"),
        (Style::Web, Strong) => ("<strong>", "</strong>"),
        (Style::Web, Em) => ("<em>", "</em>"),
        (Style::Web, Key) => ("<kbd>", "</kbd>"),
        (Style::Web, Command | Swi | Function) => ("<code>", "</code>"),
        _ => ("", ""),
    }
}

fn render_reference(ctx: &InlineContext, node: NodeId, reference: &ReferencePayload, out: &mut String) {
    let mut body = String::new();
    for child in ctx.tree.children(node) {
        render_chunk(ctx, child, &mut body);
    }
    let destination = if reference.flags.external {
        match &reference.target {
            Some(RefTarget::Unresolved(uri)) => Destination::External(uri.clone()),
            _ => Destination::External(String::new()),
        }
    } else {
        match &reference.target {
            Some(RefTarget::Resolved(target)) => destination_for(ctx, *target),
            // Left unresolved by the linker (already reported there): fall
            // back to the bare body text.
            _ => {
                out.push_str(&body);
                return;
            }
        }
    };
    render_destination(ctx.style, &body, destination, reference.flags.flatten, out);
}

enum Destination {
    External(String),
    SameFile(String),
    CrossFile(String, Option<String>),
}

fn destination_for(ctx: &InlineContext, target: NodeId) -> Destination {
    let target_file = file_of(ctx.tree, target, ctx.root, ctx.mode);
    let anchor = anchor_for(ctx.tree, ctx.numbers, target);
    if target_file == ctx.current_file {
        Destination::SameFile(anchor.unwrap_or_default())
    } else {
        let stem = match ctx.paths {
            Some(paths) => relative_href(paths, ctx.current_file, target_file),
            None => file_stem(ctx.tree, target_file, ctx.mode),
        };
        Destination::CrossFile(stem, anchor)
    }
}

/// The path one emitted web page writes in an `href` to reach another,
/// computed from each file's path relative to the output root.
fn relative_href(paths: &HashMap<NodeId, PathBuf>, from_file: NodeId, to_file: NodeId) -> String {
    let fallback = PathBuf::from(format!("page{}.html", to_file.0));
    let to_path = paths.get(&to_file).cloned().unwrap_or(fallback);
    let from_dir = paths.get(&from_file).and_then(|p| p.parent()).unwrap_or_else(|| Path::new(""));
    let rel = pathdiff::diff_paths(&to_path, from_dir).unwrap_or(to_path);
    rel.to_string_lossy().replace('\\', "/")
}

/// Escapes the handful of characters that would break a double-quoted
/// HTML attribute if an author-supplied URI happened to contain them.
fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

fn render_destination(style: Style, body: &str, destination: Destination, flatten: bool, out: &mut String) {
    if flatten {
        out.push_str(body);
        return;
    }
    match style {
        Style::Text => match destination {
            Destination::External(uri) => out.push_str(&format!("{body} <{uri}>")),
            Destination::SameFile(anchor) => out.push_str(&format!("{body} (see \"{anchor}\")")),
            Destination::CrossFile(stem, Some(anchor)) => out.push_str(&format!("{body} (see {stem}, \"{anchor}\")")),
            Destination::CrossFile(stem, None) => out.push_str(&format!("{body} (see {stem})")),
        },
        Style::Hypertext => {
            let target = match destination {
                Destination::External(uri) => uri,
                Destination::SameFile(anchor) => anchor,
                Destination::CrossFile(stem, Some(anchor)) => format!("{stem}#{anchor}"),
                Destination::CrossFile(stem, None) => stem,
            };
            out.push_str(&format!("\\@{target}@{body}\\@"));
        }
        Style::Web => {
            let href = match destination {
                Destination::External(uri) => uri,
                Destination::SameFile(anchor) => format!("#{anchor}"),
                Destination::CrossFile(stem, Some(anchor)) => format!("{stem}#{anchor}"),
                Destination::CrossFile(stem, None) => stem,
            };
            out.push_str(&format!("<a href=\"{}\">{body}</a>", escape_attr(&href)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build_file;
    use crate::diagnostics::ConsoleSink;
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
    fn same_file_reference_renders_a_see_anchor_suffix_in_text_mode() {
        let (tree, root) = build(
            r#"<manual><chapterlist><chapter id="c"><section id="s">
                <p>intro <ref id="s">here</ref></p>
            </section></chapter></chapterlist></manual>"#,
        );
        let numbers = super::super::refnum::compute(&tree, root);
        let chapter = tree.children(tree.children(root).next().unwrap()).next().unwrap();
        let section = tree.children(chapter).next().unwrap();
        let p = tree.children(section).next().unwrap();
        let ctx = InlineContext { tree: &tree, root, numbers: &numbers, mode: OutputMode::Text, style: Style::Text, current_file: root, paths: None };
        assert_eq!(render(&ctx, p), "intro here (see \"s\")");
    }

    #[test]
    fn external_reference_always_keeps_its_raw_uri() {
        let (tree, root) = build(
            r#"<manual><chapterlist><chapter id="c"><section id="s">
                <p><link id="https://example.com/" external="true">example</link></p>
            </section></chapter></chapterlist></manual>"#,
        );
        let numbers = super::super::refnum::compute(&tree, root);
        let chapter = tree.children(tree.children(root).next().unwrap()).next().unwrap();
        let section = tree.children(chapter).next().unwrap();
        let p = tree.children(section).next().unwrap();
        let ctx = InlineContext { tree: &tree, root, numbers: &numbers, mode: OutputMode::Text, style: Style::Text, current_file: root, paths: None };
        assert_eq!(render(&ctx, p), "example <https://example.com/>");
    }

    #[test]
    fn flatten_drops_the_destination_suffix() {
        let (tree, root) = build(
            r#"<manual><chapterlist><chapter id="c"><section id="s">
                <p><ref id="s" flatten="true">here</ref></p>
            </section></chapter></chapterlist></manual>"#,
        );
        let numbers = super::super::refnum::compute(&tree, root);
        let chapter = tree.children(tree.children(root).next().unwrap()).next().unwrap();
        let section = tree.children(chapter).next().unwrap();
        let p = tree.children(section).next().unwrap();
        let ctx = InlineContext { tree: &tree, root, numbers: &numbers, mode: OutputMode::Text, style: Style::Text, current_file: root, paths: None };
        assert_eq!(render(&ctx, p), "here");
    }
}
