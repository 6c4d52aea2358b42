//! The recursive-descent document builder: turns a tokenizer's tag
//! stream into a [`Tree`], resolving `file`-included chapters and
//! indexes as it goes and promoting bare inline content into an implied
//! paragraph wherever a block-collection parent requires it.

use std::path::{Path, PathBuf};

use crate::diagnostics::{Code, DiagnosticSink, Position};
use crate::xml::{Attribute, ElementKind, EntityKind, Token, Tokenizer};

use super::grammar::{self, ChildRule};
use super::node::{
    Alignment, ChapterPayload, ChapterSource, ChunkFlags, ColumnDef, NodeId, Payload, RefTarget,
    ReferencePayload, Tree,
};

pub const MAX_INCLUDE_DEPTH: u32 = 16;

struct Frame {
    node: NodeId,
    kind: ElementKind,
    /// The implied `<p>` currently collecting bare inline content under
    /// this frame, if one is open.
    implied: Option<NodeId>,
}

/// Parses `path` (and every file it includes) into a fresh [`Tree`],
/// returning the root node if the top-level file could be opened at all.
pub fn build_file(path: &Path, sink: &mut impl DiagnosticSink) -> (Tree, Option<NodeId>) {
    let mut tree = Tree::new();
    let root = build_into(&mut tree, path, 0, sink);
    tree.root = root;
    if let Some(root) = root {
        super::resources::populate(&tree, root);
        super::columns::populate(&mut tree, root);
    }
    (tree, root)
}

fn build_into(tree: &mut Tree, path: &Path, depth: u32, sink: &mut impl DiagnosticSink) -> Option<NodeId> {
    if depth > MAX_INCLUDE_DEPTH {
        sink.report(
            Position::start_of(path),
            Code::IncludeTooDeep { file: path.to_path_buf(), max: MAX_INCLUDE_DEPTH },
        );
        return None;
    }
    let mut tok = match Tokenizer::open(path) {
        Ok(t) => t,
        Err(_) => {
            sink.report(Position::start_of(path), Code::InputNotFound { file: path.to_path_buf() });
            return None;
        }
    };
    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    parse_stream(tree, &mut tok, &base_dir, depth, sink)
}

fn parse_stream(
    tree: &mut Tree,
    tok: &mut Tokenizer,
    base_dir: &Path,
    depth: u32,
    sink: &mut impl DiagnosticSink,
) -> Option<NodeId> {
    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<NodeId> = None;

    loop {
        let token = tok.read_next(sink);
        match token {
            Token::Eof | Token::Error { .. } => break,
            Token::Comment | Token::Other => {}
            Token::Whitespace { text } => {
                handle_text(tree, &mut stack, &mut root, sink, tok.position(), &text, false)
            }
            Token::Text { text } => {
                handle_text(tree, &mut stack, &mut root, sink, tok.position(), &text, true)
            }
            Token::Entity { name } => {
                let at = tok.position();
                match tok.entity() {
                    Some(kind) => handle_entity(tree, &mut stack, &mut root, sink, at, kind),
                    None => sink.report(at, Code::UnknownEntity { name }),
                }
            }
            Token::EmptyTag { name, attributes } => {
                open_element(
                    tree, tok, &mut stack, &mut root, base_dir, depth, sink, &name, &attributes, true,
                );
            }
            Token::StartTag { name, attributes } => {
                open_element(
                    tree, tok, &mut stack, &mut root, base_dir, depth, sink, &name, &attributes, false,
                );
            }
            Token::EndTag { name } => {
                handle_close(&mut stack, sink, tok.position(), &name);
            }
        }
    }
    root
}

fn ensure_implied_paragraph(tree: &mut Tree, frame: &mut Frame) -> NodeId {
    if let Some(p) = frame.implied {
        return p;
    }
    let at = tree.get(frame.node).at.clone();
    let p = tree.alloc(ElementKind::P, at);
    tree.append_child(frame.node, p);
    frame.implied = Some(p);
    p
}

/// Where a new child belongs, applying implied-paragraph promotion when
/// the current frame's kind wraps bare inline content. The bool says
/// whether the child is actually permitted there.
fn append_target(tree: &mut Tree, stack: &mut [Frame], child_kind: Option<ElementKind>) -> Option<(NodeId, bool)> {
    let is_block = child_kind.map(ElementKind::is_block).unwrap_or(false);
    let frame = stack.last_mut()?;
    Some(match grammar::child_rule(frame.kind) {
        ChildRule::ChunksOnly | ChildRule::TextOnly => (frame.node, true),
        ChildRule::BlocksWithImpliedParagraph => {
            if is_block {
                frame.implied = None;
                (frame.node, true)
            } else {
                (ensure_implied_paragraph(tree, frame), true)
            }
        }
        ChildRule::BlocksOnly => (frame.node, is_block),
        ChildRule::Only(allowed) => {
            (frame.node, child_kind.map(|k| allowed.contains(&k)).unwrap_or(false))
        }
        ChildRule::ResourceFields => (frame.node, true),
        ChildRule::Empty => (frame.node, false),
    })
}

/// Appends `node` under the top frame (or makes it the document root, if
/// the stack is empty), applying implied-paragraph promotion.
fn attach(
    tree: &mut Tree,
    stack: &mut [Frame],
    root: &mut Option<NodeId>,
    node: NodeId,
    kind: ElementKind,
    at: Position,
    sink: &mut impl DiagnosticSink,
) -> bool {
    if stack.is_empty() {
        *root = Some(node);
        return true;
    }
    match append_target(tree, stack, Some(kind)) {
        Some((target, true)) => {
            tree.append_child(target, node);
            true
        }
        Some((_, false)) => {
            let parent_tag = stack.last().map(|f| f.kind.tag()).unwrap_or("?");
            sink.report(at, Code::UnexpectedChild { child: kind.tag().to_string(), parent: parent_tag.to_string() });
            false
        }
        None => false,
    }
}

fn handle_text(
    tree: &mut Tree,
    stack: &mut [Frame],
    root: &mut Option<NodeId>,
    sink: &mut impl DiagnosticSink,
    at: Position,
    text: &str,
    significant: bool,
) {
    let _ = root;
    if text.is_empty() || stack.is_empty() {
        return;
    }
    let parent_kind = stack.last().unwrap().kind;
    if !significant
        && matches!(
            grammar::child_rule(parent_kind),
            ChildRule::BlocksOnly | ChildRule::Only(_) | ChildRule::Empty | ChildRule::ResourceFields
        )
    {
        return; // whitespace between blocks, not content
    }
    let Some((target, ok)) = append_target(tree, stack, None) else { return };
    if !ok {
        if significant {
            sink.report(at.clone(), Code::UnexpectedText { parent: parent_kind.tag().to_string() });
        }
        return;
    }
    let node = tree.alloc(ElementKind::P, at);
    tree.get_mut(node).payload = Payload::Text(text.to_string());
    tree.append_child(target, node);
}

fn handle_entity(
    tree: &mut Tree,
    stack: &mut [Frame],
    root: &mut Option<NodeId>,
    sink: &mut impl DiagnosticSink,
    at: Position,
    kind: EntityKind,
) {
    let _ = root;
    if stack.is_empty() {
        return;
    }
    let parent_kind = stack.last().unwrap().kind;
    let Some((target, ok)) = append_target(tree, stack, None) else { return };
    if !ok {
        sink.report(at.clone(), Code::UnexpectedEntity { name: kind.name().to_string(), parent: parent_kind.tag().to_string() });
        return;
    }
    let node = tree.alloc(ElementKind::P, at);
    tree.get_mut(node).payload = Payload::Entity(kind);
    tree.append_child(target, node);
}

fn validate_attributes(kind: ElementKind, attributes: &[Attribute], sink: &mut impl DiagnosticSink, at: &Position) {
    let known = grammar::known_attributes(kind);
    for attr in attributes {
        if !known.contains(&attr.name.as_str()) {
            sink.report(at.clone(), Code::UnknownAttribute { attr: attr.name.clone(), element: kind.tag().to_string() });
        }
    }
    for required in grammar::required_attributes(kind) {
        if !attributes.iter().any(|a| a.name == *required) {
            sink.report(at.clone(), Code::MissingRequiredAttribute { element: kind.tag().to_string(), attr: required.to_string() });
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn open_element(
    tree: &mut Tree,
    tok: &Tokenizer,
    stack: &mut Vec<Frame>,
    root: &mut Option<NodeId>,
    base_dir: &Path,
    depth: u32,
    sink: &mut impl DiagnosticSink,
    name: &str,
    attributes: &[Attribute],
    self_closing: bool,
) {
    let Some(kind) = tok.element() else {
        let _ = name; // unrecognised element: the tokenizer already reported it
        return;
    };
    let at = tok.position();
    validate_attributes(kind, attributes, sink, &at);

    // An empty `<chapter file="..."/>` or `<index file="..."/>` is a
    // placeholder for another file's content, spliced in once parsed.
    if self_closing && matches!(kind, ElementKind::Chapter | ElementKind::Index) {
        if let Some(file) = tok.get_text("file") {
            let file = file.to_string();
            let placeholder = tree.alloc(kind, at.clone());
            tree.get_mut(placeholder).payload = Payload::Chapter(ChapterPayload {
                id: tok.get_text("id").map(str::to_string),
                processed: false,
                source: Some(ChapterSource::File(PathBuf::from(&file))),
            });
            if !attach(tree, stack, root, placeholder, kind, at, sink) {
                return;
            }
            let included = base_dir.join(&file);
            if let Some(replacement) = build_into(tree, &included, depth + 1, sink) {
                tree.splice_include(placeholder, replacement);
            }
            return;
        }
    }

    let node = tree.alloc(kind, at.clone());

    // A title binds to its parent's `title` field rather than joining
    // the ordinary child chain.
    if kind == ElementKind::Title {
        match stack.last() {
            Some(frame) if grammar::allows_title(frame.kind) => {
                let owner = frame.node;
                tree.get_mut(owner).title = Some(node);
            }
            Some(frame) => {
                sink.report(
                    at,
                    Code::UnexpectedChild { child: kind.tag().to_string(), parent: frame.kind.tag().to_string() },
                );
                return;
            }
            None => *root = Some(node),
        }
        if !self_closing {
            stack.push(Frame { node, kind, implied: None });
        }
        return;
    }

    match kind {
        ElementKind::Mode => {
            if let Some(name) = tok.get_text("name") {
                tree.get_mut(node).payload = Payload::ModeName(name.to_string());
            }
        }
        ElementKind::Chapter | ElementKind::Index => {
            tree.get_mut(node).payload = Payload::Chapter(ChapterPayload {
                id: tok.get_text("id").map(str::to_string),
                processed: true,
                source: Some(ChapterSource::Inline),
            });
        }
        ElementKind::Ref | ElementKind::Link => {
            let flags = ChunkFlags {
                external: tok.test_boolean("external", "true", "false").unwrap_or(false),
                flatten: tok.test_boolean("flatten", "true", "false").unwrap_or(false),
            };
            let target = tok.get_text("id").map(|id| RefTarget::Unresolved(id.to_string()));
            tree.get_mut(node).payload = Payload::Reference(ReferencePayload { flags, target });
        }
        ElementKind::Section | ElementKind::Table | ElementKind::Code | ElementKind::Footnote => {
            if let Some(id) = tok.get_text("id") {
                tree.get_mut(node).payload = Payload::Identified(id.to_string());
            }
        }
        ElementKind::Col | ElementKind::Coldef => {
            tree.get_mut(node).payload = Payload::Column(read_column_def(tok, sink));
        }
        _ => {}
    }

    if !attach(tree, stack, root, node, kind, at, sink) {
        return;
    }
    if !self_closing {
        stack.push(Frame { node, kind, implied: None });
    }
}

/// Reads a `col`/`coldef`'s own `width`/`align` attributes. `width` is
/// left unset when absent (the formatter then auto-sizes the column);
/// `align` defaults to left.
fn read_column_def(tok: &Tokenizer, sink: &mut impl DiagnosticSink) -> ColumnDef {
    let width = tok.get_text("width").map(|_| tok.read_integer("width", 1, 1, 999, sink) as u32);
    let align = match tok.read_option("align", &["left", "right", "centre", "preformatted"]) {
        Some("right") => Alignment::Right,
        Some("centre") => Alignment::Centre,
        Some("preformatted") => Alignment::Preformatted,
        _ => Alignment::Left,
    };
    ColumnDef { width, align }
}

fn handle_close(stack: &mut Vec<Frame>, sink: &mut impl DiagnosticSink, at: Position, name: &str) {
    match stack.last() {
        Some(frame) if frame.kind.tag() == name => {
            stack.pop();
        }
        Some(frame) => {
            sink.report(at, Code::MismatchedEndTag { name: name.to_string(), expected: frame.kind.tag().to_string() });
        }
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ConsoleSink;
    use std::io::Write;

    fn build_str(text: &str) -> (Tree, Option<NodeId>, Vec<crate::diagnostics::Diagnostic>) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.xml");
        std::fs::File::create(&path).unwrap().write_all(text.as_bytes()).unwrap();
        let mut sink = ConsoleSink::default();
        let (tree, root) = build_file(&path, &mut sink);
        (tree, root, sink.diagnostics)
    }

    #[test]
    fn empty_manual_parses_with_no_diagnostics() {
        let (tree, root, diags) = build_str("<manual><chapterlist/></manual>");
        assert!(diags.is_empty());
        let root = root.unwrap();
        assert_eq!(tree.get(root).kind, ElementKind::Manual);
    }

    #[test]
    fn section_with_bare_text_gets_an_implied_p() {
        let (tree, root, _diags) = build_str(
            r#"<manual><chapterlist><chapter id="c"><section id="s">hello</section></chapter></chapterlist></manual>"#,
        );
        let manual = root.unwrap();
        let chapter = tree.children(manual).next().unwrap();
        let section = tree.children(chapter).next().unwrap();
        let implied_p = tree.children(section).next().unwrap();
        assert_eq!(tree.get(implied_p).kind, ElementKind::P);
        let text_node = tree.children(implied_p).next().unwrap();
        assert_eq!(tree.get(text_node).payload, Payload::Text("hello".to_string()));
    }

    #[test]
    fn unknown_attribute_is_reported() {
        let (_tree, _root, diags) = build_str(r#"<manual><chapterlist><chapter id="c" bogus="1"/></chapterlist></manual>"#);
        assert!(diags.iter().any(|d| matches!(d.code, Code::UnknownAttribute { .. })));
    }

    #[test]
    fn ref_without_id_is_missing_required_attribute() {
        let (_tree, _root, diags) = build_str(
            r#"<manual><chapterlist><chapter id="c"><section id="s"><p><ref>text</ref></p></section></chapter></chapterlist></manual>"#,
        );
        assert!(diags.iter().any(|d| matches!(d.code, Code::MissingRequiredAttribute { .. })));
    }
}
