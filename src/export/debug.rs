//! The debug writer: serializes the whole resolved tree to one JSON
//! file, independent of any output mode's page splitting.
//!
//! Kept as its own projection (`DebugNode`) rather than deriving
//! `Serialize` on [`crate::ast::Node`]/[`crate::ast::Payload`] directly,
//! so the core document model stays free of a serialization dependency.

use std::path::PathBuf;

use serde::Serialize;

use crate::ast::{Alignment, ChapterSource, NodeId, Payload, RefTarget, Tree};
use crate::diagnostics::DiagnosticSink;
use crate::filename::Filenames;

#[derive(Serialize)]
pub struct DebugNode {
    kind: &'static str,
    index: u32,
    id: Option<String>,
    title: Option<String>,
    payload: DebugPayload,
    children: Vec<DebugNode>,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum DebugPayload {
    None,
    Chapter { id: Option<String>, processed: bool, source: Option<String> },
    Identified { id: String },
    ModeName { name: String },
    Text { text: String },
    Entity { name: String },
    Reference { external: bool, flatten: bool, target: Option<String> },
    Column { width: Option<u32>, align: &'static str },
    TableColumns { columns: Vec<(Option<u32>, &'static str)> },
}

fn align_name(align: Alignment) -> &'static str {
    match align {
        Alignment::Left => "left",
        Alignment::Right => "right",
        Alignment::Centre => "centre",
        Alignment::Preformatted => "preformatted",
    }
}

fn debug_payload(payload: &Payload) -> DebugPayload {
    match payload {
        Payload::None => DebugPayload::None,
        Payload::Chapter(chapter) => DebugPayload::Chapter {
            id: chapter.id.clone(),
            processed: chapter.processed,
            source: chapter.source.as_ref().map(|s| match s {
                ChapterSource::Inline => "inline".to_string(),
                ChapterSource::File(path) => path.display().to_string(),
            }),
        },
        Payload::Identified(id) => DebugPayload::Identified { id: id.clone() },
        Payload::ModeName(name) => DebugPayload::ModeName { name: name.clone() },
        Payload::Text(text) => DebugPayload::Text { text: text.clone() },
        Payload::Entity(kind) => DebugPayload::Entity { name: kind.name().to_string() },
        Payload::Reference(reference) => DebugPayload::Reference {
            external: reference.flags.external,
            flatten: reference.flags.flatten,
            target: reference.target.as_ref().map(|t| match t {
                RefTarget::Unresolved(uri) => uri.clone(),
                RefTarget::Resolved(id) => format!("#{}", id.0),
            }),
        },
        Payload::Column(def) => DebugPayload::Column { width: def.width, align: align_name(def.align) },
        Payload::TableColumns(defs) => DebugPayload::TableColumns { columns: defs.iter().map(|d| (d.width, align_name(d.align))).collect() },
    }
}

fn build(tree: &Tree, node: NodeId) -> DebugNode {
    let n = tree.get(node);
    DebugNode {
        kind: n.kind.tag(),
        index: n.index,
        id: n.id().map(str::to_string),
        title: n.title.map(|t| crate::ast::plain_text(tree, t)),
        payload: debug_payload(&n.payload),
        children: tree.children(node).map(|child| build(tree, child)).collect(),
    }
}

pub fn emit<S: DiagnosticSink>(tree: &Tree, root: NodeId, output_root: &std::path::Path, filenames: &dyn Filenames, _sink: &mut S) -> std::io::Result<()> {
    filenames.create_dir_all(output_root)?;
    let debug_tree = build(tree, root);
    let json = serde_json::to_string_pretty(&debug_tree).unwrap_or_else(|_| "null".to_string());
    let path: PathBuf = filenames.join(output_root, "tree.json");
    std::fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build_file;
    use crate::diagnostics::ConsoleSink;
    use crate::filename::StdFilenames;
    use crate::link::link;
    use std::io::Write;

    fn build_doc(text: &str) -> (Tree, NodeId) {
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
    fn serializes_the_whole_tree_to_one_json_file() {
        let (tree, root) = build_doc(
            r#"<manual><chapterlist><chapter id="c"><title>Intro</title><section id="s">
                <p>Hello.</p>
            </section></chapter></chapterlist></manual>"#,
        );
        let out_dir = tempfile::tempdir().unwrap();
        let mut sink = ConsoleSink::default();
        emit(&tree, root, out_dir.path(), &StdFilenames, &mut sink).unwrap();
        let json = std::fs::read_to_string(out_dir.path().join("tree.json")).unwrap();
        assert!(json.contains("\"chapter\""));
        assert!(json.contains("\"id\": \"c\""));
        assert!(json.contains("Hello."));
    }
}
