//! File-ownership rules: the output modes and per-run options the
//! dispatcher (`export::dispatch`) consults to decide, per node and per
//! output mode, whether that node owns its own file.

use std::path::PathBuf;

use crate::ast::{ModeResource, Node, NodeId, Tree};
use crate::encoding::{LineEnding, Target};
use crate::xml::ElementKind;

/// One of the four renderings this crate produces. `Debug` has no page
/// splitting of its own — it always serializes the whole resolved tree
/// to one JSON file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OutputMode {
    Text,
    LegacyHypertext,
    WebHypertext,
    Debug,
}

impl OutputMode {
    pub fn label(self) -> &'static str {
        match self {
            OutputMode::Text => "text",
            OutputMode::LegacyHypertext => "legacy hypertext",
            OutputMode::WebHypertext => "web hypertext",
            OutputMode::Debug => "debug",
        }
    }
}

/// Everything a writer needs that isn't read off the tree itself.
#[derive(Clone, Debug)]
pub struct DispatchOptions {
    pub page_width: u32,
    pub target: Target,
    pub line_ending: LineEnding,
    pub output_root: PathBuf,
    /// The name given to the whole manual's single file, when the
    /// document has no file-producing resources at all.
    pub single_file_name: String,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            page_width: 77,
            target: Target::Utf8,
            line_ending: LineEnding::Lf,
            output_root: PathBuf::from("."),
            single_file_name: "ReadMe".to_string(),
        }
    }
}

/// The per-mode resource block a node declares, if any.
pub fn mode_resource(node: &Node, mode: OutputMode) -> Option<std::cell::Ref<'_, ModeResource>> {
    let resources = node.resources()?;
    Some(std::cell::Ref::map(resources, |r| match mode {
        OutputMode::Text => &r.text,
        OutputMode::LegacyHypertext => &r.hypertext,
        OutputMode::WebHypertext => &r.web,
        OutputMode::Debug => &r.text, // unused: Debug never calls owns_file
    }))
}

/// Whether `node` should become its own output file in `mode`: its
/// resources block names a filename or folder for this mode, or (web
/// hypertext only) it's an index-kind node, which always gets a root
/// index page of its own.
pub fn owns_file(tree: &Tree, node: NodeId, mode: OutputMode) -> bool {
    let declared = mode_resource(tree.get(node), mode).is_some_and(|m| m.filename.is_some() || m.folder.is_some());
    declared || (mode == OutputMode::WebHypertext && tree.get(node).kind == ElementKind::Index)
}

/// Whether *any* node in the document declares file-producing resources
/// for `mode`. When none do, the whole manual collapses to one file
/// named by the caller instead of being split at all.
pub fn any_file_producing_resources(tree: &Tree, root: NodeId, mode: OutputMode) -> bool {
    fn walk(tree: &Tree, node: NodeId, mode: OutputMode) -> bool {
        if owns_file(tree, node, mode) {
            return true;
        }
        tree.children(node).any(|child| walk(tree, child, mode))
    }
    walk(tree, root, mode)
}

/// The nearest node (itself or an ancestor) that owns the output unit
/// `node` is emitted into: the file a same-file anchor is relative to,
/// the container sub-file a link must name if it's elsewhere. Stops at
/// `root` even if `root` itself doesn't formally own a file — the whole
/// manual still has to land somewhere.
pub fn file_of(tree: &Tree, node: NodeId, root: NodeId, mode: OutputMode) -> NodeId {
    let mut current = node;
    loop {
        if current == root || owns_file(tree, current, mode) {
            return current;
        }
        current = tree.get(current).parent.unwrap_or(root);
    }
}

/// The base name a file-owning node's output unit is written under: its
/// declared filename/folder resource if any, else its own id, else a
/// stable `page<N>` fallback keyed off its arena index.
pub fn file_stem(tree: &Tree, node: NodeId, mode: OutputMode) -> String {
    if let Some(mr) = mode_resource(tree.get(node), mode) {
        if let Some(name) = &mr.filename {
            return name.clone();
        }
        if let Some(folder) = &mr.folder {
            return format!("{folder}/index");
        }
    }
    match tree.get(node).id() {
        Some(id) => id.to_string(),
        None => format!("page{}", node.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build_file;
    use crate::diagnostics::ConsoleSink;
    use std::io::Write;

    fn build(text: &str) -> (Tree, NodeId) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.xml");
        std::fs::File::create(&path).unwrap().write_all(text.as_bytes()).unwrap();
        let mut sink = ConsoleSink::default();
        let (tree, root) = build_file(&path, &mut sink);
        (tree, root.unwrap())
    }

    #[test]
    fn node_with_no_resources_owns_no_file() {
        let (tree, root) = build("<manual><chapterlist><chapter id=\"c\"/></chapterlist></manual>");
        let chapter = tree.children(tree.children(root).next().unwrap()).next().unwrap();
        assert!(!owns_file(&tree, chapter, OutputMode::Text));
        assert!(!any_file_producing_resources(&tree, root, OutputMode::Text));
    }

    #[test]
    fn declared_filename_makes_a_node_own_its_file() {
        let (tree, root) = build(
            r#"<manual><chapterlist><chapter id="c">
                <resources><mode name="text"><filename>c.txt</filename></mode></resources>
            </chapter></chapterlist></manual>"#,
        );
        let chapter = tree.children(tree.children(root).next().unwrap()).next().unwrap();
        assert!(owns_file(&tree, chapter, OutputMode::Text));
        assert!(!owns_file(&tree, chapter, OutputMode::LegacyHypertext));
        assert!(any_file_producing_resources(&tree, root, OutputMode::Text));
    }

    #[test]
    fn file_of_climbs_to_the_nearest_file_owning_ancestor() {
        let (tree, root) = build(
            r#"<manual><chapterlist><chapter id="c">
                <resources><mode name="text"><filename>c.txt</filename></mode></resources>
                <section id="s"><p>hi</p></section>
            </chapter></chapterlist></manual>"#,
        );
        let chapter = tree.children(tree.children(root).next().unwrap()).next().unwrap();
        let section = tree.children(chapter).find(|n| tree.get(*n).kind == crate::xml::ElementKind::Section).unwrap();
        assert_eq!(file_of(&tree, section, root, OutputMode::Text), chapter);
        assert_eq!(file_stem(&tree, chapter, OutputMode::Text), "c.txt");
    }

    #[test]
    fn index_kind_always_owns_a_web_page() {
        let (tree, root) = build("<manual><chapterlist><index id=\"i\"/></chapterlist></manual>");
        let index_node = tree.children(tree.children(root).next().unwrap()).next().unwrap();
        assert!(owns_file(&tree, index_node, OutputMode::WebHypertext));
        assert!(!owns_file(&tree, index_node, OutputMode::Text));
    }
}
