//! Folds each node's declared `<resources>` block — per-mode filename/
//! folder/stylesheet, plus shared images/downloads/summary/strapline/
//! credit/version/date — into its `Resources` record, so the dispatcher
//! can query `node.resources()` directly instead of re-walking raw
//! child elements every time it needs to know whether a node owns a
//! file.

use crate::xml::ElementKind;

use super::node::{ModeResource, NodeId, Payload, Tree};
use super::text::plain_text;

/// Walks the whole tree rooted at `root`, populating every node's
/// `Resources` from its direct `<resources>` child, if any.
pub fn populate(tree: &Tree, root: NodeId) {
    walk(tree, root);
}

fn walk(tree: &Tree, node: NodeId) {
    let children: Vec<NodeId> = tree.children(node).collect();
    for child in &children {
        if tree.get(*child).kind == ElementKind::Resources {
            apply(tree, node, *child);
        }
    }
    for child in children {
        walk(tree, child);
    }
}

fn apply(tree: &Tree, owner: NodeId, resources_node: NodeId) {
    for child in tree.children(resources_node) {
        match tree.get(child).kind {
            ElementKind::Mode => apply_mode(tree, owner, child),
            ElementKind::Images => tree.get(owner).resources_mut().images = Some(plain_text(tree, child)),
            ElementKind::Downloads => tree.get(owner).resources_mut().downloads = Some(plain_text(tree, child)),
            ElementKind::Summary => tree.get(owner).resources_mut().summary = Some(plain_text(tree, child)),
            ElementKind::Strapline => tree.get(owner).resources_mut().strapline = Some(plain_text(tree, child)),
            ElementKind::Credit => tree.get(owner).resources_mut().credit = Some(plain_text(tree, child)),
            ElementKind::Version => tree.get(owner).resources_mut().version = Some(plain_text(tree, child)),
            ElementKind::Date => tree.get(owner).resources_mut().date = Some(plain_text(tree, child)),
            _ => {}
        }
    }
}

fn apply_mode(tree: &Tree, owner: NodeId, mode_node: NodeId) {
    let Payload::ModeName(name) = &tree.get(mode_node).payload else { return };
    let mut mode_resource = ModeResource::default();
    for child in tree.children(mode_node) {
        match tree.get(child).kind {
            ElementKind::Filename => mode_resource.filename = Some(plain_text(tree, child)),
            ElementKind::Folder => mode_resource.folder = Some(plain_text(tree, child)),
            ElementKind::Stylesheet => mode_resource.stylesheet = Some(plain_text(tree, child)),
            _ => {}
        }
    }
    let mut resources = tree.get(owner).resources_mut();
    match name.as_str() {
        "text" => resources.text = mode_resource,
        "hypertext" => resources.hypertext = mode_resource,
        "web" => resources.web = mode_resource,
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ConsoleSink;
    use std::io::Write;

    fn build_and_populate(text: &str) -> Tree {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.xml");
        std::fs::File::create(&path).unwrap().write_all(text.as_bytes()).unwrap();
        let mut sink = ConsoleSink::default();
        let (tree, _root) = crate::ast::builder::build_file(&path, &mut sink);
        tree
    }

    #[test]
    fn mode_blocks_populate_per_mode_resource() {
        let tree = build_and_populate(
            r#"<manual>
                <resources>
                  <mode name="text"><filename>chapter1.txt</filename></mode>
                  <mode name="web"><folder>chapter1</folder><stylesheet>manual.css</stylesheet></mode>
                </resources>
                <chapterlist/>
            </manual>"#,
        );
        let manual = tree.root.unwrap();
        let resources = tree.get(manual).resources().unwrap();
        assert_eq!(resources.text.filename.as_deref(), Some("chapter1.txt"));
        assert_eq!(resources.web.folder.as_deref(), Some("chapter1"));
        assert_eq!(resources.web.stylesheet.as_deref(), Some("manual.css"));
    }

    #[test]
    fn shared_metadata_fields_populate() {
        let tree = build_and_populate(
            r#"<manual>
                <resources><summary>An overview.</summary><version>2.1</version></resources>
                <chapterlist/>
            </manual>"#,
        );
        let manual = tree.root.unwrap();
        let resources = tree.get(manual).resources().unwrap();
        assert_eq!(resources.summary.as_deref(), Some("An overview."));
        assert_eq!(resources.version.as_deref(), Some("2.1"));
    }
}
