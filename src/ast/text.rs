//! Flattening a subtree's text/entity leaves into a plain string, for
//! single-value elements declared inline as body text (resource fields
//! such as `<filename>`/`<summary>`, and similar leaf content).

use crate::xml::Expansion;

use super::node::{NodeId, Payload, Tree};

pub fn plain_text(tree: &Tree, node: NodeId) -> String {
    let mut out = String::new();
    collect(tree, node, &mut out);
    out
}

fn collect(tree: &Tree, node: NodeId, out: &mut String) {
    match &tree.get(node).payload {
        Payload::Text(text) => out.push_str(text),
        Payload::Entity(kind) => match kind.expansion() {
            Expansion::CodePoint(c) => out.push(c),
            Expansion::Private => out.push_str(kind.name()),
        },
        _ => {}
    }
    for child in tree.children(node) {
        collect(tree, child, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Position;
    use crate::xml::ElementKind;

    #[test]
    fn concatenates_text_and_entity_leaves() {
        let mut tree = Tree::new();
        let parent = tree.alloc(ElementKind::Filename, Position::start_of("t"));
        let a = tree.alloc(ElementKind::P, Position::start_of("t"));
        tree.get_mut(a).payload = Payload::Text("out/".to_string());
        let b = tree.alloc(ElementKind::P, Position::start_of("t"));
        tree.get_mut(b).payload = Payload::Entity(crate::xml::EntityKind::Euro);
        tree.append_child(parent, a);
        tree.append_child(parent, b);
        assert_eq!(plain_text(&tree, parent), "out/\u{20AC}");
    }
}
