//! The linker walk: registers ids, assigns sibling numbering to titled
//! chapters and sections, and binds `ref`/`link` targets once the whole
//! tree (every include already spliced in) is available.

use crate::ast::{NodeId, Payload, RefTarget, Tree};
use crate::diagnostics::DiagnosticSink;

use super::types::Index;

/// Runs the full link pass over `root`, returning the populated id
/// index. Two passes: the first registers ids and assigns numbering
/// (so every id is known before the second resolves references,
/// including ones that point forward in the document).
pub fn link(tree: &mut Tree, root: NodeId, sink: &mut impl DiagnosticSink) -> Index {
    let mut index = Index::new();
    assign_and_register(tree, root, sink, &mut index);
    resolve_references(tree, root, sink, &index);
    index
}

fn assign_and_register(tree: &mut Tree, node: NodeId, sink: &mut impl DiagnosticSink, index: &mut Index) {
    if let Some(id) = tree.get(node).id().map(str::to_string) {
        let at = tree.get(node).at.clone();
        index.register(&id, node, at, sink);
    }
    let children: Vec<NodeId> = tree.children(node).collect();
    let mut counter = 0u32;
    for child in children {
        if tree.get(child).kind.is_numbered() && tree.get(child).title.is_some() {
            counter += 1;
            tree.get_mut(child).index = counter;
        }
        assign_and_register(tree, child, sink, index);
    }
}

fn resolve_references(tree: &mut Tree, node: NodeId, sink: &mut impl DiagnosticSink, index: &Index) {
    if let Payload::Reference(reference) = tree.get(node).payload.clone() {
        if reference.flags.external {
            // an external reference's `id` is a raw URI, not a lookup
            // key: the writers use it verbatim and it never resolves.
        } else if let Some(RefTarget::Unresolved(id)) = &reference.target {
            match index.get(id) {
                Some(target) => {
                    let mut resolved = reference;
                    resolved.target = Some(RefTarget::Resolved(target));
                    tree.get_mut(node).payload = Payload::Reference(resolved);
                }
                None => {
                    let at = tree.get(node).at.clone();
                    sink.report(at, crate::diagnostics::Code::UnresolvedReference { id: id.clone() });
                }
            }
        }
    }
    let children: Vec<NodeId> = tree.children(node).collect();
    for child in children {
        resolve_references(tree, child, sink, index);
    }
}
