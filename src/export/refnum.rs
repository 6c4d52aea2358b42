//! Computed reference numbers for id-less tables, code blocks, and
//! footnotes.
//!
//! `link::resolve` only assigns a sibling `index` to titled chapters and
//! sections (`ElementKind::is_numbered`). A table, code block, or
//! footnote an author never gave an `id` still needs *something* for a
//! same-file anchor and a link body to point at — this pass hands out a
//! sequential per-kind number, in document order, to every such node.

use std::collections::HashMap;

use crate::ast::{NodeId, Tree};
use crate::xml::ElementKind;

#[derive(Default)]
pub struct RefNumbers {
    numbers: HashMap<NodeId, u32>,
}

impl RefNumbers {
    pub fn get(&self, node: NodeId) -> Option<u32> {
        self.numbers.get(&node).copied()
    }
}

pub fn compute(tree: &Tree, root: NodeId) -> RefNumbers {
    let mut numbers = RefNumbers::default();
    let mut tables = 0u32;
    let mut codes = 0u32;
    let mut footnotes = 0u32;
    walk(tree, root, &mut numbers, &mut tables, &mut codes, &mut footnotes);
    numbers
}

fn walk(tree: &Tree, node: NodeId, numbers: &mut RefNumbers, tables: &mut u32, codes: &mut u32, footnotes: &mut u32) {
    let kind = tree.get(node).kind;
    if tree.get(node).id().is_none() {
        let counter = match kind {
            ElementKind::Table => Some(tables),
            ElementKind::Code => Some(codes),
            ElementKind::Footnote => Some(footnotes),
            _ => None,
        };
        if let Some(counter) = counter {
            *counter += 1;
            numbers.numbers.insert(node, *counter);
        }
    }
    for child in tree.children(node) {
        walk(tree, child, numbers, tables, codes, footnotes);
    }
}

/// The synthetic anchor word a computed number is rendered under
/// (`table3`, `code5`, `footnote2`); `None` for any other kind.
pub fn anchor_word(kind: ElementKind) -> Option<&'static str> {
    match kind {
        ElementKind::Table => Some("table"),
        ElementKind::Code => Some("code"),
        ElementKind::Footnote => Some("footnote"),
        _ => None,
    }
}

/// The anchor a reference to `node` should use: its own `id` if it has
/// one, otherwise a computed `table3`/`code5`/`footnote2`-style anchor
/// for the kinds that get one. Returns `None` for a node with neither —
/// the caller reports `Code::UnanchorableTarget`.
pub fn anchor_for(tree: &Tree, numbers: &RefNumbers, node: NodeId) -> Option<String> {
    if let Some(id) = tree.get(node).id() {
        return Some(id.to_string());
    }
    let word = anchor_word(tree.get(node).kind)?;
    let n = numbers.get(node)?;
    Some(format!("{word}{n}"))
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
    fn id_less_tables_get_sequential_numbers() {
        let (tree, root) = build(
            r#"<manual><chapterlist><chapter id="c"><section id="s">
                <table><row><col width="1">a</col></row></table>
                <table><row><col width="1">b</col></row></table>
            </section></chapter></chapterlist></manual>"#,
        );
        let numbers = compute(&tree, root);
        let section = tree.children(tree.children(root).next().unwrap()).next().unwrap();
        let tables: Vec<_> = tree.children(section).filter(|n| tree.get(*n).kind == ElementKind::Table).collect();
        assert_eq!(numbers.get(tables[0]), Some(1));
        assert_eq!(numbers.get(tables[1]), Some(2));
        assert_eq!(anchor_for(&tree, &numbers, tables[0]).as_deref(), Some("table1"));
    }

    #[test]
    fn an_id_bearing_table_keeps_its_own_id_and_no_computed_number() {
        let (tree, root) = build(
            r#"<manual><chapterlist><chapter id="c"><section id="s">
                <table id="prices"><row><col width="1">a</col></row></table>
            </section></chapter></chapterlist></manual>"#,
        );
        let numbers = compute(&tree, root);
        let section = tree.children(tree.children(root).next().unwrap()).next().unwrap();
        let table = tree.children(section).find(|n| tree.get(*n).kind == ElementKind::Table).unwrap();
        assert_eq!(numbers.get(table), None);
        assert_eq!(anchor_for(&tree, &numbers, table).as_deref(), Some("prices"));
    }
}
