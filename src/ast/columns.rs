//! Folds a `<table>`'s `<columns>` child — a list of `coldef` width/align
//! declarations — into the table node's own `Payload::TableColumns`, the
//! same way `ast::resources` folds a `<resources>` child into its owner's
//! `Resources` record.

use crate::xml::ElementKind;

use super::node::{NodeId, Payload, Tree};

pub fn populate(tree: &mut Tree, root: NodeId) {
    walk(tree, root);
}

fn walk(tree: &mut Tree, node: NodeId) {
    let children: Vec<NodeId> = tree.children(node).collect();
    if tree.get(node).kind == ElementKind::Table {
        if let Some(columns_node) = children.iter().copied().find(|c| tree.get(*c).kind == ElementKind::Columns) {
            let defs: Vec<_> = tree
                .children(columns_node)
                .filter_map(|coldef| match &tree.get(coldef).payload {
                    Payload::Column(def) => Some(def.clone()),
                    _ => None,
                })
                .collect();
            if !defs.is_empty() {
                tree.get_mut(node).payload = Payload::TableColumns(defs);
            }
        }
    }
    for child in children {
        walk(tree, child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::node::{Alignment, ColumnDef};
    use crate::diagnostics::ConsoleSink;
    use std::io::Write;

    fn build(text: &str) -> Tree {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.xml");
        std::fs::File::create(&path).unwrap().write_all(text.as_bytes()).unwrap();
        let mut sink = ConsoleSink::default();
        let (tree, _root) = crate::ast::builder::build_file(&path, &mut sink);
        tree
    }

    #[test]
    fn coldef_list_folds_into_table_payload() {
        let tree = build(
            r#"<manual><chapterlist><chapter id="c"><section id="s">
                <table id="t">
                  <columns>
                    <coldef width="10" align="left"/>
                    <coldef width="20" align="right"/>
                  </columns>
                  <row><col width="10">a</col><col width="20">b</col></row>
                </table>
            </section></chapter></chapterlist></manual>"#,
        );
        let manual = tree.root.unwrap();
        let chapter = tree.children(manual).next().unwrap();
        let section = tree.children(chapter).next().unwrap();
        let table = tree.children(section).next().unwrap();
        match &tree.get(table).payload {
            Payload::TableColumns(defs) => {
                assert_eq!(
                    defs,
                    &vec![
                        ColumnDef { width: Some(10), align: Alignment::Left },
                        ColumnDef { width: Some(20), align: Alignment::Right },
                    ]
                );
            }
            other => panic!("expected TableColumns, got {other:?}"),
        }
    }
}
