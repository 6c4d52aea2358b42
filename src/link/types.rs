//! The ID index: a flat map from an author-assigned id string to the
//! node that registered it first.

use std::collections::HashMap;

use crate::ast::NodeId;
use crate::diagnostics::{Code, DiagnosticSink, Position};

#[derive(Default)]
pub struct Index {
    map: HashMap<String, NodeId>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `id` against `node`. A second registration of the same
    /// id is reported and discarded — the first binding wins.
    pub fn register(&mut self, id: &str, node: NodeId, at: Position, sink: &mut impl DiagnosticSink) {
        if self.map.contains_key(id) {
            sink.report(at, Code::DuplicateId { id: id.to_string() });
        } else {
            self.map.insert(id.to_string(), node);
        }
    }

    pub fn get(&self, id: &str) -> Option<NodeId> {
        self.map.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
