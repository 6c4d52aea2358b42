//! The document tree and the builder that populates it from a tag
//! stream.

pub mod builder;
pub mod columns;
pub mod grammar;
pub mod node;
pub mod resources;
pub mod text;

pub use builder::build_file;
pub use node::{
    Alignment, ChapterPayload, ChapterSource, ChunkFlags, ColumnDef, ModeResource, Node, NodeId,
    Payload, RefTarget, ReferencePayload, Resources, Tree,
};
pub use text::plain_text;
