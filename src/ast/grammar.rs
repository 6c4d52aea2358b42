//! What each element kind may contain and which attributes it accepts.
//! The builder consults this table while descending through the
//! tokenizer's tag stream; it never hard-codes a tag name outside this
//! file.

use crate::xml::ElementKind;

/// What a parent kind admits as children.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChildRule {
    /// No children; any content is an error.
    Empty,
    /// Only block kinds (`is_block`), no bare text/entities/inline spans.
    BlocksOnly,
    /// Block kinds, with bare inline content implicitly wrapped in a `p`.
    BlocksWithImpliedParagraph,
    /// Chunk kinds only: text, entities, inline spans.
    ChunksOnly,
    /// Exactly the listed kinds, nothing else — no implied wrapping.
    Only(&'static [ElementKind]),
    /// The fixed resource sub-elements (`mode`, `images`, `downloads`, ...).
    ResourceFields,
    /// A single metadata value (text/entities only, no nested spans).
    TextOnly,
}

pub fn child_rule(kind: ElementKind) -> ChildRule {
    use ChildRule::*;
    use ElementKind::*;
    match kind {
        Manual => Only(&[Resources, Chapterlist]),
        Index | Chapter | Section => BlocksWithImpliedParagraph,
        Resources => ResourceFields,
        Mode => ResourceFields,
        Filename | Folder | Stylesheet | Images | Downloads => TextOnly,
        P => ChunksOnly,
        Ol | Ul => BlocksOnly,
        Li | Footnote | Callout => BlocksWithImpliedParagraph,
        Table => Only(&[Columns, Row]),
        Row => BlocksOnly,
        Col => BlocksWithImpliedParagraph,
        Coldef => Empty,
        Columns => Only(&[Coldef]),
        Code => TextOnly,
        Chapterlist => Only(&[Chapter, Index]),
        Br => Empty,
        Title | Summary | Strapline | Credit | Version | Date => TextOnly,
        Cite | Em | Strong | File | Icon | Variable | Window | Function | Swi | Command
        | Constant | Event | Keyword | Maths | Menu | Message | Name | Type | Intro | Entry => {
            ChunksOnly
        }
        Key | Mouse => ChunksOnly,
        Link | Ref => ChunksOnly,
    }
}

/// Kinds that bind a `<title>` child to their own `title` field rather
/// than treating it as ordinary content.
pub fn allows_title(kind: ElementKind) -> bool {
    matches!(kind, ElementKind::Manual | ElementKind::Index | ElementKind::Chapter | ElementKind::Section)
}

/// Kinds under which bare text/inline content gets wrapped in an implied
/// `p` rather than rejected, so an author can write `<section>text</section>`
/// without an explicit paragraph.
pub fn implies_paragraph_wrap(kind: ElementKind) -> bool {
    matches!(child_rule(kind), ChildRule::BlocksWithImpliedParagraph)
}

/// Attributes a kind requires; an absent one is a diagnostic, not a
/// silent default.
pub fn required_attributes(kind: ElementKind) -> &'static [&'static str] {
    use ElementKind::*;
    match kind {
        Ref | Link => &["id"],
        Col => &["width"],
        _ => &[],
    }
}

/// The full set of attributes a kind recognises; anything else on the
/// tag is an unknown-attribute diagnostic.
pub fn known_attributes(kind: ElementKind) -> &'static [&'static str] {
    use ElementKind::*;
    match kind {
        Chapter | Section | Index => &["id"],
        Ref | Link => &["id", "external", "flatten"],
        Col => &["width", "align"],
        Coldef => &["width", "align"],
        Table => &["id"],
        Code => &["id", "language"],
        Footnote => &["id"],
        Mode => &["name"],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_collections_imply_paragraph_wrap() {
        assert!(implies_paragraph_wrap(ElementKind::Li));
        assert!(implies_paragraph_wrap(ElementKind::Footnote));
        assert!(implies_paragraph_wrap(ElementKind::Callout));
        assert!(!implies_paragraph_wrap(ElementKind::Ol));
    }

    #[test]
    fn ref_and_link_require_id() {
        assert_eq!(required_attributes(ElementKind::Ref), &["id"]);
        assert_eq!(required_attributes(ElementKind::Link), &["id"]);
        assert!(known_attributes(ElementKind::Ref).contains(&"external"));
    }
}
