//! The fixed element-kind catalogue.

use super::search::lookup;

macro_rules! element_table {
    ($($variant:ident = $name:literal),* $(,)?) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr(u16)]
        pub enum ElementKind {
            $($variant),*
        }

        impl ElementKind {
            pub const ALL: &'static [ElementKind] = &[$(ElementKind::$variant),*];

            pub fn tag(self) -> &'static str {
                match self {
                    $(ElementKind::$variant => $name),*
                }
            }
        }
    };
}

element_table! {
    // structural
    Manual = "manual",
    Index = "index",
    Chapter = "chapter",
    Section = "section",
    // resource
    Resources = "resources",
    Mode = "mode",
    Filename = "filename",
    Folder = "folder",
    Stylesheet = "stylesheet",
    Images = "images",
    Downloads = "downloads",
    // block
    P = "p",
    Ol = "ol",
    Ul = "ul",
    Li = "li",
    Table = "table",
    Row = "row",
    Col = "col",
    Coldef = "coldef",
    Columns = "columns",
    Code = "code",
    Footnote = "footnote",
    Callout = "callout",
    Chapterlist = "chapterlist",
    Br = "br",
    // metadata
    Title = "title",
    Summary = "summary",
    Strapline = "strapline",
    Credit = "credit",
    Version = "version",
    Date = "date",
    // inline-span
    Cite = "cite",
    Em = "em",
    Strong = "strong",
    File = "file",
    Icon = "icon",
    Key = "key",
    Mouse = "mouse",
    Link = "link",
    Ref = "ref",
    Variable = "variable",
    Window = "window",
    Function = "function",
    Swi = "swi",
    Command = "command",
    Constant = "constant",
    Event = "event",
    Keyword = "keyword",
    Maths = "maths",
    Menu = "menu",
    Message = "message",
    Name = "name",
    Type = "type",
    Intro = "intro",
    Entry = "entry",
}

impl ElementKind {
    /// Block kinds group other blocks or paragraphs.
    pub fn is_block(self) -> bool {
        use ElementKind::*;
        matches!(
            self,
            Manual | Index | Chapter | Section | P | Ol | Ul | Li | Table | Row
                | Col | Code | Footnote | Callout | Chapterlist
        )
    }

    /// Block-collection parents admit only block children (and imply a
    /// wrapping paragraph around bare inline content).
    pub fn is_block_collection(self) -> bool {
        use ElementKind::*;
        matches!(self, Li | Footnote | Callout | Col)
    }

    /// Chunk kinds are inline spans, text, or entities.
    pub fn is_chunk(self) -> bool {
        !self.is_block() && !self.is_resource() && !self.is_metadata()
    }

    pub fn is_resource(self) -> bool {
        use ElementKind::*;
        matches!(self, Resources | Mode | Filename | Folder | Stylesheet | Images | Downloads)
    }

    pub fn is_metadata(self) -> bool {
        use ElementKind::*;
        matches!(self, Title | Summary | Strapline | Credit | Version | Date)
    }

    /// Preformatted content is preserved verbatim rather than whitespace-
    /// flattened.
    pub fn is_preformatted(self) -> bool {
        matches!(self, ElementKind::Code)
    }

    /// Numbered kinds receive a sibling `index` when titled.
    pub fn is_numbered(self) -> bool {
        matches!(self, ElementKind::Chapter | ElementKind::Section)
    }

    /// Kinds whose id, if present, is registered in the ID index.
    /// Indexable kinds collect entries in the generated index.
    pub fn is_indexable(self) -> bool {
        use ElementKind::*;
        matches!(self, Chapter | Index | Section | Table | Code)
    }
}

fn sorted_by_tag() -> Vec<(&'static str, ElementKind)> {
    let mut v: Vec<_> = ElementKind::ALL.iter().map(|k| (k.tag(), *k)).collect();
    v.sort_by_key(|(tag, _)| *tag);
    v
}

pub fn lookup_element(tag: &str) -> Option<ElementKind> {
    let table = sorted_by_tag();
    lookup(&table, |e| e.0, &tag).map(|e| e.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_discriminant_matches_table_index() {
        for (i, kind) in ElementKind::ALL.iter().enumerate() {
            assert_eq!(*kind as u16 as usize, i, "element {:?} out of order", kind.tag());
        }
    }

    #[test]
    fn tags_are_unique() {
        let mut tags: Vec<_> = ElementKind::ALL.iter().map(|k| k.tag()).collect();
        tags.sort();
        let before = tags.len();
        tags.dedup();
        assert_eq!(before, tags.len());
    }

    #[test]
    fn lookup_roundtrips_every_element() {
        for kind in ElementKind::ALL {
            assert_eq!(lookup_element(kind.tag()), Some(*kind));
        }
        assert_eq!(lookup_element("bogus"), None);
    }

    #[test]
    fn li_is_a_block_collection_but_not_a_block() {
        assert!(ElementKind::Li.is_block_collection());
    }
}
