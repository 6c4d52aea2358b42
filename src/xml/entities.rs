//! The fixed named-entity catalogue. Each entry carries the mapped
//! Unicode code point, or a sentinel "no code point" for
//! application-private entities (e.g. separators, emoticons).
//!
//! The enum and the table below are kept index-aligned by construction: a
//! unit test walks `EntityKind::ALL` and asserts `ALL[k as usize] == k`,
//! standing in for a build-time check (the table
//! here is hand-written rather than generated, so the check has to run at
//! test time instead of compile time).

use super::search::lookup;

/// An entity's expansion: either a Unicode code point, or a sentinel for
/// entities with no universal code point (manual-specific idioms that
/// each output writer renders in its own way — see
/// `export::entities_render`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expansion {
    CodePoint(char),
    Private,
}

macro_rules! entity_table {
    ($($variant:ident = $name:literal => $expansion:expr),* $(,)?) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        #[repr(u16)]
        pub enum EntityKind {
            $($variant),*
        }

        impl EntityKind {
            pub const ALL: &'static [EntityKind] = &[$(EntityKind::$variant),*];

            pub fn name(self) -> &'static str {
                match self {
                    $(EntityKind::$variant => $name),*
                }
            }

            pub fn expansion(self) -> Expansion {
                match self {
                    $(EntityKind::$variant => $expansion),*
                }
            }
        }
    };
}

entity_table! {
    Amp = "amp" => Expansion::CodePoint('&'),
    Lt = "lt" => Expansion::CodePoint('<'),
    Gt = "gt" => Expansion::CodePoint('>'),
    Quot = "quot" => Expansion::CodePoint('"'),
    Apos = "apos" => Expansion::CodePoint('\''),
    Nbsp = "nbsp" => Expansion::CodePoint('\u{00A0}'),
    Shy = "shy" => Expansion::CodePoint('\u{00AD}'),
    Nbhy = "nbhy" => Expansion::CodePoint('\u{2011}'),
    Copy = "copy" => Expansion::CodePoint('\u{00A9}'),
    Reg = "reg" => Expansion::CodePoint('\u{00AE}'),
    Trade = "trade" => Expansion::CodePoint('\u{2122}'),
    Hellip = "hellip" => Expansion::CodePoint('\u{2026}'),
    Mdash = "mdash" => Expansion::CodePoint('\u{2014}'),
    Ndash = "ndash" => Expansion::CodePoint('\u{2013}'),
    Lsquo = "lsquo" => Expansion::CodePoint('\u{2018}'),
    Rsquo = "rsquo" => Expansion::CodePoint('\u{2019}'),
    Ldquo = "ldquo" => Expansion::CodePoint('\u{201C}'),
    Rdquo = "rdquo" => Expansion::CodePoint('\u{201D}'),
    Times = "times" => Expansion::CodePoint('\u{00D7}'),
    Divide = "divide" => Expansion::CodePoint('\u{00F7}'),
    Plusmn = "plusmn" => Expansion::CodePoint('\u{00B1}'),
    Deg = "deg" => Expansion::CodePoint('\u{00B0}'),
    Sect = "sect" => Expansion::CodePoint('\u{00A7}'),
    Para = "para" => Expansion::CodePoint('\u{00B6}'),
    Middot = "middot" => Expansion::CodePoint('\u{00B7}'),
    Laquo = "laquo" => Expansion::CodePoint('\u{00AB}'),
    Raquo = "raquo" => Expansion::CodePoint('\u{00BB}'),
    Frac12 = "frac12" => Expansion::CodePoint('\u{00BD}'),
    Frac14 = "frac14" => Expansion::CodePoint('\u{00BC}'),
    Frac34 = "frac34" => Expansion::CodePoint('\u{00BE}'),
    Le = "le" => Expansion::CodePoint('\u{2264}'),
    Ge = "ge" => Expansion::CodePoint('\u{2265}'),
    Ne = "ne" => Expansion::CodePoint('\u{2260}'),
    Minus = "minus" => Expansion::CodePoint('\u{2212}'),
    Euro = "euro" => Expansion::CodePoint('\u{20AC}'),
    Pound = "pound" => Expansion::CodePoint('\u{00A3}'),
    Yen = "yen" => Expansion::CodePoint('\u{00A5}'),
    Eacute = "eacute" => Expansion::CodePoint('\u{00E9}'),
    Egrave = "egrave" => Expansion::CodePoint('\u{00E8}'),
    Auml = "auml" => Expansion::CodePoint('\u{00E4}'),
    Ouml = "ouml" => Expansion::CodePoint('\u{00F6}'),
    Uuml = "uuml" => Expansion::CodePoint('\u{00FC}'),
    Ntilde = "ntilde" => Expansion::CodePoint('\u{00F1}'),
    Ccedil = "ccedil" => Expansion::CodePoint('\u{00E7}'),
    Szlig = "szlig" => Expansion::CodePoint('\u{00DF}'),
    Menusep = "menusep" => Expansion::Private,
    Keysep = "keysep" => Expansion::Private,
    Smiley = "smiley" => Expansion::Private,
    Frowny = "frowny" => Expansion::Private,
}

/// Entries sorted by name, built once from the table above.
fn sorted_by_name() -> Vec<(&'static str, EntityKind)> {
    let mut v: Vec<_> = EntityKind::ALL.iter().map(|k| (k.name(), *k)).collect();
    v.sort_by_key(|(name, _)| *name);
    v
}

/// Looks up an entity by name, as read between `&` and `;`.
pub fn lookup_entity(name: &str) -> Option<EntityKind> {
    let table = sorted_by_name();
    lookup(&table, |e| e.0, &name).map(|e| e.1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_discriminant_matches_table_index() {
        for (i, kind) in EntityKind::ALL.iter().enumerate() {
            assert_eq!(*kind as u16 as usize, i, "entity {:?} out of order", kind.name());
        }
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<_> = EntityKind::ALL.iter().map(|k| k.name()).collect();
        names.sort();
        let before = names.len();
        names.dedup();
        assert_eq!(before, names.len());
    }

    #[test]
    fn lookup_roundtrips_every_entity() {
        for kind in EntityKind::ALL {
            assert_eq!(lookup_entity(kind.name()), Some(*kind));
        }
        assert_eq!(lookup_entity("nonexistent"), None);
    }
}
