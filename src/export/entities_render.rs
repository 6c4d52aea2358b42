//! Per-output-mode entity rendering.
//!
//! An entity's `Expansion` only says what Unicode code point it means (or
//! that it has none). What ends up on the page still varies by writer:
//! the text writer prefers an ASCII approximation for the common
//! typographic entities rather than trusting every target encoding to
//! carry the real glyph; the legacy-hypertext writer escapes through its
//! own directive syntax; the web writer always emits a numeric character
//! reference, since that's unambiguous regardless of the declared page
//! encoding. Entities with no code point at all (`Expansion::Private`)
//! have no target-encoding fallback to defer to, so all three writers
//! share one ASCII idiom table for them.

use crate::xml::{EntityKind, Expansion};

/// The shared fallback for the four code-point-less entities. No writer
/// can defer these to the transcoder, so they get one fixed ASCII idiom.
fn private_idiom(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Menusep => ">",
        EntityKind::Keysep => "-",
        EntityKind::Smiley => ":-)",
        EntityKind::Frowny => ":-(",
        _ => "?",
    }
}

/// Plain-text rendering. Typographic punctuation gets an ASCII
/// substitute; everything else (accented letters, currency, fractions,
/// guillemets, ...) is handed back as its literal code point, to be
/// mapped by the selected target encoding when the finished line is
/// transcoded.
pub fn render_text(kind: EntityKind) -> String {
    match kind {
        EntityKind::Amp => "&".to_string(),
        EntityKind::Lt => "<".to_string(),
        EntityKind::Gt => ">".to_string(),
        EntityKind::Quot => "\"".to_string(),
        EntityKind::Apos => "'".to_string(),
        EntityKind::Mdash => "--".to_string(),
        EntityKind::Ndash => "-".to_string(),
        EntityKind::Hellip => "...".to_string(),
        EntityKind::Lsquo | EntityKind::Rsquo => "'".to_string(),
        EntityKind::Ldquo | EntityKind::Rdquo => "\"".to_string(),
        EntityKind::Copy => "(C)".to_string(),
        EntityKind::Reg => "(R)".to_string(),
        EntityKind::Trade => "(TM)".to_string(),
        EntityKind::Times => "x".to_string(),
        EntityKind::Divide => "/".to_string(),
        EntityKind::Plusmn => "+/-".to_string(),
        EntityKind::Le => "<=".to_string(),
        EntityKind::Ge => ">=".to_string(),
        EntityKind::Ne => "!=".to_string(),
        EntityKind::Minus => "-".to_string(),
        _ => match kind.expansion() {
            Expansion::CodePoint(c) => c.to_string(),
            Expansion::Private => private_idiom(kind).to_string(),
        },
    }
}

/// Legacy-hypertext rendering. The dialect's own directive syntax reads
/// `\` as an escape introducer, so any code point that would otherwise
/// collide with it (or with the markup-reserved `&`/`<`/`>`/quotes) is
/// spelled as a two-character `\x` escape instead of passed through raw.
pub fn render_hypertext(kind: EntityKind) -> String {
    match kind {
        EntityKind::Amp => "\\&".to_string(),
        EntityKind::Lt => "\\<".to_string(),
        EntityKind::Gt => "\\>".to_string(),
        EntityKind::Quot => "\\\"".to_string(),
        EntityKind::Apos => "\\'".to_string(),
        EntityKind::Mdash => "\\m".to_string(),
        EntityKind::Ndash => "\\n".to_string(),
        EntityKind::Hellip => "\\e".to_string(),
        EntityKind::Lsquo => "\\[".to_string(),
        EntityKind::Rsquo => "\\]".to_string(),
        EntityKind::Ldquo => "\\{".to_string(),
        EntityKind::Rdquo => "\\}".to_string(),
        EntityKind::Copy => "\\c".to_string(),
        EntityKind::Reg => "\\r".to_string(),
        EntityKind::Trade => "\\t".to_string(),
        _ => match kind.expansion() {
            Expansion::CodePoint(c) => c.to_string(),
            Expansion::Private => private_idiom(kind).to_string(),
        },
    }
}

/// Web-hypertext rendering: always a numeric character reference for
/// entities with a code point, since that's correct regardless of the
/// page's declared charset. The four private entities have no code
/// point to reference, so they fall back to the shared ASCII idiom
/// (already safe to embed in markup as-is).
pub fn render_web(kind: EntityKind) -> String {
    match kind.expansion() {
        Expansion::CodePoint(c) => format!("&#{};", c as u32),
        Expansion::Private => private_idiom(kind).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_writer_prefers_ascii_idiom_for_typographic_entities() {
        assert_eq!(render_text(EntityKind::Mdash), "--");
        assert_eq!(render_text(EntityKind::Hellip), "...");
        assert_eq!(render_text(EntityKind::Rsquo), "'");
    }

    #[test]
    fn text_writer_defers_unmapped_entities_to_their_literal_code_point() {
        assert_eq!(render_text(EntityKind::Eacute), "\u{00E9}");
        assert_eq!(render_text(EntityKind::Euro), "\u{20AC}");
    }

    #[test]
    fn hypertext_writer_escapes_markup_reserved_characters() {
        assert_eq!(render_hypertext(EntityKind::Amp), "\\&");
        assert_eq!(render_hypertext(EntityKind::Lt), "\\<");
    }

    #[test]
    fn web_writer_emits_numeric_character_references() {
        assert_eq!(render_web(EntityKind::Euro), "&#8364;");
        assert_eq!(render_web(EntityKind::Amp), "&#38;");
    }

    #[test]
    fn private_entities_share_one_idiom_across_every_writer() {
        for kind in [EntityKind::Menusep, EntityKind::Keysep, EntityKind::Smiley, EntityKind::Frowny] {
            let text = render_text(kind);
            let hypertext = render_hypertext(kind);
            let web = render_web(kind);
            assert_eq!(text, hypertext);
            assert_eq!(text, web);
        }
    }
}
