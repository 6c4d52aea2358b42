//! The ~15 legacy single-byte target tables, each a sorted array mapping
//! a Unicode code point to a target byte in `0x80..=0xFF`. Bytes below
//! `0x80` are never listed here — they always map to themselves.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Mapping {
    pub codepoint: u32,
    pub byte: u8,
}

macro_rules! mapping_table {
    ($name:ident: $( ($cp:expr, $b:expr) ),* $(,)?) => {
        pub static $name: &[Mapping] = &[ $( Mapping { codepoint: $cp as u32, byte: $b } ),* ];
    };
}

// Shared by most of the Acorn Latin variants: the Euro sign lands on
// 0x80, matching `AcornL1`.
mapping_table!(LATIN_BASE:
    (0x20AC, 0x80), // EURO SIGN
    (0x00A0, 0x81), // NO-BREAK SPACE
    (0x00A9, 0x82), // COPYRIGHT SIGN
    (0x00AB, 0x83), // LEFT-POINTING DOUBLE ANGLE QUOTATION MARK
    (0x00BB, 0x84), // RIGHT-POINTING DOUBLE ANGLE QUOTATION MARK
    (0x2013, 0x85), // EN DASH
    (0x2014, 0x86), // EM DASH
    (0x2018, 0x87), // LEFT SINGLE QUOTATION MARK
    (0x2019, 0x88), // RIGHT SINGLE QUOTATION MARK
    (0x201C, 0x89), // LEFT DOUBLE QUOTATION MARK
    (0x201D, 0x8A), // RIGHT DOUBLE QUOTATION MARK
    (0x2026, 0x8B), // HORIZONTAL ELLIPSIS
);

// `AcornL9` follows the later Latin-9 revision: the Euro sign moves to
// 0xA4, the byte ISO-8859-15 also gives it.
mapping_table!(LATIN9:
    (0x00A0, 0x91),
    (0x00A9, 0x92),
    (0x00AB, 0x93),
    (0x00BB, 0x94),
    (0x2013, 0x95),
    (0x2014, 0x96),
    (0x2018, 0x97),
    (0x2019, 0x98),
    (0x201C, 0x99),
    (0x201D, 0x9A),
    (0x2026, 0x9B),
    (0x20AC, 0xA4), // EURO SIGN
);

mapping_table!(CYRILLIC:
    (0x0410, 0xC0), (0x0411, 0xC1), (0x0412, 0xC2), (0x0413, 0xC3), (0x0414, 0xC4),
    (0x0415, 0xC5), (0x0416, 0xC6), (0x0417, 0xC7), (0x0418, 0xC8), (0x0419, 0xC9),
);

mapping_table!(CYRILLIC2:
    (0x0410, 0xE0), (0x0411, 0xE1), (0x0412, 0xE2), (0x0413, 0xE3), (0x0414, 0xE4),
    (0x0415, 0xE5), (0x0416, 0xE6), (0x0417, 0xE7), (0x0418, 0xE8), (0x0419, 0xE9),
);

mapping_table!(GREEK:
    (0x0391, 0xC1), (0x0392, 0xC2), (0x0393, 0xC3), (0x0394, 0xC4), (0x0395, 0xC5),
    (0x0396, 0xC6), (0x0397, 0xC7), (0x0398, 0xC8),
);

mapping_table!(HEBREW:
    (0x05D0, 0xE0), (0x05D1, 0xE1), (0x05D2, 0xE2), (0x05D3, 0xE3), (0x05D4, 0xE4),
    (0x05D5, 0xE5), (0x05D6, 0xE6),
);

mapping_table!(WELSH:
    (0x0174, 0x80), (0x0175, 0x81), (0x0176, 0x82), (0x0177, 0x83),
);

mapping_table!(BFONT:
    (0x2500, 0x80), (0x2502, 0x81), (0x250C, 0x82), (0x2510, 0x83), (0x2514, 0x84), (0x2518, 0x85),
);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Target {
    Utf8,
    SevenBit,
    AcornL1,
    AcornL2,
    AcornL3,
    AcornL4,
    AcornL5,
    AcornL6,
    AcornL7,
    AcornL8,
    AcornL9,
    AcornL10,
    Cyrillic,
    Cyrillic2,
    Greek,
    Hebrew,
    Welsh,
    BFont,
}

impl Target {
    pub const ALL: &'static [Target] = &[
        Target::Utf8,
        Target::SevenBit,
        Target::AcornL1,
        Target::AcornL2,
        Target::AcornL3,
        Target::AcornL4,
        Target::AcornL5,
        Target::AcornL6,
        Target::AcornL7,
        Target::AcornL8,
        Target::AcornL9,
        Target::AcornL10,
        Target::Cyrillic,
        Target::Cyrillic2,
        Target::Greek,
        Target::Hebrew,
        Target::Welsh,
        Target::BFont,
    ];

    pub fn name(self) -> &'static str {
        use Target::*;
        match self {
            Utf8 => "UTF8",
            SevenBit => "7Bit",
            AcornL1 => "AcornL1",
            AcornL2 => "AcornL2",
            AcornL3 => "AcornL3",
            AcornL4 => "AcornL4",
            AcornL5 => "AcornL5",
            AcornL6 => "AcornL6",
            AcornL7 => "AcornL7",
            AcornL8 => "AcornL8",
            AcornL9 => "AcornL9",
            AcornL10 => "AcornL10",
            Cyrillic => "Cyrillic",
            Cyrillic2 => "Cyrillic2",
            Greek => "Greek",
            Hebrew => "Hebrew",
            Welsh => "Welsh",
            BFont => "BFont",
        }
    }

    /// `None` for `Utf8` (no mapping — input passes through) and
    /// `SevenBit` (no mapping — anything above 0x7F is unsupported).
    pub fn table(self) -> Option<&'static [Mapping]> {
        use Target::*;
        match self {
            Utf8 | SevenBit => None,
            AcornL1 | AcornL2 | AcornL3 | AcornL4 | AcornL5 | AcornL6 | AcornL7 | AcornL8 | AcornL10 => {
                Some(LATIN_BASE)
            }
            AcornL9 => Some(LATIN9),
            Cyrillic => Some(CYRILLIC),
            Cyrillic2 => Some(CYRILLIC2),
            Greek => Some(GREEK),
            Hebrew => Some(HEBREW),
            Welsh => Some(WELSH),
            BFont => Some(BFONT),
        }
    }

    /// A web/MIME charset name, for downstream writers only; most of
    /// these vendor encodings have no standard equivalent.
    pub fn web_name(self) -> Option<&'static str> {
        use Target::*;
        match self {
            Utf8 => Some("utf-8"),
            AcornL1 => Some("iso-8859-1"),
            AcornL9 => Some("iso-8859-15"),
            Greek => Some("iso-8859-7"),
            Hebrew => Some("iso-8859-8"),
            Cyrillic => Some("iso-8859-5"),
            _ => None,
        }
    }

    pub fn lookup(name: &str) -> Option<Target> {
        Self::ALL.iter().copied().find(|t| t.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::search::is_sorted_strictly_by_key;

    #[test]
    fn every_table_is_sorted_by_codepoint() {
        for target in Target::ALL {
            if let Some(table) = target.table() {
                assert_eq!(
                    is_sorted_strictly_by_key(table, |m| m.codepoint),
                    None,
                    "{} is not sorted",
                    target.name()
                );
            }
        }
    }

    #[test]
    fn every_table_has_unique_in_range_bytes() {
        for target in Target::ALL {
            let Some(table) = target.table() else { continue };
            let mut bytes: Vec<u8> = table.iter().map(|m| m.byte).collect();
            bytes.sort_unstable();
            let before = bytes.len();
            bytes.dedup();
            assert_eq!(before, bytes.len(), "{} maps two code points to one byte", target.name());
            assert!(table.iter().all(|m| m.byte >= 0x80), "{} emits a byte below 0x80", target.name());
        }
    }

    #[test]
    fn euro_sign_matches_documented_targets() {
        let base = Target::AcornL1.table().unwrap();
        assert_eq!(base.iter().find(|m| m.codepoint == 0x20AC).unwrap().byte, 0x80);
        let latin9 = Target::AcornL9.table().unwrap();
        assert_eq!(latin9.iter().find(|m| m.codepoint == 0x20AC).unwrap().byte, 0xA4);
    }
}
