//! Emit the C++ header/source pair.
//!
//! Both modes walk the same processed project through `Emitter::table`, so an
//! array's bounds are computed once and printed identically by the `extern`
//! declaration and by the definition.

use std::collections::BTreeMap;
use std::fmt::{self, Write};

use crate::config::EmitConfig;
use crate::model::{
    Difficulty, GLOSSARY_SENTINEL, Language, LocalizedTriple, SECTION_SENTINEL, Section,
};
use crate::processor::context::GlyphRanges;
use crate::processor::projector::{ByAppearance, ByType};
use crate::processor::{ProcessedGame, ProcessedProject, group};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Enums and `extern` declarations.
    Header,
    /// Definitions with literal data.
    Source,
}

pub fn emit(project: &ProcessedProject, mode: Mode, config: &EmitConfig) -> Result<String, fmt::Error> {
    let mut e = Emitter {
        out: String::new(),
        mode,
    };

    e.preamble(config)?;
    e.glossary(&project.ctx.glossary)?;
    for game in &project.games {
        e.game(game)?;
    }
    e.glyph_ranges(&project.ctx.glyphs)?;
    writeln!(e.out, "}}")?;

    Ok(e.out)
}

/// Escape a string for a C string literal. A backslash that already starts a
/// `\0` escape is left alone.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' if chars.peek() == Some(&'0') => out.push('\\'),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out
}

/// `uint8_t` backing for fewer than 256 entries, so the sentinel plus the
/// entries still fit.
fn enum_base(count: usize) -> &'static str {
    if count < 256 { " : uint8_t" } else { "" }
}

struct Emitter {
    out: String,
    mode: Mode,
}

impl Emitter {
    fn preamble(&mut self, config: &EmitConfig) -> fmt::Result {
        match self.mode {
            Mode::Header => {
                writeln!(self.out, "#pragma once")?;
                writeln!(self.out, "#include <cstdint>")?;
            }
            Mode::Source => {
                writeln!(self.out, "#include \"{}\"", config.header_name)?;
            }
        }
        writeln!(self.out, "// Auto-generated by loc-codegen - DO NOT EDIT\n")?;
        writeln!(self.out, "namespace {} {{\n", config.root_namespace)
    }

    /// Header: `extern ty name[..];`. Source: `ty name[..]` plus whatever
    /// initializer `body` writes.
    fn table<F>(&mut self, ty: &str, name: &str, bounds: &[usize], body: F) -> fmt::Result
    where
        F: FnOnce(&mut String) -> fmt::Result,
    {
        let bounds: String = bounds.iter().map(|b| format!("[{b}]")).collect();
        match self.mode {
            Mode::Header => writeln!(self.out, "extern {ty} {name}{bounds};")?,
            Mode::Source => {
                writeln!(self.out, "{ty} {name}{bounds}")?;
                body(&mut self.out)?;
            }
        }
        writeln!(self.out)
    }

    /// Enumerations only exist in the header.
    fn enumeration<'a>(
        &mut self,
        name: &str,
        sentinel: &str,
        entries: impl ExactSizeIterator<Item = &'a str>,
    ) -> fmt::Result {
        if self.mode != Mode::Header {
            return Ok(());
        }
        writeln!(self.out, "enum {name}{}", enum_base(entries.len()))?;
        writeln!(self.out, "{{")?;
        writeln!(self.out, "    {sentinel},")?;
        for entry in entries {
            writeln!(self.out, "    {entry},")?;
        }
        writeln!(self.out, "}};\n")
    }

    fn glossary(&mut self, glossary: &BTreeMap<String, LocalizedTriple>) -> fmt::Result {
        self.enumeration(
            "th_glossary_t",
            GLOSSARY_SENTINEL,
            glossary.keys().map(String::as_str),
        )?;

        self.table(
            "const char*",
            "th_glossary_str",
            &[Language::ALL.len(), glossary.len() + 1],
            |out| {
                writeln!(out, "{{")?;
                for lang in Language::ALL {
                    writeln!(out, "    {{")?;
                    writeln!(out, "        \"\",")?;
                    for triple in glossary.values() {
                        writeln!(out, "        u8\"{}\",", escape(triple.get(lang)))?;
                    }
                    writeln!(out, "    }},")?;
                }
                writeln!(out, "}};")
            },
        )
    }

    fn game(&mut self, game: &ProcessedGame) -> fmt::Result {
        if game.is_real() {
            writeln!(self.out, "namespace {} {{\n", game.namespace)?;
            if let Some(p) = &game.projections {
                self.sections(&game.sections)?;
                self.by_appearance(&p.by_appearance)?;
                self.by_type(&p.by_type)?;
            }
        }

        for g in &game.groups {
            let bounds = group::dimensions(&g.tree);
            self.table("th_glossary_t", &g.name, &bounds, |out| {
                group::print(out, &g.tree, 0)
            })?;
        }

        if game.is_real() {
            writeln!(self.out, "}}\n")?;
        }
        Ok(())
    }

    fn sections(&mut self, sections: &[Section]) -> fmt::Result {
        self.enumeration(
            "th_sections_t",
            SECTION_SENTINEL,
            sections.iter().map(|s| s.name.as_str()),
        )?;

        let count = sections.len() + 1;
        self.table(
            "const char*",
            "th_sections_str",
            &[Language::ALL.len(), Difficulty::ALL.len(), count],
            |out| {
                writeln!(out, "{{")?;
                for lang in Language::ALL {
                    writeln!(out, "    {{")?;
                    for difficulty in Difficulty::ALL {
                        writeln!(out, "        {{")?;
                        writeln!(out, "            u8\"\",")?;
                        for s in sections {
                            let text = s.ranks.text(difficulty, lang);
                            writeln!(out, "            u8\"{}\",", escape(text))?;
                        }
                        writeln!(out, "        }},")?;
                    }
                    writeln!(out, "    }},")?;
                }
                writeln!(out, "}};")
            },
        )?;

        self.table("uint8_t", "th_sections_bgm", &[count], |out| {
            writeln!(out, "{{")?;
            writeln!(out, "    0,")?;
            for s in sections {
                writeln!(out, "    {},", s.bgm)?;
            }
            writeln!(out, "}};")
        })
    }

    fn by_appearance(&mut self, table: &ByAppearance) -> fmt::Result {
        self.table("th_sections_t", "th_sections_cba", &table.bounds(), |out| {
            writeln!(out, "{{")?;
            for plane in &table.cells {
                writeln!(out, "    {{")?;
                for row in plane {
                    write!(out, "        {{ ")?;
                    for name in ByAppearance::run(row) {
                        write!(out, "{name}, ")?;
                    }
                    writeln!(out, "}},")?;
                }
                writeln!(out, "    }},")?;
            }
            writeln!(out, "}};")
        })
    }

    fn by_type(&mut self, table: &ByType) -> fmt::Result {
        self.table("th_sections_t", "th_sections_cbt", &table.bounds(), |out| {
            writeln!(out, "{{")?;
            for pair in &table.lists {
                writeln!(out, "    {{")?;
                for list in pair {
                    write!(out, "        {{ ")?;
                    for name in table.padded(list, SECTION_SENTINEL) {
                        write!(out, "{name}, ")?;
                    }
                    writeln!(out, "}},")?;
                }
                writeln!(out, "    }},")?;
            }
            writeln!(out, "}};")
        })
    }

    fn glyph_ranges(&mut self, glyphs: &GlyphRanges) -> fmt::Result {
        for lang in Language::ALL {
            let extra: Vec<u32> = glyphs.extra(lang).collect();
            let name = format!("__thprac_loc_range_{}", lang.suffix());
            // baseline pair + one pair per code point + terminator
            let count = 2 + extra.len() * 2 + 1;
            self.table("wchar_t", &name, &[count], |out| {
                writeln!(out, "{{")?;
                writeln!(out, "    0x0020, 0x00FF,")?;
                for c in &extra {
                    writeln!(out, "    {c:#x}, {c:#x},")?;
                }
                writeln!(out, "    0")?;
                writeln!(out, "}};")
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Node;
    use crate::processor;

    fn build(json: &str, mode: Mode) -> String {
        let root: Node = serde_json::from_str(json).unwrap();
        let project = processor::run(&root);
        emit(&project, mode, &EmitConfig::default()).unwrap()
    }

    #[test]
    fn test_escape() {
        let test_cases = vec![
            ("He said \"hi\"\n", r#"He said \"hi\"\n"#),
            (r"C:\dir", r"C:\\dir"),
            (r"keep\0nul", r"keep\0nul"),
            ("trailing\\", r"trailing\\"),
            ("plain 弾幕", "plain 弾幕"),
        ];

        for (input, expected) in test_cases {
            assert_eq!(escape(input), expected, "{input:?}");
        }
    }

    #[test]
    fn test_enum_base() {
        assert_eq!(enum_base(0), " : uint8_t");
        assert_eq!(enum_base(255), " : uint8_t");
        assert_eq!(enum_base(256), "");
    }

    #[test]
    fn test_empty_document() {
        let header = build("{}", Mode::Header);
        assert_eq!(
            header,
            "#pragma once\n\
             #include <cstdint>\n\
             // Auto-generated by loc-codegen - DO NOT EDIT\n\n\
             namespace THPrac {\n\n\
             enum th_glossary_t : uint8_t\n\
             {\n    A0000ERROR_C,\n};\n\n\
             extern const char* th_glossary_str[3][1];\n\n\
             extern wchar_t __thprac_loc_range_zh[3];\n\n\
             extern wchar_t __thprac_loc_range_en[3];\n\n\
             extern wchar_t __thprac_loc_range_ja[3];\n\n\
             }\n"
        );
    }

    #[test]
    fn test_glossary_tables() {
        let json = r#"{"c": {"glossary": {"b": ["乙", "B", "べ"], "a": ["甲", "A \"q\"", "あ"]}}}"#;
        let header = build(json, Mode::Header);
        assert!(header.contains("enum th_glossary_t : uint8_t\n{\n    A0000ERROR_C,\n    a,\n    b,\n};\n"));
        assert!(header.contains("extern const char* th_glossary_str[3][3];\n"));

        let source = build(json, Mode::Source);
        assert!(source.starts_with("#include \"thprac_locale_def.h\"\n"));
        assert!(!source.contains("enum "));
        assert!(source.contains(
            "const char* th_glossary_str[3][3]\n{\n    {\n        \"\",\n        u8\"甲\",\n        u8\"乙\",\n    },\n    {\n        \"\",\n        u8\"A \\\"q\\\"\",\n        u8\"B\",\n    },\n"
        ));
    }

    #[test]
    fn test_section_tables() {
        let json = r#"{"g": {"namespace": "TH06", "sections": {
            "s1": {"bgm": 2, "appearance": [1, 1, 1], "!X": ["一", "One", "いち"]},
            "s3": {"appearance": [1, 1, 3], "!E": ["三", "Three", "さん"]}
        }}}"#;

        let header = build(json, Mode::Header);
        assert!(header.contains("namespace TH06 {\n\nenum th_sections_t : uint8_t\n{\n    A0000ERROR,\n    s1,\n    s3,\n};\n"));
        assert!(header.contains("extern const char* th_sections_str[3][4][3];\n"));
        assert!(header.contains("extern uint8_t th_sections_bgm[3];\n"));
        assert!(header.contains("extern th_sections_t th_sections_cba[1][1][4];\n"));
        assert!(header.contains("extern th_sections_t th_sections_cbt[1][2][3];\n"));

        let source = build(json, Mode::Source);
        assert!(source.contains("uint8_t th_sections_bgm[3]\n{\n    0,\n    2,\n    0,\n};\n"));
        assert!(source.contains("th_sections_t th_sections_cba[1][1][4]\n{\n    {\n        { s1, },\n    },\n};\n"));
        assert!(source.contains(
            "th_sections_t th_sections_cbt[1][2][3]\n{\n    {\n        { s1, s3, A0000ERROR, },\n        { A0000ERROR, A0000ERROR, A0000ERROR, },\n    },\n};\n"
        ));
        // English, normal: s1 set by !X, s3 only has easy
        assert!(source.contains(
            "        {\n            u8\"\",\n            u8\"One\",\n            u8\"\",\n        },\n"
        ));
    }

    #[test]
    fn test_groups_outside_and_inside_namespace() {
        let json = r#"{
            "shared": {"groups": {"g_all": [["a", "b"], ["c"]]}},
            "game": {"namespace": "TH07", "groups": {"g_one": "a"}}
        }"#;
        let header = build(json, Mode::Header);
        assert!(header.contains("extern th_glossary_t g_all[2][3];\n"));
        assert!(header.contains("namespace TH07 {\n"));
        assert!(header.contains("extern th_glossary_t g_one;\n"));

        let source = build(json, Mode::Source);
        assert!(source.contains(
            "th_glossary_t g_all[2][3]\n{\n    {\n        a,\n        b,\n    },\n    {\n        c,\n    },\n};\n"
        ));
        assert!(source.contains("th_glossary_t g_one\n= a;\n"));
    }

    #[test]
    fn test_glyph_tables() {
        let json = r#"{"g": {"namespace": "G", "sections": {
            "b": {"appearance": [1, 1, 2], "!X": ["面", "Stage 1", "面"]},
            "a": {"appearance": [1, 1, 1], "!X": ["一", "Stage 1", "一"]}
        }}}"#;
        let header = build(json, Mode::Header);
        assert!(header.contains("extern wchar_t __thprac_loc_range_zh[7];\n"));
        assert!(header.contains("extern wchar_t __thprac_loc_range_en[3];\n"));

        let source = build(json, Mode::Source);
        assert!(source.contains(
            "wchar_t __thprac_loc_range_zh[7]\n{\n    0x0020, 0x00FF,\n    0x4e00, 0x4e00,\n    0x9762, 0x9762,\n    0\n};\n"
        ));
        assert!(source.contains("wchar_t __thprac_loc_range_en[3]\n{\n    0x0020, 0x00FF,\n    0\n};\n"));
    }

    #[test]
    fn test_non_real_game_sections_are_not_emitted() {
        let json = r#"{"bucket": {"sections": {"s": {"!X": ["一", "x", "x"]}}}}"#;
        let header = build(json, Mode::Header);
        assert!(!header.contains("th_sections_t"));
        // glyphs still count
        assert!(header.contains("extern wchar_t __thprac_loc_range_zh[5];\n"));
    }

    #[test]
    fn test_shared_namespace_emits_one_section_enum() {
        let json = r#"{
            "a": {"namespace": "G", "sections": {"st1": {"appearance": [1, 1, 1]}}},
            "b": {"namespace": "G", "sections": {"st2": {"appearance": [1, 1, 1]}}, "groups": {"menu": "st1"}}
        }"#;
        let header = build(json, Mode::Header);
        assert_eq!(header.matches("enum th_sections_t").count(), 1);
        assert_eq!(header.matches("namespace G {").count(), 2);
        assert!(header.contains("extern th_glossary_t menu;\n"));
        assert!(!header.contains("st2"));
    }
}
