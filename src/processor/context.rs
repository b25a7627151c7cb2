//! State owned by one generation run: the shared glossary, the per-language
//! glyph sets and the warnings report.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::{Language, LocalizedTriple};

/// Everything at or below this code point is covered by the fixed
/// `0x0020..=0x00FF` range of every glyph table.
pub const BASELINE_GLYPH_END: u32 = 0xFF;

#[derive(Debug, Default)]
pub struct GlyphRanges {
    zh: BTreeSet<char>,
    en: BTreeSet<char>,
    ja: BTreeSet<char>,
}

impl GlyphRanges {
    pub fn add(&mut self, triple: &LocalizedTriple) {
        self.zh.extend(triple.zh.chars());
        self.en.extend(triple.en.chars());
        self.ja.extend(triple.ja.chars());
    }

    fn set(&self, lang: Language) -> &BTreeSet<char> {
        match lang {
            Language::Chinese => &self.zh,
            Language::English => &self.en,
            Language::Japanese => &self.ja,
        }
    }

    /// Code points outside the baseline range, ascending.
    pub fn extra(&self, lang: Language) -> impl Iterator<Item = u32> + '_ {
        self.set(lang)
            .iter()
            .map(|&c| u32::from(c))
            .filter(|&c| c > BASELINE_GLYPH_END)
    }
}

/// Line-oriented, human-readable report of everything that was skipped.
#[derive(Debug, Default)]
pub struct Warnings {
    lines: Vec<String>,
}

impl Warnings {
    pub fn push(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        log::debug!("{msg}");
        self.lines.push(msg);
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// One warning per line; empty when nothing was reported.
    pub fn report(&self) -> String {
        self.lines.iter().map(|l| format!("{l}\n")).collect()
    }
}

#[derive(Debug, Default)]
pub struct GenContext {
    pub glossary: BTreeMap<String, LocalizedTriple>,
    pub glyphs: GlyphRanges,
    pub warnings: Warnings,
}

impl GenContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a triple that will end up in the output and collect its glyphs.
    pub fn establish(&mut self, triple: LocalizedTriple) -> LocalizedTriple {
        self.glyphs.add(&triple);
        triple
    }

    /// Add a glossary entry; returns the previous value if the key was taken.
    pub fn define(&mut self, key: &str, triple: LocalizedTriple) -> Option<LocalizedTriple> {
        let triple = self.establish(triple);
        self.glossary.insert(key.to_owned(), triple)
    }

    /// Look up a glossary key on behalf of a section.
    pub fn resolve(&mut self, key: &str) -> Option<LocalizedTriple> {
        let triple = self.glossary.get(key)?.clone();
        Some(self.establish(triple))
    }

    pub fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg);
    }
}
